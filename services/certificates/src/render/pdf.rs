use std::path::PathBuf;

use printpdf::image_crate::{self, DynamicImage, GenericImageView, GrayImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};

use crate::domain::repository::CertificateRenderer;
use crate::domain::types::CertificateRenderData;
use crate::render::qr;
use crate::render::theme::{self, Theme};

// Landscape A4. All positions are millimeters from the bottom-left corner.
const PAGE_W_MM: f32 = 297.0;
const PAGE_H_MM: f32 = 210.0;
const PT_TO_MM: f32 = 0.3528;

const LOGO_H_MM: f32 = 22.0;
const LOGO_BOTTOM_MM: f32 = 174.0;
const QR_SIZE_MM: f32 = 32.0;
const QR_POS_MM: f32 = 18.0;

/// Renders certificates as single-page landscape A4 PDFs with builtin PDF
/// fonts. The only I/O at render time is reading the logo file; a missing or
/// undecodable logo degrades to a drawn placeholder.
pub struct PdfRenderer {
    pub logo_path: PathBuf,
}

impl CertificateRenderer for PdfRenderer {
    fn render(&self, data: &CertificateRenderData) -> anyhow::Result<Vec<u8>> {
        self.compose(data)
    }
}

impl PdfRenderer {
    pub fn new(logo_path: impl Into<PathBuf>) -> Self {
        Self { logo_path: logo_path.into() }
    }

    fn compose(&self, data: &CertificateRenderData) -> anyhow::Result<Vec<u8>> {
        let theme = theme::resolve(&data.theme, &data.config);

        let (doc, page, layer) = PdfDocument::new(
            format!("Certificate {}", data.certificate_number),
            Mm(PAGE_W_MM as _),
            Mm(PAGE_H_MM as _),
            "certificate",
        );
        let layer = doc.get_page(page).get_layer(layer);

        let (body, bold) = if theme.serif {
            (
                doc.add_builtin_font(BuiltinFont::TimesRoman)?,
                doc.add_builtin_font(BuiltinFont::TimesBold)?,
            )
        } else {
            (
                doc.add_builtin_font(BuiltinFont::Helvetica)?,
                doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            )
        };
        let mono = doc.add_builtin_font(BuiltinFont::Courier)?;

        frame(&layer, &theme);

        match self.logo_image() {
            Ok(logo) => place_logo(&layer, &logo),
            Err(e) => {
                tracing::warn!(
                    path = %self.logo_path.display(),
                    error = %e,
                    "logo unavailable, drawing placeholder"
                );
                logo_placeholder(&layer, &theme, &bold);
            }
        }

        set_fill(&layer, theme.ink);
        page_centered(&layer, &theme.institution_name, 16.0, 160.0, &bold);

        set_fill(&layer, theme.accent);
        page_centered(&layer, &theme.title, 30.0, 142.0, &bold);

        set_fill(&layer, theme.ink);
        page_centered(&layer, &format!("No. {}", data.certificate_number), 11.0, 133.0, &body);
        page_centered(&layer, "This certificate is proudly presented to", 12.0, 118.0, &body);

        page_centered(&layer, &data.attendee_name, 26.0, 100.0, &bold);
        underline(&layer, &theme, &data.attendee_name, 26.0, 96.0);

        page_centered(&layer, "for participating in", 12.0, 86.0, &body);
        page_centered(&layer, &data.event_name, 15.0, 77.0, &bold);
        page_centered(&layer, &held_at_line(data), 11.0, 67.0, &body);
        page_centered(
            &layer,
            &format!("organized by {}", data.event_organizer),
            11.0,
            59.0,
            &body,
        );

        if !theme.signatory_name.is_empty() {
            signatory_block(&layer, &theme, &body, &bold);
        }

        self.place_qr(&layer, data)?;
        set_fill(&layer, theme.ink);
        layer.use_text(
            format!("ID {}", data.short_hash),
            8.0,
            Mm(QR_POS_MM as _),
            Mm(13.0),
            &mono,
        );

        Ok(doc.save_to_bytes()?)
    }

    fn logo_image(&self) -> anyhow::Result<DynamicImage> {
        let bytes = std::fs::read(&self.logo_path)?;
        let decoded = image_crate::load_from_memory(&bytes)?;

        // Flattened to RGB: the embedded-image path writes channels as-is
        // and an alpha channel would come out as a corrupt color space.
        Ok(DynamicImage::ImageRgb8(decoded.to_rgb8()))
    }

    fn place_qr(
        &self,
        layer: &PdfLayerReference,
        data: &CertificateRenderData,
    ) -> anyhow::Result<()> {
        let (side, pixels) = match qr::qr_bitmap(&data.verification_url) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                tracing::warn!(error = %e, "qr encoding failed, drawing placeholder");
                qr::placeholder_bitmap()
            }
        };

        let gray = GrayImage::from_raw(side, side, pixels)
            .ok_or_else(|| anyhow::anyhow!("qr bitmap dimensions mismatch"))?;

        Image::from_dynamic_image(&DynamicImage::ImageLuma8(gray)).add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(QR_POS_MM as _)),
                translate_y: Some(Mm(QR_POS_MM as _)),
                dpi: Some(px_to_dpi(side as f32, QR_SIZE_MM) as _),
                ..Default::default()
            },
        );

        Ok(())
    }
}

fn frame(layer: &PdfLayerReference, theme: &Theme) {
    layer.set_outline_color(stroke_color(theme.accent));
    layer.set_outline_thickness(1.5);
    layer.add_line(rect_line(8.0, 8.0, PAGE_W_MM - 8.0, PAGE_H_MM - 8.0));

    layer.set_outline_thickness(0.5);
    layer.add_line(rect_line(11.0, 11.0, PAGE_W_MM - 11.0, PAGE_H_MM - 11.0));
}

fn place_logo(layer: &PdfLayerReference, logo: &DynamicImage) {
    let (w, h) = logo.dimensions();
    let (w, h) = (w as f32, h as f32);
    let w_mm = w * LOGO_H_MM / h;

    Image::from_dynamic_image(logo).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(((PAGE_W_MM - w_mm) / 2.0) as _)),
            translate_y: Some(Mm(LOGO_BOTTOM_MM as _)),
            dpi: Some(px_to_dpi(h, LOGO_H_MM) as _),
            ..Default::default()
        },
    );
}

/// Bordered box with the institution's initials, standing in for the logo.
fn logo_placeholder(layer: &PdfLayerReference, theme: &Theme, bold: &IndirectFontRef) {
    let x0 = (PAGE_W_MM - LOGO_H_MM) / 2.0;

    layer.set_outline_color(stroke_color(theme.accent));
    layer.set_outline_thickness(1.0);
    layer.add_line(rect_line(x0, LOGO_BOTTOM_MM, x0 + LOGO_H_MM, LOGO_BOTTOM_MM + LOGO_H_MM));

    let initials: String = theme
        .institution_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    set_fill(layer, theme.accent);
    text_centered_at(
        layer,
        &initials,
        14.0,
        PAGE_W_MM / 2.0,
        LOGO_BOTTOM_MM + LOGO_H_MM / 2.0 - 2.0,
        bold,
    );
}

fn signatory_block(
    layer: &PdfLayerReference,
    theme: &Theme,
    body: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let center = 230.0;

    layer.set_outline_color(stroke_color(theme.ink));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm((center - 25.0) as _), Mm(42.0)), false),
            (Point::new(Mm((center + 25.0) as _), Mm(42.0)), false),
        ],
        is_closed: false,
    });

    set_fill(layer, theme.ink);
    text_centered_at(layer, &theme.signatory_name, 11.0, center, 36.0, bold);
    if !theme.signatory_title.is_empty() {
        text_centered_at(layer, &theme.signatory_title, 9.0, center, 31.0, body);
    }
}

fn held_at_line(data: &CertificateRenderData) -> String {
    let date = data.event_date.format("%d %B %Y");

    if data.venue == "-" {
        format!("held on {date}")
    } else {
        format!("held at {}, {date}", data.venue)
    }
}

fn underline(layer: &PdfLayerReference, theme: &Theme, text: &str, size_pt: f32, y: f32) {
    let half = text_width_mm(text, size_pt) / 2.0;

    layer.set_outline_color(stroke_color(theme.accent));
    layer.set_outline_thickness(0.8);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm((PAGE_W_MM / 2.0 - half) as _), Mm(y as _)), false),
            (Point::new(Mm((PAGE_W_MM / 2.0 + half) as _), Mm(y as _)), false),
        ],
        is_closed: false,
    });
}

fn page_centered(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    y: f32,
    font: &IndirectFontRef,
) {
    text_centered_at(layer, text, size_pt, PAGE_W_MM / 2.0, y, font);
}

fn text_centered_at(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    center: f32,
    y: f32,
    font: &IndirectFontRef,
) {
    let x = (center - text_width_mm(text, size_pt) / 2.0).max(12.0);

    layer.use_text(text, size_pt as _, Mm(x as _), Mm(y as _), font);
}

/// Approximate width of builtin-font text: average glyph taken as half an em.
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM
}

fn rect_line(x0: f32, y0: f32, x1: f32, y1: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x0 as _), Mm(y0 as _)), false),
            (Point::new(Mm(x1 as _), Mm(y0 as _)), false),
            (Point::new(Mm(x1 as _), Mm(y1 as _)), false),
            (Point::new(Mm(x0 as _), Mm(y1 as _)), false),
        ],
        is_closed: true,
    }
}

fn set_fill(layer: &PdfLayerReference, (r, g, b): (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb::new(r as _, g as _, b as _, None)));
}

fn stroke_color((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r as _, g as _, b as _, None))
}

fn px_to_dpi(px: f32, target_mm: f32) -> f32 {
    px * 25.4 / target_mm
}
