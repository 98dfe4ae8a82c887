use qrcode::{Color, EcLevel, QrCode};

/// Side the QR bitmap aims for, in pixels. The actual side is the largest
/// whole-pixel-per-module size that fits.
pub const QR_TARGET_PX: u32 = 360;

/// Quiet zone around the symbol, in modules, as the QR spec asks for.
const QUIET_ZONE_MODULES: u32 = 4;

/// Encode `data` as a QR symbol (error correction M) and rasterize it into
/// an 8-bit grayscale square. Returns `(side_px, pixels)`, row-major.
pub fn qr_bitmap(data: &str) -> anyhow::Result<(u32, Vec<u8>)> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M)
        .map_err(|e| anyhow::anyhow!("qr encoding failed: {e}"))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();

    let total = modules + 2 * QUIET_ZONE_MODULES;
    let scale = (QR_TARGET_PX / total).max(1);
    let side = total * scale;

    let mut pixels = vec![0xFF_u8; (side * side) as usize];

    for (i, color) in colors.iter().enumerate() {
        if !matches!(color, Color::Dark) {
            continue;
        }

        let module_x = i as u32 % modules;
        let module_y = i as u32 / modules;
        let x0 = (QUIET_ZONE_MODULES + module_x) * scale;
        let y0 = (QUIET_ZONE_MODULES + module_y) * scale;

        for y in y0..y0 + scale {
            let row = (y * side) as usize;
            for x in x0..x0 + scale {
                pixels[row + x as usize] = 0x00;
            }
        }
    }

    Ok((side, pixels))
}

/// Flat gray square substituted when encoding fails, so the document still
/// renders with the verification URL printed beneath it.
pub fn placeholder_bitmap() -> (u32, Vec<u8>) {
    (QR_TARGET_PX, vec![0xD9; (QR_TARGET_PX * QR_TARGET_PX) as usize])
}
