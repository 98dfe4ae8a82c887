use serde_json::{Map, Value};

/// Resolved visual knobs for one certificate. Colors are linear RGB in
/// `0.0..=1.0`, ready for the PDF color space.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: (f32, f32, f32),
    pub ink: (f32, f32, f32),
    pub serif: bool,
    pub title: String,
    pub institution_name: String,
    pub signatory_name: String,
    pub signatory_title: String,
}

impl Theme {
    fn classic() -> Self {
        Self {
            accent: (0.72, 0.55, 0.11),
            ink: (0.13, 0.13, 0.15),
            serif: false,
            title: "SERTIFIKAT".to_owned(),
            institution_name: "Institut Teknologi Batam".to_owned(),
            signatory_name: String::new(),
            signatory_title: String::new(),
        }
    }

    fn formal() -> Self {
        Self {
            accent: (0.10, 0.17, 0.35),
            serif: true,
            ..Self::classic()
        }
    }

    fn modern() -> Self {
        Self {
            accent: (0.00, 0.47, 0.42),
            ..Self::classic()
        }
    }
}

/// Resolve a template's theme name plus config overrides into a [`Theme`].
/// Unknown theme names fall back to `classic`; malformed or empty config
/// values are ignored, never fatal.
pub fn resolve(theme: &str, config: &Map<String, Value>) -> Theme {
    let mut resolved = match theme {
        "formal" => Theme::formal(),
        "modern" => Theme::modern(),
        _ => Theme::classic(),
    };

    if let Some(name) = config_str(config, "institution_name") {
        resolved.institution_name = name;
    }
    if let Some(title) = config_str(config, "title") {
        resolved.title = title;
    }
    if let Some(name) = config_str(config, "signatory_name") {
        resolved.signatory_name = name;
    }
    if let Some(title) = config_str(config, "signatory_title") {
        resolved.signatory_title = title;
    }
    if let Some(accent) =
        config_str(config, "accent_color").and_then(|c| parse_hex_color(&c))
    {
        resolved.accent = accent;
    }

    resolved
}

fn config_str(config: &Map<String, Value>, key: &str) -> Option<String> {
    config
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// `#RRGGBB` to linear RGB. Anything else is `None`.
fn parse_hex_color(value: &str) -> Option<(f32, f32, f32)> {
    let hex = value.strip_prefix('#')?;
    // The length check alone is not enough: `len` counts bytes, and slicing
    // a multibyte value below would panic mid-character.
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };

    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
