//! Font size, family, weight, style and decoration.

/// Smallest and largest point size a text run may carry.
pub const MIN_FONT_PT: f32 = 6.0;
pub const MAX_FONT_PT: f32 = 200.0;

const PX_TO_PT: f32 = 0.75;
const BASE_FONT_PX: f32 = 16.0;

/// Web fonts and generic families mapped to names every slide viewer has.
pub const FONT_FAMILY_MAP: &[(&str, &str)] = &[
    ("helvetica neue", "Arial"),
    ("helvetica", "Arial"),
    ("arial", "Arial"),
    ("-apple-system", "Arial"),
    ("blinkmacsystemfont", "Arial"),
    ("system-ui", "Arial"),
    ("sans-serif", "Arial"),
    ("roboto", "Arial"),
    ("inter", "Arial"),
    ("open sans", "Arial"),
    ("lato", "Arial"),
    ("montserrat", "Arial"),
    ("poppins", "Arial"),
    ("noto sans", "Arial"),
    ("source sans pro", "Arial"),
    ("segoe ui", "Segoe UI"),
    ("serif", "Times New Roman"),
    ("times", "Times New Roman"),
    ("times new roman", "Times New Roman"),
    ("georgia", "Georgia"),
    ("merriweather", "Georgia"),
    ("playfair display", "Georgia"),
    ("monospace", "Courier New"),
    ("courier", "Courier New"),
    ("courier new", "Courier New"),
    ("consolas", "Consolas"),
    ("menlo", "Consolas"),
    ("fira code", "Consolas"),
    ("jetbrains mono", "Consolas"),
    ("source code pro", "Consolas"),
    ("noto sans sc", "Microsoft YaHei"),
    ("pingfang sc", "Microsoft YaHei"),
    ("microsoft yahei", "Microsoft YaHei"),
    ("cursive", "Comic Sans MS"),
];

/// Convert a CSS font size to points, clamped to
/// [`MIN_FONT_PT`]..=[`MAX_FONT_PT`]. `default_pt` is used when the value is
/// missing or has no number in it.
pub fn parse_font_size(value: Option<&str>, default_pt: f32) -> f32 {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return default_pt;
    };
    let value = value.to_lowercase();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(value.len());
    let Ok(number) = value[..split].parse::<f32>() else {
        return default_pt;
    };
    let pt = match value[split..].trim() {
        "px" => number * PX_TO_PT,
        "pt" => number,
        "em" | "rem" => number * BASE_FONT_PX * PX_TO_PT,
        "%" => number / 100.0 * BASE_FONT_PX * PX_TO_PT,
        _ => number,
    };
    pt.clamp(MIN_FONT_PT, MAX_FONT_PT)
}

/// First family of a font stack, unquoted and mapped through
/// [`FONT_FAMILY_MAP`]. Unknown families pass through as written.
pub fn map_font_family(stack: Option<&str>, default_face: &str) -> String {
    let first = stack
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|s| !s.is_empty());
    match first {
        None => default_face.to_string(),
        Some(family) => {
            let key = family.to_lowercase();
            FONT_FAMILY_MAP
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, mapped)| mapped.to_string())
                .unwrap_or_else(|| family.to_string())
        }
    }
}

pub fn is_bold(weight: Option<&str>) -> bool {
    match weight.map(str::trim) {
        Some("bold") | Some("bolder") => true,
        Some(w) => w.parse::<u32>().map(|n| n >= 700).unwrap_or(false),
        None => false,
    }
}

pub fn is_italic(style: Option<&str>) -> bool {
    matches!(
        style.map(|s| s.split_whitespace().next().unwrap_or("")),
        Some("italic") | Some("oblique")
    )
}

/// `(underline, strikethrough)` from a `text-decoration` value.
pub fn decoration_flags(decoration: Option<&str>) -> (bool, bool) {
    let decoration = decoration.unwrap_or("");
    let mut underline = false;
    let mut strike = false;
    for token in decoration.split_whitespace() {
        match token {
            "underline" => underline = true,
            "line-through" => strike = true,
            _ => {}
        }
    }
    (underline, strike)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_units() {
        assert_eq!(parse_font_size(Some("16px"), 18.0), 12.0);
        assert_eq!(parse_font_size(Some("18pt"), 18.0), 18.0);
        assert_eq!(parse_font_size(Some("1em"), 18.0), 12.0);
        assert_eq!(parse_font_size(Some("2rem"), 18.0), 24.0);
        assert_eq!(parse_font_size(Some("150%"), 18.0), 18.0);
    }

    #[test]
    fn test_font_size_fallbacks_and_clamp() {
        assert_eq!(parse_font_size(None, 18.0), 18.0);
        assert_eq!(parse_font_size(Some("large"), 18.0), 18.0);
        assert_eq!(parse_font_size(Some("14"), 18.0), 14.0);
        assert_eq!(parse_font_size(Some("20vw"), 18.0), 20.0);
        assert_eq!(parse_font_size(Some("1px"), 18.0), MIN_FONT_PT);
        assert_eq!(parse_font_size(Some("900px"), 18.0), MAX_FONT_PT);
    }

    #[test]
    fn test_font_family() {
        assert_eq!(map_font_family(Some("\"Helvetica Neue\", Arial, sans-serif"), "Arial"), "Arial");
        assert_eq!(map_font_family(Some("'Fira Code', monospace"), "Arial"), "Consolas");
        assert_eq!(map_font_family(Some("Brand Display, serif"), "Arial"), "Brand Display");
        assert_eq!(map_font_family(Some(""), "Calibri"), "Calibri");
        assert_eq!(map_font_family(None, "Calibri"), "Calibri");
    }

    #[test]
    fn test_weight_style_decoration() {
        assert!(is_bold(Some("bold")));
        assert!(is_bold(Some("700")));
        assert!(!is_bold(Some("600")));
        assert!(!is_bold(Some("normal")));
        assert!(is_italic(Some("oblique 10deg")));
        assert!(!is_italic(Some("normal")));
        assert_eq!(decoration_flags(Some("underline line-through red")), (true, true));
        assert_eq!(decoration_flags(Some("none")), (false, false));
    }
}
