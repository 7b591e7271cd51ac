//! CSS color values → six uppercase hex digits.

/// The named colors slide decks actually use. Anything else is absent.
pub const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "000000"),
    ("white", "FFFFFF"),
    ("red", "FF0000"),
    ("green", "008000"),
    ("lime", "00FF00"),
    ("blue", "0000FF"),
    ("yellow", "FFFF00"),
    ("orange", "FFA500"),
    ("purple", "800080"),
    ("pink", "FFC0CB"),
    ("gray", "808080"),
    ("grey", "808080"),
    ("silver", "C0C0C0"),
    ("lightgray", "D3D3D3"),
    ("lightgrey", "D3D3D3"),
    ("darkgray", "A9A9A9"),
    ("darkgrey", "A9A9A9"),
    ("navy", "000080"),
    ("teal", "008080"),
    ("maroon", "800000"),
    ("olive", "808000"),
    ("aqua", "00FFFF"),
    ("cyan", "00FFFF"),
    ("fuchsia", "FF00FF"),
    ("magenta", "FF00FF"),
    ("gold", "FFD700"),
    ("indigo", "4B0082"),
    ("violet", "EE82EE"),
    ("brown", "A52A2A"),
    ("coral", "FF7F50"),
    ("crimson", "DC143C"),
    ("tomato", "FF6347"),
    ("salmon", "FA8072"),
    ("skyblue", "87CEEB"),
    ("steelblue", "4682B4"),
    ("royalblue", "4169E1"),
    ("dodgerblue", "1E90FF"),
    ("darkblue", "00008B"),
    ("darkgreen", "006400"),
    ("forestgreen", "228B22"),
    ("seagreen", "2E8B57"),
    ("whitesmoke", "F5F5F5"),
    ("ghostwhite", "F8F8FF"),
    ("ivory", "FFFFF0"),
    ("beige", "F5F5DC"),
    ("slategray", "708090"),
    ("dimgray", "696969"),
];

/// Parse a CSS color into `RRGGBB` (uppercase, no `#`).
///
/// Accepts 3/4/6/8-digit hex, `rgb()`/`rgba()`, `hsl()`/`hsla()` and the
/// names in [`NAMED_COLORS`]. Alpha is dropped here (see [`parse_alpha`]);
/// a fully transparent color is absent, like `transparent`.
pub fn parse_color(value: &str) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() || value == "transparent" || value == "none" {
        return None;
    }
    if parse_alpha(&value) == Some(0.0) {
        return None;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).map(|(r, g, b, _)| to_hex(r, g, b));
    }
    if value.starts_with("rgb") {
        return parse_rgb_function(&value).map(|(r, g, b, _)| to_hex(r, g, b));
    }
    if value.starts_with("hsl") {
        return parse_hsl_function(&value).map(|(r, g, b, _)| to_hex(r, g, b));
    }
    lookup_named(&value).map(str::to_string)
}

/// Alpha component of a color, when it has one (0–1).
pub fn parse_alpha(value: &str) -> Option<f32> {
    let value = value.trim().to_lowercase();
    if value == "transparent" {
        return Some(0.0);
    }
    let alpha = if let Some(hex) = value.strip_prefix('#') {
        parse_hex(hex)?.3
    } else if value.starts_with("rgb") {
        parse_rgb_function(&value)?.3
    } else if value.starts_with("hsl") {
        parse_hsl_function(&value)?.3
    } else {
        None
    };
    alpha.map(|a| a.clamp(0.0, 1.0))
}

pub fn lookup_named(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, hex)| *hex)
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("{r:02X}{g:02X}{b:02X}")
}

type Rgba = (u8, u8, u8, Option<f32>);

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some((digit(0)?, digit(1)?, digit(2)?, None)),
        4 => Some((digit(0)?, digit(1)?, digit(2)?, Some(digit(3)? as f32 / 255.0))),
        6 => Some((pair(0)?, pair(2)?, pair(4)?, None)),
        8 => Some((pair(0)?, pair(2)?, pair(4)?, Some(pair(6)? as f32 / 255.0))),
        _ => None,
    }
}

/// Arguments of `name(...)`, split on commas, whitespace and `/`.
fn function_args(value: &str) -> Option<Vec<&str>> {
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    if close <= open {
        return None;
    }
    Some(
        value[open + 1..close]
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn parse_alpha_arg(arg: Option<&&str>) -> Option<Option<f32>> {
    match arg {
        None => Some(None),
        Some(a) => {
            let v = match a.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                None => a.parse::<f32>().ok()?,
            };
            Some(Some(v))
        }
    }
}

fn parse_rgb_function(value: &str) -> Option<Rgba> {
    let args = function_args(value)?;
    if args.len() < 3 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? * 2.55,
            None => s.parse::<f32>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = parse_alpha_arg(args.get(3))?;
    Some((channel(args[0])?, channel(args[1])?, channel(args[2])?, alpha))
}

fn parse_hsl_function(value: &str) -> Option<Rgba> {
    let args = function_args(value)?;
    if args.len() < 3 {
        return None;
    }
    let h = args[0].trim_end_matches("deg").parse::<f32>().ok()?.rem_euclid(360.0) / 360.0;
    let s = args[1].trim_end_matches('%').parse::<f32>().ok()?.clamp(0.0, 100.0) / 100.0;
    let l = args[2].trim_end_matches('%').parse::<f32>().ok()?.clamp(0.0, 100.0) / 100.0;
    let alpha = parse_alpha_arg(args.get(3))?;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    let byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Some((byte(r), byte(g), byte(b), alpha))
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#abc").as_deref(), Some("AABBCC"));
        assert_eq!(parse_color("#ABCD").as_deref(), Some("AABBCC"));
        assert_eq!(parse_color("#10b981").as_deref(), Some("10B981"));
        assert_eq!(parse_color("#10b98180").as_deref(), Some("10B981"));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse_color("rgba(255,128,0,0.5)").as_deref(), Some("FF8000"));
        assert_eq!(parse_color("rgb(16, 185, 129)").as_deref(), Some("10B981"));
        assert_eq!(parse_color("rgb(255 0 0 / 50%)").as_deref(), Some("FF0000"));
        assert_eq!(parse_color("rgb(100%, 0%, 0%)").as_deref(), Some("FF0000"));
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_hsl_and_names() {
        assert_eq!(parse_color("hsl(0, 100%, 50%)").as_deref(), Some("FF0000"));
        assert_eq!(parse_color("hsl(120deg 100% 25%)").as_deref(), Some("008000"));
        assert_eq!(parse_color("White").as_deref(), Some("FFFFFF"));
        assert_eq!(parse_color("rebeccapurplish"), None);
    }

    #[test]
    fn test_absent_values() {
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("transparent"), None);
        assert_eq!(parse_color("rgba(0, 0, 0, 0)"), None);
    }

    #[test]
    fn test_output_is_always_six_uppercase_hex() {
        let inputs = [
            "#fff", "#000000", "#a1b2c3d4", "rgb(0,0,0)", "rgba(12, 34, 56, 0.9)", "#0f0f",
            "rgb(300, -5, 128)",
        ];
        for input in inputs {
            let out = parse_color(input).unwrap();
            assert_eq!(out.len(), 6, "{input}");
            assert!(out.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn test_alpha() {
        assert_eq!(parse_alpha("rgba(255,128,0,0.5)"), Some(0.5));
        assert_eq!(parse_alpha("#ff000080").map(|a| (a * 100.0).round()), Some(50.0));
        assert_eq!(parse_alpha("#ff0000"), None);
        assert_eq!(parse_alpha("transparent"), Some(0.0));
    }
}
