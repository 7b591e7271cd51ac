//! Vector stand-ins for well-known icon glyphs, used when a glyph font
//! cannot be drawn. Paths are on a 24x24 grid.

/// Canonical glyph name → SVG path data.
const GLYPHS: &[(&str, &str)] = &[
    ("home", "M10 20v-6h4v6h5v-8h3L12 3 2 12h3v8z"),
    ("check", "M9 16.17L4.83 12l-1.42 1.41L9 19 21 7l-1.41-1.41z"),
    (
        "close",
        "M19 6.41L17.59 5 12 10.59 6.41 5 5 6.41 10.59 12 5 17.59 6.41 19 12 13.41 17.59 19 19 17.59 13.41 12z",
    ),
    (
        "star",
        "M12 17.27L18.18 21l-1.64-7.03L22 9.24l-7.19-.61L12 2 9.19 8.63 2 9.24l5.46 4.73L5.82 21z",
    ),
    (
        "favorite",
        "M12 21.35l-1.45-1.32C5.4 15.36 2 12.28 2 8.5 2 5.42 4.42 3 7.5 3c1.74 0 3.41.81 4.5 2.09C13.09 3.81 14.76 3 16.5 3 19.58 3 22 5.42 22 8.5c0 3.78-3.4 6.86-8.55 11.54L12 21.35z",
    ),
    (
        "search",
        "M15.5 14h-.79l-.28-.27C15.41 12.59 16 11.11 16 9.5 16 5.91 13.09 3 9.5 3S3 5.91 3 9.5 5.91 16 9.5 16c1.61 0 3.09-.59 4.23-1.57l.27.28v.79l5 4.99L20.49 19l-4.99-5zm-6 0C7.01 14 5 11.99 5 9.5S7.01 5 9.5 5 14 7.01 14 9.5 11.99 14 9.5 14z",
    ),
    ("menu", "M3 18h18v-2H3v2zm0-5h18v-2H3v2zm0-7v2h18V6H3z"),
    ("arrow_forward", "M12 4l-1.41 1.41L16.17 11H4v2h12.17l-5.58 5.59L12 20l8-8z"),
    ("arrow_back", "M20 11H7.83l5.59-5.59L12 4l-8 8 8 8 1.41-1.41L7.83 13H20v-2z"),
    (
        "info",
        "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-6h2v6zm0-8h-2V7h2v2z",
    ),
    ("warning", "M1 21h22L12 2 1 21zm12-3h-2v-2h2v2zm0-4h-2v-4h2v4z"),
    (
        "check_circle",
        "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 15l-5-5 1.41-1.41L10 14.17l7.59-7.59L19 8l-9 9z",
    ),
    (
        "person",
        "M12 12c2.21 0 4-1.79 4-4s-1.79-4-4-4-4 1.79-4 4 1.79 4 4 4zm0 2c-2.67 0-8 1.34-8 4v2h16v-2c0-2.66-5.33-4-8-4z",
    ),
    (
        "email",
        "M20 4H4c-1.1 0-1.99.9-1.99 2L2 18c0 1.1.9 2 2 2h16c1.1 0 2-.9 2-2V6c0-1.1-.9-2-2-2zm0 4l-8 5-8-5V6l8 5 8-5v2z",
    ),
    (
        "phone",
        "M6.62 10.79c1.44 2.83 3.76 5.14 6.59 6.59l2.2-2.2c.27-.27.67-.36 1.02-.24 1.12.37 2.33.57 3.57.57.55 0 1 .45 1 1V20c0 .55-.45 1-1 1-9.39 0-17-7.61-17-17 0-.55.45-1 1-1h3.5c.55 0 1 .45 1 1 0 1.25.2 2.45.57 3.57.11.35.03.74-.25 1.02l-2.2 2.2z",
    ),
    ("add", "M19 13h-6v6h-2v-6H5v-2h6V5h2v6h6v2z"),
    ("remove", "M19 13H5v-2h14v2z"),
    ("play_arrow", "M8 5v14l11-7z"),
    ("chevron_right", "M10 6L8.59 7.41 13.17 12l-4.58 4.59L10 18l6-6z"),
    ("chevron_left", "M15.41 7.41L14 6l-6 6 6 6 1.41-1.41L10.83 12z"),
    ("expand_more", "M16.59 8.59L12 13.17 7.41 8.59 6 10l6 6 6-6z"),
    ("trending_up", "M16 6l2.29 2.29-4.88 4.88-4-4L2 16.59 3.41 18l6-6 4 4 6.3-6.29L22 12V6z"),
    (
        "lightbulb",
        "M9 21c0 .55.45 1 1 1h4c.55 0 1-.45 1-1v-1H9v1zm3-19C8.14 2 5 5.14 5 9c0 2.38 1.19 4.47 3 5.74V17c0 .55.45 1 1 1h6c.55 0 1-.45 1-1v-2.26c1.81-1.27 3-3.36 3-5.74 0-3.86-3.14-7-7-7z",
    ),
    (
        "bolt",
        "M11 21h-1l1-7H7.5c-.58 0-.57-.32-.38-.66.19-.34.05-.08.07-.12C8.48 10.94 10.42 7.54 13 3h1l-1 7h3.5c.49 0 .56.33.47.51l-.07.15C12.96 17.55 11 21 11 21z",
    ),
    ("circle", "M12 2C6.47 2 2 6.47 2 12s4.47 10 10 10 10-4.47 10-10S17.53 2 12 2z"),
];

/// Other icon sets' names for the same glyphs.
const ALIASES: &[(&str, &str)] = &[
    ("house", "home"),
    ("done", "check"),
    ("xmark", "close"),
    ("times", "close"),
    ("x", "close"),
    ("heart", "favorite"),
    ("magnifying_glass", "search"),
    ("bars", "menu"),
    ("list", "menu"),
    ("arrow_right", "arrow_forward"),
    ("arrow_left", "arrow_back"),
    ("circle_info", "info"),
    ("info_circle", "info"),
    ("triangle_exclamation", "warning"),
    ("exclamation_triangle", "warning"),
    ("circle_check", "check_circle"),
    ("user", "person"),
    ("envelope", "email"),
    ("mail", "email"),
    ("plus", "add"),
    ("minus", "remove"),
    ("play", "play_arrow"),
    ("angle_right", "chevron_right"),
    ("angle_left", "chevron_left"),
    ("chevron_down", "expand_more"),
    ("angle_down", "expand_more"),
    ("chart_line", "trending_up"),
    ("bulb", "lightbulb"),
    ("flash_on", "bolt"),
];

fn canonical(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase().replace('-', "_");
    let stem = name
        .strip_suffix("_outline")
        .or_else(|| name.strip_suffix("_fill"))
        .filter(|stem| GLYPHS.iter().any(|(n, _)| n == stem))
        .map(str::to_string);
    stem.unwrap_or(name)
}

/// Path data for a glyph name from any of the supported icon sets.
pub fn lookup(name: &str) -> Option<&'static str> {
    let name = canonical(name);
    let name = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name.as_str());
    GLYPHS.iter().find(|(n, _)| *n == name).map(|(_, path)| *path)
}

/// Standalone SVG document drawing `path` in `fill` (six hex digits).
pub fn svg(path: &str, fill: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path fill="#{fill}" d="{path}"/></svg>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_across_icon_sets() {
        assert_eq!(lookup("home"), lookup("house"));
        assert_eq!(lookup("arrow-forward"), lookup("arrow_forward"));
        assert_eq!(lookup("circle-check"), lookup("check_circle"));
        assert_eq!(lookup("Star"), lookup("star"));
        assert_eq!(lookup("favorite_outline"), lookup("favorite"));
        assert!(lookup("rocket_launch").is_none());
    }

    #[test]
    fn test_svg_document() {
        let doc = svg(lookup("check").unwrap(), "10B981");
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r##"fill="#10B981""##));
        assert!(doc.contains("viewBox=\"0 0 24 24\""));
    }
}
