//! Style normalization: CSS value microformats parsed into a
//! target-agnostic [`StyleRecord`].
//!
//! Every parser here is total. Bad input yields `None` or a default and
//! never an error.

pub mod border;
pub mod color;
pub mod font;
pub mod gradient;

pub use border::{
    parse_border, parse_border_radius, parse_shadow, resolve_edges, BorderSpec, Edge, EdgeBorder,
    LineStyle, ShadowSpec,
};
pub use color::{parse_alpha, parse_color};
pub use font::{decoration_flags, is_bold, is_italic, map_font_family, parse_font_size};
pub use gradient::parse_gradient;

use crate::css::ComputedStyle;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("center") | Some("-webkit-center") => TextAlign::Center,
            Some("right") | Some("end") => TextAlign::Right,
            Some("justify") => TextAlign::Justify,
            _ => TextAlign::Left,
        }
    }
}

/// Normalized styling of one element. Colors are six uppercase hex digits;
/// font size is in points; radius stays in source px until the geometry
/// pass converts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRecord {
    pub font_family: String,
    pub font_size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub align: TextAlign,
    /// Line box height as a multiple of the font size.
    pub line_height: Option<f32>,
    pub color: Option<String>,
    pub background: Option<String>,
    /// Alpha of the background color, 0–1.
    pub fill_opacity: f32,
    /// Outline drawn around the whole box.
    pub border: Option<BorderSpec>,
    /// Edges bordered on their own, when the four sides differ.
    pub edge_borders: Vec<EdgeBorder>,
    pub shadow: Option<ShadowSpec>,
    pub border_radius_px: f32,
    pub opacity: f32,
    /// Raw gradient value, when the background is a gradient.
    pub gradient: Option<String>,
    /// `url(...)` target of a background image.
    pub background_image: Option<String>,
    pub animation: Option<String>,
    pub transition: Option<String>,
    pub transform: Option<String>,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_pt: 18.0,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            align: TextAlign::Left,
            line_height: None,
            color: None,
            background: None,
            fill_opacity: 1.0,
            border: None,
            edge_borders: Vec::new(),
            shadow: None,
            border_radius_px: 0.0,
            opacity: 1.0,
            gradient: None,
            background_image: None,
            animation: None,
            transition: None,
            transform: None,
        }
    }
}

/// Fallbacks used where the document does not say.
#[derive(Debug, Clone, Copy)]
pub struct StyleDefaults<'a> {
    pub font_face: &'a str,
    pub font_size_pt: f32,
}

impl StyleRecord {
    /// Capture the computed style of one element. `shorter_side_px` is the
    /// shorter side of the element's box, for percentage radii.
    pub fn capture(computed: &ComputedStyle, shorter_side_px: f32, defaults: StyleDefaults) -> Self {
        let get = |p: &str| computed.get(p).filter(|v| !v.trim().is_empty());
        let (underline, strikethrough) = decoration_flags(get("text-decoration"));
        let font_size_pt = parse_font_size(get("font-size"), defaults.font_size_pt);

        let background_color = get("background-color");
        let fill_opacity = background_color.and_then(parse_alpha).unwrap_or(1.0);

        let image = get("background-image").filter(|v| *v != "none");
        let gradient = image
            .filter(|v| v.contains("gradient("))
            .map(str::to_string);
        let background_image = image.and_then(extract_url);

        let (border, edge_borders) = resolve_edges(Edge::ALL.map(|edge| {
            let side = edge.css_name();
            parse_border(
                get(&format!("border-{side}-width")),
                get(&format!("border-{side}-style")),
                get(&format!("border-{side}-color")),
            )
        }));

        Self {
            font_family: map_font_family(get("font-family"), defaults.font_face),
            font_size_pt,
            bold: is_bold(get("font-weight")),
            italic: is_italic(get("font-style")),
            underline,
            strikethrough,
            align: TextAlign::parse(get("text-align")),
            line_height: parse_line_height(get("line-height"), computed.font_size_px()),
            color: get("color").and_then(parse_color),
            background: background_color.and_then(parse_color),
            fill_opacity,
            border,
            edge_borders,
            shadow: parse_shadow(get("box-shadow")),
            border_radius_px: parse_border_radius(get("border-radius"), shorter_side_px),
            opacity: parse_opacity(get("opacity")),
            gradient,
            background_image,
            animation: get("animation").filter(|v| *v != "none").map(str::to_string),
            transition: get("transition").map(str::to_string),
            transform: get("transform").filter(|v| *v != "none").map(str::to_string),
        }
    }

    /// Whether the box paints anything a shape primitive can reproduce.
    /// A rounded box without an image fill counts even when unfilled.
    pub fn has_box_decoration(&self) -> bool {
        self.background.is_some()
            || self.border.is_some()
            || self.shadow.is_some()
            || (self.border_radius_px > 0.0
                && self.gradient.is_none()
                && self.background_image.is_none())
    }
}

fn parse_opacity(value: Option<&str>) -> f32 {
    let Some(value) = value.map(str::trim) else {
        return 1.0;
    };
    let parsed = match value.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().map(|p| p / 100.0),
        None => value.parse::<f32>(),
    };
    parsed.map(|v| v.clamp(0.0, 1.0)).unwrap_or(1.0)
}

fn parse_line_height(value: Option<&str>, font_px: f32) -> Option<f32> {
    let value = value?.trim();
    if value == "normal" || font_px <= 0.0 {
        return None;
    }
    if let Some(px) = value.strip_suffix("px") {
        return px.trim().parse::<f32>().ok().map(|px| px / font_px);
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|p| p / 100.0);
    }
    if let Some(em) = value.strip_suffix("em") {
        return em.trim().parse::<f32>().ok();
    }
    value.parse::<f32>().ok()
}

/// Target of the first `url(...)` in a value, unquoted.
pub fn extract_url(value: &str) -> Option<String> {
    let start = value.find("url(")? + 4;
    let end = start + value[start..].find(')')?;
    let url = value[start..end].trim().trim_matches(|c| c == '"' || c == '\'');
    (!url.is_empty()).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(decls: &[(&str, &str)]) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        for (k, v) in decls {
            style.set(k, v);
        }
        style
    }

    trait WithBorder {
        fn with_border(self, edges: &[Edge], value: &str) -> Self;
    }

    impl WithBorder for ComputedStyle {
        /// `width style color` on the given edges, as the cascade stores it.
        fn with_border(mut self, edges: &[Edge], value: &str) -> Self {
            let parts: Vec<&str> = value.split_whitespace().collect();
            for edge in edges {
                for (part, v) in ["width", "style", "color"].iter().zip(&parts) {
                    self.set(&format!("border-{}-{part}", edge.css_name()), v);
                }
            }
            self
        }
    }

    const DEFAULTS: StyleDefaults<'static> = StyleDefaults {
        font_face: "Calibri",
        font_size_pt: 18.0,
    };

    #[test]
    fn test_capture_text_style() {
        let style = StyleRecord::capture(
            &computed(&[
                ("font-size", "32px"),
                ("font-family", "'Inter', sans-serif"),
                ("font-weight", "800"),
                ("font-style", "italic"),
                ("text-decoration", "underline"),
                ("text-align", "center"),
                ("line-height", "48px"),
                ("color", "#333"),
            ]),
            100.0,
            DEFAULTS,
        );
        assert_eq!(style.font_size_pt, 24.0);
        assert_eq!(style.font_family, "Arial");
        assert!(style.bold && style.italic && style.underline && !style.strikethrough);
        assert_eq!(style.align, TextAlign::Center);
        assert_eq!(style.line_height, Some(1.5));
        assert_eq!(style.color.as_deref(), Some("333333"));
    }

    #[test]
    fn test_capture_box_style() {
        let style = StyleRecord::capture(
            &computed(&[
                ("background-color", "rgba(16, 185, 129, 0.5)"),
                ("border-radius", "50%"),
                ("opacity", "0.8"),
            ])
            .with_border(&Edge::ALL, "1px solid #e5e7eb"),
            120.0,
            DEFAULTS,
        );
        assert_eq!(style.background.as_deref(), Some("10B981"));
        assert_eq!(style.fill_opacity, 0.5);
        assert_eq!(style.border_radius_px, 60.0);
        assert_eq!(style.border.as_ref().map(|b| b.color.as_str()), Some("E5E7EB"));
        assert_eq!(style.opacity, 0.8);
        assert!(style.edge_borders.is_empty());
        assert!(style.has_box_decoration());
    }

    #[test]
    fn test_capture_single_edge_border() {
        let style = StyleRecord::capture(
            &computed(&[]).with_border(&[Edge::Left], "6px solid #3b82f6"),
            100.0,
            DEFAULTS,
        );
        assert_eq!(style.border, None);
        assert_eq!(style.edge_borders.len(), 1);
        assert_eq!(style.edge_borders[0].edge, Edge::Left);
        assert_eq!(style.edge_borders[0].spec.width_pt, 4.5);
    }

    #[test]
    fn test_capture_defaults_and_backgrounds() {
        let style = StyleRecord::capture(
            &computed(&[("background-image", "linear-gradient(to right, red, blue)")]),
            10.0,
            DEFAULTS,
        );
        assert_eq!(style.font_family, "Calibri");
        assert_eq!(style.font_size_pt, 18.0);
        assert!(style.gradient.is_some());
        assert_eq!(style.background_image, None);
        assert!(!style.has_box_decoration());

        let style = StyleRecord::capture(
            &computed(&[("background-image", "url('hero.jpg')")]),
            10.0,
            DEFAULTS,
        );
        assert_eq!(style.background_image.as_deref(), Some("hero.jpg"));
        assert_eq!(style.gradient, None);
    }
}
