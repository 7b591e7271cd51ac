//! Borders, corner radius and box shadows.

use super::color::parse_color;
use serde::Serialize;

const PX_TO_PT: f32 = 0.75;
const BASE_FONT_PX: f32 = 16.0;
/// Shadows are emitted at one opacity regardless of the source color alpha.
pub const SHADOW_OPACITY: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderSpec {
    pub style: LineStyle,
    pub color: String,
    pub width_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowSpec {
    pub offset_pt: f32,
    /// Direction the shadow falls, clockwise from the positive x axis.
    pub angle_deg: f32,
    pub blur_pt: f32,
    pub color: String,
    pub opacity: f32,
}

/// One edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Side name as used in `border-<side>-width`.
    pub fn css_name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
        }
    }
}

/// A border drawn on one edge only, like a card's accent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeBorder {
    pub edge: Edge,
    pub spec: BorderSpec,
}

/// Fold the four edge descriptors (in [`Edge::ALL`] order) into either one
/// outline, when all four are present and identical, or one strip per
/// visible edge.
pub fn resolve_edges(edges: [Option<BorderSpec>; 4]) -> (Option<BorderSpec>, Vec<EdgeBorder>) {
    if let [Some(first), rest @ ..] = &edges {
        if rest.iter().all(|e| e.as_ref() == Some(first)) {
            return (Some(first.clone()), Vec::new());
        }
    }
    let strips = Edge::ALL
        .into_iter()
        .zip(edges)
        .filter_map(|(edge, spec)| spec.map(|spec| EdgeBorder { edge, spec }))
        .collect();
    (None, strips)
}

/// A border descriptor, present only for a visible style and a width > 0.
pub fn parse_border(
    width: Option<&str>,
    style: Option<&str>,
    color: Option<&str>,
) -> Option<BorderSpec> {
    let width_px = border_width_px(width?)?;
    if width_px <= 0.0 {
        return None;
    }
    let style = match style.map(str::trim).unwrap_or("solid") {
        "none" | "hidden" => return None,
        "dashed" | "dotted" => LineStyle::Dash,
        _ => LineStyle::Solid,
    };
    Some(BorderSpec {
        style,
        color: color.and_then(parse_color).unwrap_or_else(|| "000000".to_string()),
        width_pt: width_px * PX_TO_PT,
    })
}

fn border_width_px(value: &str) -> Option<f32> {
    let value = value.split_whitespace().next()?;
    match value {
        "thin" => Some(1.0),
        "medium" => Some(3.0),
        "thick" => Some(5.0),
        _ => length_px(value, None),
    }
}

/// Corner radius in source px. Only the first (top-left horizontal) radius
/// is used; percentages resolve against `shorter_side_px`.
pub fn parse_border_radius(value: Option<&str>, shorter_side_px: f32) -> f32 {
    value
        .and_then(|v| v.split(|c: char| c.is_whitespace() || c == '/').find(|t| !t.is_empty()))
        .and_then(|token| length_px(token, Some(shorter_side_px)))
        .map(|px| px.max(0.0))
        .unwrap_or(0.0)
}

fn length_px(token: &str, percent_base: Option<f32>) -> Option<f32> {
    let token = token.trim().to_lowercase();
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(token.len());
    let number = token[..split].parse::<f32>().ok()?;
    match &token[split..] {
        "" | "px" => Some(number),
        "pt" => Some(number / PX_TO_PT),
        "em" | "rem" => Some(number * BASE_FONT_PX),
        "%" => percent_base.map(|base| number / 100.0 * base),
        _ => None,
    }
}

/// First shadow of a `box-shadow` list. Inset shadows have no equivalent
/// and yield `None`.
pub fn parse_shadow(value: Option<&str>) -> Option<ShadowSpec> {
    let value = value?.trim();
    if value.is_empty() || value == "none" {
        return None;
    }
    let first = first_layer(value);

    let mut lengths = Vec::new();
    let mut color = None;
    for token in tokens(first) {
        if token == "inset" {
            return None;
        }
        match length_px(token, None) {
            Some(px) => lengths.push(px),
            None => color = color.or_else(|| parse_color(token)),
        }
    }
    if lengths.len() < 2 {
        return None;
    }
    let (h, v) = (lengths[0], lengths[1]);
    let blur = lengths.get(2).copied().unwrap_or(0.0).max(0.0);
    Some(ShadowSpec {
        offset_pt: (h * h + v * v).sqrt() * PX_TO_PT,
        angle_deg: v.atan2(h).to_degrees().rem_euclid(360.0),
        blur_pt: blur * PX_TO_PT,
        color: color.unwrap_or_else(|| "000000".to_string()),
        opacity: SHADOW_OPACITY,
    })
}

/// Text up to the first comma outside parentheses.
fn first_layer(value: &str) -> &str {
    let mut depth = 0i32;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => return &value[..i],
            _ => {}
        }
    }
    value
}

/// Whitespace tokens, keeping `rgb(0, 0, 0)` style functions whole.
fn tokens(value: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    out.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&value[s..]);
    }
    out
}
