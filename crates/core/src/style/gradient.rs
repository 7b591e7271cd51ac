//! `linear-gradient()` / `radial-gradient()` → [`GradientSpec`].

use super::color::{lookup_named, parse_color};
use crate::model::{ColorStop, GradientKind, GradientSpec};
use regex::Regex;
use std::sync::LazyLock;

// Greedy to the last `)`: stop colors carry their own parentheses.
static GRADIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:repeating-)?(linear|radial)-gradient\((.*)\)").unwrap()
});

static ANGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(-?\d*\.?\d+)(deg|turn|rad|grad)\s*$").unwrap());

static STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(#[0-9a-f]{3,8}\b|rgba?\([^)]*\)|hsla?\([^)]*\)|\b[a-z]+\b)(?:\s+(-?\d*\.?\d+)%)?",
    )
    .unwrap()
});

const DEFAULT_ANGLE: f32 = 180.0;

/// Words that may appear in a gradient's first argument.
const DIRECTION_WORDS: &[&str] = &[
    "to", "top", "bottom", "left", "right", "center", "at", "circle", "ellipse",
    "closest-side", "closest-corner", "farthest-side", "farthest-corner",
];

/// Parse the first gradient in a `background` / `background-image` value.
/// Needs at least one recognizable color stop.
pub fn parse_gradient(value: &str) -> Option<GradientSpec> {
    let caps = GRADIENT_RE.captures(value)?;
    let kind = if caps[1].eq_ignore_ascii_case("radial") {
        GradientKind::Radial
    } else {
        GradientKind::Linear
    };
    let body = caps.get(2)?.as_str();

    let angle_deg = match kind {
        GradientKind::Linear => parse_direction(body.split(',').next().unwrap_or("")),
        GradientKind::Radial => DEFAULT_ANGLE,
    };

    let mut colors = Vec::new();
    let mut positions = Vec::new();
    for cap in STOP_RE.captures_iter(body) {
        let token = &cap[1];
        let is_word = token.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        if is_word {
            let word = token.to_lowercase();
            if DIRECTION_WORDS.contains(&word.as_str()) || lookup_named(&word).is_none() {
                continue;
            }
        }
        let Some(color) = parse_color(token) else {
            continue;
        };
        colors.push(color);
        positions.push(cap.get(2).and_then(|p| p.as_str().parse::<f32>().ok()));
    }

    match colors.len() {
        0 => return None,
        1 => {
            colors.push(colors[0].clone());
            positions = vec![Some(0.0), Some(100.0)];
        }
        _ => {}
    }

    let stops = colors
        .into_iter()
        .zip(distribute_positions(&positions))
        .map(|(color, position)| ColorStop { color, position })
        .collect();
    Some(GradientSpec {
        kind,
        angle_deg,
        stops,
    })
}

/// CSS angle of a direction argument: keyword phrases first, then an
/// explicit angle, then top-to-bottom.
fn parse_direction(arg: &str) -> f32 {
    let words: Vec<String> = arg.split_whitespace().map(str::to_lowercase).collect();
    if words.first().map(String::as_str) == Some("to") {
        let has = |w: &str| words.iter().any(|x| x == w);
        let (top, bottom, left, right) = (has("top"), has("bottom"), has("left"), has("right"));
        return match (top, bottom, left, right) {
            (true, _, false, false) => 0.0,
            (true, _, false, true) => 45.0,
            (_, _, false, true) => if bottom { 135.0 } else { 90.0 },
            (_, true, true, _) => 225.0,
            (_, true, false, false) => 180.0,
            (true, _, true, _) => 315.0,
            (_, _, true, _) => 270.0,
            _ => DEFAULT_ANGLE,
        };
    }
    let Some(caps) = ANGLE_RE.captures(arg) else {
        return DEFAULT_ANGLE;
    };
    let Ok(n) = caps[1].parse::<f32>() else {
        return DEFAULT_ANGLE;
    };
    let deg = match caps[2].to_lowercase().as_str() {
        "turn" => n * 360.0,
        "rad" => n.to_degrees(),
        "grad" => n * 0.9,
        _ => n,
    };
    deg.rem_euclid(360.0)
}

/// Fill in missing stop positions: the ends default to 0 and 100, gaps are
/// spread evenly between their known neighbours, and positions never
/// decrease.
fn distribute_positions(positions: &[Option<f32>]) -> Vec<f32> {
    let n = positions.len();
    let mut out: Vec<Option<f32>> = positions
        .iter()
        .map(|p| p.map(|v| v.clamp(0.0, 100.0)))
        .collect();
    if out[0].is_none() {
        out[0] = Some(0.0);
    }
    if out[n - 1].is_none() {
        out[n - 1] = Some(100.0);
    }

    let mut i = 0;
    while i < n {
        if out[i].is_some() {
            i += 1;
            continue;
        }
        let start = i - 1;
        let mut end = i;
        while out[end].is_none() {
            end += 1;
        }
        let (from, to) = (out[start].unwrap_or(0.0), out[end].unwrap_or(100.0));
        let steps = (end - start) as f32;
        for (k, slot) in out.iter_mut().enumerate().take(end).skip(i) {
            *slot = Some(from + (to - from) * (k - start) as f32 / steps);
        }
        i = end;
    }

    let mut last = 0.0f32;
    out.into_iter()
        .map(|p| {
            last = p.unwrap_or(last).max(last);
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(spec: &GradientSpec) -> Vec<(&str, f32)> {
        spec.stops.iter().map(|s| (s.color.as_str(), s.position)).collect()
    }

    #[test]
    fn test_two_stop_linear() {
        let spec = parse_gradient("linear-gradient(to bottom, #10b981, #059669)").unwrap();
        assert_eq!(spec.kind, GradientKind::Linear);
        assert_eq!(spec.angle_deg, 180.0);
        assert_eq!(stops(&spec), vec![("10B981", 0.0), ("059669", 100.0)]);
    }

    #[test]
    fn test_rgb_stops_with_inner_commas() {
        let spec =
            parse_gradient("linear-gradient(135deg, rgb(102, 126, 234) 0%, rgba(118, 75, 162, 0.9) 100%)")
                .unwrap();
        assert_eq!(spec.angle_deg, 135.0);
        assert_eq!(stops(&spec), vec![("667EEA", 0.0), ("764BA2", 100.0)]);
    }

    #[test]
    fn test_direction_keywords() {
        let angle = |dir: &str| {
            parse_gradient(&format!("linear-gradient({dir}, red, blue)"))
                .unwrap()
                .angle_deg
        };
        assert_eq!(angle("to right"), 90.0);
        assert_eq!(angle("to bottom right"), 135.0);
        assert_eq!(angle("to left top"), 315.0);
        assert_eq!(angle("to top right"), 45.0);
        assert_eq!(angle("to bottom left"), 225.0);
        assert_eq!(angle("0.25turn"), 90.0);
        assert_eq!(angle("-90deg"), 270.0);
    }

    #[test]
    fn test_missing_positions_spread_evenly() {
        let spec = parse_gradient("linear-gradient(red, white, blue)").unwrap();
        assert_eq!(spec.angle_deg, 180.0);
        assert_eq!(stops(&spec), vec![("FF0000", 0.0), ("FFFFFF", 50.0), ("0000FF", 100.0)]);

        let spec = parse_gradient("linear-gradient(90deg, red 20%, white, black, blue 80%)").unwrap();
        let positions: Vec<f32> = spec.stops.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_radial_and_background_shorthand() {
        let spec =
            parse_gradient("url(bg.png), radial-gradient(circle at center, #fff 0%, #000 100%)").unwrap();
        assert_eq!(spec.kind, GradientKind::Radial);
        assert_eq!(stops(&spec), vec![("FFFFFF", 0.0), ("000000", 100.0)]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(parse_gradient("none"), None);
        assert_eq!(parse_gradient("linear-gradient(to right)"), None);
        let single = parse_gradient("linear-gradient(#123456)").unwrap();
        assert_eq!(stops(&single), vec![("123456", 0.0), ("123456", 100.0)]);
    }
}
