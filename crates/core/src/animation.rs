//! CSS `animation` / `transition` shorthand → slide effect descriptors.

use crate::style::StyleRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Fade,
    Fly,
    Float,
    Wipe,
    Zoom,
    Spin,
    Bounce,
    Pulse,
    Teeter,
    Swivel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    Entrance,
    Emphasis,
    Exit,
}

/// Direction the element travels while the effect plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
    Steps(u32),
}

impl Easing {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "linear" => Some(Easing::Linear),
            "ease" => Some(Easing::Ease),
            "ease-in" => Some(Easing::EaseIn),
            "ease-out" => Some(Easing::EaseOut),
            "ease-in-out" => Some(Easing::EaseInOut),
            "step-start" | "step-end" => Some(Easing::Steps(1)),
            _ if value.starts_with("cubic-bezier(") => {
                let inner = value.trim_start_matches("cubic-bezier(").trim_end_matches(')');
                let parts: Vec<f32> = inner
                    .split(',')
                    .filter_map(|p| p.trim().parse().ok())
                    .collect();
                (parts.len() == 4).then(|| Easing::CubicBezier(parts[0], parts[1], parts[2], parts[3]))
            }
            _ if value.starts_with("steps(") => {
                let inner = value.trim_start_matches("steps(").trim_end_matches(')');
                inner
                    .split(',')
                    .next()
                    .and_then(|n| n.trim().parse().ok())
                    .map(Easing::Steps)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Iterations {
    Count(u32),
    Infinite,
}

/// One slide effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSpec {
    pub archetype: Archetype,
    pub category: EffectCategory,
    pub direction: Option<Direction>,
    pub subtype: Option<&'static str>,
    pub delay_ms: u32,
    pub duration_ms: u32,
    pub easing: Easing,
    pub iterations: Iterations,
    /// Source animation name, or `transition` for inferred effects.
    pub name: String,
}

/// One `transition` layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub property: String,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: Easing,
}

const DEFAULT_DURATION_MS: u32 = 500;

struct Effect {
    archetype: Archetype,
    category: EffectCategory,
    direction: Option<Direction>,
    subtype: Option<&'static str>,
}

const fn effect(
    archetype: Archetype,
    category: EffectCategory,
    direction: Option<Direction>,
    subtype: Option<&'static str>,
) -> Effect {
    Effect {
        archetype,
        category,
        direction,
        subtype,
    }
}

use Archetype::*;
use Direction::{Down, Left, Right, Up};
use EffectCategory::{Emphasis, Entrance, Exit};

/// Animation names, lowercased with `-` and `_` removed.
const EFFECTS: &[(&str, Effect)] = &[
    ("fadein", effect(Fade, Entrance, None, None)),
    ("fadeout", effect(Fade, Exit, None, None)),
    ("fade", effect(Fade, Entrance, None, None)),
    ("appear", effect(Fade, Entrance, None, None)),
    ("fadeinup", effect(Fly, Entrance, Some(Up), None)),
    ("fadeindown", effect(Fly, Entrance, Some(Down), None)),
    ("fadeinleft", effect(Fly, Entrance, Some(Right), None)),
    ("fadeinright", effect(Fly, Entrance, Some(Left), None)),
    ("fadeoutup", effect(Fly, Exit, Some(Up), None)),
    ("fadeoutdown", effect(Fly, Exit, Some(Down), None)),
    ("fadeoutleft", effect(Fly, Exit, Some(Left), None)),
    ("fadeoutright", effect(Fly, Exit, Some(Right), None)),
    ("slideinup", effect(Fly, Entrance, Some(Up), None)),
    ("slideindown", effect(Fly, Entrance, Some(Down), None)),
    ("slideinleft", effect(Fly, Entrance, Some(Right), None)),
    ("slideinright", effect(Fly, Entrance, Some(Left), None)),
    ("slideup", effect(Fly, Entrance, Some(Up), None)),
    ("slidedown", effect(Fly, Entrance, Some(Down), None)),
    ("slideoutup", effect(Fly, Exit, Some(Up), None)),
    ("slideoutdown", effect(Fly, Exit, Some(Down), None)),
    ("slideoutleft", effect(Fly, Exit, Some(Left), None)),
    ("slideoutright", effect(Fly, Exit, Some(Right), None)),
    ("slide", effect(Fly, Entrance, Some(Up), None)),
    ("floatin", effect(Float, Entrance, Some(Up), None)),
    ("float", effect(Float, Emphasis, None, None)),
    ("wipe", effect(Wipe, Entrance, None, None)),
    ("reveal", effect(Wipe, Entrance, None, None)),
    ("zoomin", effect(Zoom, Entrance, None, Some("in"))),
    ("zoomout", effect(Zoom, Exit, None, Some("out"))),
    ("scalein", effect(Zoom, Entrance, None, Some("in"))),
    ("scaleup", effect(Zoom, Entrance, None, Some("in"))),
    ("zoom", effect(Zoom, Entrance, None, Some("in"))),
    ("bouncein", effect(Bounce, Entrance, None, None)),
    ("bounceout", effect(Bounce, Exit, None, None)),
    ("bounce", effect(Bounce, Emphasis, None, None)),
    ("rotatein", effect(Spin, Entrance, None, None)),
    ("rollin", effect(Spin, Entrance, None, None)),
    ("rotateout", effect(Spin, Exit, None, None)),
    ("rotate", effect(Spin, Emphasis, None, None)),
    ("spin", effect(Spin, Emphasis, None, None)),
    ("flipin", effect(Swivel, Entrance, None, None)),
    ("flipout", effect(Swivel, Exit, None, None)),
    ("flip", effect(Swivel, Emphasis, None, None)),
    ("pulse", effect(Pulse, Emphasis, None, None)),
    ("heartbeat", effect(Pulse, Emphasis, None, None)),
    ("glow", effect(Pulse, Emphasis, None, None)),
    ("shake", effect(Teeter, Emphasis, None, None)),
    ("wobble", effect(Teeter, Emphasis, None, None)),
    ("swing", effect(Teeter, Emphasis, None, None)),
    ("tada", effect(Teeter, Emphasis, None, None)),
    ("jello", effect(Teeter, Emphasis, None, None)),
];

const DEFAULT_EFFECT: Effect = effect(Fade, Entrance, None, None);

/// Exact name first, then the longest table key contained in the name.
fn lookup_effect(name: &str) -> &'static Effect {
    let key: String = name
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    if let Some((_, e)) = EFFECTS.iter().find(|(k, _)| *k == key) {
        return e;
    }
    EFFECTS
        .iter()
        .filter(|(k, _)| key.contains(k))
        .max_by_key(|(k, _)| k.len())
        .map(|(_, e)| e)
        .unwrap_or_else(|| {
            log::debug!("no effect for animation `{name}`, using fade");
            &DEFAULT_EFFECT
        })
}

/// Parse the first layer of an `animation` shorthand.
pub fn parse_animation(value: &str) -> Option<AnimationSpec> {
    let layer = split_top_level(value, ',').into_iter().next()?;
    let mut duration = None;
    let mut delay = None;
    let mut easing = None;
    let mut iterations = Iterations::Count(1);
    let mut name = None;

    for token in split_top_level(layer, ' ') {
        if let Some(ms) = parse_time_ms(token) {
            if duration.is_none() {
                duration = Some(ms);
            } else if delay.is_none() {
                delay = Some(ms);
            }
        } else if let Some(e) = Easing::parse(token) {
            easing.get_or_insert(e);
        } else if token == "infinite" {
            iterations = Iterations::Infinite;
        } else if let Ok(n) = token.parse::<f32>() {
            iterations = Iterations::Count(n.ceil().max(1.0) as u32);
        } else if is_animation_keyword(token) {
            continue;
        } else if name.is_none() {
            name = Some(token.to_string());
        }
    }

    let name = name.filter(|n| n != "none")?;
    let effect = lookup_effect(&name);
    Some(AnimationSpec {
        archetype: effect.archetype,
        category: effect.category,
        direction: effect.direction,
        subtype: effect.subtype,
        delay_ms: delay.unwrap_or(0),
        duration_ms: duration.unwrap_or(DEFAULT_DURATION_MS),
        easing: easing.unwrap_or_default(),
        iterations,
        name,
    })
}

fn is_animation_keyword(token: &str) -> bool {
    matches!(
        token,
        "normal"
            | "reverse"
            | "alternate"
            | "alternate-reverse"
            | "forwards"
            | "backwards"
            | "both"
            | "running"
            | "paused"
    )
}

/// Parse every layer of a `transition` shorthand. Zero-length layers and
/// `none` are dropped.
pub fn parse_transition(value: &str) -> Vec<Transition> {
    let mut out = Vec::new();
    for layer in split_top_level(value, ',') {
        let mut property = None;
        let mut duration = None;
        let mut delay = None;
        let mut easing = None;
        for token in split_top_level(layer, ' ') {
            if let Some(ms) = parse_time_ms(token) {
                if duration.is_none() {
                    duration = Some(ms);
                } else if delay.is_none() {
                    delay = Some(ms);
                }
            } else if let Some(e) = Easing::parse(token) {
                easing = Some(e);
            } else if property.is_none() {
                property = Some(token.to_lowercase());
            }
        }
        let property = property.unwrap_or_else(|| "all".to_string());
        let duration_ms = duration.unwrap_or(0);
        if property == "none" || duration_ms == 0 {
            continue;
        }
        out.push(Transition {
            property,
            duration_ms,
            delay_ms: delay.unwrap_or(0),
            easing: easing.unwrap_or_default(),
        });
    }
    out
}

/// Turn transitions into an entrance effect. A transition that can move
/// the element is read off its displaced resting `transform`; an explicit
/// opacity transition fades. Anything else is a hover effect, not an
/// entrance.
pub fn map_transition(transitions: &[Transition], transform: Option<&str>) -> Option<AnimationSpec> {
    let moving = transitions
        .iter()
        .find(|t| t.property == "transform" || t.property == "all");
    let fading = transitions.iter().find(|t| t.property == "opacity");

    let (chosen, mapped) = match (moving, transform.and_then(effect_from_transform)) {
        (Some(t), Some(inferred)) => (t, inferred),
        _ => (fading?, DEFAULT_EFFECT),
    };
    Some(AnimationSpec {
        archetype: mapped.archetype,
        category: mapped.category,
        direction: mapped.direction,
        subtype: mapped.subtype,
        delay_ms: chosen.delay_ms,
        duration_ms: chosen.duration_ms,
        easing: chosen.easing,
        iterations: Iterations::Count(1),
        name: "transition".to_string(),
    })
}

/// A displaced resting transform means the element moves back to its
/// place: positive offsets travel up or left.
fn effect_from_transform(transform: &str) -> Option<Effect> {
    let transform = transform.trim().to_lowercase();
    let (func, args) = transform.split_once('(')?;
    let args: Vec<f32> = args
        .trim_end_matches(')')
        .split(',')
        .filter_map(|a| leading_number(a.trim()))
        .collect();
    let func = func.trim();
    let identity = if func.starts_with("scale") { 1.0 } else { 0.0 };
    if args.iter().all(|a| *a == identity) {
        return None;
    }
    let fly = |dir| Some(effect(Fly, Entrance, Some(dir), None));
    match func {
        "translatey" => {
            let y = *args.first()?;
            fly(if y >= 0.0 { Up } else { Down })
        }
        "translatex" => {
            let x = *args.first()?;
            fly(if x >= 0.0 { Left } else { Right })
        }
        "translate" | "translate3d" => {
            let x = args.first().copied().unwrap_or(0.0);
            let y = args.get(1).copied().unwrap_or(0.0);
            if y.abs() >= x.abs() {
                fly(if y >= 0.0 { Up } else { Down })
            } else {
                fly(if x >= 0.0 { Left } else { Right })
            }
        }
        f if f.starts_with("scale") => Some(effect(Zoom, Entrance, None, Some("in"))),
        f if f.starts_with("rotate") => Some(effect(Spin, Entrance, None, None)),
        _ => None,
    }
}

/// Effect for an element's captured style: `animation` wins over
/// `transition`.
pub fn resolve(style: &StyleRecord) -> Option<AnimationSpec> {
    if let Some(spec) = style.animation.as_deref().and_then(parse_animation) {
        return Some(spec);
    }
    let transitions = parse_transition(style.transition.as_deref()?);
    map_transition(&transitions, style.transform.as_deref())
}

fn parse_time_ms(token: &str) -> Option<u32> {
    let ms = if let Some(ms) = token.strip_suffix("ms") {
        ms.parse::<f32>().ok()?
    } else if let Some(s) = token.strip_suffix('s') {
        s.parse::<f32>().ok()? * 1000.0
    } else {
        return None;
    };
    Some(ms.max(0.0).round() as u32)
}

fn leading_number(value: &str) -> Option<f32> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Split on `sep` (or any whitespace when `sep` is a space) outside
/// parentheses, dropping empty pieces.
fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let is_sep = |c: char| if sep == ' ' { c.is_whitespace() } else { c == sep };
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if depth == 0 && is_sep(c) => {
                parts.push(value[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_shorthand_positions() {
        let spec = parse_animation("fadeInUp 0.8s ease-out 200ms both").unwrap();
        assert_eq!(spec.archetype, Fly);
        assert_eq!(spec.category, Entrance);
        assert_eq!(spec.direction, Some(Up));
        assert_eq!(spec.duration_ms, 800);
        assert_eq!(spec.delay_ms, 200);
        assert_eq!(spec.easing, Easing::EaseOut);
        assert_eq!(spec.iterations, Iterations::Count(1));
    }

    #[test]
    fn test_animation_other_orders_and_layers() {
        let spec =
            parse_animation("1s cubic-bezier(0.4, 0, 0.2, 1) infinite pulse, fadeIn 2s").unwrap();
        assert_eq!(spec.archetype, Pulse);
        assert_eq!(spec.category, Emphasis);
        assert_eq!(spec.iterations, Iterations::Infinite);
        assert_eq!(spec.easing, Easing::CubicBezier(0.4, 0.0, 0.2, 1.0));

        let spec = parse_animation("zoom-out 300ms 2").unwrap();
        assert_eq!((spec.archetype, spec.category), (Zoom, Exit));
        assert_eq!(spec.subtype, Some("out"));
        assert_eq!(spec.iterations, Iterations::Count(2));
    }

    #[test]
    fn test_animation_name_lookup() {
        let spec = parse_animation("heroSlideInLeft 1s").unwrap();
        assert_eq!((spec.archetype, spec.direction), (Fly, Some(Right)));

        let spec = parse_animation("my-custom-thing 1s").unwrap();
        assert_eq!((spec.archetype, spec.category), (Fade, Entrance));

        assert_eq!(parse_animation("none"), None);
        assert_eq!(parse_animation("1s ease"), None);
    }

    #[test]
    fn test_transition_parse() {
        let layers = parse_transition("opacity 0.3s ease, transform 600ms cubic-bezier(0.2, 0, 0, 1) 100ms");
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].property, "transform");
        assert_eq!(layers[1].duration_ms, 600);
        assert_eq!(layers[1].delay_ms, 100);

        assert!(parse_transition("all 0s ease 0s").is_empty());
        assert!(parse_transition("none").is_empty());
    }

    #[test]
    fn test_transition_infers_from_transform() {
        let t = parse_transition("transform 0.5s ease");
        let spec = map_transition(&t, Some("translateY(30px)")).unwrap();
        assert_eq!((spec.archetype, spec.direction), (Fly, Some(Up)));
        let spec = map_transition(&t, Some("translateY(-30px)")).unwrap();
        assert_eq!(spec.direction, Some(Down));
        let spec = map_transition(&t, Some("translateX(-40px)")).unwrap();
        assert_eq!(spec.direction, Some(Right));
        let spec = map_transition(&t, Some("translate(50px, 10px)")).unwrap();
        assert_eq!(spec.direction, Some(Left));
        let spec = map_transition(&t, Some("scale(0.8)")).unwrap();
        assert_eq!((spec.archetype, spec.subtype), (Zoom, Some("in")));
        let spec = map_transition(&t, Some("rotate(-10deg)")).unwrap();
        assert_eq!(spec.archetype, Spin);
    }

    #[test]
    fn test_transition_without_motion() {
        let t = parse_transition("opacity 1s");
        assert_eq!(map_transition(&t, None).map(|s| s.archetype), Some(Fade));
        let t = parse_transition("color 1s");
        assert_eq!(map_transition(&t, None), None);
    }

    #[test]
    fn test_hover_transitions_are_not_entrances() {
        let t = parse_transition("all 0.3s ease");
        assert_eq!(map_transition(&t, None), None);
        assert_eq!(map_transition(&t, Some("translateY(0)")), None);
        assert_eq!(map_transition(&t, Some("scale(1)")), None);
        let t = parse_transition("transform 0.2s");
        assert_eq!(map_transition(&t, None), None);

        // an explicit opacity layer still fades in
        let t = parse_transition("all 0.3s ease, opacity 0.5s");
        let spec = map_transition(&t, None).unwrap();
        assert_eq!((spec.archetype, spec.duration_ms), (Fade, 500));
        let spec = map_transition(&t, Some("translateY(20px)")).unwrap();
        assert_eq!((spec.archetype, spec.duration_ms), (Fly, 300));
    }

    #[test]
    fn test_resolve_prefers_animation() {
        let style = StyleRecord {
            animation: Some("bounce 1s".into()),
            transition: Some("transform 1s".into()),
            transform: Some("translateX(20px)".into()),
            ..StyleRecord::default()
        };
        assert_eq!(resolve(&style).map(|s| s.archetype), Some(Bounce));

        let style = StyleRecord {
            transition: Some("transform 1s".into()),
            transform: Some("translateX(20px)".into()),
            ..StyleRecord::default()
        };
        assert_eq!(resolve(&style).and_then(|s| s.direction), Some(Left));
        assert_eq!(resolve(&StyleRecord::default()), None);
    }
}
