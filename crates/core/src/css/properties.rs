//! CSS property parsing: folds declaration strings into computed values
//! and derives the layout-relevant subset as a LayoutStyle.

use super::*;

/// Root font size for rem calculations (browser default).
pub(crate) const ROOT_FONT_SIZE: f32 = 16.0;

/// Apply a `property: value; ...` block on top of `computed`.
/// `parent` is the parent's computed style (for `inherit`) and
/// `parent_font` its font size in px (for `em` / `%` font sizes).
pub(crate) fn apply_declarations(
    decls: &str,
    computed: &mut ComputedStyle,
    parent: &ComputedStyle,
    parent_font: f32,
) {
    for declaration in split_top_level(decls, ';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((property, raw_value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_lowercase();
        let value = raw_value.trim();
        let value = value
            .strip_suffix("!important")
            .map(str::trim)
            .unwrap_or(value);

        // Store custom property declarations (--var-name: value)
        if property.starts_with("--") {
            computed.set(&property, value);
            continue;
        }

        let resolved = resolve_vars(value, computed);
        let resolved = resolved.trim();
        if resolved.is_empty() {
            continue;
        }

        match resolved.to_lowercase().as_str() {
            "inherit" => {
                match parent.get(&property) {
                    Some(v) => {
                        let v = v.to_string();
                        computed.set(&property, &v);
                    }
                    None => computed.remove(&property),
                }
                continue;
            }
            "initial" | "unset" | "revert" => {
                computed.remove(&property);
                continue;
            }
            _ => {}
        }

        apply_computed(&property, resolved, computed, parent_font);
    }
}

/// Store one declaration, expanding the shorthands downstream consumers
/// read as longhands.
fn apply_computed(property: &str, value: &str, computed: &mut ComputedStyle, parent_font: f32) {
    match property {
        "font-size" => {
            if let Some(px) = resolve_font_size(value, parent_font) {
                computed.set("font-size", &format!("{px}px"));
            }
        }
        "background" => {
            computed.set("background", value);
            let (color, image) = split_background(value);
            if let Some(c) = color {
                computed.set("background-color", &c);
            }
            if let Some(i) = image {
                computed.set("background-image", &i);
            }
        }
        "border" => {
            for side in BORDER_SIDES {
                expand_border_side(side, value, computed, parent_font);
            }
        }
        "border-width" | "border-style" | "border-color" => {
            let part = &property["border-".len()..];
            if let Some(values) = box_values(value) {
                for (side, v) in BORDER_SIDES.iter().zip(values) {
                    computed.set(&format!("border-{side}-{part}"), v);
                }
            }
        }
        "font" => {
            computed.set("font", value);
            expand_font_shorthand(value, computed, parent_font);
        }
        _ => match border_side(property) {
            Some(side) => expand_border_side(side, value, computed, parent_font),
            None => computed.set(property, value),
        },
    }
}

/// Split on `sep` outside of parentheses and quotes, so `url(data:...;base64,...)`
/// and `rgb(1, 2, 3)` survive intact.
pub(crate) fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = (depth - 1).max(0),
                _ if c == sep && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Resolve `var(--name)` and `var(--name, fallback)` references in a CSS value.
fn resolve_vars(value: &str, custom_props: &ComputedStyle) -> String {
    if !value.contains("var(") {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == 'v' {
            // Check for "var("
            let rest: String = chars.clone().take(3).collect();
            if rest == "ar(" {
                chars.next();
                chars.next();
                chars.next();
                // Read var content until matching ')'
                let mut depth = 1;
                let mut var_content = String::new();
                for vc in chars.by_ref() {
                    if vc == '(' {
                        depth += 1;
                    }
                    if vc == ')' {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    var_content.push(vc);
                }
                let (var_name, fallback) = match var_content.split_once(',') {
                    Some((name, fb)) => (name.trim(), Some(fb.trim())),
                    None => (var_content.trim(), None),
                };
                if let Some(val) = custom_props.get(var_name) {
                    // Variables can reference other variables
                    result.push_str(&resolve_vars(val, custom_props));
                } else if let Some(fb) = fallback {
                    result.push_str(&resolve_vars(fb, custom_props));
                }
                continue;
            }
        }
        result.push(c);
    }

    result
}

/// Resolve a `font-size` value to px.
pub(crate) fn resolve_font_size(value: &str, parent_px: f32) -> Option<f32> {
    let value = value.trim().to_lowercase();
    let keyword = match value.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|p| parent_px * p / 100.0);
    }
    if let Some(rem) = value.strip_suffix("rem") {
        return rem.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE);
    }
    if let Some(em) = value.strip_suffix("em") {
        return em.trim().parse::<f32>().ok().map(|v| v * parent_px);
    }
    parse_length(&value, parent_px)
}

/// Split the `background` shorthand into its color and image layers.
fn split_background(value: &str) -> (Option<String>, Option<String>) {
    let mut color = None;
    let mut image = None;
    for token in split_top_level(value, ' ') {
        let token = token.trim().trim_end_matches(',');
        if token.is_empty() {
            continue;
        }
        let lower = token.to_lowercase();
        if lower.contains("gradient(") || lower.starts_with("url(") {
            if image.is_none() {
                image = Some(token.to_string());
            }
        } else if lower.starts_with('#')
            || lower.starts_with("rgb")
            || lower.starts_with("hsl")
            || (lower.chars().all(|c| c.is_ascii_alphabetic()) && !is_background_keyword(&lower))
        {
            color = Some(token.to_string());
        }
    }
    (color, image)
}

fn is_background_keyword(token: &str) -> bool {
    matches!(
        token,
        "none" | "repeat" | "no-repeat" | "repeat-x" | "repeat-y" | "center" | "top" | "bottom"
            | "left" | "right" | "cover" | "contain" | "fixed" | "scroll" | "local" | "auto"
            | "padding-box" | "border-box" | "content-box"
    )
}

/// Border edges in box order, as used by the `border-<side>-<part>`
/// longhands every border declaration is stored as.
pub(crate) const BORDER_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// `border-top` → `top`.
fn border_side(property: &str) -> Option<&'static str> {
    let side = property.strip_prefix("border-")?;
    BORDER_SIDES.iter().copied().find(|s| *s == side)
}

/// One `border-<side>` shorthand. Parts it leaves out reset to unset.
fn expand_border_side(side: &str, value: &str, computed: &mut ComputedStyle, parent_font: f32) {
    for part in ["width", "style", "color"] {
        computed.remove(&format!("border-{side}-{part}"));
    }
    for token in split_top_level(value, ' ') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let part = if is_border_style(token) {
            "style"
        } else if parse_length(token, parent_font).is_some() || is_width_keyword(token) {
            "width"
        } else {
            "color"
        };
        computed.set(&format!("border-{side}-{part}"), token);
    }
}

/// The 1–4 value box shorthand spread over top, right, bottom, left.
fn box_values(value: &str) -> Option<[&str; 4]> {
    let parts: Vec<&str> = split_top_level(value, ' ')
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    match *parts.as_slice() {
        [a] => Some([a, a, a, a]),
        [a, b] => Some([a, b, a, b]),
        [a, b, c] => Some([a, b, c, b]),
        [a, b, c, d, ..] => Some([a, b, c, d]),
        [] => None,
    }
}

fn is_border_style(token: &str) -> bool {
    matches!(
        token,
        "none" | "hidden" | "solid" | "dashed" | "dotted" | "double" | "groove" | "ridge"
            | "inset" | "outset"
    )
}

fn is_width_keyword(token: &str) -> bool {
    matches!(token, "thin" | "medium" | "thick")
}

/// `font: [style] [weight] size[/line-height] family`
fn expand_font_shorthand(value: &str, computed: &mut ComputedStyle, parent_font: f32) {
    let tokens = split_top_level(value, ' ');
    let tokens: Vec<&str> = tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    let Some(size_idx) = tokens.iter().position(|t| {
        let size = t.split('/').next().unwrap_or(t);
        resolve_font_size(size, parent_font).is_some()
    }) else {
        return;
    };

    for token in &tokens[..size_idx] {
        match *token {
            "italic" | "oblique" => computed.set("font-style", token),
            "bold" | "bolder" | "lighter" => computed.set("font-weight", token),
            t if t.parse::<u32>().is_ok() => computed.set("font-weight", t),
            _ => {}
        }
    }

    let size_token = tokens[size_idx];
    let (size, line_height) = match size_token.split_once('/') {
        Some((s, lh)) => (s, Some(lh)),
        None => (size_token, None),
    };
    if let Some(px) = resolve_font_size(size, parent_font) {
        computed.set("font-size", &format!("{px}px"));
    }
    if let Some(lh) = line_height {
        computed.set("line-height", lh);
    }
    let family = tokens[size_idx + 1..].join(" ");
    if !family.is_empty() {
        computed.set("font-family", &family);
    }
}

/// Derive the layout subset from an element's computed values.
pub(crate) fn layout_from_computed(computed: &ComputedStyle, is_text: bool) -> LayoutStyle {
    let mut style = LayoutStyle {
        font_size: computed.font_size_px(),
        ..Default::default()
    };
    if is_text {
        style.display = Display::Inline;
    }

    // Shorthands first so longhands refine them
    let mut entries: Vec<(&str, &str)> = computed.iter().collect();
    entries.sort_by_key(|(k, _)| !(*k == "flex" || SHORTHANDS.iter().any(|(s, _)| s == k)));

    for (property, value) in entries {
        apply_property(property, value, &mut style);
    }
    let em = style.font_size;
    let [top, right, bottom, left] = BORDER_SIDES.map(|side| edge_border_width(computed, side, em));
    style.border_width = Edges { top, right, bottom, left };
    style
}

/// Width a border edge takes up in layout: zero unless it has a visible
/// style, `medium` when the width is left out.
fn edge_border_width(computed: &ComputedStyle, side: &str, em: f32) -> f32 {
    match computed.get(&format!("border-{side}-style")) {
        None | Some("none") | Some("hidden") => 0.0,
        Some(_) => computed
            .get(&format!("border-{side}-width"))
            .map_or(Some(3.0), |w| border_width(w, em))
            .unwrap_or(0.0),
    }
}

fn apply_property(property: &str, value: &str, style: &mut LayoutStyle) {
    let em = style.font_size;
    match property {
        "display" => {
            style.display = match value {
                "none" => Display::None,
                "inline" => Display::Inline,
                "inline-block" => Display::InlineBlock,
                "flex" => Display::Flex,
                "inline-flex" => Display::InlineFlex,
                "grid" | "inline-grid" => Display::Grid,
                _ => Display::Block,
            };
        }
        "visibility" => {
            style.visibility = match value {
                "hidden" | "collapse" => Visibility::Hidden,
                _ => Visibility::Visible,
            };
        }
        "position" => {
            style.position = match value {
                "relative" => Position::Relative,
                "absolute" => Position::Absolute,
                "fixed" => Position::Fixed,
                _ => Position::Static,
            };
        }
        "width" => set_dim(&mut style.width, value, em),
        "height" => set_dim(&mut style.height, value, em),
        "min-width" => set_dim(&mut style.min_width, value, em),
        "min-height" => set_dim(&mut style.min_height, value, em),
        "max-width" => set_dim(&mut style.max_width, value, em),
        "max-height" => set_dim(&mut style.max_height, value, em),
        "top" => set_dim(&mut style.top, value, em),
        "right" => set_dim(&mut style.right, value, em),
        "bottom" => set_dim(&mut style.bottom, value, em),
        "left" => set_dim(&mut style.left, value, em),
        "margin" => style.margin = parse_edges(value, em),
        "margin-top" => set_len(&mut style.margin.top, value, em),
        "margin-right" => set_len(&mut style.margin.right, value, em),
        "margin-bottom" => set_len(&mut style.margin.bottom, value, em),
        "margin-left" => set_len(&mut style.margin.left, value, em),
        "padding" => style.padding = parse_edges(value, em),
        "padding-top" => set_len(&mut style.padding.top, value, em),
        "padding-right" => set_len(&mut style.padding.right, value, em),
        "padding-bottom" => set_len(&mut style.padding.bottom, value, em),
        "padding-left" => set_len(&mut style.padding.left, value, em),
        "flex-direction" => {
            style.flex_direction = match value {
                "row-reverse" => FlexDirection::RowReverse,
                "column" => FlexDirection::Column,
                "column-reverse" => FlexDirection::ColumnReverse,
                _ => FlexDirection::Row,
            };
        }
        "flex-wrap" => {
            style.flex_wrap = match value {
                "wrap" => FlexWrap::Wrap,
                "wrap-reverse" => FlexWrap::WrapReverse,
                _ => FlexWrap::NoWrap,
            };
        }
        "flex" => parse_flex_shorthand(value, style),
        "flex-grow" => {
            if let Ok(v) = value.parse() {
                style.flex_grow = v;
            }
        }
        "flex-shrink" => {
            if let Ok(v) = value.parse() {
                style.flex_shrink = v;
            }
        }
        "flex-basis" => set_dim(&mut style.flex_basis, value, em),
        "align-items" => {
            style.align_items = match value {
                "flex-start" | "start" => AlignItems::FlexStart,
                "flex-end" | "end" => AlignItems::FlexEnd,
                "center" => AlignItems::Center,
                "baseline" => AlignItems::Baseline,
                _ => AlignItems::Stretch,
            };
        }
        "justify-content" => {
            style.justify_content = match value {
                "flex-end" | "end" => JustifyContent::FlexEnd,
                "center" => JustifyContent::Center,
                "space-between" => JustifyContent::SpaceBetween,
                "space-around" => JustifyContent::SpaceAround,
                "space-evenly" => JustifyContent::SpaceEvenly,
                _ => JustifyContent::FlexStart,
            };
        }
        "gap" => {
            if let Some(v) = value.split_whitespace().next().and_then(|v| parse_length(v, em)) {
                style.gap = v;
            }
        }
        "line-height" => {
            if value == "normal" {
                style.line_height = 1.2;
            } else if let Ok(v) = value.parse::<f32>() {
                style.line_height = v;
            } else if let Some(pct) = value.strip_suffix('%') {
                if let Ok(v) = pct.trim().parse::<f32>() {
                    style.line_height = v / 100.0;
                }
            } else if let Some(v) = parse_length(value, em) {
                if em > 0.0 {
                    style.line_height = v / em;
                }
            }
        }
        "overflow" | "overflow-x" | "overflow-y" => {
            style.overflow = match value {
                "hidden" | "clip" => Overflow::Hidden,
                "scroll" => Overflow::Scroll,
                "auto" => Overflow::Auto,
                _ => Overflow::Visible,
            };
        }
        _ => {} // Ignore non-layout properties
    }
}

fn set_dim(target: &mut Dimension, value: &str, em: f32) {
    if let Some(dim) = parse_dimension(value, em) {
        *target = dim;
    }
}

fn set_len(target: &mut f32, value: &str, em: f32) {
    if let Some(v) = parse_length(value, em) {
        *target = v;
    }
}

/// Parse an absolute or font-relative length to px.
pub(crate) fn parse_length(value: &str, em_base: f32) -> Option<f32> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    if let Some(v) = value.strip_suffix("px") {
        return v.trim().parse().ok();
    }
    if let Some(v) = value.strip_suffix("pt") {
        return v.trim().parse::<f32>().ok().map(|v| v * 4.0 / 3.0);
    }
    if let Some(v) = value.strip_suffix("rem") {
        return v.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE);
    }
    if let Some(v) = value.strip_suffix("em") {
        return v.trim().parse::<f32>().ok().map(|v| v * em_base);
    }
    None
}

fn parse_dimension(value: &str, em_base: f32) -> Option<Dimension> {
    let value = value.trim();
    if value == "auto" {
        return Some(Dimension::Auto);
    }
    if let Some(pct) = value.strip_suffix('%') {
        let num = pct.trim().parse::<f32>().ok()?;
        return Some(Dimension::Percent(num / 100.0));
    }
    if let Some(px) = parse_length(value, em_base) {
        return Some(Dimension::Px(px));
    }
    // Bare number (treated as px)
    value.parse::<f32>().ok().map(Dimension::Px)
}

fn parse_edges(value: &str, em_base: f32) -> Edges {
    let parts: Vec<f32> = value
        .split_whitespace()
        .map(|v| parse_length(v, em_base).unwrap_or(0.0))
        .collect();

    match parts.len() {
        1 => Edges::uniform(parts[0]),
        2 => Edges {
            top: parts[0],
            right: parts[1],
            bottom: parts[0],
            left: parts[1],
        },
        3 => Edges {
            top: parts[0],
            right: parts[1],
            bottom: parts[2],
            left: parts[1],
        },
        4 => Edges {
            top: parts[0],
            right: parts[1],
            bottom: parts[2],
            left: parts[3],
        },
        _ => Edges::zero(),
    }
}

fn border_width(value: &str, em_base: f32) -> Option<f32> {
    match value {
        "thin" => Some(1.0),
        "medium" => Some(3.0),
        "thick" => Some(5.0),
        v => parse_length(v, em_base),
    }
}

fn parse_flex_shorthand(value: &str, style: &mut LayoutStyle) {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["none"] => {
            style.flex_grow = 0.0;
            style.flex_shrink = 0.0;
        }
        ["auto"] => {
            style.flex_grow = 1.0;
            style.flex_shrink = 1.0;
        }
        [grow] => {
            if let Ok(g) = grow.parse() {
                style.flex_grow = g;
                style.flex_basis = Dimension::Px(0.0);
            }
        }
        [grow, shrink] => {
            style.flex_grow = grow.parse().unwrap_or(style.flex_grow);
            style.flex_shrink = shrink.parse().unwrap_or(style.flex_shrink);
        }
        [grow, shrink, basis, ..] => {
            style.flex_grow = grow.parse().unwrap_or(style.flex_grow);
            style.flex_shrink = shrink.parse().unwrap_or(style.flex_shrink);
            set_dim(&mut style.flex_basis, basis, style.font_size);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_data_uri() {
        let parts = split_top_level("background: url(data:image/png;base64,AAA); color: red", ';');
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("base64,AAA"));
    }

    #[test]
    fn test_font_size_resolution() {
        assert_eq!(resolve_font_size("2em", 20.0), Some(40.0));
        assert_eq!(resolve_font_size("150%", 16.0), Some(24.0));
        assert_eq!(resolve_font_size("1.5rem", 40.0), Some(24.0));
        assert_eq!(resolve_font_size("12pt", 16.0), Some(16.0));
        assert_eq!(resolve_font_size("large", 16.0), Some(18.0));
        assert_eq!(resolve_font_size("bogus", 16.0), None);
    }

    #[test]
    fn test_border_and_font_shorthands() {
        let mut computed = ComputedStyle::default();
        let parent = ComputedStyle::default();
        apply_declarations(
            "border: 2px dashed #ccc; font: italic 700 24px/1.5 'Roboto', sans-serif",
            &mut computed,
            &parent,
            16.0,
        );
        for side in BORDER_SIDES {
            assert_eq!(computed.get(&format!("border-{side}-width")), Some("2px"));
            assert_eq!(computed.get(&format!("border-{side}-style")), Some("dashed"));
            assert_eq!(computed.get(&format!("border-{side}-color")), Some("#ccc"));
        }
        assert_eq!(computed.get("font-style"), Some("italic"));
        assert_eq!(computed.get("font-weight"), Some("700"));
        assert_eq!(computed.get("font-size"), Some("24px"));
        assert_eq!(computed.get("line-height"), Some("1.5"));
        assert_eq!(computed.get("font-family"), Some("'Roboto', sans-serif"));
    }

    #[test]
    fn test_per_side_borders() {
        let mut computed = ComputedStyle::default();
        let parent = ComputedStyle::default();
        apply_declarations(
            "border: 1px solid #ddd; border-left: 6px solid #3b82f6; border-top-color: red",
            &mut computed,
            &parent,
            16.0,
        );
        assert_eq!(computed.get("border-left-width"), Some("6px"));
        assert_eq!(computed.get("border-left-color"), Some("#3b82f6"));
        assert_eq!(computed.get("border-right-width"), Some("1px"));
        assert_eq!(computed.get("border-top-color"), Some("red"));
        assert_eq!(computed.get("border-top-style"), Some("solid"));

        let style = layout_from_computed(&computed, false);
        assert_eq!(style.border_width.left, 6.0);
        assert_eq!(style.border_width.right, 1.0);
    }

    #[test]
    fn test_border_box_shorthands() {
        let mut computed = ComputedStyle::default();
        let parent = ComputedStyle::default();
        apply_declarations("border-width: 1px 4px; border-style: solid none", &mut computed, &parent, 16.0);
        assert_eq!(computed.get("border-top-width"), Some("1px"));
        assert_eq!(computed.get("border-left-width"), Some("4px"));
        assert_eq!(computed.get("border-left-style"), Some("none"));

        let style = layout_from_computed(&computed, false);
        assert_eq!(style.border_width.top, 1.0);
        assert_eq!(style.border_width.bottom, 1.0);
        // a side with no visible style takes no room
        assert_eq!(style.border_width.left, 0.0);
    }

    #[test]
    fn test_inherit_keyword() {
        let mut parent = ComputedStyle::default();
        parent.set("background-color", "#123456");
        let mut computed = ComputedStyle::default();
        apply_declarations("background-color: inherit", &mut computed, &parent, 16.0);
        assert_eq!(computed.get("background-color"), Some("#123456"));
    }
}
