//! Icon detection.
//!
//! Detection is an ordered list of independent strategies; the first one
//! that names the icon wins.

use crate::css::selector::Selectable;
use crate::layout::LayoutNode;
use crate::model::{IconData, IconGlyph};
use crate::raster::glyphs;
use crate::style::parse_color;

/// Class tokens that on their own mark an icon-font element.
pub const ICON_FAMILY_CLASSES: &[&str] = &[
    "material-icons",
    "material-icons-outlined",
    "material-icons-round",
    "material-icons-sharp",
    "material-icons-two-tone",
    "material-symbols-outlined",
    "material-symbols-rounded",
    "material-symbols-sharp",
    "fa",
    "fas",
    "far",
    "fab",
    "fal",
    "fad",
    "fa-solid",
    "fa-regular",
    "fa-brands",
    "bi",
    "glyphicon",
    "iconfont",
    "icon",
    "mdi",
    "ri",
    "ti",
    "lucide",
];

/// Per-icon class prefixes (`fa-star`, `bi-house`).
pub const ICON_CLASS_PREFIXES: &[&str] = &[
    "fa-", "bi-", "ri-", "ti-", "mdi-", "icon-", "glyphicon-", "lucide-", "iconfont-",
];

/// `fa-` tokens that are modifiers, not icon names.
const MODIFIER_SUFFIXES: &[&str] = &[
    "solid", "regular", "brands", "light", "thin", "duotone", "lg", "xs", "sm", "xl", "2x",
    "3x", "4x", "5x", "fw", "spin", "pulse", "border", "inverse", "fill", "outline",
];

const MAX_NAME_LEN: usize = 40;

pub type IconStrategy = fn(&LayoutNode) -> Option<String>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, IconStrategy)] = &[
    ("family-class", by_family_class),
    ("prefixed-class", by_prefixed_class),
    ("ligature-text", by_ligature_text),
];

/// Classify `node` as an icon. Inline `<svg>` children make a vector
/// icon; everything else is a font glyph that needs rasterizing.
pub fn classify(node: &LayoutNode) -> Option<IconData> {
    if !node.is_element() || matches!(node.tag.as_str(), "svg" | "img") {
        return None;
    }
    let (strategy, name) = STRATEGIES
        .iter()
        .find_map(|(label, strategy)| strategy(node).map(|name| (*label, name)))?;
    log::debug!("<{}> is icon `{name}` ({strategy})", node.tag);

    let glyph = match find_svg(node) {
        Some(svg) => IconGlyph::Vector {
            markup: svg.markup.clone().unwrap_or_default(),
            fill: svg
                .get_attr("fill")
                .and_then(parse_color)
                .or_else(|| node.style("color").and_then(parse_color)),
        },
        None => IconGlyph::Font {
            family: glyph_family(node),
        },
    };
    Some(IconData { name, glyph })
}

fn by_family_class(node: &LayoutNode) -> Option<String> {
    let family = node.classes().find(|c| ICON_FAMILY_CLASSES.contains(c))?;
    prefixed_name(node)
        .or_else(|| single_token(&node.text_content()))
        .or_else(|| find_svg(node).map(|_| family.to_string()))
}

fn by_prefixed_class(node: &LayoutNode) -> Option<String> {
    if node.text_content().chars().filter(|c| c.is_alphanumeric()).count() > 1 {
        return None;
    }
    prefixed_name(node)
}

/// `<i>` / `<span>` whose only text is one lowercase ligature name, when
/// something else also says "icon".
fn by_ligature_text(node: &LayoutNode) -> Option<String> {
    if !matches!(node.tag.as_str(), "i" | "span") || node.children.iter().any(|c| c.is_element()) {
        return None;
    }
    let token = single_token(&node.text_content())?;
    let family = node.style("font-family").unwrap_or("").to_lowercase();
    let hinted = family.contains("icon") || family.contains("symbol") || family.contains("material");
    (hinted || token.contains('_') || glyphs::lookup(&token).is_some()).then_some(token)
}

fn prefixed_name(node: &LayoutNode) -> Option<String> {
    node.classes().find_map(|class| {
        let suffix = ICON_CLASS_PREFIXES
            .iter()
            .find_map(|prefix| class.strip_prefix(prefix))?;
        let valid = !suffix.is_empty()
            && suffix.len() <= MAX_NAME_LEN
            && !MODIFIER_SUFFIXES.contains(&suffix)
            && suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        valid.then(|| suffix.to_string())
    })
}

/// A single lowercase word (letters, digits, `_`) of bounded length.
fn single_token(text: &str) -> Option<String> {
    let text = text.trim();
    let valid = (2..=MAX_NAME_LEN).contains(&text.len())
        && text.starts_with(|c: char| c.is_ascii_lowercase())
        && text
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    valid.then(|| text.to_string())
}

fn find_svg(node: &LayoutNode) -> Option<&LayoutNode> {
    node.children.iter().find_map(|child| {
        if child.tag_name() == "svg" {
            Some(child)
        } else if child.is_element() {
            find_svg(child)
        } else {
            None
        }
    })
}

fn glyph_family(node: &LayoutNode) -> String {
    let computed = node
        .style("font-family")
        .and_then(|f| f.split(',').next())
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|f| !f.is_empty());
    if let Some(family) = computed {
        return family;
    }
    if node.classes().any(|c| c.starts_with("material-symbols")) {
        "Material Symbols Outlined".to_string()
    } else if node.classes().any(|c| c.starts_with("fa")) {
        "Font Awesome 6 Free".to_string()
    } else {
        "Material Icons".to_string()
    }
}
