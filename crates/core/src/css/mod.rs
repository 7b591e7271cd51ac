pub mod properties;
pub mod selector;

use crate::dom::{DocumentTree, DomNode, NodeType};
use selector::{CssRule, Selectable};
use std::collections::HashMap;

/// Computed layout styles for a single element.
/// Only the properties that affect bounding box computation.
#[derive(Debug, Clone)]
pub struct LayoutStyle {
    // Display
    pub display: Display,
    pub visibility: Visibility,

    // Box model
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub margin: Edges,
    pub padding: Edges,
    pub border_width: Edges,

    // Position
    pub position: Position,
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,

    // Flex
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub align_items: AlignItems,
    pub justify_content: JustifyContent,
    pub gap: f32,

    // Text, in px and as a multiple of font size
    pub font_size: f32,
    pub line_height: f32,

    // Overflow
    pub overflow: Overflow,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            margin: Edges::zero(),
            padding: Edges::zero(),
            border_width: Edges::zero(),
            position: Position::Static,
            top: Dimension::Auto,
            right: Dimension::Auto,
            bottom: Dimension::Auto,
            left: Dimension::Auto,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            align_items: AlignItems::Stretch,
            justify_content: JustifyContent::FlexStart,
            gap: 0.0,
            font_size: properties::ROOT_FONT_SIZE,
            line_height: 1.2,
            overflow: Overflow::Visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    Flex,
    InlineFlex,
    Grid,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Px(f32),
    Percent(f32),
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn zero() -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        }
    }

    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlignItems {
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
    Baseline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JustifyContent {
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

/// Properties a child takes from its parent when it does not declare them.
const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-decoration",
    "visibility",
    "white-space",
];

/// Shorthands and the longhands a later shorthand declaration resets.
const SHORTHANDS: &[(&str, &[&str])] = &[
    ("margin", &["margin-top", "margin-right", "margin-bottom", "margin-left"]),
    ("padding", &["padding-top", "padding-right", "padding-bottom", "padding-left"]),
    ("background", &["background-color", "background-image"]),
    ("font", &["font-style", "font-weight", "font-size", "line-height", "font-family"]),
];

/// Computed property values of one element, as a rendering engine would
/// report them: `font-size` is resolved to px, `var()` references are
/// substituted and inherited properties are filled in from the parent.
/// Everything else is the cascaded specified value, untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    values: HashMap<String, String>,
}

impl ComputedStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(|s| s.as_str())
    }

    /// Font size in px; always present after the cascade.
    pub fn font_size_px(&self) -> f32 {
        self.get("font-size")
            .and_then(|v| v.strip_suffix("px"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(properties::ROOT_FONT_SIZE)
    }

    pub fn set(&mut self, property: &str, value: &str) {
        if let Some((_, longhands)) = SHORTHANDS.iter().find(|(p, _)| *p == property) {
            for longhand in *longhands {
                self.values.remove(*longhand);
            }
        }
        self.values.insert(property.to_string(), value.to_string());
    }

    pub fn remove(&mut self, property: &str) {
        self.values.remove(property);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values a child starts from: inherited properties and custom properties.
    fn inherited(&self) -> ComputedStyle {
        let values = self
            .values
            .iter()
            .filter(|(k, _)| k.starts_with("--") || INHERITED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ComputedStyle { values }
    }
}

/// A DOM node with computed styles.
#[derive(Debug, Clone)]
pub struct StyledNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub markup: Option<String>,
    pub node_type: NodeType,
    pub computed: ComputedStyle,
    pub style: LayoutStyle,
    pub children: Vec<StyledNode>,
}

/// Run the cascade over the whole document: user-agent defaults,
/// presentational attributes, `<style>` rules in specificity order, then
/// inline `style` attributes.
pub fn compute_styles(dom: &DomNode) -> StyledNode {
    compute_styles_revealing(dom, &[])
}

/// [`compute_styles`], except that the nodes in `revealed` stay displayed
/// and visible whatever the cascade says. Decks that show one slide at a
/// time hide the rest with `display: none`; revealing them lets every
/// slide be laid out.
pub fn compute_styles_revealing(dom: &DomNode, revealed: &[&DomNode]) -> StyledNode {
    let css: String = dom.raw_text_blocks("style").join("\n");
    let mut rules = selector::parse_stylesheet(&css);
    // Stable sort keeps source order among equal specificities
    rules.sort_by_key(|r| r.specificity);

    let mut ancestors: Vec<&DomNode> = Vec::new();
    let cascade = Cascade { rules: &rules, revealed };
    style_node(dom, &cascade, &ComputedStyle::default(), &mut ancestors)
}

struct Cascade<'r, 'd> {
    rules: &'r [CssRule],
    revealed: &'r [&'d DomNode],
}

impl Cascade<'_, '_> {
    fn reveals(&self, node: &DomNode) -> bool {
        self.revealed.iter().any(|r| std::ptr::eq(*r, node))
    }
}

fn style_node<'a>(
    node: &'a DomNode,
    cascade: &Cascade,
    parent: &ComputedStyle,
    ancestors: &mut Vec<&'a DomNode>,
) -> StyledNode {
    let mut computed = parent.inherited();

    if node.node_type == NodeType::Element {
        let parent_font = parent.font_size_px();

        if let Some(ua) = ua_declarations(&node.tag) {
            properties::apply_declarations(ua, &mut computed, parent, parent_font);
        }
        apply_presentational_hints(node, &mut computed);
        for rule in cascade.rules {
            if rule
                .selectors
                .iter()
                .any(|s| selector::matches_element(s, node, ancestors))
            {
                properties::apply_declarations(&rule.declarations, &mut computed, parent, parent_font);
            }
        }
        if let Some(inline) = node.get_attr("style") {
            properties::apply_declarations(inline, &mut computed, parent, parent_font);
        }
        if node.attributes.contains_key("hidden") {
            computed.set("display", "none");
        }
        if cascade.reveals(node) {
            if computed.get("display") == Some("none") {
                computed.set("display", "block");
            }
            computed.set("visibility", "visible");
        }
    }

    if computed.get("font-size").is_none() {
        computed.set("font-size", &format!("{}px", properties::ROOT_FONT_SIZE));
    }

    let style = properties::layout_from_computed(&computed, node.node_type == NodeType::Text);

    ancestors.push(node);
    let children = node
        .children
        .iter()
        .map(|c| style_node(c, cascade, &computed, ancestors))
        .collect();
    ancestors.pop();

    StyledNode {
        tag: node.tag.clone(),
        attributes: node.attributes.clone(),
        text: node.text.clone(),
        markup: node.markup.clone(),
        node_type: node.node_type.clone(),
        computed,
        style,
        children,
    }
}

/// `width`/`height` attributes on `<img>`, `<svg>`, `<table>`, etc.
fn apply_presentational_hints(node: &DomNode, computed: &mut ComputedStyle) {
    for attr in ["width", "height"] {
        if let Some(v) = node.get_attr(attr) {
            let v = v.trim();
            if v.parse::<f32>().is_ok() {
                computed.set(attr, &format!("{v}px"));
            } else if v.ends_with('%') || v.ends_with("px") {
                computed.set(attr, v);
            }
        }
    }
    if let Some(color) = node.get_attr("bgcolor") {
        computed.set("background-color", color);
    }
}

/// Default declarations for an HTML tag, a tiny user-agent stylesheet.
fn ua_declarations(tag: &str) -> Option<&'static str> {
    let decls = match tag {
        // Inline elements
        "a" | "span" | "small" | "sub" | "sup" | "label" | "abbr" | "cite" | "code" | "kbd"
        | "mark" | "q" | "samp" | "time" | "var" => "display: inline",
        "strong" | "b" => "display: inline; font-weight: bold",
        "em" | "i" => "display: inline; font-style: italic",
        "u" | "ins" => "display: inline; text-decoration: underline",
        "s" | "del" | "strike" => "display: inline; text-decoration: line-through",

        // Headings: block with larger, bold font
        "h1" => "display: block; font-size: 2em; font-weight: bold; margin: 0.67em 0",
        "h2" => "display: block; font-size: 1.5em; font-weight: bold; margin: 0.83em 0",
        "h3" => "display: block; font-size: 1.17em; font-weight: bold; margin: 1em 0",
        "h4" => "display: block; font-weight: bold; margin: 1.33em 0",
        "h5" => "display: block; font-size: 0.83em; font-weight: bold; margin: 1.67em 0",
        "h6" => "display: block; font-size: 0.67em; font-weight: bold; margin: 2.33em 0",

        "p" => "display: block; margin: 1em 0",
        "ul" | "ol" => "display: block; margin: 1em 0; padding-left: 40px",
        "th" => "display: block; font-weight: bold; text-align: center",
        "button" | "select" | "textarea" | "img" | "svg" => "display: inline-block",
        "input" => "display: inline-block; width: 173px; height: 21px",

        // Never rendered
        "head" | "meta" | "link" | "title" | "script" | "style" | "noscript" | "template" => {
            "display: none"
        }

        "body" => "display: block; margin: 8px",
        "" => return None,
        _ => "display: block",
    };
    Some(decls)
}

/// Selector matching over the raw DOM during the cascade.
impl Selectable for DomNode {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.get_attr(name)
    }
}
