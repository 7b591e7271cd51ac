use crate::css;
use crate::css::selector::Selectable;
use crate::css::{ComputedStyle, StyledNode};
use crate::dom::{DocumentTree, NodeType};
use crate::error::{Error, Result};
use serde::Serialize;
use taffy::prelude::*;

/// A node with computed styles and, when it was actually laid out, a
/// bounding box in document px.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub tag: String,
    pub attributes: std::collections::HashMap<String, String>,
    pub text: String,
    pub markup: Option<String>,
    pub node_type: NodeType,
    pub computed: ComputedStyle,
    pub bounds: Option<Bounds>,
    pub children: Vec<LayoutNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Average glyph advance relative to font size used while sizing text leaves.
const LAYOUT_CHAR_WIDTH: f32 = 0.6;

impl LayoutNode {
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Class tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class").unwrap_or("").split_whitespace()
    }

    /// Computed value of a CSS property.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed.get(property)
    }

    /// Text of the direct text children only, whitespace-collapsed.
    pub fn own_text(&self) -> String {
        let mut result = String::new();
        for child in &self.children {
            if child.node_type == NodeType::Text {
                push_words(&mut result, &child.text);
            }
        }
        result
    }

    /// Visible text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result, &|_| false);
        result
    }

    /// Like [`text_content`](Self::text_content), but skipping every subtree
    /// for which `skip` returns true.
    pub fn text_content_except(&self, skip: &dyn Fn(&LayoutNode) -> bool) -> String {
        let mut result = String::new();
        self.collect_text(&mut result, skip);
        result
    }

    fn collect_text(&self, out: &mut String, skip: &dyn Fn(&LayoutNode) -> bool) {
        match self.node_type {
            NodeType::Text => push_words(out, &self.text),
            _ => {
                if self.is_element() && (skip(self) || is_hidden(self)) {
                    return;
                }
                for child in &self.children {
                    child.collect_text(out, skip);
                }
            }
        }
    }
}

fn is_hidden(node: &LayoutNode) -> bool {
    node.style("display") == Some("none") || node.tag == "script" || node.tag == "style"
}

fn push_words(out: &mut String, text: &str) {
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
}

impl Selectable for LayoutNode {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.get_attr(name)
    }
}

impl DocumentTree for LayoutNode {
    fn element_tag(&self) -> Option<&str> {
        self.is_element().then_some(self.tag.as_str())
    }

    fn raw_text(&self) -> &str {
        &self.text
    }

    fn child_nodes(&self) -> &[LayoutNode] {
        &self.children
    }
}

fn taffy_err(e: taffy::TaffyError) -> Error {
    Error::CollaboratorUnavailable(format!("layout failed: {e}"))
}

/// Compute layout for the entire styled tree using taffy.
pub fn compute_layout(
    root: &StyledNode,
    viewport_width: f32,
    viewport_height: f32,
) -> Result<LayoutNode> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let root_taffy = build_taffy_tree(&mut tree, root, viewport_width)?;

    tree.compute_layout(
        root_taffy,
        Size {
            width: AvailableSpace::Definite(viewport_width),
            height: AvailableSpace::Definite(viewport_height),
        },
    )
    .map_err(taffy_err)?;

    extract_layout(&tree, root_taffy, root, 0.0, 0.0)
}

fn build_taffy_tree(
    tree: &mut TaffyTree<()>,
    node: &StyledNode,
    available_width: f32,
) -> Result<NodeId> {
    if node.style.display == css::Display::None {
        let taffy_style = Style {
            display: Display::None,
            ..Default::default()
        };
        return tree.new_leaf(taffy_style).map_err(taffy_err);
    }

    let mut taffy_style = to_taffy_style(&node.style);

    if node.node_type == NodeType::Text {
        let (w, h) = measure_text(node.text.trim(), &node.style, available_width);
        taffy_style.min_size.width = Dimension::Length(w);
        taffy_style.size.height = Dimension::Length(h);
        return tree.new_leaf(taffy_style).map_err(taffy_err);
    }

    // Inline SVG draws its own content; never descend into it
    if node.tag == "svg" {
        return tree.new_leaf(taffy_style).map_err(taffy_err);
    }

    // Elements with only text children become a single measured leaf
    if node.node_type == NodeType::Element
        && !node.children.is_empty()
        && node.children.iter().all(|c| c.node_type == NodeType::Text)
    {
        let text = collect_direct_text(node);
        let inner_width = match node.style.width {
            css::Dimension::Px(w) => w,
            _ => available_width,
        };
        let (w, h) = measure_text(&text, &node.style, inner_width);
        if matches!(taffy_style.size.width, Dimension::Auto) {
            taffy_style.min_size.width = Dimension::Length(w);
        }
        if matches!(taffy_style.size.height, Dimension::Auto) {
            taffy_style.min_size.height = Dimension::Length(h);
        }
        return tree.new_leaf(taffy_style).map_err(taffy_err);
    }

    let child_width = match node.style.width {
        css::Dimension::Px(w) => w,
        _ => available_width,
    };
    let child_ids = node
        .children
        .iter()
        .map(|c| build_taffy_tree(tree, c, child_width))
        .collect::<Result<Vec<NodeId>>>()?;

    tree.new_with_children(taffy_style, &child_ids)
        .map_err(taffy_err)
}

/// Size of a run of text wrapped at `max_width`.
fn measure_text(text: &str, style: &css::LayoutStyle, max_width: f32) -> (f32, f32) {
    let chars = text.chars().count() as f32;
    let line_height = style.font_size * style.line_height;
    if chars == 0.0 {
        return (0.0, line_height);
    }
    let natural = chars * style.font_size * LAYOUT_CHAR_WIDTH;
    let max_width = max_width.max(style.font_size);
    let lines = (natural / max_width).ceil().max(1.0);
    (natural.min(max_width), lines * line_height)
}

fn collect_direct_text(node: &StyledNode) -> String {
    let mut result = String::new();
    for child in &node.children {
        if child.node_type == NodeType::Text {
            let t = child.text.trim();
            if !t.is_empty() {
                if !result.is_empty() {
                    result.push(' ');
                }
                result.push_str(t);
            }
        }
    }
    result
}

fn to_taffy_style(style: &css::LayoutStyle) -> Style {
    let overflow = match style.overflow {
        css::Overflow::Hidden => taffy::Overflow::Hidden,
        css::Overflow::Scroll => taffy::Overflow::Scroll,
        _ => taffy::Overflow::Visible,
    };
    Style {
        display: match style.display {
            css::Display::Block => Display::Block,
            css::Display::Flex | css::Display::InlineFlex => Display::Flex,
            css::Display::Grid => Display::Grid,
            css::Display::None => Display::None,
            // Inline and InlineBlock approximated as Flex for taffy
            css::Display::Inline | css::Display::InlineBlock => Display::Flex,
        },
        position: match style.position {
            css::Position::Relative | css::Position::Static => Position::Relative,
            css::Position::Absolute | css::Position::Fixed => Position::Absolute,
        },
        size: Size {
            width: to_taffy_dim(&style.width),
            height: to_taffy_dim(&style.height),
        },
        min_size: Size {
            width: to_taffy_dim(&style.min_width),
            height: to_taffy_dim(&style.min_height),
        },
        max_size: Size {
            width: to_taffy_dim(&style.max_width),
            height: to_taffy_dim(&style.max_height),
        },
        margin: Rect {
            top: LengthPercentageAuto::Length(style.margin.top),
            right: LengthPercentageAuto::Length(style.margin.right),
            bottom: LengthPercentageAuto::Length(style.margin.bottom),
            left: LengthPercentageAuto::Length(style.margin.left),
        },
        padding: Rect {
            top: LengthPercentage::Length(style.padding.top),
            right: LengthPercentage::Length(style.padding.right),
            bottom: LengthPercentage::Length(style.padding.bottom),
            left: LengthPercentage::Length(style.padding.left),
        },
        border: Rect {
            top: LengthPercentage::Length(style.border_width.top),
            right: LengthPercentage::Length(style.border_width.right),
            bottom: LengthPercentage::Length(style.border_width.bottom),
            left: LengthPercentage::Length(style.border_width.left),
        },
        inset: Rect {
            top: to_taffy_auto_dim(&style.top),
            right: to_taffy_auto_dim(&style.right),
            bottom: to_taffy_auto_dim(&style.bottom),
            left: to_taffy_auto_dim(&style.left),
        },
        flex_direction: match style.flex_direction {
            css::FlexDirection::Row => FlexDirection::Row,
            css::FlexDirection::RowReverse => FlexDirection::RowReverse,
            css::FlexDirection::Column => FlexDirection::Column,
            css::FlexDirection::ColumnReverse => FlexDirection::ColumnReverse,
        },
        flex_wrap: match style.flex_wrap {
            css::FlexWrap::NoWrap => FlexWrap::NoWrap,
            css::FlexWrap::Wrap => FlexWrap::Wrap,
            css::FlexWrap::WrapReverse => FlexWrap::WrapReverse,
        },
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: to_taffy_dim(&style.flex_basis),
        align_items: Some(match style.align_items {
            css::AlignItems::FlexStart => AlignItems::FlexStart,
            css::AlignItems::FlexEnd => AlignItems::FlexEnd,
            css::AlignItems::Center => AlignItems::Center,
            css::AlignItems::Stretch => AlignItems::Stretch,
            css::AlignItems::Baseline => AlignItems::Baseline,
        }),
        justify_content: Some(match style.justify_content {
            css::JustifyContent::FlexStart => JustifyContent::FlexStart,
            css::JustifyContent::FlexEnd => JustifyContent::FlexEnd,
            css::JustifyContent::Center => JustifyContent::Center,
            css::JustifyContent::SpaceBetween => JustifyContent::SpaceBetween,
            css::JustifyContent::SpaceAround => JustifyContent::SpaceAround,
            css::JustifyContent::SpaceEvenly => JustifyContent::SpaceEvenly,
        }),
        gap: Size {
            width: LengthPercentage::Length(style.gap),
            height: LengthPercentage::Length(style.gap),
        },
        overflow: taffy::Point {
            x: overflow,
            y: overflow,
        },
        ..Default::default()
    }
}

fn to_taffy_dim(dim: &css::Dimension) -> Dimension {
    match dim {
        css::Dimension::Px(v) => Dimension::Length(*v),
        css::Dimension::Percent(v) => Dimension::Percent(*v),
        css::Dimension::Auto => Dimension::Auto,
    }
}

fn to_taffy_auto_dim(dim: &css::Dimension) -> LengthPercentageAuto {
    match dim {
        css::Dimension::Px(v) => LengthPercentageAuto::Length(*v),
        css::Dimension::Percent(v) => LengthPercentageAuto::Percent(*v),
        css::Dimension::Auto => LengthPercentageAuto::Auto,
    }
}

fn extract_layout(
    tree: &TaffyTree<()>,
    node_id: NodeId,
    styled: &StyledNode,
    parent_x: f32,
    parent_y: f32,
) -> Result<LayoutNode> {
    let taffy_layout = tree.layout(node_id).map_err(taffy_err)?;

    let x = parent_x + taffy_layout.location.x;
    let y = parent_y + taffy_layout.location.y;

    // Leaves built from text-only elements have no taffy children
    let taffy_children: Vec<NodeId> = tree.children(node_id).unwrap_or_default();
    let mut children = Vec::with_capacity(styled.children.len());
    for (i, styled_child) in styled.children.iter().enumerate() {
        match taffy_children.get(i) {
            Some(&taffy_child) => {
                children.push(extract_layout(tree, taffy_child, styled_child, x, y)?)
            }
            None => children.push(unlaid_out(styled_child)),
        }
    }

    let bounds = if styled.style.display == css::Display::None {
        None
    } else {
        Some(Bounds {
            x,
            y,
            width: taffy_layout.size.width,
            height: taffy_layout.size.height,
        })
    };

    Ok(LayoutNode {
        tag: styled.tag.clone(),
        attributes: styled.attributes.clone(),
        text: styled.text.clone(),
        markup: styled.markup.clone(),
        node_type: styled.node_type.clone(),
        computed: styled.computed.clone(),
        bounds,
        children,
    })
}

/// A subtree the layout engine never placed (text inside a measured leaf,
/// SVG internals): styles only, no bounding box.
fn unlaid_out(styled: &StyledNode) -> LayoutNode {
    LayoutNode {
        tag: styled.tag.clone(),
        attributes: styled.attributes.clone(),
        text: styled.text.clone(),
        markup: styled.markup.clone(),
        node_type: styled.node_type.clone(),
        computed: styled.computed.clone(),
        bounds: None,
        children: styled.children.iter().map(unlaid_out).collect(),
    }
}
