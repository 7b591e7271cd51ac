//! The normalized slide tree: built once by the extractor, rewritten in
//! place by the geometry pass and the rasterizer, then read by emission.

use crate::animation::AnimationSpec;
use crate::style::StyleRecord;
use base64::Engine;
use serde::Serialize;

/// All slides of one conversion run, in presentation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideDocument {
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    pub title: String,
    pub background: Background,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    #[default]
    None,
    SolidColor { color: String },
    Gradient { spec: GradientSpec, raster: Option<RasterPayload> },
    Image { src: String },
}

/// `x`, `y`, `w`, `h`: source px after extraction, inches after the
/// geometry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// One node of the slide tree.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    /// Source tag, kept for diagnostics.
    pub tag: String,
    pub geometry: Rect,
    pub style: StyleRecord,
    /// Text emitted for this element; always empty for icons.
    pub text: String,
    pub animation: Option<AnimationSpec>,
    /// Decided by the geometry pass.
    pub shape: ShapeKind,
    /// Bitmap or vector image standing in for content the target format
    /// cannot draw natively (glyph icons, gradient fills).
    pub raster: Option<RasterPayload>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(kind: ElementKind, tag: &str, geometry: Rect, style: StyleRecord) -> Self {
        Self {
            kind,
            tag: tag.to_string(),
            geometry,
            style,
            text: String::new(),
            animation: None,
            shape: ShapeKind::Rect,
            raster: None,
            children: Vec::new(),
        }
    }

    pub fn is_icon(&self) -> bool {
        matches!(self.kind, ElementKind::Icon(_))
    }

    /// Depth-first visit of this element and all descendants.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Heading { level: u8 },
    Paragraph,
    Text,
    Image { src: String, alt: String },
    Table(TableData),
    List(ListData),
    Container,
    Shape,
    Icon(IconData),
    VectorGraphic { markup: String },
    Generic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableData {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub colspan: u32,
    pub rowspan: u32,
    pub header: bool,
    pub style: StyleRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListData {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub text: String,
    pub nested: Option<ListData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconData {
    /// Glyph or icon name as written in the source (`home`, `fa-star`).
    pub name: String,
    pub glyph: IconGlyph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum IconGlyph {
    /// Drawn by an icon font; needs rasterization.
    Font { family: String },
    /// Inline SVG child, used as-is.
    Vector { markup: String, fill: Option<String> },
}

/// Ordered color stops along a gradient axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientSpec {
    pub kind: GradientKind,
    /// CSS convention: 0 points up, 90 right, 180 (default) down.
    pub angle_deg: f32,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    /// Six uppercase hex digits.
    pub color: String,
    /// 0–100.
    pub position: f32,
}

/// Output primitive chosen for a styled box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeKind {
    Rect,
    RoundRect { radius_ratio: f32 },
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterPayload {
    pub mime: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterPayload {
    pub fn png(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            mime: "image/png".to_string(),
            data,
            width,
            height,
        }
    }

    pub fn svg(markup: String, size: u32) -> Self {
        Self {
            mime: "image/svg+xml".to_string(),
            data: markup.into_bytes(),
            width: size,
            height: size,
        }
    }

    pub fn data_uri(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.mime, b64)
    }
}
