//! The presentation-encoder collaborator and the recording encoder.

use crate::animation::AnimationSpec;
use crate::error::{Error, Result};
use crate::model::{Rect, ShapeKind, TableRow};
use crate::style::{BorderSpec, ShadowSpec, TextAlign};
use serde::Serialize;

/// Slide background fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fill {
    Solid { color: String },
    /// URL or `data:` URI.
    Image { src: String },
}

/// Where a picture's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    Url { src: String },
    Embedded { mime: String, data_uri: String },
}

/// Positions are inches, font sizes points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOptions {
    pub frame: Rect,
    pub font_face: String,
    pub font_size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub align: TextAlign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOptions {
    pub frame: Rect,
    pub source: ImageSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeOptions {
    pub frame: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// 0–1, applied to `fill`.
    pub fill_opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<BorderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOptions {
    pub frame: Rect,
    pub font_face: String,
    pub font_size_pt: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSpec>,
}

/// One bullet of a flattened list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListLine {
    pub text: String,
    /// Nesting depth, 0 for top-level items.
    pub level: u32,
    pub ordered: bool,
}

/// Receives draw calls slide by slide and produces the final file.
///
/// Every call after a failed one is undefined; the walker stops at the
/// first error.
pub trait PresentationEncoder {
    fn set_metadata(&mut self, title: &str, author: &str) -> Result<()>;
    fn add_slide(&mut self, title: &str) -> Result<()>;
    fn set_background(&mut self, fill: Fill) -> Result<()>;
    fn add_text(&mut self, text: &str, options: TextOptions) -> Result<()>;
    fn add_image(&mut self, options: ImageOptions) -> Result<()>;
    fn add_shape(&mut self, shape: ShapeKind, options: ShapeOptions) -> Result<()>;
    fn add_table(&mut self, rows: &[TableRow], options: TableOptions) -> Result<()>;
    fn add_list(&mut self, items: &[ListLine], options: TextOptions) -> Result<()>;
    fn serialize(&self) -> Result<Vec<u8>>;
}

/// A recorded encoder call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    AddSlide { title: String },
    SetBackground { fill: Fill },
    AddText { text: String, options: TextOptions },
    AddImage { options: ImageOptions },
    AddShape { shape: ShapeKind, options: ShapeOptions },
    AddTable { rows: Vec<TableRow>, options: TableOptions },
    AddList { items: Vec<ListLine>, options: TextOptions },
}

#[derive(Serialize)]
struct Recording<'a> {
    title: &'a str,
    author: &'a str,
    slides: usize,
    calls: &'a [DrawCall],
}

/// Records every call and serializes them as a JSON draw list.
#[derive(Debug, Default)]
pub struct DrawCallEncoder {
    title: String,
    author: String,
    slides: usize,
    calls: Vec<DrawCall>,
}

impl DrawCallEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<DrawCall> {
        self.calls
    }

    fn push(&mut self, call: DrawCall) -> Result<()> {
        if self.slides == 0 {
            return Err(Error::Encoder(format!(
                "{} before any slide was added",
                op_name(&call)
            )));
        }
        self.calls.push(call);
        Ok(())
    }
}

fn op_name(call: &DrawCall) -> &'static str {
    match call {
        DrawCall::AddSlide { .. } => "add_slide",
        DrawCall::SetBackground { .. } => "set_background",
        DrawCall::AddText { .. } => "add_text",
        DrawCall::AddImage { .. } => "add_image",
        DrawCall::AddShape { .. } => "add_shape",
        DrawCall::AddTable { .. } => "add_table",
        DrawCall::AddList { .. } => "add_list",
    }
}

impl PresentationEncoder for DrawCallEncoder {
    fn set_metadata(&mut self, title: &str, author: &str) -> Result<()> {
        self.title = title.to_string();
        self.author = author.to_string();
        Ok(())
    }

    fn add_slide(&mut self, title: &str) -> Result<()> {
        self.slides += 1;
        self.calls.push(DrawCall::AddSlide {
            title: title.to_string(),
        });
        Ok(())
    }

    fn set_background(&mut self, fill: Fill) -> Result<()> {
        self.push(DrawCall::SetBackground { fill })
    }

    fn add_text(&mut self, text: &str, options: TextOptions) -> Result<()> {
        self.push(DrawCall::AddText {
            text: text.to_string(),
            options,
        })
    }

    fn add_image(&mut self, options: ImageOptions) -> Result<()> {
        self.push(DrawCall::AddImage { options })
    }

    fn add_shape(&mut self, shape: ShapeKind, options: ShapeOptions) -> Result<()> {
        self.push(DrawCall::AddShape { shape, options })
    }

    fn add_table(&mut self, rows: &[TableRow], options: TableOptions) -> Result<()> {
        self.push(DrawCall::AddTable {
            rows: rows.to_vec(),
            options,
        })
    }

    fn add_list(&mut self, items: &[ListLine], options: TextOptions) -> Result<()> {
        self.push(DrawCall::AddList {
            items: items.to_vec(),
            options,
        })
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let recording = Recording {
            title: &self.title,
            author: &self.author,
            slides: self.slides,
            calls: &self.calls,
        };
        Ok(serde_json::to_vec_pretty(&recording)?)
    }
}
