//! The rendering collaborator: lays out a document and answers
//! computed-style and geometry queries for every node.

use crate::css;
use crate::dom;
use crate::error::{Error, Result};
use crate::extract;
use crate::layout::{self, LayoutNode};

/// Something that can load an HTML document and report, per node, the
/// tag, attributes, text, computed styles and (when rendered) a bounding
/// rectangle.
#[allow(async_fn_in_trait)]
pub trait RenderingEngine {
    /// Load and lay out a document. Failing here is fatal for the run.
    async fn load(&mut self, html: &str) -> Result<LayoutNode>;

    /// Size of the canvas the document was laid out on, in px.
    fn canvas_size(&self) -> (f32, f32);

    /// Resolves once web fonts are usable for glyph rasterization.
    async fn fonts_ready(&self);
}

/// In-process engine: html5ever parsing, a small CSS cascade and taffy
/// box layout. It downloads nothing, so fonts are always "ready".
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    viewport_width: f32,
    viewport_height: f32,
}

impl LayoutEngine {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
        }
    }

    /// Synchronous form of [`RenderingEngine::load`].
    pub fn render(&self, html: &str) -> Result<LayoutNode> {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(Error::CollaboratorUnavailable(format!(
                "cannot open a {}x{} frame",
                self.viewport_width, self.viewport_height
            )));
        }
        let dom_tree = dom::parse_html(html)?;
        // Every slide container is laid out, including the ones a
        // one-slide-at-a-time deck keeps hidden.
        let slides = extract::find_slides(&dom_tree);
        let styled = css::compute_styles_revealing(&dom_tree, &slides);
        layout::compute_layout(&styled, self.viewport_width, self.viewport_height)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl RenderingEngine for LayoutEngine {
    async fn load(&mut self, html: &str) -> Result<LayoutNode> {
        let root = self.render(html)?;
        log::debug!(
            "laid out document at {}x{}",
            self.viewport_width,
            self.viewport_height
        );
        Ok(root)
    }

    fn canvas_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    async fn fonts_ready(&self) {}
}
