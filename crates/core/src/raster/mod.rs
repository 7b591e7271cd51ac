//! Fallback rasterization: content the target format cannot draw natively
//! (glyph-font icons, gradient fills) becomes an embedded image.
//!
//! Runs after the geometry pass, so element sizes are in inches. Every
//! element is rendered independently; a failure only costs that element
//! its payload.

pub mod fonts;
pub mod glyphs;
pub mod surface;

pub use fonts::FontBook;
pub use surface::{Canvas, RasterSurface, TinySkiaSurface};

use crate::geometry::PX_PER_INCH;
use crate::model::{
    Background, Element, ElementKind, GradientSpec, IconGlyph, RasterPayload, ShapeKind,
    SlideDocument,
};
use crate::style::parse_gradient;
use thiserror::Error;

/// Bitmaps are drawn at twice the target pixel size.
pub const OVERSAMPLE: f32 = 2.0;

/// Below this share of inked pixels a glyph render counts as blank (the
/// font was not ready or lacks the glyph).
pub const MIN_COVERAGE: f32 = 0.01;

const MAX_EDGE_PX: u32 = 4096;

/// Why one element could not be rasterized. Logged, never propagated.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("cannot allocate a {0}x{1} surface")]
    Surface(u32, u32),
    #[error("gradient has no drawable stops")]
    Shader,
    #[error("no font file for `{0}`")]
    NoFont(String),
    #[error("font has no glyphs for `{0}`")]
    NoGlyphs(String),
    #[error("glyph render was blank ({0:.3} coverage)")]
    Blank(f32),
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// What one pass did, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterStats {
    pub gradients: usize,
    pub glyphs: usize,
    pub vector_fallbacks: usize,
    pub skipped: usize,
}

/// Attach image payloads to every gradient fill and icon in `doc`.
pub fn rasterize_document<S: RasterSurface>(
    doc: &mut SlideDocument,
    surface: &S,
    target: (f32, f32),
) -> RasterStats {
    let mut stats = RasterStats::default();
    for slide in &mut doc.slides {
        if let Background::Gradient { spec, raster } = &mut slide.background {
            match render_gradient(surface, spec, ShapeKind::Rect, target.0, target.1, 1.0) {
                Ok(payload) => {
                    *raster = Some(payload);
                    stats.gradients += 1;
                }
                Err(e) => log::warn!("slide background gradient not rasterized: {e}"),
            }
        }
        for element in &mut slide.elements {
            element.walk_mut(&mut |el| rasterize_element(el, surface, &mut stats));
        }
    }
    log::debug!("rasterized {stats:?}");
    stats
}

fn rasterize_element<S: RasterSurface>(el: &mut Element, surface: &S, stats: &mut RasterStats) {
    if let ElementKind::Icon(icon) = &el.kind {
        let size = pixel_size(el.geometry.w.max(el.geometry.h));
        el.raster = match &icon.glyph {
            IconGlyph::Vector { markup, .. } if !markup.is_empty() => {
                Some(RasterPayload::svg(markup.clone(), size))
            }
            IconGlyph::Vector { .. } => None,
            IconGlyph::Font { family } => {
                let color = el.style.color.as_deref().unwrap_or("000000");
                match render_glyph(surface, &icon.name, family, size, color) {
                    Ok(payload) => {
                        stats.glyphs += 1;
                        Some(payload)
                    }
                    Err(e) => {
                        log::debug!("glyph `{}` not drawn: {e}", icon.name);
                        let fallback = vector_glyph(&icon.name, color, size);
                        match fallback {
                            Some(_) => stats.vector_fallbacks += 1,
                            None => {
                                log::debug!("icon `{}` has no vector path, skipping", icon.name);
                                stats.skipped += 1;
                            }
                        }
                        fallback
                    }
                }
            }
        };
        return;
    }

    let Some(spec) = el.style.gradient.as_deref().and_then(parse_gradient) else {
        return;
    };
    let (w, h) = (el.geometry.w, el.geometry.h);
    match render_gradient(surface, &spec, el.shape, w, h, el.style.opacity) {
        Ok(payload) => {
            el.raster = Some(payload);
            stats.gradients += 1;
        }
        Err(e) => log::warn!("<{}> gradient not rasterized: {e}", el.tag),
    }
}

/// Target inches to oversampled pixels, at least one.
fn pixel_size(inches: f32) -> u32 {
    ((inches * PX_PER_INCH * OVERSAMPLE).round() as u32).clamp(1, MAX_EDGE_PX)
}

fn render_gradient<S: RasterSurface>(
    surface: &S,
    spec: &GradientSpec,
    outline: ShapeKind,
    w_in: f32,
    h_in: f32,
    opacity: f32,
) -> Result<RasterPayload, RasterError> {
    let (w, h) = (pixel_size(w_in), pixel_size(h_in));
    let mut canvas = surface.canvas(w, h)?;
    canvas.fill_gradient(spec, outline, opacity)?;
    Ok(RasterPayload::png(canvas.encode_png()?, w, h))
}

fn render_glyph<S: RasterSurface>(
    surface: &S,
    name: &str,
    family: &str,
    size: u32,
    color: &str,
) -> Result<RasterPayload, RasterError> {
    let mut canvas = surface.canvas(size, size)?;
    canvas.fill_text(name, family, size as f32 * 0.9, color)?;
    let coverage = canvas.coverage();
    if coverage < MIN_COVERAGE {
        return Err(RasterError::Blank(coverage));
    }
    Ok(RasterPayload::png(canvas.encode_png()?, size, size))
}

fn vector_glyph(name: &str, color: &str, size: u32) -> Option<RasterPayload> {
    let path = glyphs::lookup(name)?;
    Some(RasterPayload::svg(glyphs::svg(path, color), size))
}
