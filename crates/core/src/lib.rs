pub mod animation;
pub mod config;
pub mod css;
pub mod dom;
pub mod emit;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod raster;
pub mod render;
pub mod style;

pub use config::{AspectRatio, ConvertConfig, TextEstimation};
pub use emit::{DrawCall, DrawCallEncoder, PresentationEncoder};
pub use error::{Error, Result};
pub use model::{Element, ElementKind, Slide, SlideDocument};
pub use raster::{FontBook, RasterSurface, TinySkiaSurface};
pub use render::{LayoutEngine, RenderingEngine};

use dom::DocumentTree;
use emit::EmitOptions;
use geometry::Transform;
use std::time::Duration;

/// Convert an HTML deck with the built-in collaborators and return the
/// serialized draw-call list.
/// This is the primary entry point for html2deck-core.
pub async fn convert(html: &str, config: &ConvertConfig) -> Result<Vec<u8>> {
    let mut engine = LayoutEngine::new(config.viewport_width, config.viewport_height);
    let mut encoder = DrawCallEncoder::new();
    let surface = TinySkiaSurface::with_fonts(FontBook::load(&config.icon_font_paths, config.system_fonts));
    convert_with(&mut engine, &surface, &mut encoder, html, config).await?;
    encoder.serialize()
}

/// Run the whole pipeline against caller-supplied collaborators. Returns
/// the finished slide tree, geometry in target inches.
pub async fn convert_with<R, S, E>(
    engine: &mut R,
    surface: &S,
    encoder: &mut E,
    html: &str,
    config: &ConvertConfig,
) -> Result<SlideDocument>
where
    R: RenderingEngine,
    S: RasterSurface,
    E: PresentationEncoder,
{
    config.validate()?;
    let mut doc = build_document(engine, html, config).await?;

    let target = config.target_size();
    let transform = Transform::fit(engine.canvas_size(), target);
    geometry::apply_to_document(&mut doc, &transform, target);

    wait_for_fonts(engine, Duration::from_millis(config.font_ready_timeout_ms)).await;
    raster::rasterize_document(&mut doc, surface, target);

    let options = EmitOptions {
        title: &config.title,
        author: &config.author,
        preserve_animations: config.preserve_animations,
    };
    emit::emit_document(&doc, encoder, &options).await?;
    Ok(doc)
}

/// Load `html` and extract its slides. Documents whose slides only exist
/// in a script array are rebuilt from that array and loaded again.
pub async fn build_document<R: RenderingEngine>(
    engine: &mut R,
    html: &str,
    config: &ConvertConfig,
) -> Result<SlideDocument> {
    let root = engine.load(html).await?;
    if extract::find_slides(&root).is_empty() {
        let slides = extract::script::slide_markup(&root.raw_text_blocks("script"));
        if !slides.is_empty() {
            log::info!("document builds {} slides from script", slides.len());
            let stylesheets = root.raw_text_blocks("style");
            let rebuilt = extract::script::rebuild_document(&slides, &stylesheets);
            let root = engine.load(&rebuilt).await?;
            return Ok(extract::extract_document(&root, config));
        }
    }
    let doc = extract::extract_document(&root, config);
    log::info!("extracted {} slides", doc.slides.len());
    Ok(doc)
}

async fn wait_for_fonts<R: RenderingEngine>(engine: &R, timeout: Duration) {
    tokio::select! {
        _ = engine.fonts_ready() => log::debug!("fonts ready"),
        _ = tokio::time::sleep(timeout) => {
            log::warn!("fonts not ready after {timeout:?}, rasterizing anyway");
        }
    }
}
