//! Emission: walk the finished slide tree and issue draw calls.
//!
//! Slides go out in order, each background first and then its elements
//! parent before children. Only encoder failures abort the walk.

pub mod encoder;

pub use encoder::{
    DrawCall, DrawCallEncoder, Fill, ImageOptions, ImageSource, ListLine, PresentationEncoder,
    ShapeOptions, TableOptions, TextOptions,
};

use crate::animation::AnimationSpec;
use crate::error::Result;
use crate::geometry::PX_PER_INCH;
use crate::model::{
    Background, Element, ElementKind, ListData, RasterPayload, Rect, ShapeKind, Slide, SlideDocument,
};
use crate::style::{parse_gradient, Edge, EdgeBorder, StyleRecord};

/// Sources that only live inside the page that created them.
const EPHEMERAL_SCHEMES: &[&str] = &["blob", "filesystem"];

const PT_PER_INCH: f32 = 72.0;

/// Document-level emission settings.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub preserve_animations: bool,
}

/// Emit every slide of `doc` into `encoder`.
pub async fn emit_document<E: PresentationEncoder>(
    doc: &SlideDocument,
    encoder: &mut E,
    options: &EmitOptions<'_>,
) -> Result<()> {
    let title = match options.title {
        "" => doc.slides.first().map(|s| s.title.as_str()).unwrap_or(""),
        title => title,
    };
    encoder.set_metadata(title, options.author)?;

    let total = doc.slides.len();
    for (i, slide) in doc.slides.iter().enumerate() {
        let mut walker = Walker {
            encoder: &mut *encoder,
            preserve_animations: options.preserve_animations,
        };
        walker.slide(slide)?;
        log::info!("emitted slide {}/{total}: {}", i + 1, slide.title);
        tokio::task::yield_now().await;
    }
    Ok(())
}

struct Walker<'e, E> {
    encoder: &'e mut E,
    preserve_animations: bool,
}

impl<E: PresentationEncoder> Walker<'_, E> {
    fn slide(&mut self, slide: &Slide) -> Result<()> {
        self.encoder.add_slide(&slide.title)?;
        if let Some(fill) = background_fill(&slide.background) {
            self.encoder.set_background(fill)?;
        }
        for element in &slide.elements {
            self.element(element)?;
        }
        Ok(())
    }

    fn element(&mut self, el: &Element) -> Result<()> {
        let animation = if self.preserve_animations {
            el.animation.clone()
        } else {
            None
        };

        if let ElementKind::Icon(icon) = &el.kind {
            match &el.raster {
                Some(payload) => self.embedded(el, payload, animation)?,
                None => log::debug!("icon `{}` has no image, skipped", icon.name),
            }
            return Ok(());
        }

        let gradient_drawn = self.gradient(el, animation.clone())?;
        if el.style.has_box_decoration() {
            self.encoder.add_shape(
                el.shape,
                ShapeOptions {
                    frame: el.geometry,
                    fill: if gradient_drawn { None } else { el.style.background.clone() },
                    fill_opacity: el.style.fill_opacity * el.style.opacity,
                    line: el.style.border.clone(),
                    shadow: el.style.shadow.clone(),
                    animation: animation.clone(),
                },
            )?;
        }
        for strip in &el.style.edge_borders {
            self.encoder.add_shape(
                ShapeKind::Rect,
                ShapeOptions {
                    frame: edge_frame(el.geometry, strip),
                    fill: Some(strip.spec.color.clone()),
                    fill_opacity: el.style.opacity,
                    line: None,
                    shadow: None,
                    animation: animation.clone(),
                },
            )?;
        }
        if let Some(src) = el.style.background_image.as_deref() {
            if !gradient_drawn {
                self.url_image(el, src, None, animation.clone())?;
            }
        }

        match &el.kind {
            ElementKind::Image { src, alt } => {
                let alt = (!alt.is_empty()).then(|| alt.clone());
                self.url_image(el, src, alt, animation.clone())?;
            }
            ElementKind::Table(table) => {
                self.encoder.add_table(
                    &table.rows,
                    TableOptions {
                        frame: el.geometry,
                        font_face: el.style.font_family.clone(),
                        font_size_pt: el.style.font_size_pt,
                        animation: animation.clone(),
                    },
                )?;
            }
            ElementKind::List(list) => {
                let mut lines = Vec::new();
                flatten_list(list, 0, &mut lines);
                if !lines.is_empty() {
                    self.encoder
                        .add_list(&lines, text_options(el, animation.clone()))?;
                }
            }
            ElementKind::VectorGraphic { markup } if !markup.is_empty() => {
                let size = (el.geometry.w.max(el.geometry.h) * PX_PER_INCH).round() as u32;
                let payload = RasterPayload::svg(markup.clone(), size.max(1));
                self.embedded(el, &payload, animation.clone())?;
            }
            _ => {}
        }

        if !el.text.is_empty() {
            self.encoder
                .add_text(&el.text, text_options(el, animation))?;
        }

        for child in &el.children {
            self.element(child)?;
        }
        Ok(())
    }

    /// Draw a gradient fill, from its raster or as a solid fill of the
    /// first stop. Returns whether anything was drawn.
    fn gradient(&mut self, el: &Element, animation: Option<AnimationSpec>) -> Result<bool> {
        let Some(raw) = el.style.gradient.as_deref() else {
            return Ok(false);
        };
        if let Some(payload) = &el.raster {
            self.embedded(el, payload, animation)?;
            return Ok(true);
        }
        let Some(first) = parse_gradient(raw).and_then(|spec| spec.stops.into_iter().next()) else {
            log::warn!("<{}> gradient dropped: `{raw}`", el.tag);
            return Ok(false);
        };
        log::warn!("<{}> gradient not rasterized, using a solid fill", el.tag);
        self.encoder.add_shape(
            el.shape,
            ShapeOptions {
                frame: el.geometry,
                fill: Some(first.color),
                fill_opacity: el.style.opacity,
                line: None,
                shadow: None,
                animation,
            },
        )?;
        Ok(true)
    }

    fn embedded(
        &mut self,
        el: &Element,
        payload: &RasterPayload,
        animation: Option<AnimationSpec>,
    ) -> Result<()> {
        self.encoder.add_image(ImageOptions {
            frame: el.geometry,
            source: ImageSource::Embedded {
                mime: payload.mime.clone(),
                data_uri: payload.data_uri(),
            },
            alt: None,
            animation,
        })
    }

    fn url_image(
        &mut self,
        el: &Element,
        src: &str,
        alt: Option<String>,
        animation: Option<AnimationSpec>,
    ) -> Result<()> {
        if is_ephemeral(src) {
            log::warn!("skipping image with ephemeral source `{src}`");
            return Ok(());
        }
        self.encoder.add_image(ImageOptions {
            frame: el.geometry,
            source: ImageSource::Url { src: src.to_string() },
            alt,
            animation,
        })
    }
}

/// Relative references never parse and are left to the encoder.
fn is_ephemeral(src: &str) -> bool {
    url::Url::parse(src.trim())
        .map(|u| EPHEMERAL_SCHEMES.contains(&u.scheme()))
        .unwrap_or(false)
}

/// The strip along one edge of `frame` that a single-edge border covers.
fn edge_frame(frame: Rect, strip: &EdgeBorder) -> Rect {
    let Rect { x, y, w, h } = frame;
    let across = |extent: f32| (strip.spec.width_pt / PT_PER_INCH).min(extent);
    match strip.edge {
        Edge::Top => Rect::new(x, y, w, across(h)),
        Edge::Bottom => Rect::new(x, y + h - across(h), w, across(h)),
        Edge::Left => Rect::new(x, y, across(w), h),
        Edge::Right => Rect::new(x + w - across(w), y, across(w), h),
    }
}

fn background_fill(background: &Background) -> Option<Fill> {
    match background {
        Background::None => None,
        Background::SolidColor { color } => Some(Fill::Solid { color: color.clone() }),
        Background::Gradient { raster: Some(payload), .. } => Some(Fill::Image {
            src: payload.data_uri(),
        }),
        Background::Gradient { spec, raster: None } => {
            log::warn!("background gradient not rasterized, using its first stop");
            spec.stops.first().map(|stop| Fill::Solid {
                color: stop.color.clone(),
            })
        }
        Background::Image { src } if is_ephemeral(src) => {
            log::warn!("skipping background with ephemeral source `{src}`");
            None
        }
        Background::Image { src } => Some(Fill::Image { src: src.clone() }),
    }
}

fn text_options(el: &Element, animation: Option<AnimationSpec>) -> TextOptions {
    let StyleRecord {
        font_family,
        font_size_pt,
        bold,
        italic,
        underline,
        strikethrough,
        align,
        line_height,
        color,
        ..
    } = &el.style;
    TextOptions {
        frame: el.geometry,
        font_face: font_family.clone(),
        font_size_pt: *font_size_pt,
        bold: *bold,
        italic: *italic,
        underline: *underline,
        strikethrough: *strikethrough,
        color: color.clone(),
        align: *align,
        line_spacing: *line_height,
        animation,
    }
}

fn flatten_list(list: &ListData, level: u32, out: &mut Vec<ListLine>) {
    for item in &list.items {
        if !item.text.is_empty() {
            out.push(ListLine {
                text: item.text.clone(),
                level,
                ordered: list.ordered,
            });
        }
        if let Some(nested) = &item.nested {
            flatten_list(nested, level + 1, out);
        }
    }
}
