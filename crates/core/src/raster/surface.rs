//! Offscreen drawing surfaces.

use std::sync::Arc;

use super::fonts::FontBook;
use super::RasterError;
use crate::geometry::RADIUS_CORRECTION;
use crate::model::{GradientKind, GradientSpec, ShapeKind};
use rustybuzz::UnicodeBuffer;
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point,
    RadialGradient, Rect, Shader, SpreadMode, Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Cubic control distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Glyph runs may use at most this share of the canvas width.
const MAX_RUN_WIDTH: f32 = 0.95;

/// The rasterization collaborator: hands out blank canvases.
pub trait RasterSurface {
    type Canvas: Canvas;

    fn canvas(&self, width: u32, height: u32) -> Result<Self::Canvas, RasterError>;
}

/// One bitmap being drawn. Colors are six hex digits.
pub trait Canvas {
    /// Fill the canvas with a gradient at `opacity` (0–1), clipped to
    /// `outline` inscribed in the canvas.
    fn fill_gradient(
        &mut self,
        spec: &GradientSpec,
        outline: ShapeKind,
        opacity: f32,
    ) -> Result<(), RasterError>;

    /// Draw `text` centered, in `family` at `size_px`. Ligature fonts turn
    /// an icon name into its single glyph.
    fn fill_text(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        color: &str,
    ) -> Result<(), RasterError>;

    /// Fraction of pixels with any ink, 0–1.
    fn coverage(&self) -> f32;

    fn encode_png(&self) -> Result<Vec<u8>, RasterError>;
}

/// tiny-skia surface. Text is shaped with rustybuzz and drawn from the
/// outlines of faces in its [`FontBook`].
#[derive(Debug, Clone, Default)]
pub struct TinySkiaSurface {
    fonts: Arc<FontBook>,
}

impl TinySkiaSurface {
    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            fonts: Arc::new(fonts),
        }
    }
}

impl RasterSurface for TinySkiaSurface {
    type Canvas = TinySkiaCanvas;

    fn canvas(&self, width: u32, height: u32) -> Result<TinySkiaCanvas, RasterError> {
        let pixmap = Pixmap::new(width, height).ok_or(RasterError::Surface(width, height))?;
        Ok(TinySkiaCanvas {
            pixmap,
            fonts: self.fonts.clone(),
        })
    }
}

pub struct TinySkiaCanvas {
    pixmap: Pixmap,
    fonts: Arc<FontBook>,
}

impl Canvas for TinySkiaCanvas {
    fn fill_gradient(
        &mut self,
        spec: &GradientSpec,
        outline: ShapeKind,
        opacity: f32,
    ) -> Result<(), RasterError> {
        let (w, h) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        let rect = Rect::from_xywh(0.0, 0.0, w, h).ok_or(RasterError::Surface(w as u32, h as u32))?;
        let path = outline_path(rect, outline).ok_or(RasterError::Surface(w as u32, h as u32))?;
        let shader = gradient_shader(spec, w, h, opacity).ok_or(RasterError::Shader)?;

        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        color: &str,
    ) -> Result<(), RasterError> {
        let no_font = || RasterError::NoFont(family.to_string());
        let data = self.fonts.resolve(family).ok_or_else(no_font)?;
        let shaper = rustybuzz::Face::from_slice(&data, 0).ok_or_else(no_font)?;
        let face = ttf_parser::Face::parse(&data, 0).map_err(|_| no_font())?;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let shaped = rustybuzz::shape(&shaper, &[], buffer);

        // pen positions in font units
        let mut pen = 0.0f32;
        let mut placed = Vec::new();
        for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
            if info.glyph_id != 0 {
                let id = GlyphId(info.glyph_id as u16);
                placed.push((id, pen + pos.x_offset as f32, pos.y_offset as f32));
            }
            pen += pos.x_advance as f32;
        }
        if placed.is_empty() {
            return Err(RasterError::NoGlyphs(text.to_string()));
        }

        let (w, h) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        let upem = face.units_per_em().max(1) as f32;
        let scale = (size_px / upem).min(w * MAX_RUN_WIDTH / pen.max(1.0));
        let left = (w - pen * scale) / 2.0;
        let middle = (face.ascender() as f32 + face.descender() as f32) / 2.0;
        let baseline = h / 2.0 + middle * scale;

        let mut paint = Paint::default();
        paint.set_color(sk_color(color, 1.0).unwrap_or(Color::BLACK));
        paint.anti_alias = true;

        let mut drawn = 0;
        for (id, x, y) in placed {
            let mut outline = GlyphPath::new(left + x * scale, baseline - y * scale, scale);
            if face.outline_glyph(id, &mut outline).is_none() {
                continue;
            }
            if let Some(path) = outline.builder.finish() {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                drawn += 1;
            }
        }
        if drawn == 0 {
            return Err(RasterError::NoGlyphs(text.to_string()));
        }
        Ok(())
    }

    fn coverage(&self) -> f32 {
        let pixels = self.pixmap.pixels();
        if pixels.is_empty() {
            return 0.0;
        }
        let inked = pixels.iter().filter(|p| p.alpha() > 0).count();
        inked as f32 / pixels.len() as f32
    }

    fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }
}

/// Maps font units (y up) onto the canvas (y down) around a glyph origin.
struct GlyphPath {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPath {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn at(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPath {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.at(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.at(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.at(x1, y1);
        let (x, y) = self.at(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.at(x1, y1);
        let (x2, y2) = self.at(x2, y2);
        let (x, y) = self.at(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// The shape primitive's outline over `rect`, matching the radius the
/// presentation shape gets.
fn outline_path(rect: Rect, outline: ShapeKind) -> Option<Path> {
    match outline {
        ShapeKind::Rect => Some(PathBuilder::from_rect(rect)),
        ShapeKind::Ellipse => PathBuilder::from_oval(rect),
        ShapeKind::RoundRect { radius_ratio } => {
            let shorter = rect.width().min(rect.height());
            let r = (radius_ratio * RADIUS_CORRECTION * shorter).min(shorter / 2.0);
            if r <= 0.0 {
                return Some(PathBuilder::from_rect(rect));
            }
            rounded_rect(rect, r)
        }
    }
}

fn rounded_rect(rect: Rect, r: f32) -> Option<Path> {
    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let k = r * KAPPA;
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

/// Shader for a CSS gradient over a `w`×`h` box. The linear axis runs
/// through the center at the CSS angle (0 = up, clockwise) and spans the
/// box corner to corner along that direction.
fn gradient_shader(spec: &GradientSpec, w: f32, h: f32, opacity: f32) -> Option<Shader<'static>> {
    let stops: Vec<GradientStop> = spec
        .stops
        .iter()
        .filter_map(|stop| {
            let color = sk_color(&stop.color, opacity)?;
            Some(GradientStop::new((stop.position / 100.0).clamp(0.0, 1.0), color))
        })
        .collect();
    if stops.len() < 2 {
        return None;
    }
    let center = Point::from_xy(w / 2.0, h / 2.0);
    match spec.kind {
        GradientKind::Linear => {
            let rad = spec.angle_deg.to_radians();
            let (dx, dy) = (rad.sin(), -rad.cos());
            let half = (w * dx.abs() + h * dy.abs()) / 2.0;
            let start = Point::from_xy(center.x - dx * half, center.y - dy * half);
            let end = Point::from_xy(center.x + dx * half, center.y + dy * half);
            LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity())
        }
        GradientKind::Radial => {
            let radius = (w * w + h * h).sqrt() / 2.0;
            RadialGradient::new(
                center,
                center,
                radius.max(0.0001),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }
}

/// `RRGGBB` to a tiny-skia color with the given alpha.
fn sk_color(hex: &str, opacity: f32) -> Option<Color> {
    let (r, g, b) = hex_rgb(hex)?;
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Some(Color::from_rgba8(r, g, b, a))
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorStop;
    use crate::raster::fonts::tests::dejavu_sans;
    use crate::raster::MIN_COVERAGE;

    fn two_stop(kind: GradientKind) -> GradientSpec {
        GradientSpec {
            kind,
            angle_deg: 90.0,
            stops: vec![
                ColorStop { color: "FF0000".into(), position: 0.0 },
                ColorStop { color: "0000FF".into(), position: 100.0 },
            ],
        }
    }

    #[test]
    fn test_linear_gradient_fills_canvas() {
        let mut canvas = TinySkiaSurface::default().canvas(40, 20).unwrap();
        assert_eq!(canvas.coverage(), 0.0);
        canvas
            .fill_gradient(&two_stop(GradientKind::Linear), ShapeKind::Rect, 1.0)
            .unwrap();
        assert!(canvas.coverage() > 0.99);

        // 90deg runs left to right: red on the left edge, blue on the right.
        let left = canvas.pixmap.pixel(0, 10).unwrap();
        let right = canvas.pixmap.pixel(39, 10).unwrap();
        assert!(left.red() > left.blue());
        assert!(right.blue() > right.red());

        let png = canvas.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_radial_gradient() {
        let mut canvas = TinySkiaSurface::default().canvas(20, 20).unwrap();
        canvas
            .fill_gradient(&two_stop(GradientKind::Radial), ShapeKind::Rect, 1.0)
            .unwrap();
        assert!(canvas.coverage() > 0.99);
    }

    #[test]
    fn test_gradient_follows_the_outline() {
        let surface = TinySkiaSurface::default();
        let spec = two_stop(GradientKind::Linear);

        let mut card = surface.canvas(100, 50).unwrap();
        card.fill_gradient(&spec, ShapeKind::RoundRect { radius_ratio: 0.25 }, 1.0)
            .unwrap();
        assert_eq!(card.pixmap.pixel(0, 0).unwrap().alpha(), 0);
        assert_eq!(card.pixmap.pixel(99, 49).unwrap().alpha(), 0);
        assert_eq!(card.pixmap.pixel(50, 25).unwrap().alpha(), 255);
        assert_eq!(card.pixmap.pixel(50, 1).unwrap().alpha(), 255);

        let mut badge = surface.canvas(40, 40).unwrap();
        badge.fill_gradient(&spec, ShapeKind::Ellipse, 1.0).unwrap();
        assert_eq!(badge.pixmap.pixel(2, 2).unwrap().alpha(), 0);
        assert_eq!(badge.pixmap.pixel(20, 20).unwrap().alpha(), 255);
        let coverage = badge.coverage();
        assert!(coverage > 0.7 && coverage < 0.9, "{coverage}");
    }

    #[test]
    fn test_degenerate_inputs() {
        let surface = TinySkiaSurface::default();
        assert!(surface.canvas(0, 10).is_err());
        let mut canvas = surface.canvas(4, 4).unwrap();
        let mut spec = two_stop(GradientKind::Linear);
        spec.stops.truncate(1);
        assert!(canvas.fill_gradient(&spec, ShapeKind::Rect, 1.0).is_err());
        // an empty font book has nothing to draw with
        assert!(matches!(
            canvas.fill_text("home", "Material Icons", 24.0, "000000"),
            Err(RasterError::NoFont(_))
        ));
    }

    #[test]
    fn test_text_draws_font_outlines() {
        let Some(path) = dejavu_sans() else {
            return;
        };
        let surface = TinySkiaSurface::with_fonts(FontBook::load(&[path], false));
        let mut canvas = surface.canvas(96, 96).unwrap();
        canvas.fill_text("home", "DejaVu Sans", 40.0, "1E40AF").unwrap();
        let coverage = canvas.coverage();
        assert!(coverage > MIN_COVERAGE && coverage < 0.9, "{coverage}");

        let inked = canvas
            .pixmap
            .pixels()
            .iter()
            .find(|p| p.alpha() == 255)
            .copied()
            .unwrap();
        assert_eq!((inked.red(), inked.green(), inked.blue()), (0x1E, 0x40, 0xAF));

        // no ink outside the run's vertical band
        assert!((0..96).all(|x| canvas.pixmap.pixel(x, 0).unwrap().alpha() == 0));

        let mut blank = surface.canvas(32, 32).unwrap();
        assert!(matches!(
            blank.fill_text("\u{10FFFD}", "DejaVu Sans", 20.0, "000000"),
            Err(RasterError::NoGlyphs(_))
        ));
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("10B981"), Some((0x10, 0xB9, 0x81)));
        assert_eq!(hex_rgb("#fff"), None);
    }
}
