//! Source px → target inches, canvas clamping and shape selection.
//!
//! One [`Transform`] is computed per document. It is uniform: a single
//! scale for both axes, with the leftover space split evenly as margins.
//! Only geometry goes through it; font sizes keep their point values.

use crate::model::{Rect, ShapeKind, SlideDocument};
use serde::Serialize;

pub const PX_PER_INCH: f32 = 96.0;
/// Where an element whose origin fell off the canvas is put back, inches.
pub const EDGE_MARGIN_IN: f32 = 0.1;
/// Smallest width/height any emitted element gets, inches.
pub const MIN_SIZE_IN: f32 = 0.05;
/// Width and height closer than this (source px) count as square.
pub const SQUARE_TOLERANCE_PX: f32 = 2.0;
/// Radius ratio at or above which a square box becomes an ellipse.
pub const ELLIPSE_RATIO: f32 = 0.48;
/// Rounded-rectangle adjust values render about this much rounder than
/// the CSS radius they came from.
pub const RADIUS_CORRECTION: f32 = 1.2;
pub const MAX_RADIUS_RATIO: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Fit a source canvas (px) into a target canvas (inches), centered.
    pub fn fit(source_px: (f32, f32), target_in: (f32, f32)) -> Self {
        let (sw, sh) = (px_to_in(source_px.0), px_to_in(source_px.1));
        let (tw, th) = target_in;
        if sw <= 0.0 || sh <= 0.0 {
            return Self::identity();
        }
        let scale = (tw / sw).min(th / sh);
        Self {
            scale,
            offset_x: (tw - sw * scale) / 2.0,
            offset_y: (th - sh * scale) / 2.0,
        }
    }

    /// Map a rectangle already in inches.
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect {
            x: rect.x * self.scale + self.offset_x,
            y: rect.y * self.scale + self.offset_y,
            w: rect.w * self.scale,
            h: rect.h * self.scale,
        }
    }
}

pub fn px_to_in(px: f32) -> f32 {
    px / PX_PER_INCH
}

pub fn rect_px_to_in(rect: Rect) -> Rect {
    Rect {
        x: px_to_in(rect.x),
        y: px_to_in(rect.y),
        w: px_to_in(rect.w),
        h: px_to_in(rect.h),
    }
}

/// Keep a rectangle inside a `target` canvas of the same unit. An origin
/// off the canvas is moved to [`EDGE_MARGIN_IN`]; a box that only runs
/// past the far edge is shrunk instead. Sizes never drop below
/// [`MIN_SIZE_IN`].
pub fn clamp_to_canvas(rect: Rect, target: (f32, f32)) -> Rect {
    let (x, w) = clamp_axis(rect.x, rect.w, target.0);
    let (y, h) = clamp_axis(rect.y, rect.h, target.1);
    Rect { x, y, w, h }
}

fn clamp_axis(origin: f32, size: f32, extent: f32) -> (f32, f32) {
    let origin = if !origin.is_finite() || origin < 0.0 || origin > extent - MIN_SIZE_IN {
        EDGE_MARGIN_IN.min((extent - MIN_SIZE_IN).max(0.0))
    } else {
        origin
    };
    let size = if size.is_finite() { size } else { 0.0 };
    let size = size.min(extent - origin).max(MIN_SIZE_IN);
    (origin, size)
}

/// Corner radius as a fraction of the shorter side, at most 0.5.
pub fn radius_ratio(radius_px: f32, width_px: f32, height_px: f32) -> f32 {
    let shorter = px_to_in(width_px.min(height_px));
    if shorter <= 0.0 || radius_px <= 0.0 {
        return 0.0;
    }
    (px_to_in(radius_px) / shorter).min(0.5)
}

/// Pick the primitive for a box measured in source px.
pub fn decide_shape(width_px: f32, height_px: f32, radius_px: f32) -> ShapeKind {
    let ratio = radius_ratio(radius_px, width_px, height_px);
    if (width_px - height_px).abs() < SQUARE_TOLERANCE_PX && ratio >= ELLIPSE_RATIO {
        ShapeKind::Ellipse
    } else if ratio > 0.0 {
        ShapeKind::RoundRect {
            radius_ratio: (ratio / RADIUS_CORRECTION).min(MAX_RADIUS_RATIO),
        }
    } else {
        ShapeKind::Rect
    }
}

/// Rewrite every element's geometry from source px to clamped target
/// inches and record its shape. Runs once per document.
pub fn apply_to_document(document: &mut SlideDocument, transform: &Transform, target: (f32, f32)) {
    for slide in &mut document.slides {
        for element in &mut slide.elements {
            element.walk_mut(&mut |el| {
                let px = el.geometry;
                el.shape = decide_shape(px.w, px.h, el.style.border_radius_px);
                el.geometry = clamp_to_canvas(transform.apply(rect_px_to_in(px)), target);
            });
        }
    }
    log::debug!(
        "mapped {} slides with scale {:.4} offset ({:.3}, {:.3})",
        document.slides.len(),
        transform.scale,
        transform.offset_x,
        transform.offset_y
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementKind, Slide, Background};
    use crate::style::StyleRecord;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_fit_is_uniform_and_centered() {
        let t = Transform::fit((1280.0, 720.0), (10.0, 5.625));
        assert!(close(t.scale, 0.75));
        assert!(close(t.offset_x, 0.0) && close(t.offset_y, 0.0));

        // 4:3 target: width limits, vertical letterbox
        let t = Transform::fit((1280.0, 720.0), (10.0, 7.5));
        assert!(close(t.scale, 0.75));
        assert!(close(t.offset_y, (7.5 - 7.5 * 0.75) / 2.0));
        assert!(close(t.offset_x, 0.0));
    }

    #[test]
    fn test_identity_is_idempotent() {
        let id = Transform::identity();
        let rect = Rect::new(1.25, -0.5, 3.0, 2.0);
        assert_eq!(id.apply(rect), rect);
        assert_eq!(id.apply(id.apply(rect)), id.apply(rect));
    }

    #[test]
    fn test_clamp_keeps_everything_on_canvas() {
        let target = (10.0, 5.625);
        let cases = [
            Rect::new(-3.0, 1.0, 2.0, 1.0),
            Rect::new(9.0, 5.0, 4.0, 4.0),
            Rect::new(12.0, 7.0, 1.0, 1.0),
            Rect::new(0.0, 0.0, 0.0, 0.0),
            Rect::new(2.0, 2.0, 30.0, -1.0),
            Rect::new(f32::NAN, 1.0, 1.0, f32::INFINITY),
        ];
        for rect in cases {
            let out = clamp_to_canvas(rect, target);
            assert!(out.x >= 0.0 && out.y >= 0.0, "{rect:?} -> {out:?}");
            assert!(out.x + out.w <= target.0 + 1e-5, "{rect:?} -> {out:?}");
            assert!(out.y + out.h <= target.1 + 1e-5, "{rect:?} -> {out:?}");
            assert!(out.w >= MIN_SIZE_IN && out.h >= MIN_SIZE_IN);
        }
    }

    #[test]
    fn test_clamp_shrinks_rather_than_moves() {
        let out = clamp_to_canvas(Rect::new(9.0, 1.0, 4.0, 1.0), (10.0, 5.625));
        assert_eq!(out.x, 9.0);
        assert!(close(out.w, 1.0));

        let out = clamp_to_canvas(Rect::new(-1.0, 1.0, 2.0, 1.0), (10.0, 5.625));
        assert_eq!(out.x, EDGE_MARGIN_IN);
    }

    #[test]
    fn test_shape_decision() {
        assert_eq!(decide_shape(100.0, 100.0, 50.0), ShapeKind::Ellipse);
        assert_eq!(decide_shape(100.0, 101.5, 49.0), ShapeKind::Ellipse);
        assert!(matches!(decide_shape(100.0, 104.0, 50.0), ShapeKind::RoundRect { .. }));
        assert_eq!(decide_shape(100.0, 100.0, 0.0), ShapeKind::Rect);
        assert_eq!(decide_shape(200.0, 100.0, 50.0), ShapeKind::RoundRect { radius_ratio: MAX_RADIUS_RATIO });

        match decide_shape(100.0, 100.0, 12.0) {
            ShapeKind::RoundRect { radius_ratio } => assert!(close(radius_ratio, 0.12 / RADIUS_CORRECTION)),
            other => panic!("expected round rect, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_to_document_converts_children_too() {
        let mut parent = Element::new(
            ElementKind::Container,
            "div",
            Rect::new(0.0, 0.0, 1280.0, 720.0),
            StyleRecord::default(),
        );
        let mut style = StyleRecord::default();
        style.border_radius_px = 50.0;
        parent.children.push(Element::new(
            ElementKind::Shape,
            "div",
            Rect::new(96.0, 96.0, 100.0, 100.0),
            style,
        ));
        let mut doc = SlideDocument {
            slides: vec![Slide {
                title: "t".into(),
                background: Background::None,
                elements: vec![parent],
            }],
        };
        let target = (10.0, 5.625);
        let t = Transform::fit((1280.0, 720.0), target);
        apply_to_document(&mut doc, &t, target);

        let parent = &doc.slides[0].elements[0];
        assert!(close(parent.geometry.w, 10.0));
        let child = &parent.children[0];
        assert!(close(child.geometry.x, 0.75));
        assert_eq!(child.shape, ShapeKind::Ellipse);
        assert_eq!(child.style.font_size_pt, 18.0);
    }
}
