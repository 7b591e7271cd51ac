//! Size estimates for text the rendering engine did not measure.

use crate::config::TextEstimation;

/// CJK ideographs, kana, hangul and full-width forms take a full em.
pub fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
    )
}

/// `(width, height)` in px of `text` set at `font_px`.
pub fn estimate_text_box(text: &str, font_px: f32, params: &TextEstimation) -> (f32, f32) {
    let font_px = if font_px > 0.0 { font_px } else { 16.0 };
    let max_width = params.max_width_px.max(font_px);
    let line_box = font_px * params.line_height;

    let mut widest: f32 = 0.0;
    let mut lines = 0u32;
    for line in text.lines() {
        let em: f32 = line
            .trim()
            .chars()
            .map(|c| if is_wide(c) { params.wide_char_width } else { params.char_width })
            .sum();
        let width = em * font_px;
        lines += (width / max_width).ceil().max(1.0) as u32;
        widest = widest.max(width.min(max_width));
    }
    if lines == 0 {
        return (0.0, 0.0);
    }
    (widest, lines as f32 * line_box)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_single_line() {
        let params = TextEstimation::default();
        let (w, h) = estimate_text_box("Hello", 20.0, &params);
        assert!((w - 5.0 * 0.55 * 20.0).abs() < 1e-3);
        assert!((h - 24.0).abs() < 1e-3);
    }

    #[test]
    fn test_cjk_counts_double() {
        let params = TextEstimation::default();
        let (latin, _) = estimate_text_box("ab", 20.0, &params);
        let (cjk, _) = estimate_text_box("你好", 20.0, &params);
        assert!(cjk > latin * 1.5);
    }

    #[test]
    fn test_long_text_wraps_at_ceiling() {
        let params = TextEstimation::default();
        let text = "x".repeat(500);
        let (w, h) = estimate_text_box(&text, 20.0, &params);
        assert_eq!(w, params.max_width_px);
        // 500 * 0.55 * 20 = 5500px → 5 lines
        assert!((h - 5.0 * 24.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(estimate_text_box("", 16.0, &TextEstimation::default()), (0.0, 0.0));
    }
}
