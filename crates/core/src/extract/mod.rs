//! Structural extraction: find the slides in a laid-out document and walk
//! each one into the normalized [`Element`] tree.
//!
//! Extraction never fails. A node it cannot place or classify degrades to
//! an estimated box or a generic element.

pub mod estimate;
pub mod icon;
pub mod script;

use crate::animation;
use crate::config::ConvertConfig;
use crate::css::properties::parse_length;
use crate::css::selector::{matches_element, parse_selector, Selectable, Selector};
use crate::dom::DocumentTree;
use crate::layout::LayoutNode;
use crate::model::{
    Background, Element, ElementKind, ListData, ListItem, Rect, Slide, SlideDocument, TableCell,
    TableData, TableRow,
};
use crate::style::{extract_url, parse_color, parse_gradient, StyleDefaults, StyleRecord};
use std::sync::LazyLock;

/// Slide containers, most specific first. The first selector with any
/// match decides the slides.
pub const SLIDE_SELECTORS: &[&str] = &[
    ".slide",
    ".slide-container",
    "[data-slide]",
    ".reveal .slides > section",
    ".page",
    ".pdf-page",
    ".carousel-item",
    ".swiper-slide",
];

static PARSED_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| SLIDE_SELECTORS.iter().filter_map(|s| parse_selector(s)).collect());

/// Never part of slide content.
const SKIP_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "script", "style", "noscript", "template", "br",
];

const TEXT_TAGS: &[&str] = &[
    "span", "a", "strong", "b", "em", "i", "u", "s", "small", "label", "code", "mark", "sub",
    "sup", "button", "time", "abbr", "cite", "q",
];

const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "nav", "aside", "figure", "form",
    "body",
];

/// Outermost nodes matching the first slide selector that matches anything.
/// Works on the raw DOM as well as on the laid-out tree.
pub fn find_slides<T: DocumentTree + Selectable>(root: &T) -> Vec<&T> {
    for (selector, source) in PARSED_SELECTORS.iter().zip(SLIDE_SELECTORS) {
        let mut found = Vec::new();
        collect_outermost(root, selector, &mut Vec::new(), &mut found);
        if !found.is_empty() {
            log::debug!("{} slides matched `{source}`", found.len());
            return found;
        }
    }
    Vec::new()
}

fn collect_outermost<'a, T: DocumentTree + Selectable>(
    node: &'a T,
    selector: &Selector,
    ancestors: &mut Vec<&'a T>,
    out: &mut Vec<&'a T>,
) {
    if node.element_tag().is_none() {
        for child in node.child_nodes() {
            collect_outermost(child, selector, ancestors, out);
        }
        return;
    }
    if matches_element(selector, node, ancestors) {
        out.push(node);
        return;
    }
    ancestors.push(node);
    for child in node.child_nodes() {
        collect_outermost(child, selector, ancestors, out);
    }
    ancestors.pop();
}

fn find_tag<'a>(node: &'a LayoutNode, tag: &str) -> Option<&'a LayoutNode> {
    if node.is_element() && node.tag == tag {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_tag(c, tag))
}

/// Extract every slide of a laid-out document.
pub fn extract_document(root: &LayoutNode, config: &ConvertConfig) -> SlideDocument {
    Extractor::new(config).extract(root)
}

pub struct Extractor<'a> {
    config: &'a ConvertConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a ConvertConfig) -> Self {
        Self { config }
    }

    fn defaults(&self) -> StyleDefaults<'a> {
        StyleDefaults {
            font_face: &self.config.default_font_face,
            font_size_pt: self.config.default_font_size,
        }
    }

    pub fn extract(&self, root: &LayoutNode) -> SlideDocument {
        let body = find_tag(root, "body");
        let page_background = [body, find_tag(root, "html")]
            .into_iter()
            .flatten()
            .map(background_of)
            .find(|b| *b != Background::None)
            .unwrap_or_default();

        let containers = find_slides(root);
        let slides = if containers.is_empty() {
            log::debug!("no slide containers, using the whole body as one slide");
            let node = body.unwrap_or(root);
            vec![self.slide(node, 0, (0.0, 0.0), &page_background)]
        } else {
            containers
                .iter()
                .enumerate()
                .map(|(i, node)| {
                    let origin = node.bounds.map(|b| (b.x, b.y)).unwrap_or((0.0, 0.0));
                    self.slide(node, i, origin, &page_background)
                })
                .collect()
        };
        SlideDocument { slides }
    }

    fn slide(
        &self,
        node: &LayoutNode,
        index: usize,
        origin: (f32, f32),
        page_background: &Background,
    ) -> Slide {
        let background = match background_of(node) {
            Background::None => page_background.clone(),
            own => own,
        };
        let frame = Rect::new(
            0.0,
            0.0,
            node.bounds.map(|b| b.width).unwrap_or(self.config.viewport_width),
            node.bounds.map(|b| b.height).unwrap_or(self.config.viewport_height),
        );
        let mut elements = Vec::new();
        if !node.own_text().is_empty() {
            elements.push(self.loose_text(node, origin, frame));
        }
        elements.extend(self.children(node, origin, frame));
        Slide {
            title: slide_title(node, index),
            background,
            elements,
        }
    }

    /// Text sitting directly in a slide container, outside any element.
    fn loose_text(&self, node: &LayoutNode, origin: (f32, f32), frame: Rect) -> Element {
        let text = node.own_text();
        let mut style = StyleRecord::capture(&node.computed, frame.w.min(frame.h), self.defaults());
        let font_px = node.computed.font_size_px();
        let (w, h) = estimate::estimate_text_box(&text, font_px, &self.config.estimation);
        let (x, y) = node
            .bounds
            .map(|b| (b.x - origin.0, b.y - origin.1))
            .unwrap_or((0.0, 0.0));
        style.background = None;
        style.gradient = None;
        style.background_image = None;
        style.border = None;
        style.edge_borders.clear();
        style.shadow = None;
        let mut el = Element::new(ElementKind::Text, &node.tag, Rect::new(x, y, w, h), style);
        el.text = text;
        el
    }

    fn children(&self, node: &LayoutNode, origin: (f32, f32), parent: Rect) -> Vec<Element> {
        node.children
            .iter()
            .filter(|c| c.is_element())
            .filter_map(|c| self.element(c, origin, parent))
            .collect()
    }

    fn element(&self, node: &LayoutNode, origin: (f32, f32), parent: Rect) -> Option<Element> {
        if SKIP_TAGS.contains(&node.tag.as_str()) || is_hidden(node) {
            return None;
        }

        if let Some(icon) = icon::classify(node) {
            let geometry = self.geometry(node, origin, parent, "");
            let style = StyleRecord::capture(&node.computed, geometry.w.min(geometry.h), self.defaults());
            let mut el = Element::new(ElementKind::Icon(icon), &node.tag, geometry, style);
            self.attach_animation(&mut el);
            return Some(el);
        }

        let tag = node.tag.as_str();
        let (kind, text) = match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse().unwrap_or(1);
                (ElementKind::Heading { level }, inline_text(node))
            }
            "p" | "blockquote" | "pre" | "figcaption" => (ElementKind::Paragraph, inline_text(node)),
            "img" => {
                let src = node.get_attr("src").unwrap_or("").trim().to_string();
                if src.is_empty() {
                    log::debug!("skipping <img> without src");
                    return None;
                }
                let alt = node.get_attr("alt").unwrap_or("").to_string();
                (ElementKind::Image { src, alt }, String::new())
            }
            "table" => (ElementKind::Table(self.table(node)), String::new()),
            "ul" | "ol" => (ElementKind::List(list(node)), String::new()),
            "svg" => {
                let markup = node.markup.clone().unwrap_or_default();
                (ElementKind::VectorGraphic { markup }, String::new())
            }
            _ if TEXT_TAGS.contains(&tag) => (ElementKind::Text, inline_text(node)),
            _ if CONTAINER_TAGS.contains(&tag) => (ElementKind::Container, node.own_text()),
            _ => (ElementKind::Generic, node.own_text()),
        };

        let geometry = self.geometry(node, origin, parent, &text);
        let style = StyleRecord::capture(&node.computed, geometry.w.min(geometry.h), self.defaults());
        let is_text_leaf = matches!(
            kind,
            ElementKind::Heading { .. } | ElementKind::Paragraph | ElementKind::Text
        );
        let opaque = matches!(
            kind,
            ElementKind::Image { .. }
                | ElementKind::Table(_)
                | ElementKind::List(_)
                | ElementKind::VectorGraphic { .. }
        );
        let children = if is_text_leaf {
            self.inline_media(node, origin, geometry)
        } else if opaque {
            Vec::new()
        } else {
            self.children(node, origin, geometry)
        };

        let kind = match kind {
            ElementKind::Container
                if children.is_empty() && text.is_empty() && style.has_box_decoration() =>
            {
                ElementKind::Shape
            }
            other => other,
        };

        let mut el = Element::new(kind, tag, geometry, style);
        el.text = text;
        el.children = children;
        self.attach_animation(&mut el);
        Some(el)
    }

    fn attach_animation(&self, el: &mut Element) {
        if self.config.preserve_animations {
            el.animation = animation::resolve(&el.style);
        }
    }

    /// Icons, images and SVGs nested inside a text element. Their text is
    /// already excluded from the parent's.
    fn inline_media(&self, node: &LayoutNode, origin: (f32, f32), parent: Rect) -> Vec<Element> {
        let mut out = Vec::new();
        for child in node.children.iter().filter(|c| c.is_element()) {
            if is_hidden(child) {
                continue;
            }
            if is_media(child) {
                out.extend(self.element(child, origin, parent));
            } else {
                out.extend(self.inline_media(child, origin, parent));
            }
        }
        out
    }

    /// Bounding box relative to the slide origin. Falls back to explicit
    /// `width`/`height`, then to a text estimate, then to a box one font
    /// size wide at the parent's origin.
    fn geometry(&self, node: &LayoutNode, origin: (f32, f32), parent: Rect, text: &str) -> Rect {
        if let Some(b) = node.bounds.filter(|b| !b.is_empty()) {
            return Rect::new(b.x - origin.0, b.y - origin.1, b.width, b.height);
        }
        let font_px = node.computed.font_size_px();
        let (x, y) = node
            .bounds
            .map(|b| (b.x - origin.0, b.y - origin.1))
            .unwrap_or((parent.x, parent.y));
        let width = node.style("width").and_then(|v| parse_length(v, font_px)).filter(|v| *v > 0.0);
        let height = node.style("height").and_then(|v| parse_length(v, font_px)).filter(|v| *v > 0.0);
        if let (Some(w), Some(h)) = (width, height) {
            return Rect::new(x, y, w, h);
        }

        let (est_w, est_h) = if text.is_empty() {
            (font_px, font_px * self.config.estimation.line_height)
        } else {
            estimate::estimate_text_box(text, font_px, &self.config.estimation)
        };
        log::debug!("estimated <{}> at {est_w:.0}x{est_h:.0}px", node.tag);
        Rect::new(x, y, width.unwrap_or(est_w), height.unwrap_or(est_h))
    }

    fn table(&self, node: &LayoutNode) -> TableData {
        let mut rows = Vec::new();
        for child in node.children.iter().filter(|c| c.is_element()) {
            match child.tag.as_str() {
                "tr" => rows.push(self.table_row(child, false)),
                "thead" | "tbody" | "tfoot" => {
                    let header = child.tag == "thead";
                    rows.extend(
                        child
                            .children
                            .iter()
                            .filter(|r| r.is_element() && r.tag == "tr")
                            .map(|r| self.table_row(r, header)),
                    );
                }
                _ => {}
            }
        }
        TableData { rows }
    }

    fn table_row(&self, row: &LayoutNode, header: bool) -> TableRow {
        let cells = row
            .children
            .iter()
            .filter(|c| c.is_element() && matches!(c.tag.as_str(), "td" | "th"))
            .map(|cell| {
                let shorter = cell.bounds.map(|b| b.width.min(b.height)).unwrap_or(0.0);
                TableCell {
                    text: inline_text(cell),
                    colspan: span(cell.get_attr("colspan")),
                    rowspan: span(cell.get_attr("rowspan")),
                    header: header || cell.tag == "th",
                    style: StyleRecord::capture(&cell.computed, shorter, self.defaults()),
                }
            })
            .collect();
        TableRow { cells }
    }
}

fn span(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

fn list(node: &LayoutNode) -> ListData {
    let items = node
        .children
        .iter()
        .filter(|c| c.is_element() && c.tag == "li" && !is_hidden(c))
        .map(|li| ListItem {
            text: li.text_content_except(&|n: &LayoutNode| {
                matches!(n.tag.as_str(), "ul" | "ol") || icon::classify(n).is_some()
            }),
            nested: li
                .children
                .iter()
                .find(|c| c.is_element() && matches!(c.tag.as_str(), "ul" | "ol"))
                .map(list),
        })
        .collect();
    ListData {
        ordered: node.tag == "ol",
        items,
    }
}

/// All text of a text element, minus icon glyph names and SVG text.
fn inline_text(node: &LayoutNode) -> String {
    node.text_content_except(&is_media)
}

fn is_media(node: &LayoutNode) -> bool {
    matches!(node.tag.as_str(), "img" | "svg") || icon::classify(node).is_some()
}

fn is_hidden(node: &LayoutNode) -> bool {
    node.style("display") == Some("none") || node.style("visibility") == Some("hidden")
}

fn slide_title(node: &LayoutNode, index: usize) -> String {
    fn first_heading(node: &LayoutNode) -> Option<String> {
        if node.is_element() && matches!(node.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            let text = inline_text(node);
            if !text.is_empty() {
                return Some(text);
            }
        }
        node.children.iter().find_map(first_heading)
    }
    fn titled_class(node: &LayoutNode) -> Option<String> {
        if node.is_element() && node.classes().any(|c| c.to_lowercase().contains("title")) {
            let text = inline_text(node);
            if !text.is_empty() {
                return Some(text);
            }
        }
        node.children.iter().find_map(titled_class)
    }
    first_heading(node)
        .or_else(|| titled_class(node))
        .unwrap_or_else(|| format!("Slide {}", index + 1))
}

/// Background painted by one node, gradient first.
fn background_of(node: &LayoutNode) -> Background {
    let image = node.style("background-image").filter(|v| *v != "none");
    if let Some(spec) = image.and_then(parse_gradient) {
        return Background::Gradient { spec, raster: None };
    }
    if let Some(src) = image.and_then(extract_url) {
        return Background::Image { src };
    }
    match node.style("background-color").and_then(parse_color) {
        Some(color) => Background::SolidColor { color },
        None => Background::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IconGlyph;
    use crate::render::LayoutEngine;
    use pretty_assertions::assert_eq;

    fn extract(html: &str) -> SlideDocument {
        let root = LayoutEngine::default().render(html).unwrap();
        extract_document(&root, &ConvertConfig::default())
    }

    fn all_elements(doc: &SlideDocument) -> Vec<&Element> {
        fn walk<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
            out.push(el);
            for c in &el.children {
                walk(c, out);
            }
        }
        let mut out = Vec::new();
        for slide in &doc.slides {
            for el in &slide.elements {
                walk(el, &mut out);
            }
        }
        out
    }

    #[test]
    fn test_segmentation_priority_and_order() {
        let doc = extract(
            r#"<div class="page"><div class="slide"><h1>A</h1></div>
               <div class="slide"><h2>B</h2></div></div>
               <div class="page"><div class="slide"><p class="title">C</p></div></div>"#,
        );
        let titles: Vec<&str> = doc.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_outermost_matches_only() {
        let doc = extract(
            r#"<section data-slide="1"><div data-slide="inner"><p>x</p></div></section>
               <section data-slide="2"></section>"#,
        );
        assert_eq!(doc.slides.len(), 2);
        assert_eq!(doc.slides[1].title, "Slide 2");
    }

    #[test]
    fn test_body_fallback() {
        let doc = extract("<body style='background:#123456'><h1>Only</h1><p>text</p></body>");
        assert_eq!(doc.slides.len(), 1);
        assert_eq!(doc.slides[0].title, "Only");
        assert_eq!(
            doc.slides[0].background,
            Background::SolidColor { color: "123456".into() }
        );
    }

    #[test]
    fn test_classification() {
        let doc = extract(
            r#"<div class="slide">
                 <h2>Head</h2>
                 <p>Para <b>bold</b></p>
                 <img src="a.png" alt="A">
                 <img>
                 <ul><li>One</li><li>Two<ol><li>Inner</li></ol></li></ul>
                 <table><thead><tr><th colspan="2">H</th></tr></thead>
                        <tbody><tr><td>a</td><td rowspan="2">b</td></tr></tbody></table>
                 <svg width="10" height="10"><circle r="5"/></svg>
                 <div style="width:50px;height:50px;background:red"></div>
               </div>"#,
        );
        let els = &doc.slides[0].elements;
        assert!(matches!(els[0].kind, ElementKind::Heading { level: 2 }));
        assert_eq!(els[1].kind, ElementKind::Paragraph);
        assert_eq!(els[1].text, "Para bold");
        assert_eq!(
            els[2].kind,
            ElementKind::Image { src: "a.png".into(), alt: "A".into() }
        );
        match &els[3].kind {
            ElementKind::List(list) => {
                assert!(!list.ordered);
                assert_eq!(list.items[1].text, "Two");
                assert_eq!(list.items[1].nested.as_ref().unwrap().items[0].text, "Inner");
            }
            other => panic!("expected list, got {other:?}"),
        }
        match &els[4].kind {
            ElementKind::Table(table) => {
                assert_eq!(table.rows.len(), 2);
                assert!(table.rows[0].cells[0].header);
                assert_eq!(table.rows[0].cells[0].colspan, 2);
                assert_eq!(table.rows[1].cells[1].rowspan, 2);
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert!(matches!(&els[5].kind, ElementKind::VectorGraphic { markup } if markup.contains("<circle")));
        assert_eq!(els[6].kind, ElementKind::Shape);
    }

    #[test]
    fn test_icon_text_is_blanked() {
        let doc = extract(
            r#"<div class="slide"><h2><span class="material-icons">rocket_launch</span> Launch</h2>
               <span class="material-icons">home</span></div>"#,
        );
        let els = all_elements(&doc);
        let heading = els.iter().find(|e| matches!(e.kind, ElementKind::Heading { .. })).unwrap();
        assert_eq!(heading.text, "Launch");
        let icons: Vec<_> = els.iter().filter(|e| e.is_icon()).collect();
        assert_eq!(icons.len(), 2);
        for icon in icons {
            assert!(icon.text.is_empty());
            match &icon.kind {
                ElementKind::Icon(data) => {
                    assert!(matches!(data.glyph, IconGlyph::Font { .. }));
                    assert!(!data.name.is_empty());
                }
                _ => unreachable!(),
            }
        }
        assert!(els.iter().all(|e| !e.text.contains("home") && !e.text.contains("rocket")));
    }

    #[test]
    fn test_geometry_is_slide_relative() {
        let doc = extract(
            r#"<body style="margin:0">
               <div class="slide" style="height:720px"><div style="width:100px;height:40px;background:#eee"></div></div>
               <div class="slide" style="height:720px"><div style="width:100px;height:40px;background:#eee"></div></div>
               </body>"#,
        );
        let second = &doc.slides[1].elements[0];
        assert_eq!(second.geometry.y, 0.0);
        assert_eq!(second.geometry.w, 100.0);
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let doc = extract(
            r#"<div class="slide"><p style="display:none">gone</p><p style="visibility:hidden">gone</p><p>kept</p></div>"#,
        );
        assert_eq!(doc.slides[0].elements.len(), 1);
        assert_eq!(doc.slides[0].elements[0].text, "kept");
    }

    #[test]
    fn test_animations_follow_config() {
        let html = r#"<div class="slide"><h1 style="animation: fadeInUp 1s">Hi</h1></div>"#;
        let root = LayoutEngine::default().render(html).unwrap();
        let doc = extract_document(&root, &ConvertConfig::default());
        assert!(doc.slides[0].elements[0].animation.is_some());

        let config = ConvertConfig {
            preserve_animations: false,
            ..ConvertConfig::default()
        };
        let doc = extract_document(&root, &config);
        assert!(doc.slides[0].elements[0].animation.is_none());
    }
}
