use crate::error::{Error, Result};
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever::serialize::TraversalScope;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::collections::HashMap;

/// A node in our DOM tree. Minimal: only what styling, layout and
/// slide extraction need.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    /// Serialized outer markup, kept for `<svg>` roots only.
    pub markup: Option<String>,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    Element,
    Text,
    Document,
}

/// Elements whose raw text is kept verbatim instead of parsed as children.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// The shape shared by the parsed DOM and the trees derived from it, so
/// block collection and slide matching work on any of them.
pub trait DocumentTree: Sized {
    /// Tag name, for element nodes only.
    fn element_tag(&self) -> Option<&str>;
    /// Verbatim text held by the node (the body of `<style>`/`<script>`).
    fn raw_text(&self) -> &str;
    fn child_nodes(&self) -> &[Self];

    /// Raw contents of every `<tag>` element in document order.
    fn raw_text_blocks(&self, tag: &str) -> Vec<String> {
        let mut blocks = Vec::new();
        collect_raw_blocks(self, tag, &mut blocks);
        blocks
    }
}

fn collect_raw_blocks<T: DocumentTree>(node: &T, tag: &str, out: &mut Vec<String>) {
    if node.element_tag() == Some(tag) {
        out.push(node.raw_text().to_string());
        return;
    }
    for child in node.child_nodes() {
        collect_raw_blocks(child, tag, out);
    }
}

impl DomNode {
    pub fn new_element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: HashMap::new(),
            text: String::new(),
            markup: None,
            children: Vec::new(),
            node_type: NodeType::Element,
        }
    }

    pub fn new_text(text: &str) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: text.to_string(),
            markup: None,
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    pub fn new_document() -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: String::new(),
            markup: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Get the visible text content of this node and all children.
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::Text => {
                let trimmed = self.text.trim();
                if !trimmed.is_empty() {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(trimmed);
                }
            }
            _ => {
                if RAW_TEXT_TAGS.contains(&self.tag.as_str()) {
                    return;
                }
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl DocumentTree for DomNode {
    fn element_tag(&self) -> Option<&str> {
        (self.node_type == NodeType::Element).then_some(self.tag.as_str())
    }

    fn raw_text(&self) -> &str {
        &self.text
    }

    fn child_nodes(&self) -> &[DomNode] {
        &self.children
    }
}

/// Parse an HTML string into a DomNode tree.
pub fn parse_html(html: &str) -> Result<DomNode> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::CollaboratorUnavailable(format!("failed to parse HTML: {e}")))?;

    Ok(convert_node(&dom.document))
}

fn convert_node(handle: &Handle) -> DomNode {
    match &handle.data {
        NodeData::Document => {
            let mut doc = DomNode::new_document();
            for child in handle.children.borrow().iter() {
                doc.children.push(convert_node(child));
            }
            doc
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string();
            let mut node = DomNode::new_element(&tag);
            for attr in attrs.borrow().iter() {
                node.attributes
                    .insert(attr.name.local.to_string(), attr.value.to_string());
            }

            // Script and style bodies are kept as one raw string
            if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                for child in handle.children.borrow().iter() {
                    if let NodeData::Text { contents } = &child.data {
                        node.text.push_str(&contents.borrow());
                    }
                }
                return node;
            }

            if tag == "svg" {
                node.markup = serialize_outer(handle);
            }

            for child in handle.children.borrow().iter() {
                let child_node = convert_node(child);
                // Skip empty text nodes and ignored node kinds
                if child_node.node_type == NodeType::Text && child_node.text.trim().is_empty() {
                    continue;
                }
                if child_node.node_type == NodeType::Document {
                    continue;
                }
                node.children.push(child_node);
            }
            node
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            DomNode::new_text(&text)
        }
        _ => DomNode::new_document(), // Comments, PIs, doctypes → ignored
    }
}

fn serialize_outer(handle: &Handle) -> Option<String> {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable: SerializableHandle = handle.clone().into();
    serialize(&mut bytes, &serializable, opts).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_markup_is_serialized() {
        let dom = parse_html(
            r#"<html><body><svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg></body></html>"#,
        )
        .unwrap();
        let html = &dom.children[0];
        let body = html.children.iter().find(|c| c.tag == "body").unwrap();
        let svg = &body.children[0];
        let markup = svg.markup.as_deref().unwrap();
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains("viewBox"));
        assert!(markup.contains("<path"));
        assert_eq!(svg.children[0].tag, "path");
    }

    #[test]
    fn test_style_and_script_raw_text() {
        let dom = parse_html(
            "<html><head><style>.a { color: red; }</style></head>\
             <body><script>var slides = ['<p>x</p>'];</script><p>Hi</p></body></html>",
        )
        .unwrap();
        assert_eq!(dom.raw_text_blocks("style"), vec![".a { color: red; }".to_string()]);
        assert_eq!(dom.raw_text_blocks("script").len(), 1);
        assert_eq!(dom.text_content(), "Hi");
    }
}
