//! Slides that only exist inside a `<script>`: find an array literal bound
//! to a `slides`-like name and pull one markup string out of each entry.

use regex::Regex;
use std::sync::LazyLock;

static SLIDE_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?\b[\w$]*slide[\w$]*["']?\s*[:=]\s*\["#).unwrap()
});

/// Object keys whose string value is an entry's markup.
const MARKUP_KEYS: &[&str] = &["html", "content", "body", "markup", "template"];

/// Markup of each slide found in `scripts`, in array order. Empty when no
/// script declares a slide array with markup in it.
pub fn slide_markup(scripts: &[String]) -> Vec<String> {
    for script in scripts {
        for m in SLIDE_ARRAY_RE.find_iter(script) {
            let open = m.end() - 1;
            let Some(body) = bracket_body(script, open) else {
                continue;
            };
            let slides: Vec<String> = split_entries(body)
                .into_iter()
                .filter_map(entry_markup)
                .filter(|html| html.contains('<'))
                .collect();
            if !slides.is_empty() {
                log::debug!("found {} slides in a script array", slides.len());
                return slides;
            }
        }
    }
    Vec::new()
}

/// Wrap slide snapshots into a document that keeps the page's stylesheets.
pub fn rebuild_document(slides: &[String], stylesheets: &[String]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head>");
    for css in stylesheets {
        html.push_str("<style>");
        html.push_str(css);
        html.push_str("</style>");
    }
    html.push_str("</head><body>");
    for slide in slides {
        html.push_str("<div class=\"slide\">");
        html.push_str(slide);
        html.push_str("</div>");
    }
    html.push_str("</body></html>");
    html
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Code,
    Single,
    Double,
    Template,
    LineComment,
    BlockComment,
}

/// Walks JavaScript source one char at a time, tracking strings, template
/// literals (with nested `${}`), comments and bracket depth.
struct Scanner {
    mode: Mode,
    /// Brace depth at which each open `${` returns to its template.
    template_stack: Vec<u32>,
    depth: u32,
    brace_depth: u32,
    escaped: bool,
}

impl Scanner {
    fn new() -> Self {
        Self {
            mode: Mode::Code,
            template_stack: Vec::new(),
            depth: 0,
            brace_depth: 0,
            escaped: false,
        }
    }

    /// Feed one char (`next` is the one after it). Returns true when the
    /// char was structural code, not part of a string or comment.
    fn step(&mut self, c: char, next: Option<char>) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        match self.mode {
            Mode::Code => {
                match c {
                    '\'' => self.mode = Mode::Single,
                    '"' => self.mode = Mode::Double,
                    '`' => self.mode = Mode::Template,
                    '/' if next == Some('/') => self.mode = Mode::LineComment,
                    '/' if next == Some('*') => self.mode = Mode::BlockComment,
                    '[' | '(' => self.depth += 1,
                    ']' | ')' => self.depth = self.depth.saturating_sub(1),
                    '{' => {
                        self.depth += 1;
                        self.brace_depth += 1;
                    }
                    '}' => {
                        if self.template_stack.last() == Some(&self.brace_depth) {
                            self.template_stack.pop();
                            self.mode = Mode::Template;
                            return false;
                        }
                        self.depth = self.depth.saturating_sub(1);
                        self.brace_depth = self.brace_depth.saturating_sub(1);
                    }
                    _ => {}
                }
                self.mode == Mode::Code
            }
            Mode::Single | Mode::Double => {
                match (c, self.mode) {
                    ('\\', _) => self.escaped = true,
                    ('\'', Mode::Single) | ('"', Mode::Double) | ('\n', _) => self.mode = Mode::Code,
                    _ => {}
                }
                false
            }
            Mode::Template => {
                match c {
                    '\\' => self.escaped = true,
                    '`' => self.mode = Mode::Code,
                    '$' if next == Some('{') => {
                        self.template_stack.push(self.brace_depth);
                        self.escaped = true;
                        self.mode = Mode::Code;
                    }
                    _ => {}
                }
                false
            }
            Mode::LineComment => {
                if c == '\n' {
                    self.mode = Mode::Code;
                }
                false
            }
            Mode::BlockComment => {
                if c == '*' && next == Some('/') {
                    self.escaped = true;
                    self.mode = Mode::Code;
                }
                false
            }
        }
    }
}

/// Text between the `[` at byte `open` and its matching `]`.
fn bracket_body(src: &str, open: usize) -> Option<&str> {
    let mut scanner = Scanner::new();
    let mut chars = src[open..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        let structural = scanner.step(c, next);
        if structural && c == ']' && scanner.depth == 0 {
            return Some(&src[open + 1..open + i]);
        }
    }
    None
}

/// Top-level comma-separated entries of an array body.
fn split_entries(body: &str) -> Vec<&str> {
    let mut scanner = Scanner::new();
    let mut entries = Vec::new();
    let mut start = 0;
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        let structural = scanner.step(c, next);
        if structural && c == ',' && scanner.depth == 0 {
            entries.push(body[start..i].trim());
            start = i + 1;
        }
    }
    entries.push(body[start..].trim());
    entries.retain(|e| !e.is_empty());
    entries
}

/// Markup carried by one array entry: a string/template literal, or an
/// object with a markup-valued key.
fn entry_markup(entry: &str) -> Option<String> {
    let entry = strip_leading_comments(entry);
    if let Some(literal) = string_literal(entry) {
        return Some(literal);
    }
    let inner = entry.strip_prefix('{')?.strip_suffix('}')?;
    split_entries(inner).into_iter().find_map(|prop| {
        let (key, value) = prop.split_once(':')?;
        let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
        MARKUP_KEYS
            .contains(&key)
            .then(|| string_literal(value.trim()))
            .flatten()
    })
}

fn strip_leading_comments(mut entry: &str) -> &str {
    loop {
        entry = entry.trim_start();
        if let Some(rest) = entry.strip_prefix("/*") {
            entry = rest.split_once("*/").map(|(_, after)| after).unwrap_or("");
        } else if let Some(rest) = entry.strip_prefix("//") {
            entry = rest.split_once('\n').map(|(_, after)| after).unwrap_or("");
        } else {
            return entry.trim_end();
        }
    }
}

/// Unescaped contents of a quoted or backtick literal. `${}` placeholders
/// in templates are dropped.
fn string_literal(value: &str) -> Option<String> {
    let quote = value.chars().next()?;
    if !matches!(quote, '\'' | '"' | '`') || value.len() < 2 || !value.ends_with(quote) {
        return None;
    }
    let inner = &value[1..value.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            },
            '$' if quote == '`' && chars.peek() == Some(&'{') => {
                let mut depth = 0;
                for n in chars.by_ref() {
                    match n {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }
    Some(out)
}
