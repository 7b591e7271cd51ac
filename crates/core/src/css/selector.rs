/// Minimal CSS selector matching engine.
/// Supports: tag, .class, #id, [attr] / [attr=value], `:root`,
/// combinators (descendant, child), comma-separated selectors,
/// and specificity ordering.

/// Anything selectors can be matched against.
pub trait Selectable {
    fn tag_name(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }
}

/// A parsed CSS rule: selector + declarations.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector>,
    pub declarations: String, // raw "property: value; ..." string
    pub specificity: u32,
}

/// A single selector (one part of a comma-separated list).
#[derive(Debug, Clone)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
    pub specificity: u32,
}

/// A component of a selector chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    /// Matches a tag name: `div`, `section`, etc.
    Tag(String),
    /// Matches a class: `.foo`
    Class(String),
    /// Matches an ID: `#bar`
    Id(String),
    /// Matches an attribute: `[data-slide]`, `[type="submit"]`
    Attribute(String, Option<String>),
    /// Descendant combinator (space)
    Descendant,
    /// Child combinator (>)
    Child,
    /// Universal selector (*)
    Universal,
    /// Pseudo-class; only `:root` is honoured, dynamic states never match
    PseudoClass(String),
    /// Pseudo-element (`::before`); never matches a real element
    PseudoElement(String),
}

/// Pseudo-classes describing interaction state, which a static render never has.
const DYNAMIC_PSEUDO: &[&str] = &["hover", "focus", "active", "visited", "focus-within", "focus-visible", "target"];

/// Parse a CSS stylesheet string into rules. `@media` and other at-rules
/// are skipped wholesale.
pub fn parse_stylesheet(css: &str) -> Vec<CssRule> {
    let mut rules = Vec::new();
    let css = strip_comments(css);

    // Simple state machine: find selector { declarations }
    let mut chars = css.chars().peekable();
    let mut current = String::new();

    while let Some(&ch) = chars.peek() {
        match ch {
            '{' => {
                chars.next();
                let selector_str = current.trim().to_string();
                current.clear();

                // Read until closing brace
                let mut depth = 1;
                let mut declarations = String::new();
                while let Some(&c) = chars.peek() {
                    chars.next();
                    if c == '{' {
                        depth += 1;
                    } else if c == '}' {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    declarations.push(c);
                }

                if !selector_str.is_empty() && !selector_str.starts_with('@') {
                    for selector in parse_selector_list(&selector_str) {
                        rules.push(CssRule {
                            specificity: selector.specificity,
                            selectors: vec![selector],
                            declarations: declarations.trim().to_string(),
                        });
                    }
                }
            }
            ';' if current.trim_start().starts_with('@') => {
                // Statement at-rules: @import, @charset
                chars.next();
                current.clear();
            }
            _ => {
                current.push(ch);
                chars.next();
            }
        }
    }

    rules
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(input: &str) -> Vec<Selector> {
    input
        .split(',')
        .filter_map(|s| parse_selector(s.trim()))
        .collect()
}

fn strip_comments(css: &str) -> String {
    let mut result = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c == '/' {
            chars.next();
            if chars.peek() == Some(&'*') {
                chars.next();
                // Skip until */
                loop {
                    match chars.next() {
                        Some('*') if chars.peek() == Some(&'/') => {
                            chars.next();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
            } else {
                result.push('/');
            }
        } else {
            result.push(c);
            chars.next();
        }
    }
    result
}

/// Parse a single selector string into a Selector.
pub fn parse_selector(input: &str) -> Option<Selector> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut specificity: u32 = 0;
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '.' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                let class_name = read_ident(&mut chars);
                if !class_name.is_empty() {
                    parts.push(SelectorPart::Class(class_name));
                    specificity += 10; // class = 10
                }
            }
            '#' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                let id_name = read_ident(&mut chars);
                if !id_name.is_empty() {
                    parts.push(SelectorPart::Id(id_name));
                    specificity += 100; // id = 100
                }
            }
            '[' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                let mut attr = String::new();
                let mut value = None;
                while let Some(&c) = chars.peek() {
                    if c == ']' {
                        chars.next();
                        break;
                    }
                    if c == '=' {
                        chars.next();
                        let mut val = String::new();
                        // Optional quotes
                        let quote = chars.peek().copied().filter(|q| *q == '"' || *q == '\'');
                        if let Some(q) = quote {
                            chars.next();
                            for vc in chars.by_ref() {
                                if vc == q {
                                    break;
                                }
                                val.push(vc);
                            }
                        } else {
                            while let Some(&vc) = chars.peek() {
                                if vc == ']' {
                                    break;
                                }
                                val.push(vc);
                                chars.next();
                            }
                        }
                        value = Some(val);
                    } else {
                        attr.push(c);
                        chars.next();
                    }
                }
                parts.push(SelectorPart::Attribute(attr.trim().to_string(), value));
                specificity += 10;
            }
            ':' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                let is_element = chars.peek() == Some(&':');
                if is_element {
                    chars.next();
                }
                let pseudo = read_ident(&mut chars).to_lowercase();
                // Skip function arguments like :not(...)
                if chars.peek() == Some(&'(') {
                    chars.next();
                    let mut depth = 1;
                    for c in chars.by_ref() {
                        if c == '(' {
                            depth += 1;
                        } else if c == ')' {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                    }
                }
                if is_element || pseudo == "before" || pseudo == "after" {
                    parts.push(SelectorPart::PseudoElement(pseudo));
                    specificity += 1;
                } else {
                    parts.push(SelectorPart::PseudoClass(pseudo));
                    specificity += 10;
                }
            }
            '>' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                skip_whitespace(&mut chars);
                parts.push(SelectorPart::Child);
            }
            ' ' | '\t' | '\n' | '\r' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                skip_whitespace(&mut chars);
                if let Some(&next) = chars.peek() {
                    if next != '>' && next != '+' && next != '~' && next != '{' && next != ',' {
                        parts.push(SelectorPart::Descendant);
                    }
                }
            }
            '*' => {
                flush_tag(&mut current, &mut parts, &mut specificity);
                chars.next();
                parts.push(SelectorPart::Universal);
            }
            _ => {
                current.push(ch);
                chars.next();
            }
        }
    }

    flush_tag(&mut current, &mut parts, &mut specificity);

    if parts.is_empty() {
        None
    } else {
        Some(Selector { parts, specificity })
    }
}

fn flush_tag(current: &mut String, parts: &mut Vec<SelectorPart>, specificity: &mut u32) {
    let tag = current.trim().to_string();
    if !tag.is_empty() {
        parts.push(SelectorPart::Tag(tag.to_lowercase()));
        *specificity += 1; // tag = 1
        current.clear();
    }
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars>) {
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

/// Check if a selector matches an element, given its ancestry
/// (root first, direct parent last).
pub fn matches_element<T: Selectable>(selector: &Selector, element: &T, ancestors: &[&T]) -> bool {
    let parts = &selector.parts;
    if parts.is_empty() {
        return false;
    }

    // Split into compound segments; each carries the combinator that
    // links it to the segment on its right
    let mut segments: Vec<(Vec<&SelectorPart>, Option<&SelectorPart>)> = Vec::new();
    let mut current_segment: Vec<&SelectorPart> = Vec::new();

    for part in parts {
        match part {
            SelectorPart::Descendant | SelectorPart::Child => {
                if !current_segment.is_empty() {
                    segments.push((current_segment, Some(part)));
                    current_segment = Vec::new();
                }
            }
            _ => current_segment.push(part),
        }
    }
    if !current_segment.is_empty() {
        segments.push((current_segment, None));
    }

    let Some((last_segment, _)) = segments.last() else {
        return false;
    };
    if !segment_matches(last_segment, element) {
        return false;
    }
    if segments.len() == 1 {
        return true;
    }

    // Walk ancestors for the remaining segments (right to left)
    let mut seg_idx = segments.len() - 2;
    let mut anc_idx = ancestors.len();

    loop {
        let (segment, combinator) = &segments[seg_idx];
        let is_child = matches!(combinator, Some(SelectorPart::Child));

        let mut found = false;
        while anc_idx > 0 {
            anc_idx -= 1;
            if segment_matches(segment, ancestors[anc_idx]) {
                found = true;
                break;
            }
            if is_child {
                // Child combinator: must be the direct parent
                return false;
            }
        }

        if !found {
            return false;
        }
        if seg_idx == 0 {
            return true;
        }
        seg_idx -= 1;
    }
}

fn segment_matches<T: Selectable>(segment: &[&SelectorPart], element: &T) -> bool {
    segment.iter().all(|part| match part {
        SelectorPart::Tag(t) => t.eq_ignore_ascii_case(element.tag_name()),
        SelectorPart::Class(c) => element.has_class(c),
        SelectorPart::Id(i) => element.attr("id") == Some(i.as_str()),
        SelectorPart::Attribute(name, expected) => match expected {
            Some(val) => element.attr(name) == Some(val.as_str()),
            None => element.attr(name).is_some(),
        },
        SelectorPart::Universal => true,
        SelectorPart::PseudoClass(p) if p == "root" => element.tag_name() == "html",
        SelectorPart::PseudoClass(p) => !DYNAMIC_PSEUDO.contains(&p.as_str()),
        SelectorPart::PseudoElement(_) => false,
        SelectorPart::Descendant | SelectorPart::Child => true,
    })
}
