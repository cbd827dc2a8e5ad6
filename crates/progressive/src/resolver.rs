//! Selector resolution: pick the cheapest lookup the selector's syntax
//! allows.
//!
//! Characters outside `[A-Za-z0-9-]` decide the strategy:
//!
//! - none: a bare tag name (`div`)
//! - exactly one, a leading `.`: a single class (`.note`)
//! - exactly one, a leading `#`: an id (`#widget`)
//! - anything else: a generic selector query

use crate::host::ElementLookup;

/// How a selector will be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorKind<'a> {
    Empty,
    Tag(&'a str),
    Class(&'a str),
    Id(&'a str),
    Query(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Classify `selector` without touching the document.
pub fn classify(selector: &str) -> SelectorKind<'_> {
    if selector.is_empty() {
        return SelectorKind::Empty;
    }
    let mut special = selector.char_indices().filter(|&(_, c)| !is_name_char(c));
    match (special.next(), special.next()) {
        (None, _) => SelectorKind::Tag(selector),
        (Some((0, '.')), None) if selector.len() > 1 => SelectorKind::Class(&selector[1..]),
        (Some((0, '#')), None) if selector.len() > 1 => SelectorKind::Id(&selector[1..]),
        _ => SelectorKind::Query(selector),
    }
}

/// Resolve `selector` against the live document. Never fails: empty or
/// malformed selectors resolve to nothing.
pub fn resolve<L: ElementLookup + ?Sized>(lookup: &L, selector: &str) -> Vec<L::Element> {
    match classify(selector) {
        SelectorKind::Empty => Vec::new(),
        SelectorKind::Tag(tag) => lookup.elements_by_tag(tag),
        SelectorKind::Class(class) => lookup
            .elements_by_class(class)
            .unwrap_or_else(|| lookup.query(selector)),
        SelectorKind::Id(id) => lookup.element_by_id(id).into_iter().collect(),
        SelectorKind::Query(query) => lookup.query(query),
    }
}
