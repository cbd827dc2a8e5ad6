//! Selector matching: decide whether a DOM element matches a CSS selector.
//!
//! Complex selectors are matched **right-to-left**: we start with the rightmost
//! (subject) compound selector, then walk up/sideways through the DOM tree
//! following each combinator.

use css::{AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector};
use dom::{Dom, ElementData, NodeData, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Whether `node_id` matches any selector of a selector list.
pub fn matches_any(dom: &Dom, node_id: NodeId, selectors: &[ComplexSelector]) -> bool {
    selectors.iter().any(|s| matches_selector(dom, node_id, s))
}

/// Test whether the element `node_id` matches a full complex selector.
///
/// Returns `false` if `node_id` does not refer to an element.
pub fn matches_selector(dom: &Dom, node_id: NodeId, selector: &ComplexSelector) -> bool {
    let Some((subject, first_combinator)) = selector.parts.first() else {
        return false;
    };
    if !matches_compound(dom, node_id, subject) {
        return false;
    }

    let mut current = node_id;
    let mut combinator = *first_combinator;

    for (compound, next_combinator) in &selector.parts[1..] {
        let found = match combinator {
            Some(Combinator::Descendant) => {
                first_matching(dom, compound, current, parent_element)
            }
            Some(Combinator::Child) => {
                parent_element(dom, current).filter(|&p| matches_compound(dom, p, compound))
            }
            Some(Combinator::NextSibling) => {
                prev_sibling_element(dom, current).filter(|&s| matches_compound(dom, s, compound))
            }
            Some(Combinator::SubsequentSibling) => {
                first_matching(dom, compound, current, prev_sibling_element)
            }
            None => None,
        };
        match found {
            Some(next) => current = next,
            None => return false,
        }
        combinator = *next_combinator;
    }
    true
}

/// Test whether `node_id` matches a compound selector (all simples must match).
pub fn matches_compound(dom: &Dom, node_id: NodeId, compound: &CompoundSelector) -> bool {
    let Some(elem) = dom.element(node_id) else {
        return false;
    };
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(dom, node_id, elem, simple))
}

/// Every connected element matching the selector list, in document order.
pub fn query_selector_all(dom: &Dom, selectors: &[ComplexSelector]) -> Vec<NodeId> {
    dom.connected_elements()
        .into_iter()
        .filter(|&n| matches_any(dom, n, selectors))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Walk from `start` with `step` and return the first node matching `compound`.
fn first_matching(
    dom: &Dom,
    compound: &CompoundSelector,
    start: NodeId,
    step: fn(&Dom, NodeId) -> Option<NodeId>,
) -> Option<NodeId> {
    let mut cursor = step(dom, start);
    while let Some(id) = cursor {
        if matches_compound(dom, id, compound) {
            return Some(id);
        }
        cursor = step(dom, id);
    }
    None
}

fn matches_simple(dom: &Dom, node_id: NodeId, elem: &ElementData, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => elem.tag_name.eq_ignore_ascii_case(tag),
        SimpleSelector::Id(id) => elem.id.as_deref() == Some(id.as_str()),
        SimpleSelector::Class(cls) => elem.has_class(cls),
        SimpleSelector::Attribute { name, op, value } => {
            matches_attribute(elem, name, *op, value.as_deref())
        }
        SimpleSelector::PseudoClass(pc) => matches_pseudo_class(dom, node_id, elem, pc),
    }
}

fn matches_attribute(elem: &ElementData, name: &str, op: AttrOp, value: Option<&str>) -> bool {
    let Some(attr_val) = elem
        .attrs
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .map(|a| a.value.as_str())
    else {
        return false;
    };

    match (op, value) {
        (AttrOp::Exists, _) => true,
        (_, None) => false,
        (AttrOp::Eq, Some(v)) => attr_val == v,
        (AttrOp::Includes, Some(v)) => attr_val.split_whitespace().any(|word| word == v),
        (AttrOp::DashMatch, Some(v)) => {
            attr_val == v || attr_val.strip_prefix(v).is_some_and(|rest| rest.starts_with('-'))
        }
        (AttrOp::Prefix, Some(v)) => !v.is_empty() && attr_val.starts_with(v),
        (AttrOp::Suffix, Some(v)) => !v.is_empty() && attr_val.ends_with(v),
        (AttrOp::Substring, Some(v)) => !v.is_empty() && attr_val.contains(v),
    }
}

fn matches_pseudo_class(dom: &Dom, node_id: NodeId, elem: &ElementData, pc: &PseudoClass) -> bool {
    match pc {
        PseudoClass::Root => dom
            .node(node_id)
            .and_then(|n| n.parent)
            .and_then(|p| dom.node(p))
            .is_some_and(|parent| matches!(parent.data, NodeData::Document)),
        PseudoClass::Empty => dom.children(node_id).iter().all(|&c| {
            matches!(dom.node(c).map(|n| &n.data), Some(NodeData::Text { data }) if data.is_empty())
        }),
        PseudoClass::FirstChild => sibling_elements(dom, node_id, |_| true).first() == Some(&node_id),
        PseudoClass::LastChild => sibling_elements(dom, node_id, |_| true).last() == Some(&node_id),
        PseudoClass::OnlyChild => sibling_elements(dom, node_id, |_| true) == [node_id],
        PseudoClass::FirstOfType => {
            sibling_elements(dom, node_id, |e| e.tag_name == elem.tag_name).first() == Some(&node_id)
        }
        PseudoClass::LastOfType => {
            sibling_elements(dom, node_id, |e| e.tag_name == elem.tag_name).last() == Some(&node_id)
        }
        PseudoClass::Not(inner) => !matches_compound(dom, node_id, inner),
    }
}

/// Element children of `node_id`'s parent that satisfy `filter`. Empty for
/// parentless nodes.
fn sibling_elements(dom: &Dom, node_id: NodeId, filter: impl Fn(&ElementData) -> bool) -> Vec<NodeId> {
    let Some(parent) = dom.node(node_id).and_then(|n| n.parent) else {
        return Vec::new();
    };
    dom.children(parent)
        .into_iter()
        .filter(|&c| dom.element(c).is_some_and(&filter))
        .collect()
}

fn parent_element(dom: &Dom, node_id: NodeId) -> Option<NodeId> {
    let parent = dom.node(node_id)?.parent?;
    dom.element(parent).map(|_| parent)
}

fn prev_sibling_element(dom: &Dom, node_id: NodeId) -> Option<NodeId> {
    let mut cursor = dom.node(node_id)?.prev_sibling;
    while let Some(id) = cursor {
        if dom.element(id).is_some() {
            return Some(id);
        }
        cursor = dom.node(id)?.prev_sibling;
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use css::parse_selector_list;
    use dom::Attr;

    /// ```text
    /// document
    /// └── html
    ///     └── body
    ///         ├── ul.list
    ///         │   ├── li.item#first
    ///         │   ├── li.item.done
    ///         │   └── li.item
    ///         └── p[lang=en-GB] ("text")
    /// ```
    struct Fixture {
        dom: Dom,
        html: NodeId,
        ul: NodeId,
        items: [NodeId; 3],
        p: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let html = dom.create_html_element("html");
        let body = dom.create_html_element("body");
        let ul = dom.create_element("ul", vec![Attr::new("class", "list")]);
        let li1 = dom.create_element("li", vec![Attr::new("class", "item"), Attr::new("id", "first")]);
        let li2 = dom.create_element("li", vec![Attr::new("class", "item done")]);
        let li3 = dom.create_element("li", vec![Attr::new("class", "item")]);
        let p = dom.create_element("p", vec![Attr::new("lang", "en-GB")]);
        let text = dom.create_text("text");

        let doc = dom.document();
        dom.append_child(doc, html).unwrap();
        dom.append_child(html, body).unwrap();
        dom.append_child(body, ul).unwrap();
        for li in [li1, li2, li3] {
            dom.append_child(ul, li).unwrap();
        }
        dom.append_child(body, p).unwrap();
        dom.append_child(p, text).unwrap();

        Fixture {
            dom,
            html,
            ul,
            items: [li1, li2, li3],
            p,
        }
    }

    fn query(f: &Fixture, selector: &str) -> Vec<NodeId> {
        query_selector_all(&f.dom, &parse_selector_list(selector).unwrap())
    }

    #[test]
    fn compound_and_descendant() {
        let f = fixture();
        assert_eq!(query(&f, ".item"), f.items.to_vec());
        assert_eq!(query(&f, "body li.done"), vec![f.items[1]]);
        assert_eq!(query(&f, "html > li"), Vec::<NodeId>::new());
        assert_eq!(query(&f, "ul > #first"), vec![f.items[0]]);
    }

    #[test]
    fn sibling_combinators() {
        let f = fixture();
        assert_eq!(query(&f, "#first + li"), vec![f.items[1]]);
        assert_eq!(query(&f, "#first ~ li"), vec![f.items[1], f.items[2]]);
        assert_eq!(query(&f, "ul ~ p"), vec![f.p]);
    }

    #[test]
    fn structural_pseudo_classes() {
        let f = fixture();
        assert_eq!(query(&f, ":root"), vec![f.html]);
        assert_eq!(query(&f, "li:first-child"), vec![f.items[0]]);
        assert_eq!(query(&f, "li:last-of-type"), vec![f.items[2]]);
        assert_eq!(query(&f, "li:not(.done)"), vec![f.items[0], f.items[2]]);
        assert!(query(&f, "p:empty").is_empty());
        assert!(query(&f, "li:only-child").is_empty());
    }

    #[test]
    fn attribute_operators() {
        let f = fixture();
        assert_eq!(query(&f, "[lang|=en]"), vec![f.p]);
        assert_eq!(query(&f, "[class~=done]"), vec![f.items[1]]);
        assert_eq!(query(&f, "[class$=list]"), vec![f.ul]);
        assert!(query(&f, "[lang=en]").is_empty());
    }

    #[test]
    fn selector_list_matches_any() {
        let f = fixture();
        assert_eq!(query(&f, "p, .list"), vec![f.ul, f.p]);
    }
}
