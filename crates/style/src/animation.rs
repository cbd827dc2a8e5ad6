//! CSS Animations: which animations apply to an element, and which of them
//! just started.
//!
//! Only the start of an animation is observable here. An animation starts
//! when an element gains an animation name that resolves to a `@keyframes`
//! rule: on insertion into the document, or when a style sheet change makes
//! a new name apply. Removing an element from the document cancels its
//! animations, so re-insertion starts them again.

use std::collections::HashMap;

use css::{CssToken, Declaration, Stylesheet};
use dom::{Dom, NodeId};

use crate::matching::matches_any;
use crate::profile::EngineProfile;

/// Keywords of the `animation` shorthand that can never be an animation name.
const SHORTHAND_KEYWORDS: &[&str] = &[
    "none", "infinite", "linear", "ease", "ease-in", "ease-out", "ease-in-out", "step-start",
    "step-end", "normal", "reverse", "alternate", "alternate-reverse", "forwards", "backwards",
    "both", "running", "paused", "initial", "inherit", "unset",
];

/// An animation that started on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationStart {
    pub target: NodeId,
    pub animation_name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Name extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Animation names declared by one `animation` / `animation-name`
/// declaration, or `None` if the declaration is not an animation property
/// under `prefix`.
pub fn declared_animation_names(decl: &Declaration, prefix: &str) -> Option<Vec<String>> {
    let property = decl.name.strip_prefix(prefix)?;
    let layers = decl.value.split(|t| *t == CssToken::Comma);
    match property {
        "animation" => Some(layers.filter_map(shorthand_layer_name).collect()),
        "animation-name" => Some(
            layers
                .filter_map(|layer| match non_whitespace(layer).as_slice() {
                    [CssToken::Ident(n)] if !n.eq_ignore_ascii_case("none") => Some(n.clone()),
                    [CssToken::String(n)] => Some(n.clone()),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn shorthand_layer_name(layer: &[CssToken]) -> Option<String> {
    layer.iter().find_map(|t| match t {
        CssToken::Ident(n) if !SHORTHAND_KEYWORDS.iter().any(|k| n.eq_ignore_ascii_case(k)) => Some(n.clone()),
        CssToken::String(n) => Some(n.clone()),
        _ => None,
    })
}

fn non_whitespace(tokens: &[CssToken]) -> Vec<CssToken> {
    tokens
        .iter()
        .filter(|t| **t != CssToken::Whitespace)
        .cloned()
        .collect()
}

/// The animation names that apply to `node` and resolve to a keyframes rule
/// the profile understands. Later declarations win; `!important` beats
/// normal declarations.
pub fn computed_animation_names(
    dom: &Dom,
    sheets: &[Stylesheet],
    profile: EngineProfile,
    node: NodeId,
) -> Vec<String> {
    let (Some(prefix), Some(keyframes_keyword)) = (profile.css_prefix(), profile.keyframes_keyword()) else {
        return Vec::new();
    };

    let mut winner: Option<(bool, Vec<String>)> = None;
    for rule in sheets.iter().flat_map(|s| s.style_rules()) {
        if !matches_any(dom, node, &rule.selectors) {
            continue;
        }
        for decl in &rule.declarations {
            let Some(names) = declared_animation_names(decl, prefix) else {
                continue;
            };
            if winner.as_ref().is_some_and(|(important, _)| *important && !decl.important) {
                continue;
            }
            winner = Some((decl.important, names));
        }
    }

    winner
        .map(|(_, names)| names)
        .unwrap_or_default()
        .into_iter()
        .filter(|name| sheets.iter().any(|s| s.keyframes(&keyframes_keyword, name).is_some()))
        .collect()
}

/// Elements under a `hidden` attribute generate no boxes and therefore run
/// no animations.
pub fn is_rendered(dom: &Dom, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .filter_map(|n| dom.element(n))
        .all(|el| el.attr("hidden").is_none())
}

// ─────────────────────────────────────────────────────────────────────────────
// AnimationTracker
// ─────────────────────────────────────────────────────────────────────────────

/// Remembers the running animation names of every element so a restyle only
/// reports animations that were not already running.
#[derive(Debug, Default)]
pub struct AnimationTracker {
    running: HashMap<NodeId, Vec<String>>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the animations of `scope` (connected elements only) and
    /// return the ones that started, in scope order. Hidden elements lose
    /// their animations and start them again once shown.
    pub fn restyle(
        &mut self,
        dom: &Dom,
        sheets: &[Stylesheet],
        profile: EngineProfile,
        scope: &[NodeId],
    ) -> Vec<AnimationStart> {
        let mut started = Vec::new();
        for &node in scope {
            if !dom.is_connected(node) || dom.element(node).is_none() {
                continue;
            }
            let names = if is_rendered(dom, node) {
                computed_animation_names(dom, sheets, profile, node)
            } else {
                Vec::new()
            };
            let previous = self.running.get(&node);
            for name in &names {
                if !previous.is_some_and(|p| p.contains(name)) {
                    started.push(AnimationStart {
                        target: node,
                        animation_name: name.clone(),
                    });
                }
            }
            if names.is_empty() {
                self.running.remove(&node);
            } else {
                self.running.insert(node, names);
            }
        }
        started
    }

    /// Cancel the animations of `root` and its descendants.
    pub fn cancel_subtree(&mut self, dom: &Dom, root: NodeId) {
        for node in std::iter::once(root).chain(dom.descendants(root)) {
            self.running.remove(&node);
        }
    }

    pub fn running(&self, node: NodeId) -> &[String] {
        self.running.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use css::{parse_declarations, parse_stylesheet, CssTokenizer};
    use dom::Attr;

    fn decl(text: &str) -> Declaration {
        parse_declarations(&CssTokenizer::new(text).tokenize_all()).remove(0)
    }

    fn note_tree() -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.create_html_element("body");
        let note = dom.create_element("div", vec![Attr::new("class", "note")]);
        let doc = dom.document();
        dom.append_child(doc, body).unwrap();
        dom.append_child(body, note).unwrap();
        (dom, body, note)
    }

    #[test]
    fn shorthand_skips_keywords_and_times() {
        let names = declared_animation_names(&decl("animation: 1s ease-in infinite spin, fade 2s"), "");
        assert_eq!(names, Some(vec!["spin".to_string(), "fade".to_string()]));
    }

    #[test]
    fn prefix_must_match_exactly() {
        let d = decl("-webkit-animation: highlight 0.001s");
        assert_eq!(declared_animation_names(&d, "-webkit-"), Some(vec!["highlight".to_string()]));
        assert_eq!(declared_animation_names(&d, ""), None);
        assert_eq!(declared_animation_names(&d, "-moz-"), None);
    }

    #[test]
    fn animation_name_longhand_and_none() {
        assert_eq!(
            declared_animation_names(&decl("animation-name: a, b"), ""),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(declared_animation_names(&decl("animation-name: none"), ""), Some(Vec::new()));
    }

    #[test]
    fn names_without_keyframes_do_not_apply() {
        let (dom, _, note) = note_tree();
        let sheets = vec![parse_stylesheet(".note { animation: ghost 1s }")];
        assert!(computed_animation_names(&dom, &sheets, EngineProfile::Standard, note).is_empty());
    }

    #[test]
    fn keyframes_spelling_follows_profile() {
        let (dom, _, note) = note_tree();
        let sheets = vec![parse_stylesheet(
            ".note { -webkit-animation: hl 0.001s }
             @-webkit-keyframes hl { from { opacity: 0.99 } to { opacity: 1 } }",
        )];
        assert_eq!(computed_animation_names(&dom, &sheets, EngineProfile::Webkit, note), vec!["hl"]);
        assert!(computed_animation_names(&dom, &sheets, EngineProfile::Standard, note).is_empty());
        assert!(computed_animation_names(&dom, &sheets, EngineProfile::Legacy, note).is_empty());
    }

    #[test]
    fn later_declaration_wins_unless_important() {
        let (dom, _, note) = note_tree();
        let sheets = vec![parse_stylesheet(
            "div { animation: a 1s !important }
             .note { animation: b 1s }
             @keyframes a { to { opacity: 1 } }
             @keyframes b { to { opacity: 1 } }",
        )];
        assert_eq!(computed_animation_names(&dom, &sheets, EngineProfile::Standard, note), vec!["a"]);
    }

    #[test]
    fn tracker_reports_each_start_once_until_cancelled() {
        let (dom, body, note) = note_tree();
        let sheets = vec![parse_stylesheet(
            ".note { animation: hl 0.001s } @keyframes hl { to { opacity: 1 } }",
        )];
        let mut tracker = AnimationTracker::new();
        let scope = dom.connected_elements();

        let first = tracker.restyle(&dom, &sheets, EngineProfile::Standard, &scope);
        assert_eq!(
            first,
            vec![AnimationStart {
                target: note,
                animation_name: "hl".into()
            }]
        );
        assert!(tracker.restyle(&dom, &sheets, EngineProfile::Standard, &scope).is_empty());
        assert_eq!(tracker.running(note), ["hl".to_string()]);

        tracker.cancel_subtree(&dom, body);
        assert!(tracker.running(note).is_empty());
        assert_eq!(tracker.restyle(&dom, &sheets, EngineProfile::Standard, &scope).len(), 1);
    }

    #[test]
    fn hidden_subtrees_do_not_animate_until_shown() {
        let (mut dom, body, note) = note_tree();
        dom.set_attribute(body, "hidden", "").unwrap();
        let sheets = vec![parse_stylesheet(".note { animation: hl 1s } @keyframes hl { to { opacity: 1 } }")];
        let mut tracker = AnimationTracker::new();
        let scope = dom.connected_elements();
        assert!(!is_rendered(&dom, note));
        assert!(tracker.restyle(&dom, &sheets, EngineProfile::Standard, &scope).is_empty());

        dom.remove_attribute(body, "hidden").unwrap();
        let started = tracker.restyle(&dom, &sheets, EngineProfile::Standard, &scope);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].target, note);
    }

    #[test]
    fn detached_elements_never_start() {
        let mut dom = Dom::new();
        let floating = dom.create_element("div", vec![Attr::new("class", "note")]);
        let sheets = vec![parse_stylesheet(".note { animation: hl 1s } @keyframes hl { to { opacity: 1 } }")];
        let mut tracker = AnimationTracker::new();
        assert!(tracker.restyle(&dom, &sheets, EngineProfile::Standard, &[floating]).is_empty());
    }
}
