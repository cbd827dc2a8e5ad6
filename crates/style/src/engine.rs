//! The style engine a document owns: its style sheets, its profile, and the
//! animation state of every element.

use css::{CssError, Stylesheet};
use dom::{Dom, NodeId};

use crate::animation::{AnimationStart, AnimationTracker};
use crate::profile::EngineProfile;

/// Index of a style sheet within a [`StyleEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SheetId(pub usize);

/// Outcome of inserting a batch of rules into one sheet.
#[derive(Debug, Default)]
pub struct BatchInsert {
    pub inserted: usize,
    /// `(index within the batch, error)` for every rejected rule.
    pub rejected: Vec<(usize, CssError)>,
}

#[derive(Debug)]
pub struct StyleEngine {
    profile: EngineProfile,
    sheets: Vec<Stylesheet>,
    animations: AnimationTracker,
}

impl StyleEngine {
    pub fn new(profile: EngineProfile) -> Self {
        Self {
            profile,
            sheets: Vec::new(),
            animations: AnimationTracker::new(),
        }
    }

    pub fn profile(&self) -> EngineProfile {
        self.profile
    }

    pub fn sheets(&self) -> &[Stylesheet] {
        &self.sheets
    }

    pub fn sheet(&self, id: SheetId) -> Option<&Stylesheet> {
        self.sheets.get(id.0)
    }

    pub fn sheet_mut(&mut self, id: SheetId) -> Option<&mut Stylesheet> {
        self.sheets.get_mut(id.0)
    }

    /// Append a style sheet (a `<style>` element) and return its id.
    pub fn add_sheet(&mut self, sheet: Stylesheet) -> SheetId {
        self.sheets.push(sheet);
        SheetId(self.sheets.len() - 1)
    }

    /// Append every rule of `rules` to the end of sheet `id`, in order.
    /// Rules that fail to parse are skipped and reported.
    pub fn insert_rules(&mut self, id: SheetId, rules: &[String]) -> BatchInsert {
        let mut outcome = BatchInsert::default();
        let Some(sheet) = self.sheets.get_mut(id.0) else {
            return outcome;
        };
        for (i, text) in rules.iter().enumerate() {
            match sheet.insert_rule(text, sheet.len()) {
                Ok(_) => outcome.inserted += 1,
                Err(err) => outcome.rejected.push((i, err)),
            }
        }
        outcome
    }

    /// Recompute animations for `scope` and return those that started.
    pub fn restyle(&mut self, dom: &Dom, scope: &[NodeId]) -> Vec<AnimationStart> {
        self.animations.restyle(dom, &self.sheets, self.profile, scope)
    }

    /// Recompute animations for every connected element.
    pub fn restyle_document(&mut self, dom: &Dom) -> Vec<AnimationStart> {
        let scope = dom.connected_elements();
        self.restyle(dom, &scope)
    }

    /// Cancel the animations of a subtree leaving the document.
    pub fn cancel_subtree(&mut self, dom: &Dom, root: NodeId) {
        self.animations.cancel_subtree(dom, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;

    #[test]
    fn batch_insert_reports_rejections_and_keeps_the_rest() {
        let mut engine = StyleEngine::new(EngineProfile::Standard);
        let sheet = engine.add_sheet(Stylesheet::new());
        let outcome = engine.insert_rules(
            sheet,
            &[
                ".a { animation: a 0.001s; }".to_string(),
                "p:hover { animation: b 0.001s; }".to_string(),
                "@keyframes a { from { opacity: 0.99; } to { opacity: 1; } }".to_string(),
            ],
        );
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, 1);
        assert_eq!(engine.sheet(sheet).unwrap().len(), 2);
    }

    #[test]
    fn restyle_after_sheet_change_starts_existing_elements() {
        let mut dom = Dom::new();
        let el = dom.create_element("div", vec![Attr::new("class", "a")]);
        let doc = dom.document();
        dom.append_child(doc, el).unwrap();

        let mut engine = StyleEngine::new(EngineProfile::Standard);
        assert!(engine.restyle_document(&dom).is_empty());

        let sheet = engine.add_sheet(Stylesheet::new());
        engine.insert_rules(
            sheet,
            &[
                ".a { animation: a 0.001s; }".to_string(),
                "@keyframes a { to { opacity: 1; } }".to_string(),
            ],
        );
        let started = engine.restyle_document(&dom);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].target, el);
    }

    #[test]
    fn unknown_sheet_inserts_nothing() {
        let mut engine = StyleEngine::new(EngineProfile::Webkit);
        let outcome = engine.insert_rules(SheetId(3), &["a { color: red }".to_string()]);
        assert_eq!(outcome.inserted, 0);
        assert!(outcome.rejected.is_empty());
    }
}
