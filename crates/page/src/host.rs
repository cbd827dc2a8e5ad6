//! `Document` as a host for progressive enhancement.

use dom::NodeId;
use progressive::{
    AnimationListener, AnimationSignal, ElementLookup, InstallError, InstallReport, LoadedListener,
    SignalSource, StyleSurface, TriggerSheet,
};

use crate::document::Document;

impl StyleSurface for Document {
    fn has_style_property(&self, name: &str) -> bool {
        self.profile().exposes_style_member(name)
    }
}

impl ElementLookup for Document {
    type Element = NodeId;

    fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.get_elements_by_tag_name(tag)
    }

    fn elements_by_class(&self, class: &str) -> Option<Vec<NodeId>> {
        self.config()
            .class_lookup
            .then(|| self.get_elements_by_class_name(class))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn query(&self, selector: &str) -> Vec<NodeId> {
        self.query_selector_all(selector).unwrap_or_else(|err| {
            tracing::debug!(selector, error = %err, "selector query failed");
            Vec::new()
        })
    }
}

impl TriggerSheet for Document {
    fn install(&self, rules: &[String]) -> Result<InstallReport, InstallError> {
        if !self.is_connected(self.head()) {
            return Err(InstallError::SheetUnavailable("document has no <head>".into()));
        }
        let sheet = self
            .trigger_sheet()
            .map_err(|err| InstallError::SheetUnavailable(err.to_string()))?;
        let outcome = self.insert_rules(sheet, rules);
        Ok(InstallReport {
            accepted: outcome.inserted,
            rejected: outcome
                .rejected
                .into_iter()
                .map(|(index, err)| (index, err.to_string()))
                .collect(),
        })
    }
}

impl SignalSource<NodeId> for Document {
    fn on_animation_start(&self, event_name: &str, listener: AnimationListener<NodeId>) {
        let root = self.root();
        self.add_event_listener(root, event_name, false, move |evt| {
            let (Some(target), Some(animation_name)) = (evt.target, evt.animation_name.clone()) else {
                return;
            };
            listener(&AnimationSignal {
                target,
                animation_name,
            });
        });
    }

    fn on_content_loaded(&self, listener: LoadedListener) {
        self.when_content_loaded(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentConfig;
    use progressive::{Capability, VendorPrefix, resolve};
    use std::cell::RefCell;
    use std::rc::Rc;
    use style::EngineProfile;

    #[test]
    fn capability_follows_the_profile() {
        let expected = [
            (EngineProfile::Standard, Some(VendorPrefix::None)),
            (EngineProfile::Webkit, Some(VendorPrefix::Webkit)),
            (EngineProfile::Moz, Some(VendorPrefix::Moz)),
            (EngineProfile::Presto, Some(VendorPrefix::O)),
            (EngineProfile::Trident, Some(VendorPrefix::Ms)),
            (EngineProfile::Legacy, None),
        ];
        for (profile, prefix) in expected {
            let cap = Capability::detect(&Document::with_profile(profile));
            assert_eq!(cap.is_supported(), prefix.is_some(), "{profile:?}");
            if let Some(prefix) = prefix {
                assert_eq!(cap.prefix(), prefix);
                assert_eq!(Some(prefix.css()), profile.css_prefix());
            }
        }
    }

    #[test]
    fn resolution_uses_live_lookups() {
        let doc = Document::default();
        let a = doc.create_element("div", &[("class", "note"), ("id", "widget")]);
        let b = doc.create_element("p", &[("class", "note")]);
        doc.append_child(doc.body(), a).unwrap();
        assert_eq!(resolve(&doc, ".note"), vec![a]);

        doc.append_child(doc.body(), b).unwrap();
        assert_eq!(resolve(&doc, ".note"), vec![a, b]);
        assert_eq!(resolve(&doc, "#widget"), vec![a]);
        assert_eq!(resolve(&doc, "p"), vec![b]);
        assert_eq!(resolve(&doc, "body > .note:last-child"), vec![b]);
        assert!(resolve(&doc, "p:hover").is_empty());
    }

    #[test]
    fn class_lookup_can_be_missing() {
        let doc = Document::new(DocumentConfig::default().with_class_lookup(false));
        let a = doc.create_element("div", &[("class", "note")]);
        doc.append_child(doc.body(), a).unwrap();
        assert_eq!(doc.elements_by_class("note"), None);
        assert_eq!(resolve(&doc, ".note"), vec![a]);
    }

    #[test]
    fn install_reports_rejected_rules() {
        let doc = Document::default();
        let report = doc
            .install(&[
                "p:hover { animation: a 0.001s; }".to_string(),
                "@keyframes a { from { opacity: 0.99; } to { opacity: 1; } }".to_string(),
            ])
            .unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, 0);
    }

    #[test]
    fn install_without_head_fails() {
        let doc = Document::default();
        doc.remove_child(doc.html(), doc.head()).unwrap();
        assert!(matches!(
            doc.install(&["p { animation: a 1s; }".to_string()]),
            Err(InstallError::SheetUnavailable(_))
        ));
    }

    #[test]
    fn animation_listener_sees_target_and_name() {
        let doc = Document::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        doc.on_animation_start(
            "animationstart",
            Box::new(move |signal| s.borrow_mut().push(signal.clone())),
        );
        doc.install(&[
            ".note { animation: hl 0.001s; }".to_string(),
            "@keyframes hl { from { opacity: 0.99; } to { opacity: 1; } }".to_string(),
        ])
        .unwrap();
        let el = doc.create_element("div", &[("class", "note")]);
        doc.append_child(doc.body(), el).unwrap();
        doc.run_until_idle();
        assert_eq!(
            *seen.borrow(),
            vec![AnimationSignal {
                target: el,
                animation_name: "hl".to_string()
            }]
        );
    }
}
