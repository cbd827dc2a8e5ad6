//! In-memory host used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::InstallError;
use crate::host::{
    AnimationListener, AnimationSignal, ElementLookup, InstallReport, LoadedListener,
    SignalSource, StyleSurface, TriggerSheet,
};

/// Element handle: an index into the fake document.
pub type FakeElement = usize;

#[derive(Debug)]
struct FakeNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Default)]
struct Inner {
    style_members: Vec<&'static str>,
    class_lookup: bool,
    nodes: RefCell<Vec<FakeNode>>,
    installed: RefCell<Vec<String>>,
    install_error: RefCell<Option<InstallError>>,
    reject_containing: RefCell<Option<String>>,
    animation_listeners: RefCell<HashMap<String, Vec<Rc<AnimationListener<FakeElement>>>>>,
    loaded_listeners: RefCell<Vec<LoadedListener>>,
    loaded: Cell<bool>,
    install_calls: Cell<usize>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FakeHost {
    inner: Rc<Inner>,
}

impl FakeHost {
    pub fn new(style_members: &[&'static str]) -> Self {
        Self {
            inner: Rc::new(Inner {
                style_members: style_members.to_vec(),
                class_lookup: true,
                ..Inner::default()
            }),
        }
    }

    pub fn supporting() -> Self {
        Self::new(&["opacity", "animationName"])
    }

    pub fn unsupporting() -> Self {
        Self::new(&["opacity"])
    }

    pub fn without_class_lookup(mut self) -> Self {
        if let Some(inner) = Rc::get_mut(&mut self.inner) {
            inner.class_lookup = false;
        }
        self
    }

    /// Add an element; returns its handle.
    pub fn add(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> FakeElement {
        let mut nodes = self.inner.nodes.borrow_mut();
        nodes.push(FakeNode {
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        });
        nodes.len() - 1
    }

    pub fn set_classes(&self, element: FakeElement, classes: &[&str]) {
        self.inner.nodes.borrow_mut()[element].classes =
            classes.iter().map(|c| c.to_string()).collect();
    }

    pub fn fail_installs(&self, error: InstallError) {
        *self.inner.install_error.borrow_mut() = Some(error);
    }

    pub fn reject_rules_containing(&self, needle: &str) {
        *self.inner.reject_containing.borrow_mut() = Some(needle.to_string());
    }

    pub fn installed(&self) -> Vec<String> {
        self.inner.installed.borrow().clone()
    }

    pub fn install_calls(&self) -> usize {
        self.inner.install_calls.get()
    }

    pub fn subscribed_events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.animation_listeners.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Deliver an animation-start firing to listeners of `event_name`.
    pub fn fire(&self, event_name: &str, target: FakeElement, animation_name: &str) {
        let listeners = self
            .inner
            .animation_listeners
            .borrow()
            .get(event_name)
            .cloned()
            .unwrap_or_default();
        let signal = AnimationSignal {
            target,
            animation_name: animation_name.to_string(),
        };
        for listener in listeners {
            listener(&signal);
        }
    }

    /// Fire the content-loaded signal.
    pub fn load(&self) {
        self.inner.loaded.set(true);
        let listeners = std::mem::take(&mut *self.inner.loaded_listeners.borrow_mut());
        for listener in listeners {
            listener();
        }
    }

    fn matching(&self, pred: impl Fn(&FakeNode) -> bool) -> Vec<FakeElement> {
        self.inner
            .nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, n)| pred(n))
            .map(|(i, _)| i)
            .collect()
    }
}

impl StyleSurface for FakeHost {
    fn has_style_property(&self, name: &str) -> bool {
        self.inner.style_members.contains(&name)
    }
}

impl ElementLookup for FakeHost {
    type Element = FakeElement;

    fn elements_by_tag(&self, tag: &str) -> Vec<FakeElement> {
        self.matching(|n| n.tag == tag)
    }

    fn elements_by_class(&self, class: &str) -> Option<Vec<FakeElement>> {
        self.inner
            .class_lookup
            .then(|| self.matching(|n| n.classes.iter().any(|c| c == class)))
    }

    fn element_by_id(&self, id: &str) -> Option<FakeElement> {
        self.matching(|n| n.id.as_deref() == Some(id)).first().copied()
    }

    /// Understands `tag.class` and `.class`; anything else matches nothing.
    fn query(&self, selector: &str) -> Vec<FakeElement> {
        let Some((tag, class)) = selector.split_once('.') else {
            return Vec::new();
        };
        self.matching(|n| (tag.is_empty() || n.tag == tag) && n.classes.iter().any(|c| c == class))
    }
}

impl TriggerSheet for FakeHost {
    fn install(&self, rules: &[String]) -> Result<InstallReport, InstallError> {
        self.inner.install_calls.set(self.inner.install_calls.get() + 1);
        if let Some(err) = self.inner.install_error.borrow().clone() {
            return Err(err);
        }
        let reject = self.inner.reject_containing.borrow().clone();
        let mut report = InstallReport::default();
        for (i, rule) in rules.iter().enumerate() {
            if reject.as_deref().is_some_and(|needle| rule.contains(needle)) {
                report.rejected.push((i, "refused".to_string()));
            } else {
                self.inner.installed.borrow_mut().push(rule.clone());
                report.accepted += 1;
            }
        }
        Ok(report)
    }
}

impl SignalSource<FakeElement> for FakeHost {
    fn on_animation_start(&self, event_name: &str, listener: AnimationListener<FakeElement>) {
        self.inner
            .animation_listeners
            .borrow_mut()
            .entry(event_name.to_string())
            .or_default()
            .push(Rc::new(listener));
    }

    fn on_content_loaded(&self, listener: LoadedListener) {
        self.inner.loaded_listeners.borrow_mut().push(listener);
    }
}

/// Records every element a callback was invoked with.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Rc<RefCell<Vec<FakeElement>>>,
}

impl Recorder {
    pub fn callback(&self) -> impl Fn(&FakeElement) + 'static {
        let seen = self.seen.clone();
        move |el: &FakeElement| seen.borrow_mut().push(*el)
    }

    pub fn seen(&self) -> Vec<FakeElement> {
        self.seen.borrow().clone()
    }
}
