//! The document: tree, style engine, listeners and task queue behind one
//! shared handle.
//!
//! Every mutation restyles the document and queues an animation-start task
//! for each animation that began. Tasks run from [`Document::run_until_idle`]
//! with no borrow held, so listeners are free to mutate the document.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use css::{Stylesheet, parse_selector_list, parse_stylesheet};
use dom::{Attr, DispatchPlan, Dom, Event, EventListener, EventTargetMap, NodeId};
use progressive::LoadedListener;
use scheduler::{EventLoop, Task, TaskSource};
use style::{AnimationStart, EngineProfile, SheetId, StyleEngine, query_selector_all};

use crate::error::DocumentError;

// ─────────────────────────────────────────────────────────────────────────────
// ReadyState
// ─────────────────────────────────────────────────────────────────────────────

/// `document.readyState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Still parsing.
    Loading,
    /// Parsed; `DOMContentLoaded` is queued or has fired.
    Interactive,
    /// `load` has fired.
    Complete,
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentConfig
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of engine the document simulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentConfig {
    pub profile: EngineProfile,
    /// Whether `getElementsByClassName` exists.
    pub class_lookup: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            profile: EngineProfile::Standard,
            class_lookup: true,
        }
    }
}

impl DocumentConfig {
    pub fn with_profile(mut self, profile: EngineProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_class_lookup(mut self, available: bool) -> Self {
        self.class_lookup = available;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) enum PageTask {
    AnimationStart {
        start: AnimationStart,
        event_type: &'static str,
    },
    ContentLoaded,
    Load,
    Callback(LoadedListener),
}

impl fmt::Debug for PageTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTask::AnimationStart { start, event_type } => f
                .debug_struct("AnimationStart")
                .field("target", &start.target)
                .field("animation_name", &start.animation_name)
                .field("event_type", event_type)
                .finish(),
            PageTask::ContentLoaded => f.write_str("ContentLoaded"),
            PageTask::Load => f.write_str("Load"),
            PageTask::Callback(_) => f.write_str("Callback"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

struct Inner {
    config: DocumentConfig,
    dom: RefCell<Dom>,
    style: RefCell<StyleEngine>,
    listeners: RefCell<EventTargetMap>,
    tasks: RefCell<EventLoop<PageTask>>,
    ready_state: Cell<ReadyState>,
    content_loaded_fired: Cell<bool>,
    loaded_listeners: RefCell<Vec<LoadedListener>>,
    trigger_sheet: Cell<Option<SheetId>>,
    html: NodeId,
    head: NodeId,
    body: NodeId,
}

/// A shared handle to one document. Clones refer to the same document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("config", &self.inner.config)
            .field("ready_state", &self.inner.ready_state.get())
            .field("nodes", &self.inner.dom.borrow().len())
            .field("pending_tasks", &self.inner.tasks.borrow().len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl Document {
    /// A loading document holding `<html><head></head><body></body></html>`.
    pub fn new(config: DocumentConfig) -> Self {
        let mut dom = Dom::new();
        let html = dom.append_new_element(dom.document(), "html");
        let head = dom.append_new_element(html, "head");
        let body = dom.append_new_element(html, "body");

        tracing::debug!(profile = ?config.profile, class_lookup = config.class_lookup, "new document");
        Self {
            inner: Rc::new(Inner {
                config,
                dom: RefCell::new(dom),
                style: RefCell::new(StyleEngine::new(config.profile)),
                listeners: RefCell::new(EventTargetMap::new()),
                tasks: RefCell::new(EventLoop::new()),
                ready_state: Cell::new(ReadyState::Loading),
                content_loaded_fired: Cell::new(false),
                loaded_listeners: RefCell::new(Vec::new()),
                trigger_sheet: Cell::new(None),
                html,
                head,
                body,
            }),
        }
    }

    pub fn with_profile(profile: EngineProfile) -> Self {
        Self::new(DocumentConfig::default().with_profile(profile))
    }

    pub fn config(&self) -> DocumentConfig {
        self.inner.config
    }

    pub fn profile(&self) -> EngineProfile {
        self.inner.config.profile
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    pub fn root(&self) -> NodeId {
        self.inner.dom.borrow().document()
    }

    pub fn html(&self) -> NodeId {
        self.inner.html
    }

    pub fn head(&self) -> NodeId {
        self.inner.head
    }

    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    /// Read access to the tree. Do not call back into the document from `f`.
    pub fn with_dom<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.inner.dom.borrow())
    }

    // ── Tree mutation ───────────────────────────────────────────────────────

    /// Create a detached element.
    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs.iter().map(|(n, v)| Attr::new(n, v)).collect();
        self.inner.dom.borrow_mut().create_element(tag, attrs)
    }

    pub fn create_text(&self, data: &str) -> NodeId {
        self.inner.dom.borrow_mut().create_text(data)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.inner.dom.borrow_mut().append_child(parent, child)?;
        self.restyle();
        Ok(())
    }

    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DocumentError> {
        self.inner
            .dom
            .borrow_mut()
            .insert_before(parent, child, reference)?;
        self.restyle();
        Ok(())
    }

    /// Remove `child`. Its animations are cancelled, so inserting it again
    /// starts them again.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let mut dom = self.inner.dom.borrow_mut();
        dom.remove_child(parent, child)?;
        self.inner.style.borrow_mut().cancel_subtree(&dom, child);
        drop(dom);
        self.restyle();
        Ok(())
    }

    pub fn set_attribute(&self, element: NodeId, name: &str, value: &str) -> Result<(), DocumentError> {
        self.inner
            .dom
            .borrow_mut()
            .set_attribute(element, name, value)?;
        self.restyle();
        Ok(())
    }

    pub fn remove_attribute(&self, element: NodeId, name: &str) -> Result<(), DocumentError> {
        self.inner.dom.borrow_mut().remove_attribute(element, name)?;
        self.restyle();
        Ok(())
    }

    // ── Element access ──────────────────────────────────────────────────────

    pub fn attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.inner
            .dom
            .borrow()
            .element(element)
            .and_then(|e| e.attr(name).map(str::to_string))
    }

    pub fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.inner
            .dom
            .borrow()
            .element(element)
            .is_some_and(|e| e.has_class(class))
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.dom.borrow().is_connected(node)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.inner.dom.borrow().get_element_by_id(id)
    }

    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.inner.dom.borrow().get_elements_by_tag_name(tag)
    }

    pub fn get_elements_by_class_name(&self, classes: &str) -> Vec<NodeId> {
        self.inner.dom.borrow().get_elements_by_class_name(classes)
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DocumentError> {
        let selectors = parse_selector_list(selector)?;
        Ok(query_selector_all(&self.inner.dom.borrow(), &selectors))
    }

    // ── Style sheets ────────────────────────────────────────────────────────

    /// Add a `<style>` sheet with `css` (parsed leniently).
    pub fn add_style_sheet(&self, css: &str) -> SheetId {
        let id = self.inner.style.borrow_mut().add_sheet(parse_stylesheet(css));
        self.restyle();
        id
    }

    /// `CSSStyleSheet.insertRule`.
    pub fn insert_rule(&self, sheet: SheetId, rule: &str, index: usize) -> Result<usize, DocumentError> {
        let inserted = {
            let mut style = self.inner.style.borrow_mut();
            let target = style.sheet_mut(sheet).ok_or(DocumentError::UnknownSheet(sheet))?;
            target.insert_rule(rule, index)?
        };
        self.restyle();
        Ok(inserted)
    }

    /// Number of rules in `sheet`.
    pub fn sheet_len(&self, sheet: SheetId) -> Option<usize> {
        self.inner.style.borrow().sheet(sheet).map(Stylesheet::len)
    }

    /// Text of every style rule in `sheet` as selector text, in order.
    pub fn sheet_selectors(&self, sheet: SheetId) -> Vec<String> {
        self.inner
            .style
            .borrow()
            .sheet(sheet)
            .map(|s| s.style_rules().map(|r| r.selector_text.clone()).collect())
            .unwrap_or_default()
    }

    /// The sheet holding generated trigger rules, creating it (and its
    /// `<style>` element in `<head>`) on first use.
    pub(crate) fn trigger_sheet(&self) -> Result<SheetId, DocumentError> {
        if let Some(id) = self.inner.trigger_sheet.get() {
            return Ok(id);
        }
        let element = self.create_element("style", &[("data-owner", "progressive")]);
        self.append_child(self.inner.head, element)?;
        let id = self.inner.style.borrow_mut().add_sheet(Stylesheet::new());
        self.inner.trigger_sheet.set(Some(id));
        tracing::debug!(sheet = id.0, "created trigger style sheet");
        Ok(id)
    }

    pub fn trigger_sheet_id(&self) -> Option<SheetId> {
        self.inner.trigger_sheet.get()
    }

    pub(crate) fn insert_rules(&self, sheet: SheetId, rules: &[String]) -> style::BatchInsert {
        let outcome = self.inner.style.borrow_mut().insert_rules(sheet, rules);
        self.restyle();
        outcome
    }

    // ── Events ──────────────────────────────────────────────────────────────

    pub fn add_event_listener<F>(&self, node: NodeId, type_: &str, capture: bool, callback: F)
    where
        F: Fn(&mut Event) + 'static,
    {
        self.inner
            .listeners
            .borrow_mut()
            .add_listener(node, EventListener::new(type_, capture, callback));
    }

    /// Dispatch `event` at `target` now.
    pub fn dispatch_event(&self, target: NodeId, event: &mut Event) {
        let plan = DispatchPlan::new(
            &self.inner.dom.borrow(),
            &self.inner.listeners.borrow(),
            target,
            &event.type_,
        );
        plan.run(event);
    }

    /// Run `listener` once content has loaded: on `DOMContentLoaded` if that
    /// has not fired yet, otherwise on a later task.
    pub(crate) fn when_content_loaded(&self, listener: LoadedListener) {
        if self.inner.content_loaded_fired.get() {
            self.post(TaskSource::Script, PageTask::Callback(listener));
        } else {
            self.inner.loaded_listeners.borrow_mut().push(listener);
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// The parser reached the end of input: the document becomes
    /// interactive and `DOMContentLoaded` is queued behind everything
    /// already pending.
    pub fn finish_parsing(&self) {
        if self.ready_state() != ReadyState::Loading {
            tracing::warn!(state = ?self.ready_state(), "finish_parsing called twice");
            return;
        }
        self.set_ready_state(ReadyState::Interactive);
        self.post(TaskSource::Dom, PageTask::ContentLoaded);
    }

    /// Run tasks until the queue is empty; returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.next_task() {
            self.run_task(task);
            ran += 1;
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    fn next_task(&self) -> Option<Task<PageTask>> {
        self.inner.tasks.borrow_mut().next_task()
    }

    fn post(&self, source: TaskSource, task: PageTask) {
        self.inner.tasks.borrow_mut().post_task(source, task);
    }

    fn set_ready_state(&self, state: ReadyState) {
        tracing::debug!(from = ?self.ready_state(), to = ?state, "ready state");
        self.inner.ready_state.set(state);
    }

    fn run_task(&self, task: Task<PageTask>) {
        tracing::trace!(id = task.id.0, source = ?task.source, payload = ?task.payload, "running task");
        match task.payload {
            PageTask::AnimationStart { start, event_type } => {
                if !self.is_connected(start.target) {
                    tracing::trace!(node = %start.target, "animation target left the document");
                    return;
                }
                let mut event = Event::animation(event_type, &start.animation_name);
                self.dispatch_event(start.target, &mut event);
            }
            PageTask::ContentLoaded => {
                self.inner.content_loaded_fired.set(true);
                let listeners = std::mem::take(&mut *self.inner.loaded_listeners.borrow_mut());
                for listener in listeners {
                    listener();
                }
                let root = self.root();
                self.dispatch_event(root, &mut Event::new("DOMContentLoaded", true));
                self.post(TaskSource::Dom, PageTask::Load);
            }
            PageTask::Load => {
                self.set_ready_state(ReadyState::Complete);
                let root = self.root();
                self.dispatch_event(root, &mut Event::new("load", false));
            }
            PageTask::Callback(callback) => callback(),
        }
    }

    /// Recompute animations after a change and queue a task per start.
    fn restyle(&self) {
        let started = {
            let dom = self.inner.dom.borrow();
            self.inner.style.borrow_mut().restyle_document(&dom)
        };
        let Some(event_type) = self.profile().animation_start_event() else {
            return;
        };
        for start in started {
            tracing::trace!(node = %start.target, animation = %start.animation_name, "animation started");
            self.post(TaskSource::Rendering, PageTask::AnimationStart { start, event_type });
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
