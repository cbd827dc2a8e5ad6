//! Events and listener dispatch.
//!
//! The document delivers a small set of events: animation starts on
//! elements and the lifecycle events on the document node. Dispatch walks
//! the ancestor chain in tree order for capture listeners, then visits the
//! target, then climbs back up for bubbling listeners when the event
//! bubbles.
//!
//! A host that keeps the tree behind a `RefCell` builds a [`DispatchPlan`]
//! while borrowed, drops the borrow, and only then calls
//! [`DispatchPlan::run`]. Listeners are therefore free to mutate the tree.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::node::NodeId;
use crate::tree::Dom;

// ─── Event ───────────────────────────────────────────────────────────────────

/// One event on its way through the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// `"animationstart"`, `"webkitAnimationStart"`, `"DOMContentLoaded"`...
    pub type_: String,
    /// Filled in when dispatch starts.
    pub target: Option<NodeId>,
    pub bubbles: bool,
    /// Only set on animation events.
    pub animation_name: Option<String>,
}

impl Event {
    pub fn new(type_: &str, bubbles: bool) -> Self {
        Self {
            type_: type_.to_owned(),
            target: None,
            bubbles,
            animation_name: None,
        }
    }

    /// Animation events bubble, so a single listener on the document
    /// sees every element that starts an animation.
    pub fn animation(type_: &str, animation_name: &str) -> Self {
        let mut event = Self::new(type_, true);
        event.animation_name = Some(animation_name.to_owned());
        event
    }

    pub fn is_animation(&self) -> bool {
        self.animation_name.is_some()
    }
}

// ─── Listeners ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct EventListener {
    pub type_: String,
    pub capture: bool,
    handler: Rc<dyn Fn(&mut Event)>,
}

impl EventListener {
    pub fn new<F>(type_: &str, capture: bool, handler: F) -> Self
    where
        F: Fn(&mut Event) + 'static,
    {
        Self {
            type_: type_.to_owned(),
            capture,
            handler: Rc::new(handler),
        }
    }

    pub fn call(&self, event: &mut Event) {
        (self.handler)(event)
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({}, capture={})", self.type_, self.capture)
    }
}

/// Listeners keyed by the node they were added to, in registration order.
#[derive(Debug, Default)]
pub struct EventTargetMap {
    by_node: HashMap<NodeId, Vec<EventListener>>,
}

impl EventTargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, node: NodeId, listener: EventListener) {
        self.by_node.entry(node).or_default().push(listener);
    }

    pub fn listener_count(&self, node: NodeId, type_: &str) -> usize {
        self.of_type(node, type_).count()
    }

    fn of_type<'a>(&'a self, node: NodeId, type_: &'a str) -> impl Iterator<Item = &'a EventListener> + 'a {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .filter(move |listener| listener.type_ == type_)
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Stop {
    node: NodeId,
    listeners: Vec<EventListener>,
}

/// The listeners an event will reach, captured up front.
///
/// Listeners added while the plan runs are not called for this event.
#[derive(Debug)]
pub struct DispatchPlan {
    target: NodeId,
    /// Ancestors of the target, outermost first.
    ancestors: Vec<Stop>,
    at_target: Vec<EventListener>,
}

impl DispatchPlan {
    pub fn new(dom: &Dom, targets: &EventTargetMap, target: NodeId, type_: &str) -> Self {
        let collect = |node: NodeId| targets.of_type(node, type_).cloned().collect::<Vec<_>>();
        let ancestors = dom
            .ancestors(target)
            .into_iter()
            .rev()
            .map(|node| Stop {
                node,
                listeners: collect(node),
            })
            .filter(|stop| !stop.listeners.is_empty())
            .collect();
        Self {
            target,
            ancestors,
            at_target: collect(target),
        }
    }

    /// Nodes that hold at least one listener for this event, target last.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.ancestors.iter().map(|stop| stop.node).collect();
        if !self.at_target.is_empty() {
            nodes.push(self.target);
        }
        nodes
    }

    pub fn run(&self, event: &mut Event) {
        event.target = Some(self.target);

        for stop in &self.ancestors {
            stop.listeners
                .iter()
                .filter(|l| l.capture)
                .for_each(|l| l.call(event));
        }
        for listener in &self.at_target {
            listener.call(event);
        }
        if !event.bubbles {
            return;
        }
        for stop in self.ancestors.iter().rev() {
            stop.listeners
                .iter()
                .filter(|l| !l.capture)
                .for_each(|l| l.call(event));
        }
    }
}

/// Plan and run in one go, for callers that own the tree outright.
pub fn dispatch_event(dom: &Dom, targets: &EventTargetMap, target: NodeId, event: &mut Event) {
    DispatchPlan::new(dom, targets, target, &event.type_).run(event);
}
