//! Rules and the registry that owns them.
//!
//! A registry is built once per `enhance` call. Its key set never changes
//! afterwards; only the per-rule counters and the set of notified elements
//! do, through interior mutability, so the bridge and the fallback scan can
//! share one `Rc<Registry>`.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::DedupPolicy;

// ─────────────────────────────────────────────────────────────────────────────
// Callbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Work to run for each element a rule matches.
pub trait OnMatch<E> {
    fn on_match(&self, element: &E);
}

impl<E, F> OnMatch<E> for F
where
    F: Fn(&E),
{
    fn on_match(&self, element: &E) {
        self(element)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RuleSet
// ─────────────────────────────────────────────────────────────────────────────

struct PendingRule<E> {
    name: String,
    selector: String,
    callback: Rc<dyn OnMatch<E>>,
}

/// Rules as declared by the caller, in declaration order.
pub struct RuleSet<E> {
    rules: Vec<PendingRule<E>>,
}

impl<E> Default for RuleSet<E> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<E> RuleSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule. `name` doubles as the trigger's animation name.
    pub fn rule(
        mut self,
        name: impl Into<String>,
        selector: impl Into<String>,
        callback: impl OnMatch<E> + 'static,
    ) -> Self {
        self.rules.push(PendingRule {
            name: name.into(),
            selector: selector.into(),
            callback: Rc::new(callback),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<E> fmt::Debug for RuleSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (&r.name, &r.selector)))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule
// ─────────────────────────────────────────────────────────────────────────────

/// A registered rule and its bookkeeping.
pub struct Rule<E> {
    name: String,
    selector: String,
    callback: Rc<dyn OnMatch<E>>,
    /// Passive firings. Only the event bridge increments it.
    invocation_count: Cell<u64>,
    /// Invocations issued by the fallback scan.
    fallback_invocations: Cell<u64>,
    notified: RefCell<HashSet<E>>,
    /// Elements the fallback scan handled that have not started the trigger
    /// animation since. Their first start is the one they missed.
    scanned: RefCell<HashSet<E>>,
}

impl<E: Clone + Eq + Hash> Rule<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocation_count.get()
    }

    pub fn fallback_invocations(&self) -> u64 {
        self.fallback_invocations.get()
    }

    pub fn has_notified(&self, element: &E) -> bool {
        self.notified.borrow().contains(element)
    }

    pub fn notified_count(&self) -> usize {
        self.notified.borrow().len()
    }

    /// Record a passive firing for `element` and run the callback, unless
    /// `policy` is identity-based and the fallback scan already handled the
    /// element before it ever animated. Returns whether the callback ran.
    pub(crate) fn fire_passive(&self, element: &E, policy: DedupPolicy) -> bool {
        self.invocation_count.set(self.invocation_count.get().saturating_add(1));
        let caught_up = self.scanned.borrow_mut().remove(element);
        if caught_up && policy == DedupPolicy::ElementIdentity {
            return false;
        }
        self.notify(element);
        true
    }

    /// Run the callback on behalf of the fallback scan.
    pub(crate) fn fire_fallback(&self, element: &E) {
        self.fallback_invocations
            .set(self.fallback_invocations.get().saturating_add(1));
        self.scanned.borrow_mut().insert(element.clone());
        self.notify(element);
    }

    fn notify(&self, element: &E) {
        // The borrow ends before the callback runs; callbacks may read the
        // registry through an `Enhancement`.
        self.notified.borrow_mut().insert(element.clone());
        let callback = Rc::clone(&self.callback);
        callback.on_match(element);
    }
}

impl<E> fmt::Debug for Rule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("invocation_count", &self.invocation_count.get())
            .field("fallback_invocations", &self.fallback_invocations.get())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Rule name → rule, in declaration order.
#[derive(Debug)]
pub struct Registry<E> {
    rules: IndexMap<String, Rule<E>>,
}

impl<E: Clone + Eq + Hash> Registry<E> {
    /// Build from declared rules. A repeated name replaces the earlier rule
    /// and keeps its position.
    pub fn from_rules(rules: RuleSet<E>) -> Self {
        let mut map = IndexMap::with_capacity(rules.len());
        for pending in rules.rules {
            let rule = Rule {
                name: pending.name.clone(),
                selector: pending.selector,
                callback: pending.callback,
                invocation_count: Cell::new(0),
                fallback_invocations: Cell::new(0),
                notified: RefCell::new(HashSet::new()),
                scanned: RefCell::new(HashSet::new()),
            };
            if let Some(replaced) = map.insert(pending.name, rule) {
                tracing::warn!(
                    rule = %replaced.name,
                    selector = %replaced.selector,
                    "duplicate rule name, keeping the later declaration"
                );
            }
        }
        Self { rules: map }
    }

    pub fn get(&self, name: &str) -> Option<&Rule<E>> {
        self.rules.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<E>> {
        self.rules.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
