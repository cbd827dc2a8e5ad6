//! The fallback scan, run once when the document's content has loaded.
//!
//! It covers hosts without animation events, elements that never rendered
//! (hidden subtrees do not animate), and triggers the host rejected.

use std::hash::Hash;

use crate::config::DedupPolicy;
use crate::host::ElementLookup;
use crate::registry::{Registry, Rule};
use crate::resolver::resolve;

/// Re-resolve every rule, in registry order, and invoke callbacks for the
/// matches `policy` considers unhandled. Returns the number of invocations.
pub fn scan<L>(lookup: &L, registry: &Registry<L::Element>, policy: DedupPolicy) -> usize
where
    L: ElementLookup + ?Sized,
{
    let mut invoked = 0;
    for rule in registry.iter() {
        let matches = resolve(lookup, rule.selector());
        let pending = pending_elements(rule, matches, policy);
        tracing::trace!(rule = %rule.name(), pending = pending.len(), "fallback scan");
        for element in &pending {
            rule.fire_fallback(element);
        }
        invoked += pending.len();
    }
    tracing::debug!(invoked, ?policy, "fallback scan finished");
    invoked
}

fn pending_elements<E: Clone + Eq + Hash>(rule: &Rule<E>, matches: Vec<E>, policy: DedupPolicy) -> Vec<E> {
    match policy {
        DedupPolicy::ElementIdentity => matches.into_iter().filter(|e| !rule.has_notified(e)).collect(),
        DedupPolicy::InvocationCount => {
            if rule.invocation_count() < matches.len() as u64 {
                matches
            } else {
                Vec::new()
            }
        }
    }
}
