//! Event bridge: turns animation-start firings back into rule callbacks.

use std::hash::Hash;
use std::rc::Rc;

use crate::config::DedupPolicy;
use crate::host::{AnimationSignal, SignalSource};
use crate::registry::Registry;

/// Every spelling of the animation-start event shipped by an engine.
pub const ANIMATION_START_EVENTS: [&str; 4] = [
    "animationstart",
    "webkitAnimationStart",
    "oanimationstart",
    "MSAnimationStart",
];

/// Handle one firing. The animation name selects the rule; names that are
/// not ours (other animations on the page) are ignored.
pub fn dispatch<E: Clone + Eq + Hash + std::fmt::Debug>(
    registry: &Registry<E>,
    signal: &AnimationSignal<E>,
    policy: DedupPolicy,
) {
    match registry.get(&signal.animation_name) {
        Some(rule) => {
            if rule.fire_passive(&signal.target, policy) {
                tracing::trace!(rule = %rule.name(), element = ?signal.target, "passive trigger fired");
            } else {
                tracing::trace!(rule = %rule.name(), element = ?signal.target, "already handled by the fallback scan");
            }
        }
        None => {
            tracing::trace!(animation = %signal.animation_name, "ignoring unrelated animation");
        }
    }
}

/// Subscribe the bridge to every animation-start spelling on `source`.
pub fn subscribe<E, S>(source: &S, registry: &Rc<Registry<E>>, policy: DedupPolicy)
where
    E: Clone + Eq + Hash + std::fmt::Debug + 'static,
    S: SignalSource<E> + ?Sized,
{
    for event_name in ANIMATION_START_EVENTS {
        let registry = Rc::clone(registry);
        source.on_animation_start(event_name, Box::new(move |signal| dispatch(&registry, signal, policy)));
    }
    tracing::debug!(rules = registry.len(), "listening for animation starts");
}
