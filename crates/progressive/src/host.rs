//! The collaborators the engine needs from its host document.
//!
//! Each trait covers one concern so a host can be assembled from separate
//! pieces; [`Host`] is implemented automatically for anything providing all
//! of them.

use std::fmt;
use std::hash::Hash;

use crate::error::InstallError;

// ─────────────────────────────────────────────────────────────────────────────
// Style surface
// ─────────────────────────────────────────────────────────────────────────────

/// A script-visible style declaration, used to probe which animation
/// properties the style engine understands.
pub trait StyleSurface {
    /// Whether the declaration exposes the camel-cased member `name`
    /// (e.g. `"WebkitAnimationName"`).
    fn has_style_property(&self, name: &str) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Element lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Live element queries against the current document.
///
/// Results are in document order and are never cached by the engine.
pub trait ElementLookup {
    /// An element handle. Equality is element identity.
    type Element: Clone + Eq + Hash + fmt::Debug + 'static;

    fn elements_by_tag(&self, tag: &str) -> Vec<Self::Element>;

    /// `None` when the host has no class lookup; the caller then falls back
    /// to [`query`](Self::query).
    fn elements_by_class(&self, class: &str) -> Option<Vec<Self::Element>>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Generic selector query. Malformed selectors yield an empty result.
    fn query(&self, selector: &str) -> Vec<Self::Element>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Trigger sheet
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of installing a batch of generated rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub accepted: usize,
    /// `(index in the batch, reason)` for each rule the host refused.
    pub rejected: Vec<(usize, String)>,
}

/// A style sheet owned by the engine that receives generated trigger rules.
pub trait TriggerSheet {
    /// Append `rules` in order as one batch.
    fn install(&self, rules: &[String]) -> Result<InstallReport, InstallError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Signals
// ─────────────────────────────────────────────────────────────────────────────

/// One animation-start firing as seen on the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSignal<E> {
    pub target: E,
    pub animation_name: String,
}

pub type AnimationListener<E> = Box<dyn Fn(&AnimationSignal<E>)>;
pub type LoadedListener = Box<dyn FnOnce()>;

/// The two inbound signals. Both are delivered asynchronously on the same
/// thread as everything else; listeners are never removed.
pub trait SignalSource<E> {
    /// Listen on the document root for animation-start events of type
    /// `event_name`.
    fn on_animation_start(&self, event_name: &str, listener: AnimationListener<E>);

    /// Run `listener` once when the document's content has loaded. If that
    /// already happened, the listener runs on a later turn.
    fn on_content_loaded(&self, listener: LoadedListener);
}

/// Everything the engine needs, in one bound.
pub trait Host:
    StyleSurface + ElementLookup + TriggerSheet + SignalSource<<Self as ElementLookup>::Element>
{
}

impl<T> Host for T where
    T: StyleSurface + ElementLookup + TriggerSheet + SignalSource<<T as ElementLookup>::Element>
{
}
