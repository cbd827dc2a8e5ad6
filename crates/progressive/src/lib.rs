//! # Progressive
//!
//! Run a callback once for every element matching a selector as soon as the
//! element enters the document, without polling and without mutation
//! observers.
//!
//! For each rule the engine installs a style rule that gives matching
//! elements a near-zero-length animation of an invisible property. Engines
//! fire `animationstart` when such an element is rendered, whether it was
//! parsed or inserted later by a script; the event bridge maps the
//! animation name back to the rule. A one-time scan when the content has
//! loaded covers hosts without animation events.
//!
//! ```ignore
//! let handle = progressive::enhance(
//!     document.clone(),
//!     RuleSet::new().rule("highlight", ".note", |el: &NodeId| mark(*el)),
//! );
//! ```

pub mod bridge;
pub mod capability;
pub mod compiler;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod fallback;
pub mod host;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use capability::{Capability, VendorPrefix};
pub use config::{DedupPolicy, EnhanceConfig};
pub use enhancer::{Enhancement, Enhancer, Phase, enhance};
pub use error::InstallError;
pub use host::{
    AnimationListener, AnimationSignal, ElementLookup, Host, InstallReport, LoadedListener,
    SignalSource, StyleSurface, TriggerSheet,
};
pub use registry::{OnMatch, Registry, Rule, RuleSet};
pub use resolver::{SelectorKind, classify, resolve};
