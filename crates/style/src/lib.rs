//! # Style Engine
//!
//! Selector matching and CSS Animations start detection for a headless
//! document. Depends only on sibling workspace crates.

pub mod animation;
pub mod engine;
pub mod matching;
pub mod profile;

pub use animation::{
    AnimationStart, AnimationTracker, computed_animation_names, declared_animation_names, is_rendered,
};
pub use engine::{BatchInsert, SheetId, StyleEngine};
pub use matching::{matches_any, matches_compound, matches_selector, query_selector_all};
pub use profile::EngineProfile;
