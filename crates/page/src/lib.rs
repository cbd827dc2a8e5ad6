//! # Page Crate
//!
//! A headless document for the progressive enhancement engine: a DOM tree,
//! a style engine that starts CSS animations, an event loop and the
//! document lifecycle (`Loading → Interactive → Complete`).
//!
//! [`Document`] implements every host trait of the `progressive` crate.

#![forbid(unsafe_code)]

pub mod document;
pub mod error;
mod host;

pub use document::{Document, DocumentConfig, ReadyState};
pub use error::DocumentError;
