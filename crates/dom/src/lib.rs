//! Document Object Model.
//!
//! Index-based DOM tree with event dispatch. Nodes are addressed by
//! [`NodeId`] handles instead of `Rc`/`RefCell` links.

pub mod error;
pub mod event;
pub mod node;
pub mod tree;

pub use error::DomError;
pub use event::*;
pub use node::*;
pub use tree::Dom;
