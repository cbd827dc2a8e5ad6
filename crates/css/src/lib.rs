//! CSS tokenizer, selector parser and rule parser.
//!
//! Only the subset of CSS the style engine evaluates is modelled: selectors,
//! plain declarations and `@keyframes` (unprefixed and vendor-prefixed).

pub mod error;
pub mod parser;
pub mod selector;
pub mod token;

pub use error::CssError;
pub use parser::{
    CssRule, Declaration, KeyframeBlock, KeyframesRule, StyleRule, Stylesheet, parse_declarations,
    parse_rule, parse_stylesheet,
};
pub use selector::{
    AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector,
    parse_selector_list,
};
pub use token::{CssToken, CssTokenizer, tokens_to_css};
