use css::CssError;
use dom::DomError;
use style::SheetId;
use thiserror::Error;

/// Errors from document mutation and style sheet edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Css(#[from] CssError),
    #[error("no style sheet {0:?}")]
    UnknownSheet(SheetId),
}
