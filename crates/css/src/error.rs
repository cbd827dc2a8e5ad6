use thiserror::Error;

/// Errors raised while parsing selectors or single rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    #[error("empty selector")]
    EmptySelector,
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("unsupported selector feature: {0}")]
    UnsupportedSelector(String),
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("invalid keyframe selector `{0}`")]
    InvalidKeyframeSelector(String),
}
