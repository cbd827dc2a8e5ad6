//! Error types surfaced by host collaborators.

use thiserror::Error;

/// Why a batch of trigger rules could not be installed at all.
///
/// Individual rules the host refuses are not errors; they come back in
/// [`InstallReport::rejected`](crate::host::InstallReport::rejected).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("no style sheet available for trigger rules: {0}")]
    SheetUnavailable(String),
}
