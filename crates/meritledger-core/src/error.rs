//! Error types for the core library.

use thiserror::Error;

use crate::ledger::EntryId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Appreciation or criticism entry with `user == owner`.
    #[error("you cannot give review points to yourself")]
    SelfReview,

    /// Caller lacks the role a privileged operation requires.
    #[error("not permitted: {0}")]
    NotPermitted(&'static str),

    /// Revert requested for an entry that is not automated.
    #[error("entry {0} cannot be reverted")]
    CannotRevert(EntryId),

    /// No ledger entry with the given id.
    #[error("entry {0} not found")]
    EntryNotFound(EntryId),

    /// A stored row could not be decoded into a ledger entry.
    #[error("corrupt ledger row: {0}")]
    Decode(String),

    /// The mailer collaborator failed to deliver.
    #[error("mail error: {0}")]
    Mail(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
