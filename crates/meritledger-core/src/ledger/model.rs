//! Ledger entry data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Unique identifier for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl EntryId {
    /// Create a new entry ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Generated by an automated rule.
    Auto,
    /// A peer spent review points to reward the user's work.
    Appreciation,
    /// A peer spent review points to penalize the user's work.
    Criticism,
    /// Movement on the review-point allowance (grant or spend).
    Review,
    /// Administrative compensation of an automated entry.
    Revert,
}

impl EntryType {
    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Auto" => Some(Self::Auto),
            "Appreciation" => Some(Self::Appreciation),
            "Criticism" => Some(Self::Criticism),
            "Review" => Some(Self::Review),
            "Revert" => Some(Self::Revert),
            _ => None,
        }
    }

    /// Convert to the database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Appreciation => "Appreciation",
            Self::Criticism => "Criticism",
            Self::Review => "Review",
            Self::Revert => "Revert",
        }
    }

}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The review flavors a caller can submit against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewType {
    /// Credits the target user's energy points.
    Appreciation,
    /// Debits the target user's energy points.
    Criticism,
}

impl ReviewType {
    /// Signed energy point delta for a review of `magnitude` points.
    #[must_use]
    pub const fn signed(self, magnitude: i64) -> i64 {
        match self {
            Self::Appreciation => magnitude,
            Self::Criticism => -magnitude,
        }
    }
}

impl From<ReviewType> for EntryType {
    fn from(review_type: ReviewType) -> Self {
        match review_type {
            ReviewType::Appreciation => Self::Appreciation,
            ReviewType::Criticism => Self::Criticism,
        }
    }
}

/// Tagged reference to the record an entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRef {
    /// Kind of the referenced record.
    pub doctype: String,
    /// Identifier of the referenced record.
    pub name: String,
}

impl DocRef {
    /// Doctype used when an entry references another ledger entry.
    pub const ENTRY_DOCTYPE: &'static str = "Energy Point Entry";

    /// Create a reference to a record.
    #[must_use]
    pub fn new(doctype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            doctype: doctype.into(),
            name: name.into(),
        }
    }

    /// Create a reference to another ledger entry.
    #[must_use]
    pub fn entry(id: EntryId) -> Self {
        Self::new(Self::ENTRY_DOCTYPE, id.to_string())
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.doctype, self.name)
    }
}

/// One append-only ledger record.
///
/// Immutable once created, except for the one-way `reverted` flag flip
/// performed by the revert workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Account whose balance is affected.
    pub user: String,
    /// Account that caused the entry.
    pub owner: String,
    /// Kind of event recorded.
    pub entry_type: EntryType,
    /// Signed point delta.
    pub points: i64,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// Record the entry is about.
    pub reference: Option<DocRef>,
    /// Automated rule that generated an `Auto` entry.
    pub rule: Option<String>,
    /// True once a revert entry has compensated this entry.
    pub reverted: bool,
    /// For `Revert` entries, the entry being reversed.
    pub revert_of: Option<EntryId>,
    /// Insert timestamp, set by the repository.
    pub creation: DateTime<Utc>,
}

/// Payload for inserting a new ledger entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Account whose balance is affected.
    pub user: String,
    /// Account that causes the entry.
    pub owner: String,
    /// Kind of event recorded.
    pub entry_type: EntryType,
    /// Signed point delta.
    pub points: i64,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// Record the entry is about.
    pub reference: Option<DocRef>,
    /// Automated rule behind an `Auto` entry.
    pub rule: Option<String>,
    /// For `Revert` entries, the entry being reversed.
    pub revert_of: Option<EntryId>,
}

impl NewEntry {
    /// Write-time rules checked on every create path.
    ///
    /// Appreciation and criticism must come from someone else.
    pub(crate) fn validate(&self) -> Result<()> {
        if matches!(
            self.entry_type,
            EntryType::Appreciation | EntryType::Criticism
        ) && self.user == self.owner
        {
            return Err(Error::SelfReview);
        }
        Ok(())
    }
}

/// Input fields for an automated-rule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoEntryFields {
    /// User whose energy points the rule moves.
    pub user: String,
    /// Account on whose behalf the rule fired.
    pub owner: String,
    /// Signed point delta granted by the rule.
    pub points: i64,
    /// Identifier of the automated rule; part of the dedup key.
    pub rule: String,
    /// Optional human-readable reason.
    pub reason: Option<String>,
}

/// Aggregated point totals for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPointTotals {
    /// User the totals belong to.
    pub user: String,
    /// Sum of all non-review point deltas.
    pub energy_points: i64,
    /// Net review-point allowance (grants minus spends).
    pub review_points: i64,
    /// Total review points the user has given away.
    pub given_points: i64,
}

impl UserPointTotals {
    /// Zero totals for a user with no ledger entries.
    #[must_use]
    pub fn empty(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            energy_points: 0,
            review_points: 0,
            given_points: 0,
        }
    }
}

/// A peer review entry as returned by review listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Signed point delta of the review.
    pub points: i64,
    /// Reviewer.
    pub owner: String,
    /// Appreciation or criticism.
    pub review_type: ReviewType,
    /// Reviewed user.
    pub user: String,
    /// Free-text reason supplied by the reviewer.
    pub reason: Option<String>,
    /// When the review was recorded.
    pub creation: DateTime<Utc>,
}
