//! Entry creation paths: dedup for automated rules, review movements, reverts.
//!
//! Every successful write is followed by the notifier, so callers get alert,
//! email, and cache side effects without wiring them up themselves. This is
//! the trusted internal path; role checks belong to the service layer.

use tracing::debug;

use super::model::{AutoEntryFields, DocRef, EntryId, EntryType, LedgerEntry, NewEntry};
use super::repository::LedgerRepository;
use crate::notify::Notifier;
use crate::Result;

/// Writes ledger entries and dispatches their notifications.
#[derive(Clone)]
pub struct EntryWriter {
    repo: LedgerRepository,
    notifier: Notifier,
}

impl EntryWriter {
    /// Create a writer over a repository and notifier.
    #[must_use]
    pub fn new(repo: LedgerRepository, notifier: Notifier) -> Self {
        Self { repo, notifier }
    }

    /// Record an automated-rule entry, at most once per natural key.
    ///
    /// Returns `None` without error when an entry with the same
    /// `(user, rule, reference)` tuple already exists, so rules may fire
    /// repeatedly. The check-then-insert is not race-safe; two concurrent
    /// triggers for the same key can both insert.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or mail dispatch fails.
    pub async fn create_auto_entry(
        &self,
        reference: &DocRef,
        fields: AutoEntryFields,
    ) -> Result<Option<LedgerEntry>> {
        if self
            .repo
            .auto_entry_exists(&fields.user, &fields.rule, reference)
            .await?
        {
            debug!(
                user = %fields.user,
                rule = %fields.rule,
                reference = %reference,
                "duplicate automated entry skipped"
            );
            return Ok(None);
        }

        let entry = self
            .repo
            .insert(NewEntry {
                user: fields.user,
                owner: fields.owner,
                entry_type: EntryType::Auto,
                points: fields.points,
                reason: fields.reason,
                reference: Some(reference.clone()),
                rule: Some(fields.rule),
                revert_of: None,
            })
            .await?;
        self.notifier.entry_created(&entry).await?;
        Ok(Some(entry))
    }

    /// Record a movement on a user's review-point allowance.
    ///
    /// Used for administrative grants and for the reviewer-debit side of a
    /// review; never deduplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn create_review_points_entry(
        &self,
        user: &str,
        points: i64,
        reason: Option<&str>,
        reference: Option<&DocRef>,
        owner: &str,
    ) -> Result<LedgerEntry> {
        let entry = self
            .repo
            .insert(NewEntry {
                user: user.to_string(),
                owner: owner.to_string(),
                entry_type: EntryType::Review,
                points,
                reason: reason.map(ToString::to_string),
                reference: reference.cloned(),
                rule: None,
                revert_of: None,
            })
            .await?;
        self.notifier.entry_created(&entry).await?;
        Ok(entry)
    }

    /// Write the linked target-entry/reviewer-debit pair, then notify for
    /// both entries.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SelfReview`] with nothing written if the
    /// target reviews its own owner, or an error if persistence or mail
    /// dispatch fails.
    pub async fn create_review_pair(
        &self,
        target: NewEntry,
        reviewer: &str,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        let (target_entry, debit_entry) = self.repo.create_review_pair(target, reviewer).await?;
        self.notifier.entry_created(&target_entry).await?;
        self.notifier.entry_created(&debit_entry).await?;
        Ok((target_entry, debit_entry))
    }

    /// Reverse an automated entry and notify the affected user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CannotRevert`] for non-`Auto` entries,
    /// [`crate::Error::EntryNotFound`] for unknown ids, or an error if
    /// persistence fails.
    pub async fn revert(&self, id: EntryId, reason: &str, owner: &str) -> Result<LedgerEntry> {
        let entry = self.repo.revert(id, reason, owner).await?;
        self.notifier.entry_created(&entry).await?;
        Ok(entry)
    }
}
