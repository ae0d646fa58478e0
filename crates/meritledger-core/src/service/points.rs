//! Public ledger operations: grants, aggregates, reviews, reverts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::ledger::{
    DocRef, EntryId, EntryWriter, LedgerEntry, LedgerRepository, NewEntry, Review, ReviewType,
    UserPointTotals,
};
use crate::session::{Role, Session};
use crate::Result;

/// The operations the host application calls into.
#[derive(Clone)]
pub struct PointsService {
    repo: LedgerRepository,
    writer: EntryWriter,
}

impl PointsService {
    /// Create the service over a repository and entry writer.
    #[must_use]
    pub fn new(repo: LedgerRepository, writer: EntryWriter) -> Self {
        Self { repo, writer }
    }

    /// Grant review points directly to a user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotPermitted`] unless the caller is a System
    /// Manager, or an error if persistence fails.
    pub async fn add_review_points(
        &self,
        session: &Session,
        user: &str,
        points: i64,
    ) -> Result<LedgerEntry> {
        session.require_role(Role::SystemManager)?;
        self.writer
            .create_review_points_entry(user, points, None, None, &session.user)
            .await
    }

    /// Current totals for one user.
    ///
    /// Always recomputed from the ledger; the per-user cache is only
    /// invalidated, not read. See DESIGN.md.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn energy_points(&self, user: &str) -> Result<UserPointTotals> {
        self.repo.totals_for_user(user).await
    }

    /// The general aggregate as an ordered sequence, optionally filtered by
    /// user and/or a minimum creation timestamp (AND-combined).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn standings(
        &self,
        user: Option<&str>,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserPointTotals>> {
        self.repo.totals(user, from).await
    }

    /// The general aggregate keyed by user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals_by_user(
        &self,
        from: Option<DateTime<Utc>>,
    ) -> Result<HashMap<String, UserPointTotals>> {
        self.repo.totals_by_user(from).await
    }

    /// Spend review points on a record's author.
    ///
    /// The balance check is point-in-time: the caller's `review_points` are
    /// read once, and two concurrent reviews can both pass it. Returns
    /// `Ok(None)` with nothing written when the balance is insufficient;
    /// otherwise both linked entries are written and the target-facing entry
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SelfReview`] if `to_user` is the caller, or an
    /// error if persistence or mail dispatch fails.
    pub async fn submit_review(
        &self,
        session: &Session,
        doc: &DocRef,
        points: i64,
        to_user: &str,
        reason: &str,
        review_type: ReviewType,
    ) -> Result<Option<LedgerEntry>> {
        let balance = self.repo.totals_for_user(&session.user).await?.review_points;
        let magnitude = points.abs();
        if magnitude > balance {
            warn!(
                user = %session.user,
                requested = magnitude,
                available = balance,
                "not enough review points"
            );
            return Ok(None);
        }

        let target = NewEntry {
            user: to_user.to_string(),
            owner: session.user.clone(),
            entry_type: review_type.into(),
            points: review_type.signed(magnitude),
            reason: Some(reason.to_string()),
            reference: Some(doc.clone()),
            rule: None,
            revert_of: None,
        };
        let (entry, _debit) = self.writer.create_review_pair(target, &session.user).await?;
        Ok(Some(entry))
    }

    /// All appreciation/criticism entries referencing a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn reviews(&self, doc: &DocRef) -> Result<Vec<Review>> {
        self.repo.reviews_for(doc).await
    }

    /// Reverse an automated entry with a compensating entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotPermitted`] unless the caller is a System
    /// Manager, [`crate::Error::CannotRevert`] for non-`Auto` entries, or an
    /// error if persistence fails.
    pub async fn revert_entry(
        &self,
        session: &Session,
        id: EntryId,
        reason: &str,
    ) -> Result<LedgerEntry> {
        session.require_role(Role::SystemManager)?;
        self.writer.revert(id, reason, &session.user).await
    }
}
