//! Ledger persistence: schema, inserts, and the grouped point aggregate.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use std::collections::HashMap;

use super::model::{DocRef, EntryId, EntryType, LedgerEntry, NewEntry, Review, ReviewType, UserPointTotals};
use crate::{Error, Result};

/// Repository for ledger entries.
///
/// Clones share the same connection pool.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS energy_point_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                owner TEXT NOT NULL,
                entry_type TEXT NOT NULL,
                points INTEGER NOT NULL,
                reason TEXT,
                reference_doctype TEXT,
                reference_name TEXT,
                rule TEXT,
                reverted INTEGER NOT NULL DEFAULT 0,
                revert_of INTEGER,
                creation TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Dedup probe for automated entries. Not UNIQUE: duplicate
        // suppression is a check-then-insert in the writer.
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_energy_point_entries_natural_key
            ON energy_point_entries(user, rule, reference_doctype, reference_name)
            ",
        )
        .execute(&self.pool)
        .await?;

        // Index for review listings per record
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_energy_point_entries_reference
            ON energy_point_entries(reference_doctype, reference_name)
            ",
        )
        .execute(&self.pool)
        .await?;

        // Index for time-windowed aggregation
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_energy_point_entries_creation
            ON energy_point_entries(creation)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert one entry and return the persisted row.
    ///
    /// The `creation` timestamp is set here; callers never supply it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfReview`] for an appreciation/criticism entry with
    /// `user == owner`, or an error if the insert fails.
    pub async fn insert(&self, new: NewEntry) -> Result<LedgerEntry> {
        insert_with(&self.pool, &new).await
    }

    /// Check whether an automated entry with this natural key already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn auto_entry_exists(
        &self,
        user: &str,
        rule: &str,
        reference: &DocRef,
    ) -> Result<bool> {
        let row = sqlx::query(
            r"
            SELECT id FROM energy_point_entries
            WHERE user = ? AND rule = ? AND reference_doctype = ? AND reference_name = ?
            LIMIT 1
            ",
        )
        .bind(user)
        .bind(rule)
        .bind(&reference.doctype)
        .bind(&reference.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Get an entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is corrupt.
    pub async fn get(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(
            r"
            SELECT id, user, owner, entry_type, points, reason,
                   reference_doctype, reference_name, rule, reverted, revert_of, creation
            FROM energy_point_entries
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    /// Insert the target-facing review entry and the reviewer-debit entry in
    /// one transaction.
    ///
    /// The debit carries the same reason, negates the target's point
    /// magnitude, and references the target entry. Either both rows are
    /// committed or neither is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfReview`] before anything is written if the target
    /// entry reviews its own owner, or an error if an insert fails (the
    /// transaction is rolled back).
    pub async fn create_review_pair(
        &self,
        target: NewEntry,
        reviewer: &str,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        target.validate()?;
        let magnitude = target.points.abs();

        let mut tx = self.pool.begin().await?;
        let target_entry = insert_with(&mut *tx, &target).await?;

        let debit = NewEntry {
            user: reviewer.to_string(),
            owner: reviewer.to_string(),
            entry_type: EntryType::Review,
            points: -magnitude,
            reason: target.reason.clone(),
            reference: Some(DocRef::entry(target_entry.id)),
            rule: None,
            revert_of: None,
        };
        let debit_entry = insert_with(&mut *tx, &debit).await?;
        tx.commit().await?;

        Ok((target_entry, debit_entry))
    }

    /// Reverse an automated entry.
    ///
    /// In one transaction: flags the original as reverted and inserts a
    /// compensating entry with negated points, the same user and reference,
    /// and `revert_of` pointing back. Returns the compensating entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if `id` does not exist,
    /// [`Error::CannotRevert`] unless the entry's type is `Auto` (no write
    /// happens in either case), or an error if a statement fails.
    pub async fn revert(&self, id: EntryId, reason: &str, owner: &str) -> Result<LedgerEntry> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            SELECT id, user, owner, entry_type, points, reason,
                   reference_doctype, reference_name, rule, reverted, revert_of, creation
            FROM energy_point_entries
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *tx)
        .await?;

        let original = row
            .as_ref()
            .map(row_to_entry)
            .transpose()?
            .ok_or(Error::EntryNotFound(id))?;

        if original.entry_type != EntryType::Auto {
            return Err(Error::CannotRevert(id));
        }

        sqlx::query("UPDATE energy_point_entries SET reverted = 1 WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        let compensating = NewEntry {
            user: original.user.clone(),
            owner: owner.to_string(),
            entry_type: EntryType::Revert,
            points: -original.points,
            reason: Some(reason.to_string()),
            reference: original.reference.clone(),
            rule: None,
            revert_of: Some(id),
        };
        let entry = insert_with(&mut *tx, &compensating).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Run the grouped point aggregate.
    ///
    /// Per user: `energy_points` sums every non-review delta, `review_points`
    /// sums review deltas, and `given_points` sums the magnitudes of negative
    /// review deltas (points spent on others). Rows are ordered by
    /// `energy_points` descending. When both filters are supplied they are
    /// AND-combined.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals(
        &self,
        user: Option<&str>,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserPointTotals>> {
        let mut sql = String::from(
            r"
            SELECT
                user,
                SUM(CASE WHEN entry_type != 'Review' THEN points ELSE 0 END) AS energy_points,
                SUM(CASE WHEN entry_type = 'Review' THEN points ELSE 0 END) AS review_points,
                SUM(CASE WHEN entry_type = 'Review' AND points < 0 THEN ABS(points) ELSE 0 END) AS given_points
            FROM energy_point_entries
            ",
        );

        let mut conditions: Vec<&str> = Vec::new();
        if user.is_some() {
            conditions.push("user = ?");
        }
        if from.is_some() {
            conditions.push("creation >= ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" GROUP BY user ORDER BY energy_points DESC");

        let mut query = sqlx::query(&sql);
        if let Some(user) = user {
            query = query.bind(user);
        }
        if let Some(from) = from {
            query = query.bind(from.to_rfc3339());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_totals).collect())
    }

    /// Current totals for one user; zero-valued when no entries exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals_for_user(&self, user: &str) -> Result<UserPointTotals> {
        let rows = self.totals(Some(user), None).await?;
        Ok(rows
            .into_iter()
            .next()
            .unwrap_or_else(|| UserPointTotals::empty(user)))
    }

    /// The aggregate in mapping form, keyed by user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals_by_user(
        &self,
        from: Option<DateTime<Utc>>,
    ) -> Result<HashMap<String, UserPointTotals>> {
        let rows = self.totals(None, from).await?;
        Ok(rows
            .into_iter()
            .map(|totals| (totals.user.clone(), totals))
            .collect())
    }

    /// All appreciation/criticism entries referencing a record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is corrupt.
    pub async fn reviews_for(&self, reference: &DocRef) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r"
            SELECT points, owner, entry_type, user, reason, creation
            FROM energy_point_entries
            WHERE reference_doctype = ? AND reference_name = ?
              AND entry_type IN ('Appreciation', 'Criticism')
            ORDER BY creation DESC
            ",
        )
        .bind(&reference.doctype)
        .bind(&reference.name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_review).collect()
    }
}

/// Insert one validated entry through any executor (pool or transaction).
async fn insert_with<'e, E>(executor: E, new: &NewEntry) -> Result<LedgerEntry>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    new.validate()?;
    let creation = Utc::now();

    let result = sqlx::query(
        r"
        INSERT INTO energy_point_entries
            (user, owner, entry_type, points, reason,
             reference_doctype, reference_name, rule, reverted, revert_of, creation)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        ",
    )
    .bind(&new.user)
    .bind(&new.owner)
    .bind(new.entry_type.as_str())
    .bind(new.points)
    .bind(new.reason.as_deref())
    .bind(new.reference.as_ref().map(|r| r.doctype.as_str()))
    .bind(new.reference.as_ref().map(|r| r.name.as_str()))
    .bind(new.rule.as_deref())
    .bind(new.revert_of.map(|id| id.0))
    .bind(creation.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(LedgerEntry {
        id: EntryId(result.last_insert_rowid()),
        user: new.user.clone(),
        owner: new.owner.clone(),
        entry_type: new.entry_type,
        points: new.points,
        reason: new.reason.clone(),
        reference: new.reference.clone(),
        rule: new.rule.clone(),
        reverted: false,
        revert_of: new.revert_of,
        creation,
    })
}

/// Convert a database row to a `LedgerEntry`.
fn row_to_entry(row: &SqliteRow) -> Result<LedgerEntry> {
    let type_str: String = row.get("entry_type");
    let entry_type = EntryType::parse(&type_str)
        .ok_or_else(|| Error::Decode(format!("unknown entry type `{type_str}`")))?;

    let creation_str: String = row.get("creation");
    let creation = DateTime::parse_from_rfc3339(&creation_str)
        .map_err(|e| Error::Decode(format!("bad creation timestamp `{creation_str}`: {e}")))?
        .with_timezone(&Utc);

    let reference = match (
        row.get::<Option<String>, _>("reference_doctype"),
        row.get::<Option<String>, _>("reference_name"),
    ) {
        (Some(doctype), Some(name)) => Some(DocRef { doctype, name }),
        _ => None,
    };

    Ok(LedgerEntry {
        id: EntryId(row.get("id")),
        user: row.get("user"),
        owner: row.get("owner"),
        entry_type,
        points: row.get("points"),
        reason: row.get("reason"),
        reference,
        rule: row.get("rule"),
        reverted: row.get::<i64, _>("reverted") != 0,
        revert_of: row.get::<Option<i64>, _>("revert_of").map(EntryId),
        creation,
    })
}

fn row_to_totals(row: &SqliteRow) -> UserPointTotals {
    UserPointTotals {
        user: row.get("user"),
        energy_points: row.get("energy_points"),
        review_points: row.get("review_points"),
        given_points: row.get("given_points"),
    }
}

fn row_to_review(row: &SqliteRow) -> Result<Review> {
    let type_str: String = row.get("entry_type");
    let review_type = match type_str.as_str() {
        "Appreciation" => ReviewType::Appreciation,
        "Criticism" => ReviewType::Criticism,
        other => return Err(Error::Decode(format!("unexpected review type `{other}`"))),
    };

    let creation_str: String = row.get("creation");
    let creation = DateTime::parse_from_rfc3339(&creation_str)
        .map_err(|e| Error::Decode(format!("bad creation timestamp `{creation_str}`: {e}")))?
        .with_timezone(&Utc);

    Ok(Review {
        points: row.get("points"),
        owner: row.get("owner"),
        review_type,
        user: row.get("user"),
        reason: row.get("reason"),
        creation,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(entry_type: EntryType, user: &str, owner: &str, points: i64) -> NewEntry {
        NewEntry {
            user: user.to_string(),
            owner: owner.to_string(),
            entry_type,
            points,
            reason: None,
            reference: None,
            rule: None,
            revert_of: None,
        }
    }

    fn auto_entry(user: &str, points: i64, rule: &str, doc: &DocRef) -> NewEntry {
        NewEntry {
            rule: Some(rule.to_string()),
            reference: Some(doc.clone()),
            ..entry(EntryType::Auto, user, "admin@example.com", points)
        }
    }

    /// Shift an entry's creation timestamp into the past.
    async fn backdate(repo: &LedgerRepository, id: EntryId, days: i64) {
        let creation = (Utc::now() - chrono::Duration::days(days)).to_rfc3339();
        sqlx::query("UPDATE energy_point_entries SET creation = ? WHERE id = ?")
            .bind(creation)
            .bind(id.0)
            .execute(&repo.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_creation() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let created = repo
            .insert(auto_entry(
                "amira@example.com",
                10,
                "closed-task",
                &DocRef::new("Task", "TASK-0001"),
            ))
            .await
            .unwrap();

        let loaded = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.user, "amira@example.com");
        assert_eq!(loaded.entry_type, EntryType::Auto);
        assert_eq!(loaded.points, 10);
        assert_eq!(loaded.rule.as_deref(), Some("closed-task"));
        assert_eq!(
            loaded.reference,
            Some(DocRef::new("Task", "TASK-0001"))
        );
        assert!(!loaded.reverted);
        assert_eq!(loaded.creation, created.creation);
    }

    #[tokio::test]
    async fn test_insert_rejects_self_review() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let result = repo
            .insert(entry(
                EntryType::Appreciation,
                "amira@example.com",
                "amira@example.com",
                5,
            ))
            .await;
        assert!(matches!(result, Err(Error::SelfReview)));

        // Nothing was written.
        assert!(repo.totals(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_entry_exists_probe() {
        let repo = LedgerRepository::in_memory().await.unwrap();
        let doc = DocRef::new("Task", "TASK-0001");

        assert!(
            !repo
                .auto_entry_exists("amira@example.com", "closed-task", &doc)
                .await
                .unwrap()
        );

        repo.insert(auto_entry("amira@example.com", 10, "closed-task", &doc))
            .await
            .unwrap();

        assert!(
            repo.auto_entry_exists("amira@example.com", "closed-task", &doc)
                .await
                .unwrap()
        );
        // A different rule on the same record is a different natural key.
        assert!(
            !repo
                .auto_entry_exists("amira@example.com", "reopened-task", &doc)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_totals_partitions_energy_and_review_points() {
        let repo = LedgerRepository::in_memory().await.unwrap();
        let user = "amira@example.com";

        repo.insert(auto_entry(user, 10, "closed-task", &DocRef::new("Task", "T-1")))
            .await
            .unwrap();
        repo.insert(entry(EntryType::Appreciation, user, "noor@example.com", 5))
            .await
            .unwrap();
        repo.insert(entry(EntryType::Review, user, user, -3))
            .await
            .unwrap();
        repo.insert(entry(EntryType::Review, user, user, -3))
            .await
            .unwrap();

        let totals = repo.totals_for_user(user).await.unwrap();
        assert_eq!(totals.energy_points, 15);
        assert_eq!(totals.review_points, -6);
        assert_eq!(totals.given_points, 6);
    }

    #[tokio::test]
    async fn test_totals_given_points_ignores_grants() {
        let repo = LedgerRepository::in_memory().await.unwrap();
        let user = "amira@example.com";

        repo.insert(entry(EntryType::Review, user, "admin@example.com", 20))
            .await
            .unwrap();
        repo.insert(entry(EntryType::Review, user, user, -8))
            .await
            .unwrap();

        let totals = repo.totals_for_user(user).await.unwrap();
        assert_eq!(totals.energy_points, 0);
        assert_eq!(totals.review_points, 12);
        assert_eq!(totals.given_points, 8);
    }

    #[tokio::test]
    async fn test_totals_ordered_by_energy_points_desc() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        repo.insert(auto_entry("low@example.com", 5, "r", &DocRef::new("Task", "T-1")))
            .await
            .unwrap();
        repo.insert(auto_entry("high@example.com", 50, "r", &DocRef::new("Task", "T-2")))
            .await
            .unwrap();
        repo.insert(auto_entry("mid@example.com", 20, "r", &DocRef::new("Task", "T-3")))
            .await
            .unwrap();

        let standings = repo.totals(None, None).await.unwrap();
        let users: Vec<&str> = standings.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(
            users,
            ["high@example.com", "mid@example.com", "low@example.com"]
        );
    }

    #[tokio::test]
    async fn test_totals_user_and_from_date_filters_combine() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let old = repo
            .insert(auto_entry("amira@example.com", 10, "r", &DocRef::new("Task", "T-1")))
            .await
            .unwrap();
        backdate(&repo, old.id, 30).await;
        repo.insert(auto_entry("amira@example.com", 7, "r", &DocRef::new("Task", "T-2")))
            .await
            .unwrap();
        repo.insert(auto_entry("noor@example.com", 3, "r", &DocRef::new("Task", "T-3")))
            .await
            .unwrap();

        let from = Utc::now() - chrono::Duration::days(7);

        // Both filters at once: only amira's recent entry counts.
        let filtered = repo.totals(Some("amira@example.com"), Some(from)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].energy_points, 7);

        // User filter alone sees the backdated entry too.
        let all_time = repo.totals(Some("amira@example.com"), None).await.unwrap();
        assert_eq!(all_time[0].energy_points, 17);

        // Window filter alone covers both users.
        let windowed = repo.totals(None, Some(from)).await.unwrap();
        assert_eq!(windowed.len(), 2);
    }

    #[tokio::test]
    async fn test_totals_for_user_defaults_to_zero() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let totals = repo.totals_for_user("nobody@example.com").await.unwrap();
        assert_eq!(totals, UserPointTotals::empty("nobody@example.com"));
    }

    #[tokio::test]
    async fn test_totals_by_user_mapping_form() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        repo.insert(auto_entry("amira@example.com", 10, "r", &DocRef::new("Task", "T-1")))
            .await
            .unwrap();
        repo.insert(auto_entry("noor@example.com", 3, "r", &DocRef::new("Task", "T-2")))
            .await
            .unwrap();

        let map = repo.totals_by_user(None).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["amira@example.com"].energy_points, 10);
        assert_eq!(map["noor@example.com"].energy_points, 3);
    }

    #[tokio::test]
    async fn test_review_pair_links_debit_to_target() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let target = NewEntry {
            reason: Some("great refactor".to_string()),
            reference: Some(DocRef::new("Task", "TASK-0001")),
            ..entry(
                EntryType::Appreciation,
                "amira@example.com",
                "noor@example.com",
                8,
            )
        };
        let (target_entry, debit) = repo
            .create_review_pair(target, "noor@example.com")
            .await
            .unwrap();

        assert_eq!(target_entry.points, 8);
        assert_eq!(debit.user, "noor@example.com");
        assert_eq!(debit.entry_type, EntryType::Review);
        assert_eq!(debit.points, -8);
        assert_eq!(debit.reason.as_deref(), Some("great refactor"));
        assert_eq!(debit.reference, Some(DocRef::entry(target_entry.id)));

        let reviewer = repo.totals_for_user("noor@example.com").await.unwrap();
        assert_eq!(reviewer.review_points, -8);
        assert_eq!(reviewer.given_points, 8);
    }

    #[tokio::test]
    async fn test_review_pair_writes_nothing_on_self_review() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let target = entry(
            EntryType::Appreciation,
            "noor@example.com",
            "noor@example.com",
            8,
        );
        let result = repo.create_review_pair(target, "noor@example.com").await;
        assert!(matches!(result, Err(Error::SelfReview)));
        assert!(repo.totals(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revert_auto_entry() {
        let repo = LedgerRepository::in_memory().await.unwrap();
        let doc = DocRef::new("Task", "TASK-0001");

        let original = repo
            .insert(auto_entry("amira@example.com", 10, "closed-task", &doc))
            .await
            .unwrap();

        let compensating = repo
            .revert(original.id, "granted by mistake", "admin@example.com")
            .await
            .unwrap();

        assert_eq!(compensating.entry_type, EntryType::Revert);
        assert_eq!(compensating.points, -10);
        assert_eq!(compensating.user, "amira@example.com");
        assert_eq!(compensating.owner, "admin@example.com");
        assert_eq!(compensating.reference, Some(doc));
        assert_eq!(compensating.revert_of, Some(original.id));

        let flagged = repo.get(original.id).await.unwrap().unwrap();
        assert!(flagged.reverted);

        let totals = repo.totals_for_user("amira@example.com").await.unwrap();
        assert_eq!(totals.energy_points, 0);
    }

    #[tokio::test]
    async fn test_revert_refuses_non_auto_entries() {
        let repo = LedgerRepository::in_memory().await.unwrap();

        let review = repo
            .insert(entry(
                EntryType::Review,
                "amira@example.com",
                "admin@example.com",
                5,
            ))
            .await
            .unwrap();
        let result = repo.revert(review.id, "nope", "admin@example.com").await;
        assert!(matches!(result, Err(Error::CannotRevert(id)) if id == review.id));

        let auto = repo
            .insert(auto_entry(
                "amira@example.com",
                10,
                "closed-task",
                &DocRef::new("Task", "T-1"),
            ))
            .await
            .unwrap();
        let compensating = repo.revert(auto.id, "mistake", "admin@example.com").await.unwrap();

        // A revert entry cannot itself be reverted.
        let result = repo
            .revert(compensating.id, "re-grant", "admin@example.com")
            .await;
        assert!(matches!(result, Err(Error::CannotRevert(_))));

        let missing = repo.revert(EntryId::new(9999), "x", "admin@example.com").await;
        assert!(matches!(missing, Err(Error::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn test_reviews_for_reference() {
        let repo = LedgerRepository::in_memory().await.unwrap();
        let doc = DocRef::new("Task", "TASK-0001");

        repo.insert(auto_entry("amira@example.com", 10, "closed-task", &doc))
            .await
            .unwrap();
        repo.insert(NewEntry {
            reason: Some("nice work".to_string()),
            reference: Some(doc.clone()),
            ..entry(
                EntryType::Appreciation,
                "amira@example.com",
                "noor@example.com",
                8,
            )
        })
        .await
        .unwrap();
        repo.insert(NewEntry {
            reference: Some(doc.clone()),
            ..entry(
                EntryType::Criticism,
                "amira@example.com",
                "farid@example.com",
                -3,
            )
        })
        .await
        .unwrap();
        repo.insert(NewEntry {
            reference: Some(doc.clone()),
            ..entry(EntryType::Review, "noor@example.com", "noor@example.com", -8)
        })
        .await
        .unwrap();

        let reviews = repo.reviews_for(&doc).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(
            reviews
                .iter()
                .any(|r| r.review_type == ReviewType::Appreciation
                    && r.owner == "noor@example.com"
                    && r.points == 8
                    && r.reason.as_deref() == Some("nice work"))
        );
        assert!(
            reviews
                .iter()
                .any(|r| r.review_type == ReviewType::Criticism
                    && r.owner == "farid@example.com"
                    && r.points == -3)
        );
    }
}
