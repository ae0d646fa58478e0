//! Periodic leaderboard emails.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::ledger::{LedgerRepository, UserPointTotals};
use crate::ports::{MailerPort, OutgoingEmail, SettingsPort, UserDirectoryPort};
use crate::Result;

/// Reporting window for the summary job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPeriod {
    /// Trailing 7 days.
    Weekly,
    /// Trailing 30 days.
    Monthly,
}

impl SummaryPeriod {
    /// Length of the trailing window in days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }

    /// Label used in the email subject.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    fn footer(self, from: NaiveDate, to: NaiveDate) -> String {
        match self {
            Self::Weekly => {
                format!("Stats based on last week's performance (from {from} to {to})")
            }
            Self::Monthly => {
                format!("Stats based on last month's performance (from {from} to {to})")
            }
        }
    }
}

/// Scheduled job that mails the energy point leaderboard to all enabled
/// users.
#[derive(Clone)]
pub struct SummaryReporter {
    repo: LedgerRepository,
    directory: Arc<dyn UserDirectoryPort>,
    mailer: Arc<dyn MailerPort>,
    settings: Arc<dyn SettingsPort>,
}

impl SummaryReporter {
    /// Create the reporter over the repository and host ports.
    #[must_use]
    pub fn new(
        repo: LedgerRepository,
        directory: Arc<dyn UserDirectoryPort>,
        mailer: Arc<dyn MailerPort>,
        settings: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            repo,
            directory,
            mailer,
            settings,
        }
    }

    /// Send the weekly summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query or mail dispatch fails.
    pub async fn send_weekly_summary(&self) -> Result<()> {
        self.send_summary(SummaryPeriod::Weekly).await
    }

    /// Send the monthly summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query or mail dispatch fails.
    pub async fn send_monthly_summary(&self) -> Result<()> {
        self.send_summary(SummaryPeriod::Monthly).await
    }

    /// Run the aggregate over the trailing window and email the leaderboard.
    ///
    /// No-op when the feature is disabled or the window shows no energy
    /// point activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregate query or mail dispatch fails.
    pub async fn send_summary(&self, period: SummaryPeriod) -> Result<()> {
        if !self.settings.energy_points_enabled().await {
            return Ok(());
        }

        let to_date = Utc::now();
        let from_date = to_date - Duration::days(period.days());
        let standings = self.repo.totals(None, Some(from_date)).await?;

        let Some(top_performer) = standings.first() else {
            return Ok(());
        };
        if top_performer.energy_points == 0 {
            debug!("no energy point activity in window, skipping summary");
            return Ok(());
        }

        let recipients = self.directory.enabled_user_emails().await;
        if recipients.is_empty() {
            debug!("no enabled users to report to");
            return Ok(());
        }

        let top_reviewer = standings
            .iter()
            .max_by_key(|row| row.given_points)
            .unwrap_or(top_performer);
        let body = render_summary(
            period,
            top_performer,
            top_reviewer,
            &standings,
            from_date.date_naive(),
            to_date.date_naive(),
        );

        let mut email = OutgoingEmail::new(
            format!("{} energy points summary", period.label()),
            body,
        );
        for recipient in recipients {
            email = email.to(recipient);
        }

        info!(period = period.label(), "sending energy points summary");
        self.mailer.send(email).await
    }
}

/// Plain-text leaderboard: top performer, top reviewer, top-10 standings,
/// and the date-range footer.
fn render_summary(
    period: SummaryPeriod,
    top_performer: &UserPointTotals,
    top_reviewer: &UserPointTotals,
    standings: &[UserPointTotals],
    from: NaiveDate,
    to: NaiveDate,
) -> String {
    use std::fmt::Write;

    let mut body = String::new();
    let _ = writeln!(
        body,
        "Top performer: {} with {} energy points",
        top_performer.user, top_performer.energy_points
    );
    let _ = writeln!(
        body,
        "Top reviewer: {} with {} points given",
        top_reviewer.user, top_reviewer.given_points
    );
    body.push('\n');

    let _ = writeln!(body, "Standings:");
    for (rank, row) in standings.iter().take(10).enumerate() {
        let _ = writeln!(
            body,
            "{}. {} - {} energy points ({} given)",
            rank + 1,
            row.user,
            row.energy_points,
            row.given_points
        );
    }
    body.push('\n');

    body.push_str(&period.footer(from, to));
    body
}
