//! Post-write notification dispatch.

use std::sync::Arc;

use super::alert::{Alert, alert_for};
use crate::ledger::{EntryType, LedgerEntry};
use crate::ports::{CachePort, MailerPort, NotificationPort, OutgoingEmail, UserDirectoryPort};
use crate::Result;

/// Fans a freshly persisted entry out to the user-facing channels.
///
/// Invoked synchronously after the write has committed, so listeners reading
/// back through the aggregate observe the new entry.
#[derive(Clone)]
pub struct Notifier {
    notifications: Arc<dyn NotificationPort>,
    cache: Arc<dyn CachePort>,
    mailer: Arc<dyn MailerPort>,
    directory: Arc<dyn UserDirectoryPort>,
}

impl Notifier {
    /// Create a notifier over the host application's ports.
    #[must_use]
    pub fn new(
        notifications: Arc<dyn NotificationPort>,
        cache: Arc<dyn CachePort>,
        mailer: Arc<dyn MailerPort>,
        directory: Arc<dyn UserDirectoryPort>,
    ) -> Self {
        Self {
            notifications,
            cache,
            mailer,
            directory,
        }
    }

    /// React to a persisted entry: alert, optional email, cache invalidation,
    /// and the generic totals-changed broadcast.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailer fails; alert publication and cache
    /// invalidation are infallible.
    pub async fn entry_created(&self, entry: &LedgerEntry) -> Result<()> {
        let owner_name = self.directory.full_name(&entry.owner).await;
        if let Some(alert) = alert_for(entry, &owner_name) {
            self.notifications.publish_alert(&entry.user, &alert).await;
            if matches!(
                entry.entry_type,
                EntryType::Appreciation | EntryType::Criticism
            ) {
                self.send_points_mail(entry, &alert).await?;
            }
        }

        self.cache.invalidate_totals(&entry.user).await;
        self.notifications.broadcast_totals_changed().await;
        Ok(())
    }

    async fn send_points_mail(&self, entry: &LedgerEntry, alert: &Alert) -> Result<()> {
        let subject = if entry.points > 0 {
            "You gained some energy points"
        } else {
            "You lost some energy points"
        };

        let mut body = alert.message.clone();
        if let Some(reason) = &entry.reason {
            body.push_str("\n\n");
            body.push_str(reason);
        }

        let email = OutgoingEmail::new(subject, body).to(entry.user.clone());
        self.mailer.send(email).await
    }
}
