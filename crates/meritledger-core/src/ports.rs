//! Injected collaborator interfaces.
//!
//! The realtime channel, totals cache, mailer, user directory, and feature
//! flag all live in the host application; the ledger only talks to these
//! traits.

use async_trait::async_trait;

use crate::Result;
use crate::notify::Alert;

/// Per-user realtime push channel.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Push an alert to one user's live-update channel.
    async fn publish_alert(&self, user: &str, alert: &Alert);

    /// Broadcast the generic "totals changed" signal to all listeners.
    async fn broadcast_totals_changed(&self);
}

/// Cache of per-user point totals.
#[async_trait]
pub trait CachePort: Send + Sync {
    /// Drop any cached totals for the user.
    async fn invalidate_totals(&self, user: &str);
}

/// Transactional email sender.
#[async_trait]
pub trait MailerPort: Send + Sync {
    /// Deliver one email.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; the ledger propagates it without
    /// retrying.
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Directory of application users.
#[async_trait]
pub trait UserDirectoryPort: Send + Sync {
    /// Display name for a user; implementations fall back to the identifier.
    async fn full_name(&self, user: &str) -> String;

    /// Email addresses of all enabled users.
    async fn enabled_user_emails(&self) -> Vec<String>;
}

/// Administrative feature switches.
#[async_trait]
pub trait SettingsPort: Send + Sync {
    /// Whether the energy points feature is enabled.
    async fn energy_points_enabled(&self) -> bool;
}

/// An email message handed to the mailer.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

impl OutgoingEmail {
    /// Creates a new message with no recipients yet.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: Vec::new(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fakes {
    //! Recording port implementations for tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{
        CachePort, MailerPort, NotificationPort, OutgoingEmail, SettingsPort, UserDirectoryPort,
    };
    use crate::notify::{Alert, Notifier};
    use crate::Result;
    use async_trait::async_trait;

    #[derive(Default)]
    pub struct RecordingNotifications {
        pub alerts: Mutex<Vec<(String, Alert)>>,
        pub broadcasts: AtomicUsize,
    }

    #[async_trait]
    impl NotificationPort for RecordingNotifications {
        async fn publish_alert(&self, user: &str, alert: &Alert) {
            self.alerts
                .lock()
                .unwrap()
                .push((user.to_string(), alert.clone()));
        }

        async fn broadcast_totals_changed(&self) {
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    pub struct RecordingCache {
        pub invalidated: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CachePort for RecordingCache {
        async fn invalidate_totals(&self, user: &str) {
            self.invalidated.lock().unwrap().push(user.to_string());
        }
    }

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl MailerPort for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<()> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct StaticDirectory {
        pub names: HashMap<String, String>,
        pub enabled: Vec<String>,
    }

    #[async_trait]
    impl UserDirectoryPort for StaticDirectory {
        async fn full_name(&self, user: &str) -> String {
            self.names
                .get(user)
                .cloned()
                .unwrap_or_else(|| user.to_string())
        }

        async fn enabled_user_emails(&self) -> Vec<String> {
            self.enabled.clone()
        }
    }

    pub struct StaticSettings {
        pub enabled: bool,
    }

    #[async_trait]
    impl SettingsPort for StaticSettings {
        async fn energy_points_enabled(&self) -> bool {
            self.enabled
        }
    }

    /// Handles onto the recording ports behind a [`Notifier`].
    pub struct PortSet {
        pub notifications: Arc<RecordingNotifications>,
        pub cache: Arc<RecordingCache>,
        pub mailer: Arc<RecordingMailer>,
        pub directory: Arc<StaticDirectory>,
    }

    impl PortSet {
        pub fn notifier(&self) -> Notifier {
            Notifier::new(
                self.notifications.clone(),
                self.cache.clone(),
                self.mailer.clone(),
                self.directory.clone(),
            )
        }
    }

    pub fn recording_ports() -> PortSet {
        PortSet {
            notifications: Arc::new(RecordingNotifications::default()),
            cache: Arc::new(RecordingCache::default()),
            mailer: Arc::new(RecordingMailer::default()),
            directory: Arc::new(StaticDirectory::default()),
        }
    }
}
