//! # meritledger-core
//!
//! Energy points ledger for business applications.
//!
//! This crate provides:
//! - Append-only ledger entries from automated rules, peer
//!   appreciation/criticism, review-point spending, and administrative
//!   reverts
//! - Idempotent creation of rule-generated entries keyed on
//!   `(user, rule, reference)`
//! - Grouped aggregation of energy points, review points, and points given
//! - The capped review workflow: spending review points credits or debits
//!   the target and debits the reviewer in one transaction
//! - Alert and email dispatch through injected host ports
//! - Weekly/monthly leaderboard summary emails

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod ledger;
pub mod notify;
pub mod ports;
pub mod service;
mod session;

pub use error::{Error, Result};
pub use ledger::{
    AutoEntryFields, DocRef, EntryId, EntryType, EntryWriter, LedgerEntry, LedgerRepository,
    NewEntry, Review, ReviewType, UserPointTotals,
};
pub use notify::{Alert, Indicator, Notifier};
pub use ports::{
    CachePort, MailerPort, NotificationPort, OutgoingEmail, SettingsPort, UserDirectoryPort,
};
pub use service::{PointsService, SummaryPeriod, SummaryReporter};
pub use session::{Role, Session};
