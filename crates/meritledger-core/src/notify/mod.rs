//! Alert composition and post-write notification dispatch.

mod alert;
mod notifier;

pub use alert::{Alert, Indicator, alert_for};
pub use notifier::Notifier;
