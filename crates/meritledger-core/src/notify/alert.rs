//! User-facing alert payloads composed per entry type.

use serde::{Deserialize, Serialize};

use crate::ledger::{EntryType, LedgerEntry};

/// Color hint shown next to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Points gained.
    Green,
    /// Points lost or taken away.
    Red,
}

impl Indicator {
    /// String form used by the realtime channel.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// Payload pushed to the affected user's live-update channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Human-readable message.
    pub message: String,
    /// Color hint.
    pub indicator: Indicator,
}

/// Compose the alert for a freshly persisted entry.
///
/// Review entries produce no alert; the reviewer already knows.
#[must_use]
pub fn alert_for(entry: &LedgerEntry, owner_name: &str) -> Option<Alert> {
    let reference = entry
        .reference
        .as_ref()
        .map_or_else(|| "a record".to_string(), ToString::to_string);

    match entry.entry_type {
        EntryType::Auto => Some(Alert {
            message: format!("You gained {} points", entry.points),
            indicator: Indicator::Green,
        }),
        EntryType::Appreciation => Some(Alert {
            message: format!(
                "{owner_name} appreciated your work on {reference} with {} points",
                entry.points
            ),
            indicator: Indicator::Green,
        }),
        EntryType::Criticism => Some(Alert {
            message: format!(
                "{owner_name} criticized your work on {reference} with {} points",
                entry.points
            ),
            indicator: Indicator::Red,
        }),
        EntryType::Revert => Some(Alert {
            message: format!("{owner_name} reverted your points on {reference}"),
            indicator: Indicator::Red,
        }),
        EntryType::Review => None,
    }
}
