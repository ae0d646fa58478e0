//! Service layer exposing the public ledger operations.

pub mod points;
pub mod summary;

pub use points::PointsService;
pub use summary::{SummaryPeriod, SummaryReporter};
