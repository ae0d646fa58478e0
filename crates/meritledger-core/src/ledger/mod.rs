//! Append-only energy point ledger: entry model, persistence, and writes.

mod model;
mod repository;
mod writer;

pub use model::{
    AutoEntryFields, DocRef, EntryId, EntryType, LedgerEntry, NewEntry, Review, ReviewType,
    UserPointTotals,
};
pub use repository::LedgerRepository;
pub use writer::EntryWriter;
