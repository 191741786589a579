//! Storage backends for the deposits table.

pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod traits;

pub use memory::MemoryDepositStore;
pub use postgres::PgDepositStore;
pub use traits::{DepositStore, StoredRow};
