//! SQLite persistence for the server-side reconciliation mirror.
//!
//! - Database initialization, migrations, and pragmas
//! - Repository layer over mirrored balances/positions/transactions and
//!   the event journal

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{JournalEntry, MirrorPosition, MirrorRepository, MirrorTransaction};
