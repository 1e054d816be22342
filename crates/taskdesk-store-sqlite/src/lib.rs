//! SQLite backend for taskdesk.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements both
//! [`taskdesk_core::store::DirectoryStore`] and
//! [`taskdesk_core::store::NotificationStore`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
