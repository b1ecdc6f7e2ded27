//! Process bootstrap for the daily selection service.
//!
//! Configuration loading, database location parsing, startup bootstrap and
//! the optional background refresher. The binary in `main.rs` wires these
//! together with [`bleach_api::api_router`].

pub mod config;
pub mod error;
pub mod refresher;

pub use config::{DatabaseLocation, ServerConfig};
pub use error::{Error, Result};

use bleach_store_sqlite::SqliteStore;

/// Open the SQLite store described by `location`.
pub async fn open_store(
  location: &DatabaseLocation,
) -> bleach_store_sqlite::Result<SqliteStore> {
  match location {
    DatabaseLocation::File(path) => SqliteStore::open(path).await,
    DatabaseLocation::Memory => SqliteStore::open_in_memory().await,
  }
}
