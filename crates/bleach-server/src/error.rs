//! Startup error type for `bleach-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("DATABASE_URL environment variable not set")]
  MissingDatabaseUrl,

  #[error("invalid database url: {0}")]
  InvalidDatabaseUrl(#[from] url::ParseError),

  #[error("unsupported database scheme {0:?} (expected \"sqlite\")")]
  UnsupportedScheme(String),

  #[error("database url has no database name")]
  MissingDatabaseName,

  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
