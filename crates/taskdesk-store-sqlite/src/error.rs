//! Error type for `taskdesk-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] taskdesk_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("an account with email {0:?} already exists")]
  EmailTaken(String),

  #[error("account {0} already has an employee record")]
  EmployeeExists(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
