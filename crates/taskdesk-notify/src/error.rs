//! Error type for `taskdesk-notify`.
//!
//! Push delivery failures have no variant; they are counted in
//! [`crate::PushReport`], never raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The requester lacks the role the action needs.
  #[error("not authorized: {0}")]
  Authorization(String),

  /// The request payload is malformed. Raised before any write.
  #[error("invalid request: {0}")]
  Validation(String),

  /// The target resolved to nobody.
  #[error("no recipients: {0}")]
  RecipientResolution(String),

  /// Writing the notification document failed; nothing was pushed.
  #[error("failed to persist notification: {0}")]
  NotificationPersistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
