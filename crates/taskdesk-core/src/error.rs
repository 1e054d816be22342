//! Error types for `taskdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A stored id list could not be parsed as a JSON array of strings.
  #[error("malformed id list {raw:?}: {source}")]
  MalformedIdList {
    raw:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
