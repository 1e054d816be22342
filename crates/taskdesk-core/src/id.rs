//! String identifier newtypes.
//!
//! Identifiers are opaque strings. Freshly minted ones are hyphenated UUIDs,
//! but rows written by older deployments may hold anything, so no format is
//! enforced on parse.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      /// Mint a fresh random identifier.
      pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

      pub fn as_str(&self) -> &str { &self.0 }

      pub fn into_inner(self) -> String { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self { Self(s) }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self { Self(s.to_owned()) }
    }

    impl AsRef<str> for $name {
      fn as_ref(&self) -> &str { &self.0 }
    }
  };
}

string_id!(
  /// Identity issued by the identity provider at signup; used for login.
  AccountId
);
string_id!(
  /// Primary key of an employee profile record. Distinct from the account
  /// identity of the same person.
  EmployeeId
);
string_id!(WorkspaceId);
string_id!(TaskId);
string_id!(NotificationId);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_ids_are_distinct() {
    assert_ne!(AccountId::generate(), AccountId::generate());
  }

  #[test]
  fn serializes_as_bare_string() {
    let id = EmployeeId::from("emp-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"emp-1\"");
    let back: EmployeeId = serde_json::from_str("\"emp-1\"").unwrap();
    assert_eq!(back, id);
  }
}
