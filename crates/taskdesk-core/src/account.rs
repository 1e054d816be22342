//! Accounts as supplied by the identity provider, and the administrator check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::AccountId;

/// Label carried by administrator accounts.
pub const ADMIN_LABEL: &str = "admin";

/// A login identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub account_id:    AccountId,
  pub email:         String,
  pub name:          String,
  pub labels:        Vec<String>,
  /// Argon2 PHC string. Never leaves the server.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl Account {
  pub fn has_label(&self, label: &str) -> bool {
    self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
  }
}

/// Input to [`crate::store::DirectoryStore::add_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  pub name:          String,
  pub labels:        Vec<String>,
  pub password_hash: String,
}

/// Whether `account` may perform administrator-only actions.
///
/// True when the account carries the [`ADMIN_LABEL`] or its email matches the
/// configured administrator email. Comparison is case-insensitive.
pub fn is_admin(account: &Account, admin_email: &str) -> bool {
  if account.has_label(ADMIN_LABEL) {
    return true;
  }
  let configured = admin_email.trim();
  !configured.is_empty() && account.email.trim().eq_ignore_ascii_case(configured)
}
