//! Route handlers, one module per resource.

pub mod employees;
pub mod fcm;
pub mod notifications;
pub mod tasks;
pub mod workspaces;

use serde::Serialize;
use taskdesk_core::{account::Account, id::NotificationId, visibility::Requester};
use taskdesk_notify::{FanOutReport, access, identity::IdentityResolver};

use crate::{AppState, Store, error::ApiError};

/// Reject non-administrators with 403.
fn require_admin<S: Store>(state: &AppState<S>, account: &Account) -> Result<(), ApiError> {
  access::require_admin(account, &state.config.admin_email).map_err(ApiError::from)
}

/// Both identities of the caller, for visibility and assignment checks.
async fn requester<S: Store>(state: &AppState<S>, account: &Account) -> Result<Requester, ApiError> {
  Ok(
    IdentityResolver::new(&*state.store)
      .requester(&account.account_id)
      .await?,
  )
}

/// Response body for every route that triggers a fan-out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
  pub notification_id: NotificationId,
  pub recipients:      usize,
  pub success_count:   usize,
  pub failure_count:   usize,
}

impl From<FanOutReport> for SendResponse {
  fn from(report: FanOutReport) -> Self {
    Self {
      notification_id: report.notification.notification_id,
      recipients:      report.recipients.len(),
      success_count:   report.push.succeeded,
      failure_count:   report.push.failed,
    }
  }
}

/// `Some(trimmed)` when `s` has non-whitespace content.
fn non_blank(s: &str) -> Option<&str> {
  let trimmed = s.trim();
  (!trimmed.is_empty()).then_some(trimmed)
}
