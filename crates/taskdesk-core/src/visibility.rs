//! Which notifications a requester may see, count and mark read.
//!
//! Stored recipient lists mix identity spaces: most hold account ids, some
//! hold employee ids, and a few are not valid JSON. Every check here accepts a
//! match on either of the requester's identities.

use crate::{
  id::{AccountId, EmployeeId, WorkspaceId},
  notification::{Notification, NotificationKind},
};

/// Both identities of the person making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
  pub account_id:  AccountId,
  /// `None` for accounts without an employee record (admins, unprovisioned).
  pub employee_id: Option<EmployeeId>,
}

impl Requester {
  pub fn new(account_id: AccountId, employee_id: Option<EmployeeId>) -> Self {
    Self { account_id, employee_id }
  }

  /// The requester's non-empty identity strings.
  pub fn identities(&self) -> impl Iterator<Item = &str> {
    std::iter::once(self.account_id.as_str())
      .chain(self.employee_id.as_ref().map(EmployeeId::as_str))
      .filter(|id| !id.is_empty())
  }

  /// Whether `id` names this requester in either identity space.
  pub fn answers_to(&self, id: &str) -> bool {
    let id = id.trim();
    self.identities().any(|own| own == id)
  }
}

/// Whether `notification` is visible to `requester`.
///
/// 1. Broadcasts (`admin_message`) ignore the recipient list and are visible
///    unless a workspace filter is given that names another workspace.
/// 2. Otherwise the recipient list must contain one of the requester's ids.
/// 3. If the list is not valid JSON, a raw substring check stands in.
pub fn is_visible(
  notification: &Notification,
  requester: &Requester,
  workspace: Option<&WorkspaceId>,
) -> bool {
  if notification.kind == NotificationKind::AdminMessage {
    return workspace.is_none_or(|w| *w == notification.workspace_id);
  }

  match notification.recipients() {
    Ok(ids) => ids.iter().any(|id| requester.answers_to(id)),
    Err(e) => {
      tracing::warn!(
        notification_id = %notification.notification_id,
        error = %e,
        "falling back to substring match on recipient list"
      );
      requester
        .identities()
        .any(|id| notification.recipient_ids.contains(id))
    }
  }
}

/// Whether `notification` counts towards `requester`'s unread badge.
pub fn is_unread_for(
  notification: &Notification,
  requester: &Requester,
  workspace: Option<&WorkspaceId>,
) -> bool {
  !notification.is_read && is_visible(notification, requester, workspace)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    id::NotificationId,
    notification::NotificationPriority,
  };

  fn notification(kind: NotificationKind, recipients: &str, ws: &str) -> Notification {
    Notification {
      notification_id: NotificationId::generate(),
      title:           "title".into(),
      message:         "message".into(),
      kind,
      priority:        NotificationPriority::Medium,
      recipient_ids:   recipients.into(),
      workspace_id:    WorkspaceId::from(ws),
      created_by:      AccountId::from("admin"),
      task_id:         None,
      is_read:         false,
      created_at:      Utc::now(),
    }
  }

  fn account_only(id: &str) -> Requester { Requester::new(id.into(), None) }

  fn with_employee(account: &str, employee: &str) -> Requester {
    Requester::new(account.into(), Some(employee.into()))
  }

  // ── Broadcasts ────────────────────────────────────────────────────────────

  #[test]
  fn broadcast_without_filter_is_visible_to_anyone() {
    let n = notification(NotificationKind::AdminMessage, r#"["u1"]"#, "W");
    assert!(is_visible(&n, &account_only("stranger"), None));
  }

  #[test]
  fn broadcast_respects_workspace_filter() {
    let n = notification(NotificationKind::AdminMessage, "[]", "W");
    let me = account_only("u1");
    assert!(is_visible(&n, &me, Some(&WorkspaceId::from("W"))));
    assert!(!is_visible(&n, &me, Some(&WorkspaceId::from("other"))));
  }

  #[test]
  fn broadcast_ignores_malformed_recipients() {
    let n = notification(NotificationKind::AdminMessage, "not-json[", "W");
    assert!(is_visible(&n, &account_only("anyone"), Some(&WorkspaceId::from("W"))));
  }

  // ── Targeted ──────────────────────────────────────────────────────────────

  #[test]
  fn targeted_matches_account_identity() {
    let n = notification(NotificationKind::TaskAssigned, r#"["acct-123"]"#, "W");
    assert!(is_visible(&n, &account_only("acct-123"), None));
  }

  #[test]
  fn targeted_matches_legacy_employee_identity() {
    let n = notification(NotificationKind::TaskAssigned, r#"["acct-123"]"#, "W");
    assert!(is_visible(&n, &with_employee("acct-999", "acct-123"), None));
  }

  #[test]
  fn targeted_hides_from_unrelated_requester() {
    let n = notification(NotificationKind::TaskAssigned, r#"["acct-123"]"#, "W");
    assert!(!is_visible(&n, &with_employee("acct-9", "emp-9"), None));
  }

  #[test]
  fn targeted_ignores_workspace_filter() {
    let n = notification(NotificationKind::General, r#"["u1"]"#, "W");
    assert!(is_visible(&n, &account_only("u1"), Some(&WorkspaceId::from("X"))));
  }

  // ── Malformed ─────────────────────────────────────────────────────────────

  #[test]
  fn malformed_recipients_fall_back_to_substring() {
    let n = notification(NotificationKind::General, "not-json[acct-123", "W");
    assert!(is_visible(&n, &account_only("acct-123"), None));
    assert!(is_visible(&n, &with_employee("x", "json"), None));
    assert!(!is_visible(&n, &account_only("acct-456"), None));
  }

  #[test]
  fn empty_identity_never_matches_by_substring() {
    let n = notification(NotificationKind::General, "not-json[", "W");
    assert!(!is_visible(&n, &with_employee("", ""), None));
  }

  // ── Unread ────────────────────────────────────────────────────────────────

  #[test]
  fn read_notifications_are_not_unread() {
    let mut n = notification(NotificationKind::General, r#"["u1"]"#, "W");
    assert!(is_unread_for(&n, &account_only("u1"), None));
    n.is_read = true;
    assert!(!is_unread_for(&n, &account_only("u1"), None));
    assert!(is_visible(&n, &account_only("u1"), None));
  }
}
