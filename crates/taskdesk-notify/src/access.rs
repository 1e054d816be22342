//! Reads and mutations of notifications on behalf of a requester.
//!
//! Reads are filtered with [`taskdesk_core::visibility`]; mark-read is gated
//! on the same visibility rules; delete and the broadcast management view
//! are administrator-only.

use taskdesk_core::{
  account::{Account, is_admin},
  id::{NotificationId, WorkspaceId},
  notification::{Notification, NotificationKind, RECENT_NOTIFICATION_WINDOW},
  store::{NotificationQuery, NotificationStore},
  visibility::{Requester, is_unread_for, is_visible},
};

use crate::{Error, Result};

/// Fail with [`Error::Authorization`] unless `account` is an administrator.
pub fn require_admin(account: &Account, admin_email: &str) -> Result<()> {
  if is_admin(account, admin_email) {
    Ok(())
  } else {
    Err(Error::Authorization("administrator role required".into()))
  }
}

async fn recent<S: NotificationStore>(store: &S) -> Result<Vec<Notification>> {
  let query = NotificationQuery {
    limit: Some(RECENT_NOTIFICATION_WINDOW),
    ..NotificationQuery::default()
  };
  store.query_notifications(&query).await.map_err(Error::store)
}

/// Recent notifications visible to `requester`, newest first.
pub async fn visible_notifications<S: NotificationStore>(
  store: &S,
  requester: &Requester,
  workspace: Option<&WorkspaceId>,
) -> Result<Vec<Notification>> {
  let mut notifications = recent(store).await?;
  notifications.retain(|n| is_visible(n, requester, workspace));
  Ok(notifications)
}

/// How many recent notifications visible to `requester` are still unread.
pub async fn unread_count<S: NotificationStore>(
  store: &S,
  requester: &Requester,
  workspace: Option<&WorkspaceId>,
) -> Result<usize> {
  Ok(
    recent(store)
      .await?
      .iter()
      .filter(|n| is_unread_for(n, requester, workspace))
      .count(),
  )
}

/// Mark each visible notification in `ids` as read; silently skip the rest.
///
/// Read state is per document, so this marks it read for every recipient.
/// Returns how many documents were updated.
pub async fn mark_read<S: NotificationStore>(
  store: &S,
  requester: &Requester,
  ids: &[NotificationId],
) -> Result<usize> {
  let mut updated = 0;
  for id in ids {
    let Some(notification) = store.get_notification(id).await.map_err(Error::store)? else {
      tracing::debug!(notification_id = %id, "mark-read skipped: not found");
      continue;
    };
    if !is_visible(&notification, requester, None) {
      tracing::debug!(
        notification_id = %id,
        account = %requester.account_id,
        "mark-read skipped: not a recipient"
      );
      continue;
    }
    if store.mark_read(id).await.map_err(Error::store)? {
      updated += 1;
    }
  }
  Ok(updated)
}

/// Hard-delete a notification. Administrator only; no ownership check.
///
/// Returns `false` when nothing was deleted.
pub async fn delete_notification<S: NotificationStore>(
  store: &S,
  actor: &Account,
  admin_email: &str,
  id: &NotificationId,
) -> Result<bool> {
  require_admin(actor, admin_email)?;
  let deleted = store.delete_notification(id).await.map_err(Error::store)?;
  if deleted {
    tracing::info!(notification_id = %id, by = %actor.account_id, "notification deleted");
  }
  Ok(deleted)
}

/// Every broadcast of `workspace`, newest first. Administrator only.
pub async fn workspace_broadcasts<S: NotificationStore>(
  store: &S,
  actor: &Account,
  admin_email: &str,
  workspace: &WorkspaceId,
) -> Result<Vec<Notification>> {
  require_admin(actor, admin_email)?;
  let query = NotificationQuery {
    workspace_id: Some(workspace.clone()),
    kind:         Some(NotificationKind::AdminMessage),
    limit:        None,
  };
  store.query_notifications(&query).await.map_err(Error::store)
}
