//! The fan-out engine: persist one notification, then attempt push.
//!
//! The two steps are not transactional. Persistence defines success; push
//! runs only after it and reports counts that can never undo the write.

use std::sync::Arc;

use serde::Serialize;
use taskdesk_core::{
  codec::encode_id_list,
  id::{AccountId, TaskId, WorkspaceId},
  notification::{NewNotification, Notification, NotificationKind, NotificationPriority},
  store::{DirectoryStore, NotificationStore},
  task::Task,
};

use crate::{
  Error, Result,
  assignees::assignee_accounts,
  push::{PushMessage, PushReport, PushTransport, dispatch},
  recipients::{Target, resolve_recipients},
};

/// What to announce; who to announce it to is supplied separately.
#[derive(Debug, Clone)]
pub struct Notice {
  pub title:        String,
  pub message:      String,
  pub kind:         NotificationKind,
  pub priority:     NotificationPriority,
  pub workspace_id: WorkspaceId,
  pub created_by:   AccountId,
  pub task_id:      Option<TaskId>,
}

impl Notice {
  /// Reject blank titles and messages before anything is written.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::Validation("title is required".into()));
    }
    if self.message.trim().is_empty() {
      return Err(Error::Validation("message is required".into()));
    }
    if self.workspace_id.as_str().trim().is_empty() {
      return Err(Error::Validation("workspaceId is required".into()));
    }
    Ok(())
  }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
  pub notification: Notification,
  pub recipients:   Vec<AccountId>,
  pub push:         PushReport,
}

/// Fan-out engine over a store `S` and a push transport `P`.
///
/// Calling it twice with the same input creates two documents.
pub struct FanOut<S, P> {
  store:     Arc<S>,
  transport: Arc<P>,
}

impl<S, P> Clone for FanOut<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      transport: Arc::clone(&self.transport),
    }
  }
}

impl<S, P> FanOut<S, P>
where
  S: NotificationStore,
  P: PushTransport,
{
  pub fn new(store: Arc<S>, transport: Arc<P>) -> Self { Self { store, transport } }

  /// Persist `notice` for already-resolved account ids, then push.
  pub async fn deliver(
    &self,
    notice: Notice,
    recipients: Vec<AccountId>,
  ) -> Result<FanOutReport> {
    notice.validate()?;
    if recipients.is_empty() {
      return Err(Error::RecipientResolution(
        "notification has no recipients".into(),
      ));
    }

    let notification = self
      .store
      .insert_notification(NewNotification {
        title:         notice.title,
        message:       notice.message,
        kind:          notice.kind,
        priority:      notice.priority,
        recipient_ids: encode_id_list(&recipients),
        workspace_id:  notice.workspace_id,
        created_by:    notice.created_by,
        task_id:       notice.task_id,
      })
      .await
      .map_err(|e| Error::NotificationPersistence(Box::new(e)))?;

    tracing::info!(
      notification_id = %notification.notification_id,
      kind = %notification.kind,
      recipients = recipients.len(),
      "notification persisted"
    );

    let push = self.push(&notification, &recipients).await;

    Ok(FanOutReport {
      notification,
      recipients,
      push,
    })
  }

  /// Best-effort push to every token of `recipients`. Never fails.
  async fn push(&self, notification: &Notification, recipients: &[AccountId]) -> PushReport {
    let tokens = match self.store.push_tokens_for(recipients).await {
      Ok(tokens) => tokens,
      Err(e) => {
        tracing::warn!(
          notification_id = %notification.notification_id,
          error = %e,
          "could not load push tokens; skipping push"
        );
        return PushReport::default();
      }
    };

    if tokens.is_empty() {
      tracing::debug!(
        notification_id = %notification.notification_id,
        "no push tokens registered for recipients"
      );
      return PushReport::default();
    }

    let report = dispatch(
      Arc::clone(&self.transport),
      tokens,
      PushMessage::for_notification(notification),
    )
    .await;

    tracing::info!(
      notification_id = %notification.notification_id,
      succeeded = report.succeeded,
      failed = report.failed,
      "push attempted"
    );
    report
  }
}

impl<S, P> FanOut<S, P>
where
  S: DirectoryStore + NotificationStore,
  P: PushTransport,
{
  /// Resolve `target`, then [`deliver`](Self::deliver).
  pub async fn send(&self, notice: Notice, target: &Target) -> Result<FanOutReport> {
    notice.validate()?;
    let recipients = resolve_recipients(&*self.store, target).await?;
    self.deliver(notice, recipients).await
  }

  /// Notify the accounts behind `assignee_ids` about `task`.
  ///
  /// `assignee_ids` are stored assignee ids (see
  /// [`taskdesk_core::codec::decode_assignee_field`]); they are mapped to
  /// account ids first. Returns `None` when none of them resolve.
  pub async fn notify_task(
    &self,
    task: &Task,
    assignee_ids: &[String],
    kind: NotificationKind,
    message: String,
    actor: &AccountId,
  ) -> Result<Option<FanOutReport>> {
    let recipients = assignee_accounts(&*self.store, assignee_ids).await?;
    if recipients.is_empty() {
      tracing::debug!(task_id = %task.task_id, "no assignee accounts to notify");
      return Ok(None);
    }

    let notice = Notice {
      title: match kind {
        NotificationKind::TaskAssigned => format!("New task: {}", task.title),
        _ => format!("Task updated: {}", task.title),
      },
      message,
      kind,
      priority: NotificationPriority::from(task.priority),
      workspace_id: task.workspace_id.clone(),
      created_by: actor.clone(),
      task_id: Some(task.task_id.clone()),
    };

    self.deliver(notice, recipients).await.map(Some)
  }
}
