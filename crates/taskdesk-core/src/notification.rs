//! Notifications and push tokens.
//!
//! One notification document covers every recipient of a fan-out event. The
//! `is_read` flag is shared by all of them: marking it read on behalf of one
//! recipient marks it read for everyone on the document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  Result,
  codec::decode_id_list,
  id::{AccountId, NotificationId, TaskId, WorkspaceId},
  task::TaskPriority,
};

/// How many of the newest notifications are considered when building a
/// requester's list or unread count.
pub const RECENT_NOTIFICATION_WINDOW: usize = 1000;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  TaskAssigned,
  /// Workspace broadcast; visible to everyone in the workspace.
  AdminMessage,
  TaskUpdate,
  #[default]
  General,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationPriority {
  Low,
  #[default]
  Medium,
  High,
}

impl From<TaskPriority> for NotificationPriority {
  fn from(p: TaskPriority) -> Self {
    match p {
      TaskPriority::Low => Self::Low,
      TaskPriority::Medium => Self::Medium,
      TaskPriority::High => Self::High,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub notification_id: NotificationId,
  pub title:           String,
  pub message:         String,
  #[serde(rename = "type")]
  pub kind:            NotificationKind,
  pub priority:        NotificationPriority,
  /// Raw stored recipient list. Expected to be a JSON array of account ids,
  /// but older call paths wrote employee ids and some rows are not valid JSON
  /// at all.
  pub recipient_ids:   String,
  pub workspace_id:    WorkspaceId,
  pub created_by:      AccountId,
  pub task_id:         Option<TaskId>,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

impl Notification {
  /// Strictly decoded recipient ids.
  pub fn recipients(&self) -> Result<Vec<String>> { decode_id_list(&self.recipient_ids) }
}

/// Input to [`crate::store::NotificationStore::insert_notification`].
/// `is_read` always starts out `false`.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub title:         String,
  pub message:       String,
  pub kind:          NotificationKind,
  pub priority:      NotificationPriority,
  /// Already encoded with [`crate::codec::encode_id_list`].
  pub recipient_ids: String,
  pub workspace_id:  WorkspaceId,
  pub created_by:    AccountId,
  pub task_id:       Option<TaskId>,
}

/// A device registration for push delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushToken {
  pub token:      String,
  pub account_id: AccountId,
  pub platform:   Option<String>,
  pub created_at: DateTime<Utc>,
}
