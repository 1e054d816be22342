//! Tasks and their assignee field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  codec::decode_assignee_field,
  id::{AccountId, TaskId, WorkspaceId},
};

/// Workflow column. Declaration order is board order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  Backlog,
  #[default]
  Todo,
  InProgress,
  InReview,
  Done,
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub task_id:      TaskId,
  pub workspace_id: WorkspaceId,
  pub title:        String,
  pub description:  Option<String>,
  pub status:       TaskStatus,
  pub priority:     TaskPriority,
  pub due_date:     Option<NaiveDate>,
  /// Encoded assignee field; see [`crate::codec`]. Written with employee ids
  /// only, but legacy rows may hold a bare account id.
  pub assignee_id:  String,
  pub created_by:   AccountId,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Task {
  /// Decoded assignee ids, in stored order.
  pub fn assignees(&self) -> Vec<String> { decode_assignee_field(&self.assignee_id) }
}

/// Input to [`crate::store::DirectoryStore::add_task`].
#[derive(Debug, Clone)]
pub struct NewTask {
  pub workspace_id: WorkspaceId,
  pub title:        String,
  pub description:  Option<String>,
  pub status:       TaskStatus,
  pub priority:     TaskPriority,
  pub due_date:     Option<NaiveDate>,
  /// Already encoded with [`crate::codec::encode_assignee_field`].
  pub assignee_id:  String,
  pub created_by:   AccountId,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<TaskStatus>,
  pub priority:    Option<TaskPriority>,
  pub due_date:    Option<NaiveDate>,
  pub assignee_id: Option<String>,
}

impl TaskPatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.description.is_none()
      && self.status.is_none()
      && self.priority.is_none()
      && self.due_date.is_none()
      && self.assignee_id.is_none()
  }
}
