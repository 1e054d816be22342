//! Handlers for `/tasks`.
//!
//! Assignee ids supplied by callers may be account or employee ids; they are
//! normalized to employee ids before anything is written. Assignment and
//! status changes fan out notifications to the assignees' accounts. A failed
//! notification never fails the task write.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use taskdesk_core::{
  account::{Account, is_admin},
  id::{AccountId, EmployeeId, TaskId, WorkspaceId},
  notification::NotificationKind,
  task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus},
};
use taskdesk_notify::assignees::{diff_assignees, is_assigned_to, normalize_assignee_input};

use super::{non_blank, require_admin, requester};
use crate::{
  AppState, Store,
  auth::CurrentUser,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub workspace_id: Option<WorkspaceId>,
}

/// `GET /tasks[?workspaceId=<id>]`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
  require_admin(&state, &user)?;
  let tasks = state
    .store
    .list_tasks(params.workspace_id.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tasks))
}

/// `GET /tasks/mine`
pub async fn mine<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
  let me = requester(&state, &user).await?;
  let mut tasks = state.store.list_tasks(None).await.map_err(ApiError::store)?;
  tasks.retain(|t| is_assigned_to(t, &me));
  Ok(Json(tasks))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub workspace_id: WorkspaceId,
  pub title:        String,
  #[serde(default)]
  pub description:  Option<String>,
  #[serde(default)]
  pub status:       TaskStatus,
  #[serde(default)]
  pub priority:     TaskPriority,
  #[serde(default)]
  pub due_date:     Option<NaiveDate>,
  #[serde(default)]
  pub assignee_ids: Vec<String>,
}

/// `POST /tasks`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_admin(&state, &user)?;
  let title = non_blank(&body.title)
    .ok_or_else(|| ApiError::BadRequest("title is required".into()))?;

  state
    .store
    .get_workspace(&body.workspace_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("workspace {}", body.workspace_id)))?;

  let assignee_id = normalize_assignee_input(&*state.store, &body.assignee_ids).await?;

  let task = state
    .store
    .add_task(NewTask {
      workspace_id: body.workspace_id,
      title: title.to_string(),
      description: body.description,
      status: body.status,
      priority: body.priority,
      due_date: body.due_date,
      assignee_id,
      created_by: user.account_id.clone(),
    })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(task_id = %task.task_id, workspace = %task.workspace_id, "task created");

  notify_assignees(
    &state,
    &task,
    &task.assignees(),
    NotificationKind::TaskAssigned,
    assignment_message(&task),
    &user.account_id,
  )
  .await;

  Ok((StatusCode::CREATED, Json(task)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchBody {
  pub title:        Option<String>,
  pub description:  Option<String>,
  pub status:       Option<TaskStatus>,
  pub priority:     Option<TaskPriority>,
  pub due_date:     Option<NaiveDate>,
  pub assignee_ids: Option<Vec<String>>,
}

impl PatchBody {
  fn touches_more_than_status(&self) -> bool {
    self.title.is_some()
      || self.description.is_some()
      || self.priority.is_some()
      || self.due_date.is_some()
      || self.assignee_ids.is_some()
  }
}

/// Administrators may change anything; assignees may only move the status.
async fn authorize_update<S: Store>(
  state: &AppState<S>,
  user: &Account,
  task: &Task,
  body: &PatchBody,
) -> Result<(), ApiError> {
  if is_admin(user, &state.config.admin_email) {
    return Ok(());
  }
  let me = requester(state, user).await?;
  if !is_assigned_to(task, &me) {
    return Err(ApiError::Forbidden("not assigned to this task".into()));
  }
  if body.touches_more_than_status() {
    return Err(ApiError::Forbidden("assignees may only change the status".into()));
  }
  Ok(())
}

/// `PATCH /tasks/{id}`
pub async fn update<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<TaskId>,
  JsonBody(body): JsonBody<PatchBody>,
) -> Result<Json<Task>, ApiError> {
  let before = state
    .store
    .get_task(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("task {id}")))?;

  authorize_update(&state, &user, &before, &body).await?;

  if let Some(title) = &body.title
    && non_blank(title).is_none()
  {
    return Err(ApiError::BadRequest("title must not be blank".into()));
  }

  let assignee_id = match &body.assignee_ids {
    Some(ids) => Some(normalize_assignee_input(&*state.store, ids).await?),
    None => None,
  };
  let patch = TaskPatch {
    title: body.title.map(|t| t.trim().to_string()),
    description: body.description,
    status: body.status,
    priority: body.priority,
    due_date: body.due_date,
    assignee_id,
  };
  if patch.is_empty() {
    return Ok(Json(before));
  }

  let after = state
    .store
    .update_task(&id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("task {id}")))?;

  let diff = match diff_assignees(&*state.store, &before.assignees(), &after.assignees()).await {
    Ok(diff) => diff,
    Err(e) => {
      tracing::warn!(task_id = %id, error = %e, "task saved but assignees could not be compared");
      return Ok(Json(after));
    }
  };

  if !diff.added.is_empty() {
    notify_assignees(
      &state,
      &after,
      &as_strings(&diff.added),
      NotificationKind::TaskAssigned,
      assignment_message(&after),
      &user.account_id,
    )
    .await;
  }

  if after.status != before.status && !diff.kept.is_empty() {
    notify_assignees(
      &state,
      &after,
      &as_strings(&diff.kept),
      NotificationKind::TaskUpdate,
      format!("Status changed from {} to {}", before.status, after.status),
      &user.account_id,
    )
    .await;
  }

  Ok(Json(after))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /tasks/{id}`
pub async fn remove<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
  require_admin(&state, &user)?;
  if state.store.delete_task(&id).await.map_err(ApiError::store)? {
    tracing::info!(task_id = %id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("task {id}")))
  }
}

// ─── Notification helpers ─────────────────────────────────────────────────────

fn as_strings(ids: &[EmployeeId]) -> Vec<String> { ids.iter().map(ToString::to_string).collect() }

fn assignment_message(task: &Task) -> String {
  match task.due_date {
    Some(due) => format!("You have been assigned \"{}\" (due {due})", task.title),
    None => format!("You have been assigned \"{}\"", task.title),
  }
}

async fn notify_assignees<S: Store>(
  state: &AppState<S>,
  task: &Task,
  assignee_ids: &[String],
  kind: NotificationKind,
  message: String,
  actor: &AccountId,
) {
  match state
    .fanout
    .notify_task(task, assignee_ids, kind, message, actor)
    .await
  {
    Ok(Some(report)) => tracing::debug!(
      task_id = %task.task_id,
      notification_id = %report.notification.notification_id,
      "assignees notified"
    ),
    Ok(None) => {}
    Err(e) => tracing::warn!(
      task_id = %task.task_id,
      error = %e,
      "task saved but assignee notification failed"
    ),
  }
}
