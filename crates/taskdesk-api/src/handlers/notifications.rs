//! Handlers for `/notifications`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | Visible to the caller, newest first. Optional `?workspaceId=` scopes broadcasts |
//! | `GET`    | `/notifications/unread-count` | `{"count": n}` |
//! | `GET`    | `/notifications/manage` | Admin. Broadcasts of `?workspaceId=` (required) |
//! | `POST`   | `/notifications` | Targeted notification to explicit `recipientIds` |
//! | `POST`   | `/notifications/broadcast` | Admin. Defaults to every employee of the workspace |
//! | `PATCH`  | `/notifications/mark-read` | Body: `{"notificationIds": [..]}` |
//! | `DELETE` | `/notifications/{id}` | Admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use taskdesk_core::{
  id::{AccountId, NotificationId, TaskId, WorkspaceId},
  notification::{Notification, NotificationKind, NotificationPriority},
};
use taskdesk_notify::{Notice, Target, access};

use super::{SendResponse, requester, require_admin};
use crate::{
  AppState, Store,
  auth::CurrentUser,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceParams {
  pub workspace_id: Option<WorkspaceId>,
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /notifications[?workspaceId=<id>]`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  QueryParams(params): QueryParams<WorkspaceParams>,
) -> Result<Json<Vec<Notification>>, ApiError> {
  let me = requester(&state, &user).await?;
  let notifications =
    access::visible_notifications(&*state.store, &me, params.workspace_id.as_ref()).await?;
  Ok(Json(notifications))
}

/// `GET /notifications/unread-count[?workspaceId=<id>]`
pub async fn unread_count<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  QueryParams(params): QueryParams<WorkspaceParams>,
) -> Result<Json<Value>, ApiError> {
  let me = requester(&state, &user).await?;
  let count = access::unread_count(&*state.store, &me, params.workspace_id.as_ref()).await?;
  Ok(Json(json!({ "count": count })))
}

/// `GET /notifications/manage?workspaceId=<id>`
pub async fn manage<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  QueryParams(params): QueryParams<WorkspaceParams>,
) -> Result<Json<Vec<Notification>>, ApiError> {
  require_admin(&state, &user)?;
  let workspace = params
    .workspace_id
    .ok_or_else(|| ApiError::BadRequest("workspaceId is required".into()))?;
  let broadcasts = access::workspace_broadcasts(
    &*state.store,
    &user,
    &state.config.admin_email,
    &workspace,
  )
  .await?;
  Ok(Json(broadcasts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub title:         String,
  pub message:       String,
  #[serde(rename = "type", default)]
  pub kind:          NotificationKind,
  #[serde(default)]
  pub priority:      NotificationPriority,
  #[serde(default)]
  pub recipient_ids: Vec<AccountId>,
  pub workspace_id:  Option<WorkspaceId>,
  #[serde(default)]
  pub task_id:       Option<TaskId>,
}

fn required_workspace(workspace: Option<WorkspaceId>) -> Result<WorkspaceId, ApiError> {
  workspace
    .filter(|w| !w.as_str().trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("workspaceId is required".into()))
}

/// `POST /notifications`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.recipient_ids.iter().all(|id| id.as_str().trim().is_empty()) {
    return Err(ApiError::BadRequest("recipientIds must not be empty".into()));
  }
  // Admin messages are visible to the whole workspace.
  if body.kind == NotificationKind::AdminMessage {
    require_admin(&state, &user)?;
  }

  let notice = Notice {
    title:        body.title,
    message:      body.message,
    kind:         body.kind,
    priority:     body.priority,
    workspace_id: required_workspace(body.workspace_id)?,
    created_by:   user.account_id,
    task_id:      body.task_id,
  };
  let report = state
    .fanout
    .send(notice, &Target::MultipleUsers(body.recipient_ids))
    .await?;
  Ok((StatusCode::CREATED, Json(SendResponse::from(report))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBody {
  pub title:         String,
  pub message:       String,
  #[serde(default)]
  pub priority:      NotificationPriority,
  pub workspace_id:  Option<WorkspaceId>,
  #[serde(default)]
  pub recipient_ids: Vec<AccountId>,
}

/// `POST /notifications/broadcast`
pub async fn broadcast<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<BroadcastBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_admin(&state, &user)?;
  let workspace = required_workspace(body.workspace_id)?;

  let target = if body.recipient_ids.is_empty() {
    Target::AllUsersInWorkspace(workspace.clone())
  } else {
    Target::MultipleUsers(body.recipient_ids)
  };
  let notice = Notice {
    title:        body.title,
    message:      body.message,
    kind:         NotificationKind::AdminMessage,
    priority:     body.priority,
    workspace_id: workspace,
    created_by:   user.account_id,
    task_id:      None,
  };
  let report = state.fanout.send(notice, &target).await?;
  Ok((StatusCode::CREATED, Json(SendResponse::from(report))))
}

// ─── Mutations ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadBody {
  #[serde(default)]
  pub notification_ids: Vec<NotificationId>,
}

/// `PATCH /notifications/mark-read`
///
/// Succeeds even when some ids were skipped; `updated` says how many were
/// actually marked.
pub async fn mark_read<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<MarkReadBody>,
) -> Result<Json<Value>, ApiError> {
  let me = requester(&state, &user).await?;
  let updated = access::mark_read(&*state.store, &me, &body.notification_ids).await?;
  Ok(Json(json!({ "success": true, "updated": updated })))
}

/// `DELETE /notifications/{id}`
pub async fn remove<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
  let deleted =
    access::delete_notification(&*state.store, &user, &state.config.admin_email, &id).await?;
  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("notification {id}")))
  }
}
