//! Handlers for `/fcm`: device token registration and the push-first send
//! routes.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use taskdesk_core::{
  id::{AccountId, WorkspaceId},
  notification::{NotificationKind, NotificationPriority},
};
use taskdesk_notify::{Notice, Target};

use super::{SendResponse, non_blank, require_admin};
use crate::{AppState, Store, auth::CurrentUser, error::ApiError, extract::JsonBody};

// ─── Tokens ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub token:    String,
  #[serde(default)]
  pub platform: Option<String>,
}

/// `POST /fcm/tokens`
pub async fn register_token<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let token = non_blank(&body.token)
    .ok_or_else(|| ApiError::BadRequest("token is required".into()))?;
  let registered = state
    .store
    .register_push_token(user.account_id, token.to_string(), body.platform)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(registered)))
}

/// `DELETE /fcm/tokens/{token}`
pub async fn remove_token<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
  let removed = state
    .store
    .remove_push_token(&user.account_id, &token)
    .await
    .map_err(ApiError::store)?;
  if removed {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound("push token".into()))
  }
}

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
  pub title:        String,
  pub message:      String,
  #[serde(default)]
  pub user_id:      Option<AccountId>,
  #[serde(default)]
  pub user_ids:     Option<Vec<AccountId>>,
  #[serde(default)]
  pub all_users:    bool,
  #[serde(default)]
  pub workspace_id: Option<WorkspaceId>,
  #[serde(default)]
  pub priority:     NotificationPriority,
}

impl SendBody {
  /// Exactly one of `userId`, `userIds`, `allUsers` must be given.
  fn target(&mut self) -> Result<Target, ApiError> {
    let given = [self.user_id.is_some(), self.user_ids.is_some(), self.all_users]
      .into_iter()
      .filter(|g| *g)
      .count();
    if given != 1 {
      return Err(ApiError::BadRequest(
        "exactly one of userId, userIds or allUsers is required".into(),
      ));
    }

    if let Some(id) = self.user_id.take() {
      return Ok(Target::SingleUser(id));
    }
    if let Some(ids) = self.user_ids.take() {
      if ids.is_empty() {
        return Err(ApiError::BadRequest("userIds must not be empty".into()));
      }
      return Ok(Target::MultipleUsers(ids));
    }
    let workspace = self
      .workspace_id
      .clone()
      .ok_or_else(|| ApiError::BadRequest("allUsers requires workspaceId".into()))?;
    Ok(Target::AllUsersInWorkspace(workspace))
  }
}

/// `POST /fcm/notifications/send`
pub async fn send<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(mut body): JsonBody<SendBody>,
) -> Result<impl IntoResponse, ApiError> {
  let target = body.target()?;
  let workspace = body
    .workspace_id
    .ok_or_else(|| ApiError::BadRequest("workspaceId is required".into()))?;

  let notice = Notice {
    title:        body.title,
    message:      body.message,
    kind:         NotificationKind::General,
    priority:     body.priority,
    workspace_id: workspace,
    created_by:   user.account_id,
    task_id:      None,
  };
  let report = state.fanout.send(notice, &target).await?;
  Ok((StatusCode::CREATED, Json(SendResponse::from(report))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementBody {
  pub title:        String,
  pub message:      String,
  pub workspace_id: Option<WorkspaceId>,
  #[serde(default)]
  pub priority:     NotificationPriority,
}

/// `POST /fcm/notifications/announcement`
pub async fn announcement<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<AnnouncementBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_admin(&state, &user)?;
  let workspace = body
    .workspace_id
    .ok_or_else(|| ApiError::BadRequest("workspaceId is required".into()))?;

  let notice = Notice {
    title:        body.title,
    message:      body.message,
    kind:         NotificationKind::AdminMessage,
    priority:     body.priority,
    workspace_id: workspace.clone(),
    created_by:   user.account_id,
    task_id:      None,
  };
  let report = state
    .fanout
    .send(notice, &Target::AllUsersInWorkspace(workspace))
    .await?;
  Ok((StatusCode::CREATED, Json(SendResponse::from(report))))
}
