//! Handlers for `/workspaces`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/workspaces` | Any authenticated caller |
//! | `POST` | `/workspaces` | Admin. Body: `{"name":"Ops"}` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use taskdesk_core::workspace::{NewWorkspace, Workspace};

use super::{non_blank, require_admin};
use crate::{AppState, Store, auth::CurrentUser, error::ApiError, extract::JsonBody};

/// `GET /workspaces`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<Workspace>>, ApiError> {
  let workspaces = state.store.list_workspaces().await.map_err(ApiError::store)?;
  Ok(Json(workspaces))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /workspaces`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_admin(&state, &user)?;
  let name = non_blank(&body.name)
    .ok_or_else(|| ApiError::BadRequest("name is required".into()))?;

  let workspace = state
    .store
    .add_workspace(NewWorkspace {
      name:       name.to_string(),
      created_by: user.account_id,
    })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(workspace = %workspace.workspace_id, name = %workspace.name, "workspace created");
  Ok((StatusCode::CREATED, Json(workspace)))
}
