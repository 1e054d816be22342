//! Handlers for `/employees`.
//!
//! Creating an employee also creates its login account; the two are linked
//! through `userId`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use taskdesk_core::{
  account::{Account, NewAccount},
  id::WorkspaceId,
  store::DirectoryStore,
  workspace::{Employee, NewEmployee},
};

use super::{non_blank, require_admin};
use crate::{
  AppState, Store,
  auth::{CurrentUser, hash_password},
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub workspace_id: Option<WorkspaceId>,
}

/// `GET /employees[?workspaceId=<id>]`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Employee>>, ApiError> {
  require_admin(&state, &user)?;
  let employees = state
    .store
    .list_employees(params.workspace_id.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(employees))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:          String,
  pub email:         String,
  pub password:      String,
  pub workspace_id:  WorkspaceId,
  #[serde(default)]
  pub department:    Option<String>,
  #[serde(default)]
  pub employee_code: Option<String>,
}

/// `POST /employees`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_admin(&state, &user)?;

  let name = non_blank(&body.name)
    .ok_or_else(|| ApiError::BadRequest("name is required".into()))?;
  let email = non_blank(&body.email)
    .filter(|e| e.contains('@'))
    .ok_or_else(|| ApiError::BadRequest("a valid email is required".into()))?;
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password is required".into()));
  }

  state
    .store
    .get_workspace(&body.workspace_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("workspace {}", body.workspace_id)))?;

  if state
    .store
    .find_account_by_email(email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("email {email} is already registered")));
  }

  let password_hash =
    hash_password(&body.password).map_err(|e| ApiError::Store(e.to_string().into()))?;

  let employee = provision_login(
    &*state.store,
    NewAccount {
      email:         email.to_string(),
      name:          name.to_string(),
      labels:        vec![],
      password_hash,
    },
    |account| NewEmployee {
      user_id:       account.account_id.clone(),
      workspace_id:  body.workspace_id,
      name:          name.to_string(),
      email:         account.email.clone(),
      department:    body.department,
      employee_code: body.employee_code,
    },
  )
  .await?;

  tracing::info!(
    employee = %employee.employee_id,
    account = %employee.user_id,
    workspace = %employee.workspace_id,
    "employee created"
  );
  Ok((StatusCode::CREATED, Json(employee)))
}

/// Write the login account, then the employee record that points at it.
///
/// If the employee write fails the account is deleted again so the email
/// stays free for a retry.
async fn provision_login<S: DirectoryStore>(
  store: &S,
  account: NewAccount,
  employee: impl FnOnce(&Account) -> NewEmployee,
) -> Result<Employee, ApiError> {
  let account = store.add_account(account).await.map_err(ApiError::store)?;

  match store.add_employee(employee(&account)).await {
    Ok(employee) => Ok(employee),
    Err(e) => {
      if let Err(cleanup) = store.delete_account(&account.account_id).await {
        tracing::warn!(
          account = %account.account_id,
          error = %cleanup,
          "could not remove account after failed employee write"
        );
      }
      Err(ApiError::store(e))
    }
  }
}
