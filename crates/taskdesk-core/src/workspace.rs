//! Workspaces and the employee records that belong to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AccountId, EmployeeId, WorkspaceId};

/// A tenant. Tasks, employees and broadcasts are scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
  pub workspace_id: WorkspaceId,
  pub name:         String,
  pub created_by:   AccountId,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWorkspace {
  pub name:       String,
  pub created_by: AccountId,
}

/// Profile record created by an administrator for a person with an account.
///
/// At most one employee record exists per account; `user_id` points back at
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub employee_id:   EmployeeId,
  pub user_id:       AccountId,
  pub workspace_id:  WorkspaceId,
  pub name:          String,
  pub email:         String,
  pub department:    Option<String>,
  /// Human-facing staff number, unrelated to [`EmployeeId`].
  pub employee_code: Option<String>,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
  pub user_id:       AccountId,
  pub workspace_id:  WorkspaceId,
  pub name:          String,
  pub email:         String,
  pub department:    Option<String>,
  pub employee_code: Option<String>,
}
