//! Storage traits.
//!
//! Implemented by storage backends (e.g. `taskdesk-store-sqlite`). The
//! notification engine and the HTTP layer depend on these abstractions, never
//! on a concrete backend.
//!
//! All methods return `Send` futures so the traits can be used from a
//! multi-threaded tokio runtime behind `axum`.

use std::future::Future;

use crate::{
  account::{Account, NewAccount},
  id::{AccountId, EmployeeId, NotificationId, TaskId, WorkspaceId},
  notification::{NewNotification, Notification, NotificationKind, PushToken},
  task::{NewTask, Task, TaskPatch},
  workspace::{Employee, NewEmployee, NewWorkspace, Workspace},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`NotificationStore::query_notifications`]. Results are
/// always newest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
  pub workspace_id: Option<WorkspaceId>,
  pub kind:         Option<NotificationKind>,
  pub limit:        Option<usize>,
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Accounts, workspaces, employee records and tasks.
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Fails if the email is already taken.
  fn add_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account<'a>(
    &'a self,
    id: &'a AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Case-insensitive lookup by email.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Hard delete. Returns `false` if nothing was deleted.
  fn delete_account<'a>(
    &'a self,
    id: &'a AccountId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Workspaces ────────────────────────────────────────────────────────

  fn add_workspace(
    &self,
    input: NewWorkspace,
  ) -> impl Future<Output = Result<Workspace, Self::Error>> + Send + '_;

  fn get_workspace<'a>(
    &'a self,
    id: &'a WorkspaceId,
  ) -> impl Future<Output = Result<Option<Workspace>, Self::Error>> + Send + 'a;

  fn list_workspaces(
    &self,
  ) -> impl Future<Output = Result<Vec<Workspace>, Self::Error>> + Send + '_;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Persist an employee record. Fails if the account already has one.
  fn add_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  fn get_employee<'a>(
    &'a self,
    id: &'a EmployeeId,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  /// The employee record whose `user_id` is `account`, if any.
  fn find_employee_by_user<'a>(
    &'a self,
    account: &'a AccountId,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  /// All employee records, optionally restricted to one workspace.
  fn list_employees<'a>(
    &'a self,
    workspace: Option<&'a WorkspaceId>,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + 'a;

  // ── Tasks ─────────────────────────────────────────────────────────────

  fn add_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn get_task<'a>(
    &'a self,
    id: &'a TaskId,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + 'a;

  /// Apply `patch` and return the updated task, or `None` if it does not
  /// exist. Last write wins.
  fn update_task<'a>(
    &'a self,
    id: &'a TaskId,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + 'a;

  /// Tasks newest first, optionally restricted to one workspace.
  fn list_tasks<'a>(
    &'a self,
    workspace: Option<&'a WorkspaceId>,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + 'a;

  /// Hard delete. Returns `false` if nothing was deleted.
  fn delete_task<'a>(
    &'a self,
    id: &'a TaskId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Notification documents and push-token registrations.
pub trait NotificationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one notification document with `is_read = false`.
  fn insert_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification<'a>(
    &'a self,
    id: &'a NotificationId,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + 'a;

  fn query_notifications<'a>(
    &'a self,
    query: &'a NotificationQuery,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;

  /// Set `is_read = true` on the whole document. Returns `false` if it does
  /// not exist.
  fn mark_read<'a>(
    &'a self,
    id: &'a NotificationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Hard delete. Returns `false` if nothing was deleted.
  fn delete_notification<'a>(
    &'a self,
    id: &'a NotificationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Push tokens ───────────────────────────────────────────────────────

  /// Register `token` for `account`, taking it over if another account held
  /// it.
  fn register_push_token(
    &self,
    account: AccountId,
    token: String,
    platform: Option<String>,
  ) -> impl Future<Output = Result<PushToken, Self::Error>> + Send + '_;

  /// Remove `token` if `owner` holds it. Returns `false` otherwise.
  fn remove_push_token<'a>(
    &'a self,
    owner: &'a AccountId,
    token: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every token registered to any of `accounts`.
  fn push_tokens_for<'a>(
    &'a self,
    accounts: &'a [AccountId],
  ) -> impl Future<Output = Result<Vec<PushToken>, Self::Error>> + Send + 'a;
}
