//! [`SqliteStore`]: the SQLite implementation of the taskdesk store traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use taskdesk_core::{
  account::{Account, NewAccount},
  id::{AccountId, EmployeeId, NotificationId, TaskId, WorkspaceId},
  notification::{NewNotification, Notification, PushToken},
  store::{DirectoryStore, NotificationQuery, NotificationStore},
  task::{NewTask, Task, TaskPatch},
  workspace::{Employee, NewEmployee, NewWorkspace, Workspace},
};

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawEmployee, RawNotification, RawPushToken, RawTask, RawWorkspace,
    encode_date, encode_dt, encode_labels,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A taskdesk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` with positional `params` and map at most one row.
  async fn fetch_one<R, F>(&self, sql: String, params: Vec<String>, map: F) -> Result<Option<R>>
  where
    R: Send + 'static,
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(&sql, rusqlite::params_from_iter(params), map)
              .optional()?,
          )
        })
        .await?,
    )
  }

  /// Run `sql` with positional `params` and map every row.
  async fn fetch_all<R>(
    &self,
    sql: String,
    params: Vec<String>,
    map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params_from_iter(params), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  /// Run a single write statement and return the number of affected rows.
  async fn execute(&self, sql: &'static str, params: Vec<Option<String>>) -> Result<usize> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
        .await?,
    )
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_account(&self, input: NewAccount) -> Result<Account> {
    if self.find_account_by_email(&input.email).await?.is_some() {
      return Err(Error::EmailTaken(input.email));
    }

    let account = Account {
      account_id:    AccountId::generate(),
      email:         input.email.trim().to_owned(),
      name:          input.name,
      labels:        input.labels,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    self
      .execute(
        "INSERT INTO accounts (account_id, email, name, labels, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          Some(account.account_id.to_string()),
          Some(account.email.clone()),
          Some(account.name.clone()),
          Some(encode_labels(&account.labels)?),
          Some(account.password_hash.clone()),
          Some(encode_dt(account.created_at)),
        ],
      )
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE account_id = ?1", RawAccount::COLUMNS);
    self
      .fetch_one(sql, vec![id.to_string()], RawAccount::from_row)
      .await?
      .map(RawAccount::into_account)
      .transpose()
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE email = ?1", RawAccount::COLUMNS);
    self
      .fetch_one(sql, vec![email.trim().to_owned()], RawAccount::from_row)
      .await?
      .map(RawAccount::into_account)
      .transpose()
  }

  async fn delete_account(&self, id: &AccountId) -> Result<bool> {
    let n = self
      .execute("DELETE FROM accounts WHERE account_id = ?1", vec![Some(id.to_string())])
      .await?;
    Ok(n > 0)
  }

  // ── Workspaces ────────────────────────────────────────────────────────────

  async fn add_workspace(&self, input: NewWorkspace) -> Result<Workspace> {
    let workspace = Workspace {
      workspace_id: WorkspaceId::generate(),
      name:         input.name,
      created_by:   input.created_by,
      created_at:   Utc::now(),
    };

    self
      .execute(
        "INSERT INTO workspaces (workspace_id, name, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          Some(workspace.workspace_id.to_string()),
          Some(workspace.name.clone()),
          Some(workspace.created_by.to_string()),
          Some(encode_dt(workspace.created_at)),
        ],
      )
      .await?;

    Ok(workspace)
  }

  async fn get_workspace(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
    let sql = format!(
      "SELECT {} FROM workspaces WHERE workspace_id = ?1",
      RawWorkspace::COLUMNS
    );
    self
      .fetch_one(sql, vec![id.to_string()], RawWorkspace::from_row)
      .await?
      .map(RawWorkspace::into_workspace)
      .transpose()
  }

  async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
    let sql = format!(
      "SELECT {} FROM workspaces ORDER BY created_at, rowid",
      RawWorkspace::COLUMNS
    );
    self
      .fetch_all(sql, vec![], RawWorkspace::from_row)
      .await?
      .into_iter()
      .map(RawWorkspace::into_workspace)
      .collect()
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
    if self.find_employee_by_user(&input.user_id).await?.is_some() {
      return Err(Error::EmployeeExists(input.user_id.into_inner()));
    }

    let employee = Employee {
      employee_id:   EmployeeId::generate(),
      user_id:       input.user_id,
      workspace_id:  input.workspace_id,
      name:          input.name,
      email:         input.email,
      department:    input.department,
      employee_code: input.employee_code,
      created_at:    Utc::now(),
    };

    self
      .execute(
        "INSERT INTO employees (
           employee_id, user_id, workspace_id, name, email,
           department, employee_code, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        vec![
          Some(employee.employee_id.to_string()),
          Some(employee.user_id.to_string()),
          Some(employee.workspace_id.to_string()),
          Some(employee.name.clone()),
          Some(employee.email.clone()),
          employee.department.clone(),
          employee.employee_code.clone(),
          Some(encode_dt(employee.created_at)),
        ],
      )
      .await?;

    Ok(employee)
  }

  async fn get_employee(&self, id: &EmployeeId) -> Result<Option<Employee>> {
    let sql = format!(
      "SELECT {} FROM employees WHERE employee_id = ?1",
      RawEmployee::COLUMNS
    );
    self
      .fetch_one(sql, vec![id.to_string()], RawEmployee::from_row)
      .await?
      .map(RawEmployee::into_employee)
      .transpose()
  }

  async fn find_employee_by_user(&self, account: &AccountId) -> Result<Option<Employee>> {
    let sql = format!("SELECT {} FROM employees WHERE user_id = ?1", RawEmployee::COLUMNS);
    self
      .fetch_one(sql, vec![account.to_string()], RawEmployee::from_row)
      .await?
      .map(RawEmployee::into_employee)
      .transpose()
  }

  async fn list_employees(&self, workspace: Option<&WorkspaceId>) -> Result<Vec<Employee>> {
    let (sql, params) = match workspace {
      Some(ws) => (
        format!(
          "SELECT {} FROM employees WHERE workspace_id = ?1 ORDER BY created_at, rowid",
          RawEmployee::COLUMNS
        ),
        vec![ws.to_string()],
      ),
      None => (
        format!("SELECT {} FROM employees ORDER BY created_at, rowid", RawEmployee::COLUMNS),
        vec![],
      ),
    };

    self
      .fetch_all(sql, params, RawEmployee::from_row)
      .await?
      .into_iter()
      .map(RawEmployee::into_employee)
      .collect()
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  async fn add_task(&self, input: NewTask) -> Result<Task> {
    let now = Utc::now();
    let task = Task {
      task_id:      TaskId::generate(),
      workspace_id: input.workspace_id,
      title:        input.title,
      description:  input.description,
      status:       input.status,
      priority:     input.priority,
      due_date:     input.due_date,
      assignee_id:  input.assignee_id,
      created_by:   input.created_by,
      created_at:   now,
      updated_at:   now,
    };

    self
      .execute(
        "INSERT INTO tasks (
           task_id, workspace_id, title, description, status, priority,
           due_date, assignee_id, created_by, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        task_params(&task),
      )
      .await?;

    Ok(task)
  }

  async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE task_id = ?1", RawTask::COLUMNS);
    self
      .fetch_one(sql, vec![id.to_string()], RawTask::from_row)
      .await?
      .map(RawTask::into_task)
      .transpose()
  }

  async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<Option<Task>> {
    let Some(mut task) = self.get_task(id).await? else {
      return Ok(None);
    };

    if let Some(title) = patch.title {
      task.title = title;
    }
    if let Some(description) = patch.description {
      task.description = Some(description);
    }
    if let Some(status) = patch.status {
      task.status = status;
    }
    if let Some(priority) = patch.priority {
      task.priority = priority;
    }
    if let Some(due_date) = patch.due_date {
      task.due_date = Some(due_date);
    }
    if let Some(assignee_id) = patch.assignee_id {
      task.assignee_id = assignee_id;
    }
    task.updated_at = Utc::now();

    // Whole-row write; concurrent updates race and the last one wins.
    self
      .execute(
        "UPDATE tasks SET
           workspace_id = ?2, title = ?3, description = ?4, status = ?5,
           priority = ?6, due_date = ?7, assignee_id = ?8, created_by = ?9,
           created_at = ?10, updated_at = ?11
         WHERE task_id = ?1",
        task_params(&task),
      )
      .await?;

    Ok(Some(task))
  }

  async fn list_tasks(&self, workspace: Option<&WorkspaceId>) -> Result<Vec<Task>> {
    let (sql, params) = match workspace {
      Some(ws) => (
        format!(
          "SELECT {} FROM tasks WHERE workspace_id = ?1 ORDER BY created_at DESC, rowid DESC",
          RawTask::COLUMNS
        ),
        vec![ws.to_string()],
      ),
      None => (
        format!(
          "SELECT {} FROM tasks ORDER BY created_at DESC, rowid DESC",
          RawTask::COLUMNS
        ),
        vec![],
      ),
    };

    self
      .fetch_all(sql, params, RawTask::from_row)
      .await?
      .into_iter()
      .map(RawTask::into_task)
      .collect()
  }

  async fn delete_task(&self, id: &TaskId) -> Result<bool> {
    let n = self
      .execute("DELETE FROM tasks WHERE task_id = ?1", vec![Some(id.to_string())])
      .await?;
    Ok(n > 0)
  }
}

fn task_params(task: &Task) -> Vec<Option<String>> {
  vec![
    Some(task.task_id.to_string()),
    Some(task.workspace_id.to_string()),
    Some(task.title.clone()),
    task.description.clone(),
    Some(task.status.to_string()),
    Some(task.priority.to_string()),
    task.due_date.map(encode_date),
    Some(task.assignee_id.clone()),
    Some(task.created_by.to_string()),
    Some(encode_dt(task.created_at)),
    Some(encode_dt(task.updated_at)),
  ]
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

impl NotificationStore for SqliteStore {
  type Error = Error;

  async fn insert_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: NotificationId::generate(),
      title:           input.title,
      message:         input.message,
      kind:            input.kind,
      priority:        input.priority,
      recipient_ids:   input.recipient_ids,
      workspace_id:    input.workspace_id,
      created_by:      input.created_by,
      task_id:         input.task_id,
      is_read:         false,
      created_at:      Utc::now(),
    };

    self
      .execute(
        "INSERT INTO notifications (
           notification_id, title, message, type, priority, recipient_ids,
           workspace_id, created_by, task_id, is_read, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
        vec![
          Some(notification.notification_id.to_string()),
          Some(notification.title.clone()),
          Some(notification.message.clone()),
          Some(notification.kind.to_string()),
          Some(notification.priority.to_string()),
          Some(notification.recipient_ids.clone()),
          Some(notification.workspace_id.to_string()),
          Some(notification.created_by.to_string()),
          notification.task_id.as_ref().map(TaskId::to_string),
          Some(encode_dt(notification.created_at)),
        ],
      )
      .await?;

    Ok(notification)
  }

  async fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>> {
    let sql = format!(
      "SELECT {} FROM notifications WHERE notification_id = ?1",
      RawNotification::COLUMNS
    );
    self
      .fetch_one(sql, vec![id.to_string()], RawNotification::from_row)
      .await?
      .map(RawNotification::into_notification)
      .transpose()
  }

  async fn query_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];
    if let Some(ws) = &query.workspace_id {
      params.push(ws.to_string());
      conds.push(format!("workspace_id = ?{}", params.len()));
    }
    if let Some(kind) = query.kind {
      params.push(kind.to_string());
      conds.push(format!("type = ?{}", params.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    // SQLite treats a negative LIMIT as "no limit".
    let limit = query.limit.map_or(-1, |l| l as i64);

    let sql = format!(
      "SELECT {} FROM notifications {where_clause}
       ORDER BY created_at DESC, rowid DESC
       LIMIT {limit}",
      RawNotification::COLUMNS
    );

    self
      .fetch_all(sql, params, RawNotification::from_row)
      .await?
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn mark_read(&self, id: &NotificationId) -> Result<bool> {
    let n = self
      .execute(
        "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
        vec![Some(id.to_string())],
      )
      .await?;
    Ok(n > 0)
  }

  async fn delete_notification(&self, id: &NotificationId) -> Result<bool> {
    let n = self
      .execute(
        "DELETE FROM notifications WHERE notification_id = ?1",
        vec![Some(id.to_string())],
      )
      .await?;
    Ok(n > 0)
  }

  // ── Push tokens ───────────────────────────────────────────────────────────

  async fn register_push_token(
    &self,
    account: AccountId,
    token: String,
    platform: Option<String>,
  ) -> Result<PushToken> {
    let registered = PushToken {
      token,
      account_id: account,
      platform,
      created_at: Utc::now(),
    };

    self
      .execute(
        "INSERT INTO push_tokens (token, account_id, platform, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(token) DO UPDATE SET
           account_id = excluded.account_id,
           platform   = excluded.platform,
           created_at = excluded.created_at",
        vec![
          Some(registered.token.clone()),
          Some(registered.account_id.to_string()),
          registered.platform.clone(),
          Some(encode_dt(registered.created_at)),
        ],
      )
      .await?;

    Ok(registered)
  }

  async fn remove_push_token(&self, owner: &AccountId, token: &str) -> Result<bool> {
    let n = self
      .execute(
        "DELETE FROM push_tokens WHERE token = ?1 AND account_id = ?2",
        vec![Some(token.to_owned()), Some(owner.to_string())],
      )
      .await?;
    Ok(n > 0)
  }

  async fn push_tokens_for(&self, accounts: &[AccountId]) -> Result<Vec<PushToken>> {
    if accounts.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders = (1..=accounts.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "SELECT token, account_id, platform, created_at FROM push_tokens
       WHERE account_id IN ({placeholders})
       ORDER BY created_at, rowid"
    );
    let params = accounts.iter().map(AccountId::to_string).collect();

    self
      .fetch_all(sql, params, RawPushToken::from_row)
      .await?
      .into_iter()
      .map(RawPushToken::into_push_token)
      .collect()
  }
}
