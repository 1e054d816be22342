//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 with fixed microsecond precision and a `Z`
//! suffix, so lexical order equals chronological order. Enums are stored by
//! their wire names. Account labels are a compact JSON array.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use taskdesk_core::{
  account::Account,
  notification::{Notification, PushToken},
  task::Task,
  workspace::{Employee, Workspace},
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Parse a stored enum by its wire name.
pub fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| {
    Error::Core(taskdesk_core::Error::UnknownDiscriminant {
      kind,
      value: s.to_owned(),
    })
  })
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn encode_labels(labels: &[String]) -> Result<String> { Ok(serde_json::to_string(labels)?) }

pub fn decode_labels(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub email:         String,
  pub name:          String,
  pub labels:        String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub const COLUMNS: &'static str =
    "account_id, email, name, labels, password_hash, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      labels:        row.get(3)?,
      password_hash: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    self.account_id.into(),
      email:         self.email,
      name:          self.name,
      labels:        decode_labels(&self.labels)?,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `workspaces` row.
pub struct RawWorkspace {
  pub workspace_id: String,
  pub name:         String,
  pub created_by:   String,
  pub created_at:   String,
}

impl RawWorkspace {
  pub const COLUMNS: &'static str = "workspace_id, name, created_by, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      workspace_id: row.get(0)?,
      name:         row.get(1)?,
      created_by:   row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_workspace(self) -> Result<Workspace> {
    Ok(Workspace {
      workspace_id: self.workspace_id.into(),
      name:         self.name,
      created_by:   self.created_by.into(),
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub employee_id:   String,
  pub user_id:       String,
  pub workspace_id:  String,
  pub name:          String,
  pub email:         String,
  pub department:    Option<String>,
  pub employee_code: Option<String>,
  pub created_at:    String,
}

impl RawEmployee {
  pub const COLUMNS: &'static str = "employee_id, user_id, workspace_id, name, email, \
                                     department, employee_code, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id:   row.get(0)?,
      user_id:       row.get(1)?,
      workspace_id:  row.get(2)?,
      name:          row.get(3)?,
      email:         row.get(4)?,
      department:    row.get(5)?,
      employee_code: row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id:   self.employee_id.into(),
      user_id:       self.user_id.into(),
      workspace_id:  self.workspace_id.into(),
      name:          self.name,
      email:         self.email,
      department:    self.department,
      employee_code: self.employee_code,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `tasks` row.
pub struct RawTask {
  pub task_id:      String,
  pub workspace_id: String,
  pub title:        String,
  pub description:  Option<String>,
  pub status:       String,
  pub priority:     String,
  pub due_date:     Option<String>,
  pub assignee_id:  String,
  pub created_by:   String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawTask {
  pub const COLUMNS: &'static str = "task_id, workspace_id, title, description, status, \
                                     priority, due_date, assignee_id, created_by, \
                                     created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      task_id:      row.get(0)?,
      workspace_id: row.get(1)?,
      title:        row.get(2)?,
      description:  row.get(3)?,
      status:       row.get(4)?,
      priority:     row.get(5)?,
      due_date:     row.get(6)?,
      assignee_id:  row.get(7)?,
      created_by:   row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      task_id:      self.task_id.into(),
      workspace_id: self.workspace_id.into(),
      title:        self.title,
      description:  self.description,
      status:       decode_enum("task status", &self.status)?,
      priority:     decode_enum("task priority", &self.priority)?,
      due_date:     self.due_date.as_deref().map(decode_date).transpose()?,
      assignee_id:  self.assignee_id,
      created_by:   self.created_by.into(),
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub title:           String,
  pub message:         String,
  pub kind:            String,
  pub priority:        String,
  pub recipient_ids:   String,
  pub workspace_id:    String,
  pub created_by:      String,
  pub task_id:         Option<String>,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub const COLUMNS: &'static str = "notification_id, title, message, type, priority, \
                                     recipient_ids, workspace_id, created_by, task_id, \
                                     is_read, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      title:           row.get(1)?,
      message:         row.get(2)?,
      kind:            row.get(3)?,
      priority:        row.get(4)?,
      recipient_ids:   row.get(5)?,
      workspace_id:    row.get(6)?,
      created_by:      row.get(7)?,
      task_id:         row.get(8)?,
      is_read:         row.get(9)?,
      created_at:      row.get(10)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: self.notification_id.into(),
      title:           self.title,
      message:         self.message,
      kind:            decode_enum("notification type", &self.kind)?,
      priority:        decode_enum("notification priority", &self.priority)?,
      recipient_ids:   self.recipient_ids,
      workspace_id:    self.workspace_id.into(),
      created_by:      self.created_by.into(),
      task_id:         self.task_id.map(Into::into),
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `push_tokens` row.
pub struct RawPushToken {
  pub token:      String,
  pub account_id: String,
  pub platform:   Option<String>,
  pub created_at: String,
}

impl RawPushToken {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      token:      row.get(0)?,
      account_id: row.get(1)?,
      platform:   row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_push_token(self) -> Result<PushToken> {
    Ok(PushToken {
      token:      self.token,
      account_id: self.account_id.into(),
      platform:   self.platform,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use taskdesk_core::task::TaskStatus;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
    let b = Utc.timestamp_opt(1_700_000_000, 120_000_000).unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn unknown_enum_is_an_error() {
    assert!(decode_enum::<TaskStatus>("task status", "DONE").is_ok());
    assert!(decode_enum::<TaskStatus>("task status", "ARCHIVED").is_err());
  }
}
