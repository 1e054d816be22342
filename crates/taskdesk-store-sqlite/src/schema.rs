//! SQL schema for the taskdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT NOT NULL COLLATE NOCASE UNIQUE,
    name          TEXT NOT NULL,
    labels        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- One row per account at most; user_id is the back-reference to accounts.
CREATE TABLE IF NOT EXISTS employees (
    employee_id   TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL UNIQUE,
    workspace_id  TEXT NOT NULL,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    department    TEXT,
    employee_code TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id      TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    title        TEXT NOT NULL,
    description  TEXT,
    status       TEXT NOT NULL,              -- 'BACKLOG' | 'TODO' | ... | 'DONE'
    priority     TEXT NOT NULL,              -- 'LOW' | 'MEDIUM' | 'HIGH'
    due_date     TEXT,                       -- YYYY-MM-DD
    assignee_id  TEXT NOT NULL DEFAULT '',   -- '', bare id, or JSON array
    created_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- One row per fan-out event, shared by every recipient.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    type            TEXT NOT NULL,
    priority        TEXT NOT NULL,
    recipient_ids   TEXT NOT NULL DEFAULT '[]',  -- stored verbatim, not validated
    workspace_id    TEXT NOT NULL,
    created_by      TEXT NOT NULL,
    task_id         TEXT,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS push_tokens (
    token      TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    platform   TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS employees_workspace_idx   ON employees(workspace_id);
CREATE INDEX IF NOT EXISTS tasks_workspace_idx       ON tasks(workspace_id);
CREATE INDEX IF NOT EXISTS notifications_created_idx ON notifications(created_at);
CREATE INDEX IF NOT EXISTS notifications_ws_type_idx ON notifications(workspace_id, type);
CREATE INDEX IF NOT EXISTS push_tokens_account_idx   ON push_tokens(account_id);

PRAGMA user_version = 1;
";
