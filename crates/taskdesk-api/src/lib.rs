//! JSON HTTP API for taskdesk.
//!
//! Exposes an axum [`Router`] over any store implementing both
//! [`DirectoryStore`] and [`NotificationStore`]. Requests authenticate with
//! HTTP Basic against the accounts table (see [`auth`]).

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod push;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use serde::Deserialize;
use taskdesk_core::{
  account::{ADMIN_LABEL, NewAccount},
  store::{DirectoryStore, NotificationStore},
};
use taskdesk_notify::FanOut;
use tower_http::trace::TraceLayer;

use handlers::{employees, fcm, notifications, tasks, workspaces};
use push::PushBackend;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TASKDESK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Accounts with this email are administrators regardless of labels.
  pub admin_email:         String,
  /// When set, an administrator account for `admin_email` is created at
  /// start-up if none exists.
  #[serde(default)]
  pub admin_password_hash: Option<String>,
  /// Webhook that receives one POST per device token. Push is only logged
  /// when unset.
  #[serde(default)]
  pub push_endpoint:       Option<String>,
  #[serde(default = "default_push_timeout_secs")]
  pub push_timeout_secs:   u64,
}

fn default_push_timeout_secs() -> u64 { 10 }

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the API needs from a storage backend.
pub trait Store: DirectoryStore + NotificationStore + 'static {}

impl<T> Store for T where T: DirectoryStore + NotificationStore + 'static {}

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub fanout: FanOut<S, PushBackend>,
  pub config: Arc<ServerConfig>,
}

impl<S: Store> AppState<S> {
  pub fn new(store: Arc<S>, push: PushBackend, config: ServerConfig) -> Self {
    Self {
      fanout: FanOut::new(Arc::clone(&store), Arc::new(push)),
      store,
      config: Arc::new(config),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      fanout: self.fanout.clone(),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S: Store>(state: AppState<S>) -> Router {
  Router::new()
    // Directory
    .route("/workspaces", get(workspaces::list::<S>).post(workspaces::create::<S>))
    .route("/employees", get(employees::list::<S>).post(employees::create::<S>))
    // Tasks
    .route("/tasks", get(tasks::list::<S>).post(tasks::create::<S>))
    .route("/tasks/mine", get(tasks::mine::<S>))
    .route("/tasks/{id}", patch(tasks::update::<S>).delete(tasks::remove::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>).post(notifications::create::<S>))
    .route("/notifications/unread-count", get(notifications::unread_count::<S>))
    .route("/notifications/manage", get(notifications::manage::<S>))
    .route("/notifications/broadcast", post(notifications::broadcast::<S>))
    .route("/notifications/mark-read", patch(notifications::mark_read::<S>))
    .route("/notifications/{id}", delete(notifications::remove::<S>))
    // Push
    .route("/fcm/tokens", post(fcm::register_token::<S>))
    .route("/fcm/tokens/{token}", delete(fcm::remove_token::<S>))
    .route("/fcm/notifications/send", post(fcm::send::<S>))
    .route("/fcm/notifications/announcement", post(fcm::announcement::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

/// Create the configured administrator account if it does not exist yet.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin<S: DirectoryStore>(
  store: &S,
  config: &ServerConfig,
) -> Result<bool, S::Error> {
  let Some(hash) = &config.admin_password_hash else {
    return Ok(false);
  };
  if store.find_account_by_email(&config.admin_email).await?.is_some() {
    return Ok(false);
  }

  let account = store
    .add_account(NewAccount {
      email:         config.admin_email.clone(),
      name:          "Administrator".to_string(),
      labels:        vec![ADMIN_LABEL.to_string()],
      password_hash: hash.clone(),
    })
    .await?;
  tracing::info!(account = %account.account_id, email = %account.email, "created administrator account");
  Ok(true)
}
