//! Concrete push transports.

use std::{collections::BTreeMap, convert::Infallible, time::Duration};

use reqwest::Client;
use serde::Serialize;
use taskdesk_notify::{PushMessage, PushTransport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
  #[error("push request failed: {0}")]
  Http(#[from] reqwest::Error),
}

// ─── Webhook ──────────────────────────────────────────────────────────────────

/// POSTs each delivery as JSON to a fixed endpoint; any non-2xx status is a
/// failure for that token.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WebhookPush {
  client:   Client,
  endpoint: String,
}

#[derive(Serialize)]
struct WebhookBody<'a> {
  token:        &'a str,
  notification: WebhookNotification<'a>,
  data:         &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct WebhookNotification<'a> {
  title: &'a str,
  body:  &'a str,
}

impl WebhookPush {
  pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PushError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
    })
  }
}

impl PushTransport for WebhookPush {
  type Error = PushError;

  async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
    let body = WebhookBody {
      token,
      notification: WebhookNotification {
        title: &message.title,
        body:  &message.body,
      },
      data: &message.data,
    };
    self
      .client
      .post(&self.endpoint)
      .json(&body)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

// ─── Log only ─────────────────────────────────────────────────────────────────

/// Records deliveries in the log and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPush;

impl PushTransport for LogPush {
  type Error = Infallible;

  async fn send(&self, token: &str, message: &PushMessage) -> Result<(), Infallible> {
    tracing::info!(token, title = %message.title, "push (log only)");
    Ok(())
  }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// The transport chosen from configuration at start-up.
#[derive(Debug, Clone)]
pub enum PushBackend {
  Webhook(WebhookPush),
  Log(LogPush),
}

impl PushTransport for PushBackend {
  type Error = PushError;

  async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
    match self {
      PushBackend::Webhook(w) => w.send(token, message).await,
      PushBackend::Log(l) => match l.send(token, message).await {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
    }
  }
}
