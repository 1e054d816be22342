//! Push delivery seam.
//!
//! Delivery is fire-and-collect: one task per token, dispatched concurrently,
//! no ordering, no retries. Failed tokens are counted and logged but never
//! pruned here.

use std::{collections::BTreeMap, future::Future, sync::Arc};

use serde::Serialize;
use taskdesk_core::notification::{Notification, PushToken};
use tokio::task::JoinSet;

/// Payload handed to a [`PushTransport`] for each token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
  pub title: String,
  pub body:  String,
  /// String-only key/value data, as most push services require.
  pub data:  BTreeMap<String, String>,
}

impl PushMessage {
  pub fn for_notification(notification: &Notification) -> Self {
    let mut data = BTreeMap::new();
    data.insert(
      "notificationId".to_owned(),
      notification.notification_id.to_string(),
    );
    data.insert("type".to_owned(), notification.kind.to_string());
    data.insert("priority".to_owned(), notification.priority.to_string());
    if let Some(task_id) = &notification.task_id {
      data.insert("taskId".to_owned(), task_id.to_string());
    }
    Self {
      title: notification.title.clone(),
      body: notification.message.clone(),
      data,
    }
  }
}

/// Delivers one message to one device token.
pub trait PushTransport: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    token: &'a str,
    message: &'a PushMessage,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Per-token delivery counts for one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
  pub attempted: usize,
  pub succeeded: usize,
  pub failed:    usize,
}

/// Send `message` to every token concurrently and count the outcomes.
pub async fn dispatch<P: PushTransport>(
  transport: Arc<P>,
  tokens: Vec<PushToken>,
  message: PushMessage,
) -> PushReport {
  let message = Arc::new(message);
  let mut in_flight = JoinSet::new();

  for token in tokens {
    let transport = Arc::clone(&transport);
    let message = Arc::clone(&message);
    in_flight.spawn(async move {
      let outcome = transport.send(&token.token, &message).await;
      (token, outcome)
    });
  }

  let mut report = PushReport::default();
  while let Some(joined) = in_flight.join_next().await {
    report.attempted += 1;
    match joined {
      Ok((token, Ok(()))) => {
        report.succeeded += 1;
        tracing::debug!(account = %token.account_id, "push delivered");
      }
      Ok((token, Err(e))) => {
        report.failed += 1;
        tracing::warn!(account = %token.account_id, error = %e, "push delivery failed");
      }
      Err(e) => {
        report.failed += 1;
        tracing::warn!(error = %e, "push task did not complete");
      }
    }
  }
  report
}
