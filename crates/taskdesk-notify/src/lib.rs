//! Notification fan-out and recipient resolution for taskdesk.
//!
//! Everything here is generic over the storage traits in
//! [`taskdesk_core::store`] and over a [`push::PushTransport`]; the HTTP layer
//! wires in concrete implementations.
//!
//! - [`recipients`] turns a [`recipients::Target`] into account ids.
//! - [`identity`] reconciles account ids and employee ids.
//! - [`assignees`] normalizes caller-supplied assignee ids for storage.
//! - [`fanout`] persists one notification, then attempts push delivery.
//! - [`access`] applies visibility and authorization to reads and mutations.

#![allow(async_fn_in_trait)]

pub mod access;
pub mod assignees;
pub mod error;
pub mod fanout;
pub mod identity;
pub mod push;
pub mod recipients;

pub use error::{Error, Result};
pub use fanout::{FanOut, FanOutReport, Notice};
pub use push::{PushMessage, PushReport, PushTransport};
pub use recipients::Target;

#[cfg(test)]
mod tests;
