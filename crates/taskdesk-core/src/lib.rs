//! Core types and trait definitions for taskdesk.
//!
//! This crate is free of HTTP and database dependencies. It holds the domain
//! model, the codecs for id lists stored in scalar fields, the administrator
//! predicate and the notification visibility rules. Every other crate depends
//! on it.

// Native `async fn` / RPITIT in traits; the `Send` bounds are spelled out on
// the returned futures instead.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod codec;
pub mod error;
pub mod id;
pub mod notification;
pub mod store;
pub mod task;
pub mod visibility;
pub mod workspace;

pub use error::{Error, Result};
