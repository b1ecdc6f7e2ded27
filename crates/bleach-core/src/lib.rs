//! Core types and trait definitions for the daily Bleach selection service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement [`store::SelectionStore`]; the HTTP layer talks to a
//! [`refresh::RefreshEngine`] wrapped around one.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod entity;
pub mod error;
pub mod policy;
pub mod refresh;
pub mod store;

pub use error::{Error, Result};
