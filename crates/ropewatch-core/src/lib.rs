//! Core types and decision logic for the ropewatch rope-lifecycle tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! status engine is a pure function over a rope's event history; storage
//! backends plug in through the [`store::RopeStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod event;
pub mod overview;
pub mod policy;
pub mod rope;
pub mod status;
pub mod store;

pub use error::{Error, Result};
pub use status::{Status, StatusColor};
