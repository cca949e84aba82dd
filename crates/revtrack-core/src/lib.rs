//! Core types and the revision-event turnaround engine.
//!
//! Everything that turns a record's append-only log of "submitted to client" /
//! "received back" events into cycles, statistics, and display status lives
//! here. The analysis functions are pure: they take the events and an explicit
//! `now` and never touch a clock, a database, or the network.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::EventStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cycle;
pub mod days;
pub mod error;
pub mod event;
pub mod last_event;
pub mod log;
pub mod status;
pub mod store;
pub mod summary;
pub mod timeline;

pub use error::{Error, Result};
