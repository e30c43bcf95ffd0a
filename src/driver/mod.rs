//! Per-method build harness.
//!
//! The allocator core works on one method at a time. This module is the thin
//! layer around it that an optimizer pipeline calls: it runs many independent
//! builds, in parallel when configured, tags failures with the method they
//! belong to, applies the strict-or-skip policy and keeps an event log and
//! aggregate statistics.
//!
//! # Key Components
//!
//! - [`BuildConfig`] - Strictness, parallelism and diagnostics settings
//! - [`BuildSession`] - Runs batches of [`MethodInput`]s
//! - [`BuildReport`] / [`BuildStats`] - Results and aggregate counts
//! - [`EventLog`] - Thread-safe record of what happened

mod config;
mod events;
mod session;

pub use config::BuildConfig;
pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use session::{BuildReport, BuildSession, BuildStats, MethodGraph, MethodInput};
