//! # Request Lifecycle Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Owns the blood request state machine:
//!
//! ```text
//! [Pending] ──accept──→ [Accepted] ──complete──→ [Completed]
//!     │
//!     └── decline ──→ [Declined]
//! ```
//!
//! ## Concurrency
//!
//! Every status change goes through the store's single conditional update.
//! Two donor sessions accepting the same request concurrently resolve to
//! exactly one winner; the loser receives `CoreError::Conflict`, never a
//! silent overwrite. The patient notification commits atomically with the
//! status change, and the bus event publishes only after commit.
//!
//! ## Authority
//!
//! Only the assigned donor may accept, decline, or complete a request.
//! Anyone else gets `CoreError::Unauthorized`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod engine;

pub use engine::{RequestEngine, MAX_UNITS_REQUIRED, REPORT_URL_TTL};
