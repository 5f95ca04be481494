//! # Notification Dispatch Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! Bridges committed bus events to per-client alerts. Each connected
//! client holds one [`ProfileSubscription`] scoped to its own profile id;
//! unsubscribing is dropping the handle.
//!
//! ```text
//!  shared-bus ──MatchEvent──→ ProfileSubscription ──ClientAlert──→ client
//!                                   │
//!                                   └── resync(&store) on reconnect
//! ```
//!
//! ## Delivery semantics
//!
//! The bus is at-least-once: the dispatcher remembers the last seen
//! `(request, status)` pair per subscription and swallows duplicate
//! deliveries of the same transition. After a gap (lag, reconnect) the
//! client calls `resync` to re-fetch current state from the store instead
//! of trusting queued events.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod alert;
pub mod dispatcher;

pub use alert::{classify, AlertPattern, ClientAlert, Role};
pub use dispatcher::ProfileSubscription;
