//! # Shared Bus - Event Bus for Request and Notification Traffic
//!
//! The in-process stand-in for the hosted realtime channel: subsystems
//! publish committed changes (request created, request updated, notification
//! posted) and per-profile subscribers receive the ones addressed to them.
//!
//! ```text
//! ┌──────────────────┐                    ┌────────────────────┐
//! │ Request Engine   │                    │ Notify Dispatcher  │
//! │                  │    publish()       │ (one sub/profile)  │
//! │                  │ ──────┐            │                    │
//! └──────────────────┘       │            └────────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │ ─────────┘
//!                      └──────────────┘  subscribe(filter)
//! ```
//!
//! ## Delivery contract
//!
//! - Events publish **after** the store commit; consumers may see the same
//!   transition more than once (reconnects, resync) and must treat
//!   duplicates as no-ops.
//! - Per-publisher commit order is preserved to each subscriber; there is
//!   no ordering guarantee across distinct requests or subscribers.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, MatchEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before older ones are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
