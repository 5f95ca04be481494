//! # Visibility Resolver Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Decides, per viewer/candidate pair, which rendition of a profile the
//! viewer receives. Three renditions exist, each a distinct type so a
//! "partially masked" value cannot be constructed:
//!
//! ```text
//! viewer == candidate ──────────────→ ProfileView::Owner   (everything)
//! contact edge or accepted request ─→ ProfileView::Contact (phone, no medical)
//! otherwise ────────────────────────→ ProfileView::Public  (masked)
//! ```
//!
//! ## Rules
//!
//! - Masked by default: strangers see `PublicProfile` regardless of the
//!   candidate's visibility policy. The policy only records WHY the mask
//!   applies, it never widens exposure.
//! - A contact edge in either direction unmasks the phone.
//! - An accepted or completed request between the pair is a standing
//!   exception: it unmasks both directions permanently, surviving later
//!   policy changes.
//! - Medical disclosure fields appear only in the owner view.
//! - Decisions are evaluated per query. Nothing is cached, so a policy
//!   change takes effect on the next resolve.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod resolver;
pub mod view;

pub use resolver::{resolve, resolve_all_via_store, resolve_via_store, ContactQuery, RequestQuery};
pub use view::{AccessReason, ContactProfile, VisibilityDecision};
