//! # Contact Graph Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Maintains each profile's personal donor network: a directed
//! `(owner, contact)` relation with at most one edge per ordered pair.
//! A adding B does not make A a contact of B.
//!
//! ## Semantics
//!
//! - Adding an existing contact is informational, not an error. The store
//!   reports the unique-index outcome and the manager surfaces it as
//!   `AddOutcome::AlreadyContact`, so retries are idempotent.
//! - Bulk adds report a per-id outcome; one failure never aborts the rest.
//! - Phone-match import normalizes numbers to their last 10 digits and
//!   matches donor profiles without creating edges. Confirmation stays
//!   with the caller.
//!
//! ## Module Structure
//!
//! ```text
//! phone.rs    - phone number normalization (pure)
//! manager.rs  - ContactGraph over the ProfileStore port
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod manager;
pub mod phone;

pub use manager::{AddOutcome, BulkOutcome, ContactGraph, RemoveOutcome};
pub use phone::normalize_phone;
