//! # Profile Store Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Ports for the external collaborators the matching core depends on: the
//! hosted relational Profile Store, the Blob Store for medical reports, and
//! the Identity Provider. Plus in-memory adapters used by tests and the
//! single-node runtime.
//!
//! ## Concurrency contract
//!
//! The Profile Store is the externally-synchronized resource. Every
//! mutating operation is a single conditional update:
//!
//! - `insert_contact` relies on the unique `(owner, contact)` index and
//!   reports `Duplicate` instead of failing;
//! - `transition_request` compares the row's current status against the
//!   caller's expectation and applies status + notification atomically, so
//!   a losing concurrent racer receives `StoreError::StatusConflict` rather
//!   than silently overwriting.
//!
//! ## Module Structure
//!
//! ```text
//! ports.rs       - ProfileStore, BlobStore, IdentityProvider traits
//! adapters/      - MemoryStore, MemoryBlobStore, StaticIdentityProvider
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod ports;

pub use adapters::{MemoryBlobStore, MemoryStore, StaticIdentityProvider};
pub use ports::{BlobStore, ContactInsert, IdentityProvider, ProfileStore};
