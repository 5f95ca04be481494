//! # Shared Types - Domain Entities for HemoLink
//!
//! Single source of truth for the types that flow between subsystems:
//! profiles, contact edges, blood requests, notifications, and the error
//! enums every operation reports through.
//!
//! ## Conventions
//!
//! - Entity ids are `Uuid` newtypes (`ProfileId`, `RequestId`, ...).
//! - Enumerations serialize with the wire strings of the hosted relational
//!   schema (`"A+"`, `"contacts_only"`, `"pending"`, ...).
//! - Medical disclosure fields live only on the full `Profile`; the masked
//!   `PublicProfile` type cannot carry them by construction.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod errors;
pub mod ids;

// Re-export main types
pub use entities::{
    Area, BloodGroup, BloodRequest, ContactEdge, District, NewBloodRequest, Notification,
    NotificationKind, Profile, ProfileWithArea, PublicProfile, RequestStatus, StateRegion,
    Urgency, Visibility,
};
pub use errors::{CoreError, StoreError};
pub use ids::{AccountId, AreaId, NotificationId, ProfileId, RequestId};
