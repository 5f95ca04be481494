//! Typed identifiers for domain entities.
//!
//! Newtypes over `Uuid` so a request id can never be passed where a profile
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifies one registered profile (donor or patient).
    ProfileId
);
entity_id!(
    /// Identifies one blood request.
    RequestId
);
entity_id!(
    /// Identifies one notification row.
    NotificationId
);
entity_id!(
    /// Identifies one area reference row.
    AreaId
);
entity_id!(
    /// Identifies one identity-provider account.
    AccountId
);
