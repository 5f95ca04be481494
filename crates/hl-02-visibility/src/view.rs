//! The three renditions of a profile and the reasons behind a decision.

use serde::{Deserialize, Serialize};
use shared_types::{AreaId, BloodGroup, Profile, ProfileId, PublicProfile};

/// The rendition handed to an entitled non-owner viewer: contact details
/// visible, medical disclosures absent by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactProfile {
    pub id: ProfileId,
    pub full_name: String,
    pub blood_group: BloodGroup,
    pub is_donor: bool,
    pub is_available: bool,
    pub phone: Option<String>,
    pub area_id: Option<AreaId>,
    pub district: Option<String>,
    pub state: Option<String>,
}

impl ContactProfile {
    /// Project a full profile down to the contact rendition.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name.clone(),
            blood_group: profile.blood_group,
            is_donor: profile.is_donor,
            is_available: profile.is_available,
            phone: profile.phone.clone(),
            area_id: profile.area_id,
            district: profile.district.clone(),
            state: profile.state.clone(),
        }
    }
}

/// Why a resolve came out the way it did. Informational; callers branch on
/// the decision variant, not the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    /// The viewer is looking at their own profile.
    SelfView,
    /// A contact edge links the pair (either direction).
    ContactEdge,
    /// An accepted or completed request links the pair.
    AcceptedRequest,
    /// The candidate's policy is `contacts_only` and no exception applies.
    PolicyContactsOnly,
    /// No relationship; the privacy-by-default mask applies.
    DefaultMasked,
}

/// Outcome of one resolve. Exactly one rendition per viewer/candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisibilityDecision {
    /// Self-view: the unmodified profile, medical fields included.
    Owner(Profile),
    /// Entitled viewer: phone visible, medical fields never.
    Contact {
        profile: ContactProfile,
        reason: AccessReason,
    },
    /// Everyone else: the masked public rendition.
    Masked {
        profile: PublicProfile,
        reason: AccessReason,
    },
}

impl VisibilityDecision {
    /// Whether this decision exposes the candidate's phone.
    #[must_use]
    pub fn phone_visible(&self) -> bool {
        matches!(self, Self::Owner(_) | Self::Contact { .. })
    }

    /// The reason recorded with the decision.
    #[must_use]
    pub fn reason(&self) -> AccessReason {
        match self {
            Self::Owner(_) => AccessReason::SelfView,
            Self::Contact { reason, .. } | Self::Masked { reason, .. } => *reason,
        }
    }
}
