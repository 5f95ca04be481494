//! # Domain Entities
//!
//! The rows of the hosted relational schema, restated as owned Rust types.
//! Wire strings follow the schema's enum labels so serialized values match
//! what the data API stores.

use crate::ids::{AccountId, AreaId, NotificationId, ProfileId, RequestId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// The eight blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    /// All groups, in schema declaration order.
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
        Self::OPos,
        Self::ONeg,
    ];

    /// The wire label (`"A+"`, `"O-"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown blood group: {s}"))
    }
}

/// Severity tier of a blood request. Drives notification intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Urgent,
    Critical,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Blood request lifecycle status.
///
/// ```text
/// [Pending] ──accept──→ [Accepted] ──complete──→ [Completed]
///     │
///     └── decline ──→ [Declined]
/// ```
///
/// `Declined` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl RequestStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Declined)
                | (Self::Accepted, Self::Completed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Profile-level default exposure of contact details to non-contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Everyone,
    ContactsOnly,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Everyone
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// A named area (finest location granularity a profile can register under).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

/// A district, used by donors searching for patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: AreaId,
    pub name: String,
}

/// A state/province reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRegion {
    pub id: AreaId,
    pub name: String,
}

// =============================================================================
// PROFILE
// =============================================================================

/// One registered person. Owned by exactly one identity-provider account.
///
/// The medical disclosure fields (`is_on_medication`, `has_medical_condition`
/// and their detail strings) are never exposed to any viewer other than the
/// owner; the Visibility Resolver strips them by returning [`PublicProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// The identity-provider account this profile belongs to.
    pub account_id: AccountId,
    pub full_name: String,
    pub blood_group: BloodGroup,
    pub is_donor: bool,
    pub is_available: bool,
    pub visibility: Visibility,
    pub phone: Option<String>,
    pub area_id: Option<AreaId>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub last_donation_date: Option<NaiveDate>,
    pub is_on_medication: bool,
    pub medication_details: Option<String>,
    pub has_medical_condition: bool,
    pub medical_condition_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile joined with its area row. Produced by an explicit join step in
/// the store adapter, never by optional-chaining at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileWithArea {
    pub profile: Profile,
    pub area: Option<Area>,
}

/// The masked view of a profile handed to viewers not entitled to contact
/// details. A distinct type: no phone, no medical fields, by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: ProfileId,
    pub full_name: String,
    pub blood_group: BloodGroup,
    pub is_donor: bool,
    pub is_available: bool,
    pub area_id: Option<AreaId>,
    pub district: Option<String>,
    pub state: Option<String>,
    /// Whether the viewer already holds this profile in their contact graph.
    pub is_contact: bool,
}

impl PublicProfile {
    /// Mask a full profile down to its public fields.
    #[must_use]
    pub fn from_profile(profile: &Profile, is_contact: bool) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name.clone(),
            blood_group: profile.blood_group,
            is_donor: profile.is_donor,
            is_available: profile.is_available,
            area_id: profile.area_id,
            district: profile.district.clone(),
            state: profile.state.clone(),
            is_contact,
        }
    }
}

// =============================================================================
// CONTACT EDGE
// =============================================================================

/// Directed "added to my network" relation. Not symmetric: A adding B does
/// not make A a contact of B. At most one edge per ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEdge {
    pub owner: ProfileId,
    pub contact: ProfileId,
}

// =============================================================================
// BLOOD REQUEST
// =============================================================================

/// A patient's ask for blood, optionally targeted at one donor.
///
/// `donor_id = None` means broadcast/unassigned. Status is mutated only
/// through the Request Lifecycle Engine's conditional update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: RequestId,
    pub patient_id: ProfileId,
    pub donor_id: Option<ProfileId>,
    pub blood_group: BloodGroup,
    pub urgency: Urgency,
    pub units_required: u32,
    pub hospital_name: Option<String>,
    pub message: Option<String>,
    /// Blob-store path of the uploaded medical report. Never a URL; signed
    /// links are regenerated per view.
    pub medical_report_path: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a request. Validated by the engine before insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBloodRequest {
    pub patient_id: ProfileId,
    pub donor_id: Option<ProfileId>,
    pub blood_group: BloodGroup,
    pub urgency: Urgency,
    pub units_required: u32,
    pub hospital_name: Option<String>,
    pub message: Option<String>,
    pub medical_report_path: Option<String>,
}

// =============================================================================
// NOTIFICATION
// =============================================================================

/// What a notification is about. Drives the client-side alert wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewRequest,
    RequestAccepted,
    RequestDeclined,
    RequestCompleted,
}

/// An informational record addressed to one profile. Marked read only by
/// its addressee; never mutated by others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// The addressee.
    pub profile_id: ProfileId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_request_id: Option<RequestId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification addressed to `profile_id`.
    #[must_use]
    pub fn new(
        profile_id: ProfileId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_request_id: Option<RequestId>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            profile_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_request_id,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
