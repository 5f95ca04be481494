//! Outbound (driven) ports for the matching core.
//!
//! These traits define the external systems the core depends on. Every
//! method is async because each call may cross a network boundary and
//! suspend the caller; nothing here blocks.

use async_trait::async_trait;
use shared_types::{
    AccountId, Area, AreaId, BloodGroup, BloodRequest, ContactEdge, District, NewBloodRequest,
    Notification, Profile, ProfileId, ProfileWithArea, RequestId, RequestStatus, StateRegion,
    StoreError, Visibility,
};
use std::time::Duration;

/// Outcome of a contact-edge insert against the unique `(owner, contact)`
/// index. Duplicates are an expected, informational outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactInsert {
    /// A new edge was created.
    Inserted,
    /// The edge already existed; nothing changed.
    Duplicate,
}

/// The hosted relational data API, scoped to the authenticated caller.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    /// Fetch one profile row.
    async fn profile(&self, id: ProfileId) -> Result<Profile, StoreError>;

    /// Fetch several profiles; missing ids are skipped, not errors.
    async fn profiles_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, StoreError>;

    /// The explicit join step producing a profile with its area row.
    async fn profile_with_area(&self, id: ProfileId) -> Result<ProfileWithArea, StoreError>;

    /// Insert a profile at registration.
    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError>;

    /// Owner-scoped mutation: toggle donation availability.
    async fn update_availability(&self, id: ProfileId, available: bool)
        -> Result<(), StoreError>;

    /// Owner-scoped mutation: move to another area.
    async fn update_area(&self, id: ProfileId, area: Option<AreaId>) -> Result<(), StoreError>;

    /// Owner-scoped mutation: change the visibility policy. Takes effect on
    /// the next query; the resolver caches nothing.
    async fn update_visibility(
        &self,
        id: ProfileId,
        visibility: Visibility,
    ) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Available donors registered under an area, excluding the viewer.
    async fn donors_in_area(
        &self,
        area: AreaId,
        exclude: ProfileId,
    ) -> Result<Vec<Profile>, StoreError>;

    /// Available donors of a blood group, excluding the viewer. Bounded.
    async fn available_donors_by_group(
        &self,
        group: BloodGroup,
        exclude: ProfileId,
        limit: usize,
    ) -> Result<Vec<Profile>, StoreError>;

    /// Patients (non-donors) whose free-text district matches any name.
    async fn patients_in_districts(
        &self,
        district_names: &[String],
        exclude: ProfileId,
    ) -> Result<Vec<Profile>, StoreError>;

    /// Every donor profile except the given one. Used by phone-match import.
    async fn all_donors_except(&self, exclude: ProfileId) -> Result<Vec<Profile>, StoreError>;

    // -------------------------------------------------------------------------
    // Contact edges
    // -------------------------------------------------------------------------

    /// Insert an edge; `Duplicate` if the ordered pair already exists.
    async fn insert_contact(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<ContactInsert, StoreError>;

    /// Delete an edge. Returns whether a row was removed.
    async fn delete_contact(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<bool, StoreError>;

    /// All outgoing edges of an owner.
    async fn contact_edges(&self, owner: ProfileId) -> Result<Vec<ContactEdge>, StoreError>;

    /// Whether the ordered edge `owner -> contact` exists.
    async fn contact_exists(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<bool, StoreError>;

    // -------------------------------------------------------------------------
    // Blood requests
    // -------------------------------------------------------------------------

    /// Insert a new request in `pending` state and return the stored row.
    async fn insert_request(&self, new: NewBloodRequest) -> Result<BloodRequest, StoreError>;

    /// Fetch one request row.
    async fn request(&self, id: RequestId) -> Result<BloodRequest, StoreError>;

    /// All requests created by a patient, newest first.
    async fn requests_for_patient(
        &self,
        patient: ProfileId,
    ) -> Result<Vec<BloodRequest>, StoreError>;

    /// Pending requests assigned to a donor, newest first.
    async fn pending_requests_for_donor(
        &self,
        donor: ProfileId,
    ) -> Result<Vec<BloodRequest>, StoreError>;

    /// Whether any accepted or completed request links the pair, in either
    /// patient/donor orientation. This is the standing exception the
    /// Visibility Resolver consults.
    async fn accepted_or_completed_between(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, StoreError>;

    /// The single conditional update of the request state machine.
    ///
    /// Applies `status := next` only if the row currently holds `expected`,
    /// and inserts `notification` in the same transaction. Either both
    /// happen or neither does.
    ///
    /// # Errors
    ///
    /// `StoreError::StatusConflict` when the row's status is no longer
    /// `expected` (a concurrent racer won).
    async fn transition_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
        notification: Notification,
    ) -> Result<BloodRequest, StoreError>;

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Insert a notification row.
    async fn insert_notification(&self, notification: Notification) -> Result<(), StoreError>;

    /// Newest-first notifications addressed to a profile.
    async fn notifications_for(
        &self,
        profile: ProfileId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Addressee-only mutation: mark everything read. Returns rows changed.
    async fn mark_all_read(&self, profile: ProfileId) -> Result<usize, StoreError>;

    // -------------------------------------------------------------------------
    // Reference data
    // -------------------------------------------------------------------------

    /// All areas, ordered by name.
    async fn areas(&self) -> Result<Vec<Area>, StoreError>;

    /// All districts, ordered by name.
    async fn districts(&self) -> Result<Vec<District>, StoreError>;

    /// All states, ordered by name.
    async fn states(&self) -> Result<Vec<StateRegion>, StoreError>;
}

/// Opaque blob storage for medical reports. Rows reference blobs by path
/// only; links are minted per view with a short expiry.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a path, returning the path.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    /// Mint a time-limited signed URL for a stored path.
    async fn create_signed_url(&self, path: &str, ttl: Duration) -> Result<String, StoreError>;
}

/// The external identity provider. Opaque; failures surface as generic
/// authentication errors.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AccountId, StoreError>;

    /// The currently authenticated account, if any.
    async fn current_account(&self) -> Result<Option<AccountId>, StoreError>;

    /// Trigger a password-reset email with a redirect target.
    async fn reset_password(&self, email: &str, redirect_url: &str) -> Result<(), StoreError>;
}
