//! In-memory adapters for testing and single-node operation.
//!
//! `MemoryStore` keeps every table behind one `RwLock` so the conditional
//! request transition and its notification insert commit atomically, which
//! is exactly the guarantee the hosted store provides per row.

use crate::ports::{BlobStore, ContactInsert, IdentityProvider, ProfileStore};
use async_trait::async_trait;
use chrono::Utc;
use shared_types::{
    AccountId, Area, AreaId, BloodGroup, BloodRequest, ContactEdge, District, NewBloodRequest,
    Notification, Profile, ProfileId, ProfileWithArea, RequestId, RequestStatus, StateRegion,
    StoreError, Visibility,
};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;

#[derive(Default)]
struct Inner {
    profiles: HashMap<ProfileId, Profile>,
    contacts: HashSet<ContactEdge>,
    requests: HashMap<RequestId, BloodRequest>,
    notifications: Vec<Notification>,
    areas: Vec<Area>,
    districts: Vec<District>,
    states: Vec<StateRegion>,
}

/// In-memory implementation of [`ProfileStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an area reference row.
    pub fn seed_area(&self, area: Area) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.areas.push(area);
        Ok(())
    }

    /// Seed a district reference row.
    pub fn seed_district(&self, district: District) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.districts.push(district);
        Ok(())
    }

    /// Seed a state reference row.
    pub fn seed_state(&self, state: StateRegion) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.states.push(state);
        Ok(())
    }
}

fn newest_first(requests: &mut [BloodRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        inner
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    async fn profiles_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.profiles.get(id).cloned())
            .collect())
    }

    async fn profile_with_area(&self, id: ProfileId) -> Result<ProfileWithArea, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let profile = inner
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;
        let area = profile
            .area_id
            .and_then(|aid| inner.areas.iter().find(|a| a.id == aid).cloned());
        Ok(ProfileWithArea { profile, area })
    }

    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if inner.profiles.contains_key(&profile.id) {
            return Err(StoreError::UniqueViolation(format!(
                "profile {}",
                profile.id
            )));
        }
        inner.profiles.insert(profile.id, profile);
        Ok(())
    }

    async fn update_availability(
        &self,
        id: ProfileId,
        available: bool,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let profile = inner
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;
        profile.is_available = available;
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn update_area(&self, id: ProfileId, area: Option<AreaId>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let profile = inner
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;
        profile.area_id = area;
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn update_visibility(
        &self,
        id: ProfileId,
        visibility: Visibility,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let profile = inner
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;
        profile.visibility = visibility;
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn donors_in_area(
        &self,
        area: AreaId,
        exclude: ProfileId,
    ) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .profiles
            .values()
            .filter(|p| {
                p.is_donor && p.is_available && p.area_id == Some(area) && p.id != exclude
            })
            .cloned()
            .collect())
    }

    async fn available_donors_by_group(
        &self,
        group: BloodGroup,
        exclude: ProfileId,
        limit: usize,
    ) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .profiles
            .values()
            .filter(|p| {
                p.is_donor && p.is_available && p.blood_group == group && p.id != exclude
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn patients_in_districts(
        &self,
        district_names: &[String],
        exclude: ProfileId,
    ) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .profiles
            .values()
            .filter(|p| {
                !p.is_donor
                    && p.id != exclude
                    && p.district
                        .as_ref()
                        .is_some_and(|d| district_names.contains(d))
            })
            .cloned()
            .collect())
    }

    async fn all_donors_except(&self, exclude: ProfileId) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .profiles
            .values()
            .filter(|p| p.is_donor && p.id != exclude)
            .cloned()
            .collect())
    }

    async fn insert_contact(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<ContactInsert, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if inner.contacts.insert(ContactEdge { owner, contact }) {
            debug!(%owner, %contact, "Contact edge inserted");
            Ok(ContactInsert::Inserted)
        } else {
            Ok(ContactInsert::Duplicate)
        }
    }

    async fn delete_contact(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.contacts.remove(&ContactEdge { owner, contact }))
    }

    async fn contact_edges(&self, owner: ProfileId) -> Result<Vec<ContactEdge>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .contacts
            .iter()
            .filter(|e| e.owner == owner)
            .copied()
            .collect())
    }

    async fn contact_exists(
        &self,
        owner: ProfileId,
        contact: ProfileId,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.contacts.contains(&ContactEdge { owner, contact }))
    }

    async fn insert_request(&self, new: NewBloodRequest) -> Result<BloodRequest, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let now = Utc::now();
        let request = BloodRequest {
            id: RequestId::new(),
            patient_id: new.patient_id,
            donor_id: new.donor_id,
            blood_group: new.blood_group,
            urgency: new.urgency,
            units_required: new.units_required,
            hospital_name: new.hospital_name,
            message: new.message,
            medical_report_path: new.medical_report_path,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn request(&self, id: RequestId) -> Result<BloodRequest, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        inner
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))
    }

    async fn requests_for_patient(
        &self,
        patient: ProfileId,
    ) -> Result<Vec<BloodRequest>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.patient_id == patient)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn pending_requests_for_donor(
        &self,
        donor: ProfileId,
    ) -> Result<Vec<BloodRequest>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.donor_id == Some(donor) && r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn accepted_or_completed_between(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.requests.values().any(|r| {
            matches!(r.status, RequestStatus::Accepted | RequestStatus::Completed)
                && (r.patient_id == a && r.donor_id == Some(b)
                    || r.patient_id == b && r.donor_id == Some(a))
        }))
    }

    async fn transition_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
        notification: Notification,
    ) -> Result<BloodRequest, StoreError> {
        // Single write lock: the compare-and-set and the notification
        // insert commit together or not at all.
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        if request.status != expected {
            return Err(StoreError::StatusConflict {
                expected,
                actual: request.status,
            });
        }
        request.status = next;
        request.updated_at = Utc::now();
        let updated = request.clone();
        inner.notifications.push(notification);
        debug!(request = %id, status = %next, "Request transitioned");
        Ok(updated)
    }

    async fn insert_notification(&self, notification: Notification) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.notifications.push(notification);
        Ok(())
    }

    async fn notifications_for(
        &self,
        profile: ProfileId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows: Vec<_> = inner
            .notifications
            .iter()
            .filter(|n| n.profile_id == profile)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn mark_all_read(&self, profile: ProfileId) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut changed = 0;
        for n in inner
            .notifications
            .iter_mut()
            .filter(|n| n.profile_id == profile && !n.is_read)
        {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn areas(&self) -> Result<Vec<Area>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut areas = inner.areas.clone();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(areas)
    }

    async fn districts(&self) -> Result<Vec<District>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut districts = inner.districts.clone();
        districts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(districts)
    }

    async fn states(&self) -> Result<Vec<StateRegion>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut states = inner.states.clone();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(states)
    }
}

/// In-memory [`BlobStore`]. Signed URLs are deterministic and carry their
/// expiry so tests can assert on the TTL.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let mut blobs = self.blobs.write().map_err(|_| StoreError::LockPoisoned)?;
        if blobs.contains_key(path) {
            return Err(StoreError::UniqueViolation(format!("blob {path}")));
        }
        blobs.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    async fn create_signed_url(
        &self,
        path: &str,
        ttl: Duration,
    ) -> Result<String, StoreError> {
        let blobs = self.blobs.read().map_err(|_| StoreError::LockPoisoned)?;
        if !blobs.contains_key(path) {
            return Err(StoreError::NotFound(format!("blob {path}")));
        }
        Ok(format!(
            "memory://medical-reports/{path}?expires_in={}",
            ttl.as_secs()
        ))
    }
}

/// [`IdentityProvider`] that always reports one fixed signed-in account.
/// Enough for tests and the single-node demo runtime.
pub struct StaticIdentityProvider {
    account: AccountId,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AccountId, StoreError> {
        Ok(self.account)
    }

    async fn current_account(&self) -> Result<Option<AccountId>, StoreError> {
        Ok(Some(self.account))
    }

    async fn reset_password(&self, _email: &str, _redirect_url: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
