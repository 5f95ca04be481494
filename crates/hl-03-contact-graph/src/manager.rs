//! The contact graph manager over the Profile Store port.

use crate::phone::normalize_phone;
use hl_01_profile_store::{ContactInsert, ProfileStore};
use serde::{Deserialize, Serialize};
use shared_types::{Area, AreaId, CoreError, ProfileId, ProfileWithArea};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a single contact add. `AlreadyContact` is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadyContact,
}

/// Outcome of a single contact removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotAContact,
}

/// Per-id outcome of a bulk add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    Added,
    AlreadyContact,
    Failed(String),
}

/// Manages one directed contact relation per profile.
pub struct ContactGraph<S> {
    store: Arc<S>,
}

impl<S: ProfileStore> ContactGraph<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add `target` to `owner`'s network.
    ///
    /// # Errors
    ///
    /// - `CoreError::SelfReference` when `owner == target`.
    /// - `CoreError::NotFound` when `target` has no profile.
    pub async fn add_contact(
        &self,
        owner: ProfileId,
        target: ProfileId,
    ) -> Result<AddOutcome, CoreError> {
        if owner == target {
            return Err(CoreError::SelfReference);
        }
        // Resolve the target first so a bad id is a NotFound, not a
        // dangling edge.
        self.store.profile(target).await?;

        match self.store.insert_contact(owner, target).await? {
            ContactInsert::Inserted => {
                info!(%owner, contact = %target, "Contact added");
                Ok(AddOutcome::Added)
            }
            ContactInsert::Duplicate => {
                debug!(%owner, contact = %target, "Already a contact");
                Ok(AddOutcome::AlreadyContact)
            }
        }
    }

    /// Remove `target` from `owner`'s network. Removing a non-contact is a
    /// no-op outcome, not an error.
    pub async fn remove_contact(
        &self,
        owner: ProfileId,
        target: ProfileId,
    ) -> Result<RemoveOutcome, CoreError> {
        if self.store.delete_contact(owner, target).await? {
            info!(%owner, contact = %target, "Contact removed");
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotAContact)
        }
    }

    /// Add several contacts. Each target gets its own outcome; a failure on
    /// one never aborts the rest.
    pub async fn add_contacts_bulk(
        &self,
        owner: ProfileId,
        targets: &[ProfileId],
    ) -> Vec<(ProfileId, BulkOutcome)> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for &target in targets {
            let outcome = match self.add_contact(owner, target).await {
                Ok(AddOutcome::Added) => BulkOutcome::Added,
                Ok(AddOutcome::AlreadyContact) => BulkOutcome::AlreadyContact,
                Err(err) => BulkOutcome::Failed(err.to_string()),
            };
            outcomes.push((target, outcome));
        }
        outcomes
    }

    /// Match donor profiles against a batch of phone numbers from the
    /// caller's address book. Numbers normalize to their last 10 digits;
    /// inputs with fewer digits are discarded. No edges are created, the
    /// caller confirms each match separately.
    pub async fn import_by_phone_match(
        &self,
        owner: ProfileId,
        numbers: &[String],
    ) -> Result<Vec<ProfileWithArea>, CoreError> {
        let wanted: HashSet<String> = numbers
            .iter()
            .filter_map(|n| normalize_phone(n))
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let donors = self.store.all_donors_except(owner).await?;
        let mut matches = Vec::new();
        for donor in donors {
            let Some(stored) = donor.phone.as_deref().and_then(normalize_phone) else {
                continue;
            };
            if wanted.contains(&stored) {
                matches.push(self.store.profile_with_area(donor.id).await?);
            }
        }
        debug!(%owner, inputs = numbers.len(), matched = matches.len(), "Phone-match import");
        Ok(matches)
    }

    /// The owner's contacts joined with their areas, ordered by full name.
    /// One batched profile fetch; edges pointing at deleted profiles are
    /// silently dropped.
    pub async fn list_contacts(
        &self,
        owner: ProfileId,
    ) -> Result<Vec<ProfileWithArea>, CoreError> {
        let edges = self.store.contact_edges(owner).await?;
        let ids: Vec<ProfileId> = edges.iter().map(|e| e.contact).collect();
        let profiles = self.store.profiles_by_ids(&ids).await?;

        let areas: HashMap<AreaId, Area> = self
            .store
            .areas()
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let mut contacts: Vec<ProfileWithArea> = profiles
            .into_iter()
            .map(|profile| {
                let area = profile.area_id.and_then(|id| areas.get(&id).cloned());
                ProfileWithArea { profile, area }
            })
            .collect();
        contacts.sort_by(|a, b| a.profile.full_name.cmp(&b.profile.full_name));
        Ok(contacts)
    }

    /// Whether `target` is in `owner`'s network.
    pub async fn is_contact(
        &self,
        owner: ProfileId,
        target: ProfileId,
    ) -> Result<bool, CoreError> {
        Ok(self.store.contact_exists(owner, target).await?)
    }

    /// Filter the owner's contacts by name substring, phone substring, or
    /// exact blood-group label. Case-insensitive on names.
    pub async fn search_contacts(
        &self,
        owner: ProfileId,
        query: &str,
    ) -> Result<Vec<ProfileWithArea>, CoreError> {
        let query = query.trim();
        let contacts = self.list_contacts(owner).await?;
        if query.is_empty() {
            return Ok(contacts);
        }
        let lowered = query.to_lowercase();
        Ok(contacts
            .into_iter()
            .filter(|c| {
                c.profile.full_name.to_lowercase().contains(&lowered)
                    || c.profile
                        .phone
                        .as_deref()
                        .is_some_and(|p| p.contains(query))
                    || c.profile.blood_group.as_str().eq_ignore_ascii_case(query)
            })
            .collect())
    }
}
