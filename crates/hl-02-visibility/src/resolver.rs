//! The resolve algorithm and the evidence it consumes.
//!
//! The resolver itself is synchronous and pure: it takes the candidate row
//! plus two evidence queries and produces a [`VisibilityDecision`]. The
//! async entry point [`resolve_via_store`] gathers the evidence from the
//! Profile Store first, then delegates.

use crate::view::{AccessReason, ContactProfile, VisibilityDecision};
use hl_01_profile_store::ProfileStore;
use shared_types::{CoreError, Profile, ProfileId, PublicProfile, Visibility};
use tracing::debug;

/// Contact-edge evidence. Implemented by store snapshots and test mocks.
pub trait ContactQuery {
    /// Whether the directed edge `owner -> contact` exists.
    fn edge_exists(&self, owner: ProfileId, contact: ProfileId) -> bool;
}

/// Request-link evidence.
pub trait RequestQuery {
    /// Whether any accepted or completed request links the pair, in either
    /// patient/donor orientation.
    fn accepted_or_completed_between(&self, a: ProfileId, b: ProfileId) -> bool;
}

/// Resolve what `viewer` may see of `candidate`.
///
/// Masked by default: a stranger gets [`VisibilityDecision::Masked`] even
/// when the candidate's policy is `everyone`. Unmasking requires a contact
/// edge in either direction or the standing accepted-request exception.
pub fn resolve(
    viewer: ProfileId,
    candidate: &Profile,
    contacts: &impl ContactQuery,
    requests: &impl RequestQuery,
) -> VisibilityDecision {
    if viewer == candidate.id {
        return VisibilityDecision::Owner(candidate.clone());
    }

    let viewer_added = contacts.edge_exists(viewer, candidate.id);
    let candidate_added = contacts.edge_exists(candidate.id, viewer);
    if viewer_added || candidate_added {
        return VisibilityDecision::Contact {
            profile: ContactProfile::from_profile(candidate),
            reason: AccessReason::ContactEdge,
        };
    }

    // The standing exception: acceptance unmasks the pair permanently,
    // including after a later switch to contacts_only.
    if requests.accepted_or_completed_between(viewer, candidate.id) {
        return VisibilityDecision::Contact {
            profile: ContactProfile::from_profile(candidate),
            reason: AccessReason::AcceptedRequest,
        };
    }

    let reason = match candidate.visibility {
        Visibility::ContactsOnly => AccessReason::PolicyContactsOnly,
        Visibility::Everyone => AccessReason::DefaultMasked,
    };
    debug!(%viewer, candidate = %candidate.id, ?reason, "Masked profile view");
    VisibilityDecision::Masked {
        profile: PublicProfile::from_profile(candidate, false),
        reason,
    }
}

/// Resolve against the live store. Evidence is fetched fresh, so policy and
/// graph changes take effect immediately.
pub async fn resolve_via_store(
    viewer: ProfileId,
    candidate: &Profile,
    store: &dyn ProfileStore,
) -> Result<VisibilityDecision, CoreError> {
    if viewer == candidate.id {
        return Ok(VisibilityDecision::Owner(candidate.clone()));
    }

    let viewer_added = store.contact_exists(viewer, candidate.id).await?;
    let candidate_added = store.contact_exists(candidate.id, viewer).await?;
    if viewer_added || candidate_added {
        return Ok(VisibilityDecision::Contact {
            profile: ContactProfile::from_profile(candidate),
            reason: AccessReason::ContactEdge,
        });
    }
    if store
        .accepted_or_completed_between(viewer, candidate.id)
        .await?
    {
        return Ok(VisibilityDecision::Contact {
            profile: ContactProfile::from_profile(candidate),
            reason: AccessReason::AcceptedRequest,
        });
    }

    let reason = match candidate.visibility {
        Visibility::ContactsOnly => AccessReason::PolicyContactsOnly,
        Visibility::Everyone => AccessReason::DefaultMasked,
    };
    Ok(VisibilityDecision::Masked {
        profile: PublicProfile::from_profile(candidate, false),
        reason,
    })
}

/// Resolve a batch of search results for one viewer.
pub async fn resolve_all_via_store(
    viewer: ProfileId,
    candidates: &[Profile],
    store: &dyn ProfileStore,
) -> Result<Vec<VisibilityDecision>, CoreError> {
    let mut decisions = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        decisions.push(resolve_via_store(viewer, candidate, store).await?);
    }
    Ok(decisions)
}
