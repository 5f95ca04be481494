//! The engine driving request creation and status transitions.

use hl_01_profile_store::{BlobStore, ProfileStore};
use shared_bus::{EventPublisher, MatchEvent};
use shared_types::{
    BloodRequest, CoreError, NewBloodRequest, Notification, NotificationKind, ProfileId,
    RequestId, RequestStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Upper bound on units per request, matching the request form.
pub const MAX_UNITS_REQUIRED: u32 = 20;

/// Signed report links expire after an hour; a fresh link is minted per view.
pub const REPORT_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Drives the request lifecycle over the Profile Store, publishing a bus
/// event after every committed change.
pub struct RequestEngine<S, B> {
    store: Arc<S>,
    bus: Arc<B>,
}

impl<S: ProfileStore, B: EventPublisher> RequestEngine<S, B> {
    #[must_use]
    pub fn new(store: Arc<S>, bus: Arc<B>) -> Self {
        Self { store, bus }
    }

    /// Create a request in `pending` state, notify the assigned donor, and
    /// publish [`MatchEvent::RequestCreated`].
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` when `units_required` is outside `1..=20`.
    /// - `CoreError::SelfReference` when the patient targets themselves.
    /// - `CoreError::NotFound` when the patient or donor has no profile.
    pub async fn create_request(&self, new: NewBloodRequest) -> Result<BloodRequest, CoreError> {
        if new.units_required < 1 || new.units_required > MAX_UNITS_REQUIRED {
            return Err(CoreError::Validation(format!(
                "units_required must be between 1 and {MAX_UNITS_REQUIRED}, got {}",
                new.units_required
            )));
        }
        if new.donor_id == Some(new.patient_id) {
            return Err(CoreError::SelfReference);
        }

        let patient = self.store.profile(new.patient_id).await?;
        if let Some(donor) = new.donor_id {
            self.store.profile(donor).await?;
        }

        let request = self.store.insert_request(new).await?;
        info!(
            request = %request.id,
            patient = %request.patient_id,
            urgency = %request.urgency,
            "Blood request created"
        );

        // The request event goes out first so the donor's alert lands
        // before the unread-badge refresh.
        self.bus
            .publish(MatchEvent::RequestCreated {
                request: request.clone(),
            })
            .await;

        if let Some(donor) = request.donor_id {
            let notification = Notification::new(
                donor,
                NotificationKind::NewRequest,
                "New Blood Request",
                format!(
                    "{} needs {} blood ({})",
                    patient.full_name, request.blood_group, request.urgency
                ),
                Some(request.id),
            );
            self.store.insert_notification(notification.clone()).await?;
            self.bus
                .publish(MatchEvent::NotificationPosted { notification })
                .await;
        }
        Ok(request)
    }

    /// Move a request to `next`, acting as `actor`.
    ///
    /// The status change and the patient notification commit atomically; a
    /// concurrent racer that loses the conditional update gets
    /// `CoreError::Conflict` and the state is unchanged.
    ///
    /// # Errors
    ///
    /// - `CoreError::Unauthorized` unless `actor` is the assigned donor.
    /// - `CoreError::IllegalTransition` when the state machine forbids
    ///   `current -> next`.
    /// - `CoreError::Conflict` when a concurrent transition won the race.
    pub async fn transition(
        &self,
        request_id: RequestId,
        actor: ProfileId,
        next: RequestStatus,
    ) -> Result<BloodRequest, CoreError> {
        let current = self.store.request(request_id).await?;

        if current.donor_id != Some(actor) {
            return Err(CoreError::Unauthorized {
                actor,
                request: request_id,
            });
        }
        if !current.status.can_transition_to(next) {
            return Err(CoreError::IllegalTransition {
                from: current.status,
                to: next,
            });
        }

        let notification = patient_notice(&current, next);
        let previous = current.status;
        let updated = self
            .store
            .transition_request(request_id, previous, next, notification.clone())
            .await?;

        info!(request = %request_id, from = %previous, to = %next, "Request transitioned");
        self.bus
            .publish(MatchEvent::RequestUpdated {
                request: updated.clone(),
                previous,
            })
            .await;
        self.bus
            .publish(MatchEvent::NotificationPosted { notification })
            .await;
        Ok(updated)
    }

    /// A patient's requests, newest first.
    pub async fn list_for_patient(
        &self,
        patient: ProfileId,
    ) -> Result<Vec<BloodRequest>, CoreError> {
        Ok(self.store.requests_for_patient(patient).await?)
    }

    /// Pending requests assigned to a donor, newest first.
    pub async fn list_pending_for_donor(
        &self,
        donor: ProfileId,
    ) -> Result<Vec<BloodRequest>, CoreError> {
        Ok(self.store.pending_requests_for_donor(donor).await?)
    }

    /// Mint a fresh signed link for the request's medical report, if one
    /// was attached. Links expire after [`REPORT_URL_TTL`].
    pub async fn report_url(
        &self,
        request: &BloodRequest,
        blobs: &dyn BlobStore,
    ) -> Result<Option<String>, CoreError> {
        match request.medical_report_path.as_deref() {
            Some(path) => Ok(Some(blobs.create_signed_url(path, REPORT_URL_TTL).await?)),
            None => Ok(None),
        }
    }
}

/// The patient-addressed notification recorded with each transition.
fn patient_notice(request: &BloodRequest, next: RequestStatus) -> Notification {
    let (kind, title, message) = match next {
        RequestStatus::Accepted => (
            NotificationKind::RequestAccepted,
            "Request Accepted",
            "Your blood request was accepted. You can now view the donor's contact details."
                .to_string(),
        ),
        RequestStatus::Declined => (
            NotificationKind::RequestDeclined,
            "Request Declined",
            "Your blood request was declined. You can reach out to other donors.".to_string(),
        ),
        RequestStatus::Completed => (
            NotificationKind::RequestCompleted,
            "Donation Completed",
            "The donor marked this donation as completed.".to_string(),
        ),
        RequestStatus::Pending => (
            NotificationKind::NewRequest,
            "Request Updated",
            "Your blood request was updated.".to_string(),
        ),
    };
    Notification::new(request.patient_id, kind, title, message, Some(request.id))
}
