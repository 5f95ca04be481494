//! Classification of bus events into client-facing alerts.

use serde::{Deserialize, Serialize};
use shared_bus::MatchEvent;
use shared_types::{ProfileId, RequestId, RequestStatus, Urgency};

/// Which side of a request the subscribed client is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Donor,
    Patient,
}

/// How hard the client should get the user's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPattern {
    /// Short buzz, for normal and urgent requests.
    Buzzer,
    /// Sustained alarm, reserved for critical requests.
    UrgentAlarm,
}

impl AlertPattern {
    /// The pattern a new request of this urgency triggers.
    #[must_use]
    pub fn for_urgency(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Critical => Self::UrgentAlarm,
            Urgency::Normal | Urgency::Urgent => Self::Buzzer,
        }
    }
}

/// What the client should do in response to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientAlert {
    /// A pending request was assigned to this donor.
    NewRequest {
        request_id: RequestId,
        urgency: Urgency,
        alert: AlertPattern,
    },
    /// The patient's request was accepted; the donor's contact details
    /// are now visible to them.
    RequestAccepted {
        request_id: RequestId,
        contact_now_visible: bool,
    },
    /// The patient's request was declined. Rendered gently, no sound.
    RequestDeclined { request_id: RequestId },
    /// Something this client displays changed; refresh without alerting.
    SilentRefresh,
}

/// Classify one event for a subscriber. `None` means the event carries
/// nothing for this client.
#[must_use]
pub fn classify(role: Role, profile: ProfileId, event: &MatchEvent) -> Option<ClientAlert> {
    match (role, event) {
        (Role::Donor, MatchEvent::RequestCreated { request })
            if request.donor_id == Some(profile) && request.status == RequestStatus::Pending =>
        {
            Some(ClientAlert::NewRequest {
                request_id: request.id,
                urgency: request.urgency,
                alert: AlertPattern::for_urgency(request.urgency),
            })
        }
        // The donor's own transitions just refresh their request list
        (Role::Donor, MatchEvent::RequestUpdated { request, .. })
            if request.donor_id == Some(profile) =>
        {
            Some(ClientAlert::SilentRefresh)
        }
        (Role::Patient, MatchEvent::RequestUpdated { request, previous })
            if request.patient_id == profile =>
        {
            match (previous, request.status) {
                (RequestStatus::Pending, RequestStatus::Accepted) => {
                    Some(ClientAlert::RequestAccepted {
                        request_id: request.id,
                        contact_now_visible: true,
                    })
                }
                (RequestStatus::Pending, RequestStatus::Declined) => {
                    Some(ClientAlert::RequestDeclined {
                        request_id: request.id,
                    })
                }
                _ => Some(ClientAlert::SilentRefresh),
            }
        }
        // A notification row landed for this profile: bump the unread badge
        (_, MatchEvent::NotificationPosted { notification })
            if notification.profile_id == profile =>
        {
            Some(ClientAlert::SilentRefresh)
        }
        _ => None,
    }
}
