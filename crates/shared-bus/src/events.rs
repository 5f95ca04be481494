//! # Match Events
//!
//! Defines the events that flow through the shared bus. Each corresponds to
//! a committed row change in the Profile Store.

use serde::{Deserialize, Serialize};
use shared_types::{BloodRequest, Notification, ProfileId, RequestStatus};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A blood request row was inserted.
    /// Source: Request Lifecycle Engine | Target: the assigned donor's
    /// subscription (if any).
    RequestCreated { request: BloodRequest },

    /// A blood request's status changed. Carries the pre-transition status
    /// so consumers can distinguish `pending->accepted` from a replay.
    /// Source: Request Lifecycle Engine | Target: patient and donor
    /// subscriptions.
    RequestUpdated {
        request: BloodRequest,
        previous: RequestStatus,
    },

    /// A notification row was inserted for a profile.
    NotificationPosted { notification: Notification },
}

impl MatchEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RequestCreated { .. } | Self::RequestUpdated { .. } => EventTopic::Requests,
            Self::NotificationPosted { .. } => EventTopic::Notifications,
        }
    }

    /// The profiles this event is addressed to. A subscription scoped to a
    /// profile id receives exactly the events listing that id here.
    #[must_use]
    pub fn addressed_profiles(&self) -> Vec<ProfileId> {
        match self {
            Self::RequestCreated { request } => request.donor_id.into_iter().collect(),
            Self::RequestUpdated { request, .. } => {
                let mut ids = vec![request.patient_id];
                ids.extend(request.donor_id);
                ids
            }
            Self::NotificationPosted { notification } => vec![notification.profile_id],
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Blood request inserts and status changes.
    Requests,
    /// Notification rows addressed to a profile.
    Notifications,
    /// All events (no topic filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Addressed profiles to include. Empty means all profiles.
    pub profiles: Vec<ProfileId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            profiles: Vec::new(),
        }
    }

    /// Create a filter for events addressed to one profile. This is the
    /// shape every connected client uses: one logical subscription scoped
    /// to its own profile id.
    #[must_use]
    pub fn for_profile(profile: ProfileId) -> Self {
        Self {
            topics: Vec::new(),
            profiles: vec![profile],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MatchEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let profile_match = self.profiles.is_empty()
            || event
                .addressed_profiles()
                .iter()
                .any(|p| self.profiles.contains(p));

        topic_match && profile_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_types::{BloodGroup, NotificationKind, RequestId, Urgency};

    fn request(donor: Option<ProfileId>) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(),
            patient_id: ProfileId::new(),
            donor_id: donor,
            blood_group: BloodGroup::APos,
            urgency: Urgency::Normal,
            units_required: 1,
            hospital_name: None,
            message: None,
            medical_report_path: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        let event = MatchEvent::RequestCreated {
            request: request(Some(ProfileId::new())),
        };
        assert_eq!(event.topic(), EventTopic::Requests);
    }

    #[test]
    fn test_created_addresses_donor_only() {
        let donor = ProfileId::new();
        let event = MatchEvent::RequestCreated {
            request: request(Some(donor)),
        };
        assert_eq!(event.addressed_profiles(), vec![donor]);

        // Broadcast request addresses nobody until a donor picks it up
        let event = MatchEvent::RequestCreated {
            request: request(None),
        };
        assert!(event.addressed_profiles().is_empty());
    }

    #[test]
    fn test_updated_addresses_both_parties() {
        let donor = ProfileId::new();
        let req = request(Some(donor));
        let patient = req.patient_id;
        let event = MatchEvent::RequestUpdated {
            request: req,
            previous: RequestStatus::Pending,
        };
        let addressed = event.addressed_profiles();
        assert!(addressed.contains(&patient));
        assert!(addressed.contains(&donor));
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        let event = MatchEvent::RequestCreated {
            request: request(None),
        };
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_filter_by_profile() {
        let donor = ProfileId::new();
        let filter = EventFilter::for_profile(donor);

        let addressed = MatchEvent::RequestCreated {
            request: request(Some(donor)),
        };
        assert!(filter.matches(&addressed));

        let other = MatchEvent::RequestCreated {
            request: request(Some(ProfileId::new())),
        };
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Notifications]);

        let request_event = MatchEvent::RequestCreated {
            request: request(None),
        };
        assert!(!filter.matches(&request_event));

        let notification = Notification::new(
            ProfileId::new(),
            NotificationKind::NewRequest,
            "New blood request",
            "Someone needs A+ blood",
            None,
        );
        let posted = MatchEvent::NotificationPosted { notification };
        assert!(filter.matches(&posted));
    }
}
