//! Per-client subscriptions with duplicate suppression and resync.

use crate::alert::{classify, AlertPattern, ClientAlert, Role};
use hl_01_profile_store::ProfileStore;
use shared_bus::{EventFilter, InMemoryEventBus, MatchEvent, Subscription};
use shared_types::{CoreError, ProfileId, RequestId, RequestStatus};
use std::collections::HashSet;
use tracing::debug;

/// One connected client's view of the bus, scoped to its own profile.
///
/// Dropping the handle unsubscribes. After a reconnect, call
/// [`ProfileSubscription::resync`] before trusting live events again.
pub struct ProfileSubscription {
    profile: ProfileId,
    role: Role,
    subscription: Subscription,
    /// Transitions already delivered to this client. At-least-once bus
    /// delivery means the same transition can arrive twice.
    seen: HashSet<(RequestId, RequestStatus)>,
}

impl ProfileSubscription {
    /// Subscribe `profile` to the bus in the given role.
    #[must_use]
    pub fn subscribe(bus: &InMemoryEventBus, profile: ProfileId, role: Role) -> Self {
        Self {
            profile,
            role,
            subscription: bus.subscribe(EventFilter::for_profile(profile)),
            seen: HashSet::new(),
        }
    }

    /// The profile this subscription is scoped to.
    #[must_use]
    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    /// The role events are classified under.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Await the next alert for this client. Duplicate deliveries of a
    /// transition are swallowed; `None` means the bus shut down.
    pub async fn next_alert(&mut self) -> Option<ClientAlert> {
        loop {
            let event = self.subscription.recv().await?;
            if let Some(alert) = self.admit(&event) {
                return Some(alert);
            }
        }
    }

    /// Non-blocking variant of [`next_alert`](Self::next_alert). `None`
    /// means nothing is queued right now.
    pub fn try_next_alert(&mut self) -> Option<ClientAlert> {
        while let Ok(Some(event)) = self.subscription.try_recv() {
            if let Some(alert) = self.admit(&event) {
                return Some(alert);
            }
        }
        None
    }

    /// Re-fetch current state from the store after a gap, returning the
    /// alerts the client should replay. Queued events for transitions the
    /// resync already covered are swallowed afterwards.
    pub async fn resync(&mut self, store: &dyn ProfileStore) -> Result<Vec<ClientAlert>, CoreError> {
        let mut alerts = Vec::new();
        match self.role {
            Role::Donor => {
                for request in store.pending_requests_for_donor(self.profile).await? {
                    if self.seen.insert((request.id, request.status)) {
                        alerts.push(ClientAlert::NewRequest {
                            request_id: request.id,
                            urgency: request.urgency,
                            alert: AlertPattern::for_urgency(request.urgency),
                        });
                    }
                }
            }
            Role::Patient => {
                for request in store.requests_for_patient(self.profile).await? {
                    if !self.seen.insert((request.id, request.status)) {
                        continue;
                    }
                    match request.status {
                        RequestStatus::Accepted => alerts.push(ClientAlert::RequestAccepted {
                            request_id: request.id,
                            contact_now_visible: true,
                        }),
                        RequestStatus::Declined => alerts.push(ClientAlert::RequestDeclined {
                            request_id: request.id,
                        }),
                        RequestStatus::Pending | RequestStatus::Completed => {}
                    }
                }
            }
        }
        debug!(profile = %self.profile, replayed = alerts.len(), "Subscription resynced");
        Ok(alerts)
    }

    /// Dedupe, then classify. Returns the alert to deliver, if any.
    fn admit(&mut self, event: &MatchEvent) -> Option<ClientAlert> {
        if let Some(key) = transition_key(event) {
            if !self.seen.insert(key) {
                debug!(profile = %self.profile, request = %key.0, "Duplicate delivery swallowed");
                return None;
            }
        }
        classify(self.role, self.profile, event)
    }
}

/// The dedupe key of a request event. Notification events are not keyed;
/// they only ever produce silent refreshes.
fn transition_key(event: &MatchEvent) -> Option<(RequestId, RequestStatus)> {
    match event {
        MatchEvent::RequestCreated { request } | MatchEvent::RequestUpdated { request, .. } => {
            Some((request.id, request.status))
        }
        MatchEvent::NotificationPosted { .. } => None,
    }
}
