//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, MatchEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving events.
///
/// Dropping the handle releases the subscription; the bus holds no other
/// per-subscriber state. A client that navigated away simply drops its
/// handle and re-subscribes (then resyncs) on return.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<MatchEvent>,

    /// Filter for this subscription.
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<MatchEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<MatchEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    // Dropped events are recovered by the dispatcher's resync
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
            // Event doesn't match filter, continue waiting
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<MatchEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
            // Event doesn't match filter, try again
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = MatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Ok(None) => {
                // No event ready; re-arm the waker and yield
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use chrono::Utc;
    use shared_types::{
        BloodGroup, BloodRequest, Notification, NotificationKind, ProfileId, RequestId,
        RequestStatus, Urgency,
    };
    use std::time::Duration;
    use tokio::time::timeout;

    fn request_for(donor: ProfileId) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(),
            patient_id: ProfileId::new(),
            donor_id: Some(donor),
            blood_group: BloodGroup::OPos,
            urgency: Urgency::Urgent,
            units_required: 2,
            hospital_name: None,
            message: None,
            medical_report_path: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        let donor = ProfileId::new();
        bus.publish(MatchEvent::RequestCreated {
            request: request_for(donor),
        })
        .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert!(matches!(received, MatchEvent::RequestCreated { .. }));
    }

    #[tokio::test]
    async fn test_subscription_profile_filter() {
        let bus = InMemoryEventBus::new();
        let donor = ProfileId::new();

        let mut sub = bus.subscribe(EventFilter::for_profile(donor));

        // Addressed to a different donor: filtered out
        bus.publish(MatchEvent::RequestCreated {
            request: request_for(ProfileId::new()),
        })
        .await;

        // Addressed to our donor: received
        let ours = request_for(donor);
        let ours_id = ours.id;
        bus.publish(MatchEvent::RequestCreated { request: ours }).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        match received {
            MatchEvent::RequestCreated { request } => assert_eq!(request.id, ours_id),
            other => panic!("expected RequestCreated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscription_topic_filter() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Notifications]));

        bus.publish(MatchEvent::RequestCreated {
            request: request_for(ProfileId::new()),
        })
        .await;

        let addressee = ProfileId::new();
        bus.publish(MatchEvent::NotificationPosted {
            notification: Notification::new(
                addressee,
                NotificationKind::NewRequest,
                "New blood request",
                "Someone needs O+ blood",
                None,
            ),
        })
        .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert!(matches!(received, MatchEvent::NotificationPosted { .. }));
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = InMemoryEventBus::new();

        {
            let _sub1 = bus.subscribe(EventFilter::all());
            let _sub2 = bus.subscribe(EventFilter::all());
            assert_eq!(bus.subscriber_count(), 2);
        }

        // After drop, count should be 0
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        let result = sub.try_recv();
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_ordering_per_request() {
        let bus = InMemoryEventBus::new();
        let donor = ProfileId::new();
        let mut sub = bus.subscribe(EventFilter::for_profile(donor));

        let req = request_for(donor);
        bus.publish(MatchEvent::RequestCreated {
            request: req.clone(),
        })
        .await;

        let mut accepted = req.clone();
        accepted.status = RequestStatus::Accepted;
        bus.publish(MatchEvent::RequestUpdated {
            request: accepted,
            previous: RequestStatus::Pending,
        })
        .await;

        // Committed order is preserved for this subscriber
        let first = sub.recv().await.expect("first event");
        let second = sub.recv().await.expect("second event");
        assert!(matches!(first, MatchEvent::RequestCreated { .. }));
        assert!(matches!(second, MatchEvent::RequestUpdated { .. }));
    }

    #[test]
    fn test_event_stream_filter() {
        let bus = InMemoryEventBus::new();
        let filter = EventFilter::topics(vec![EventTopic::Requests]);
        let stream = bus.event_stream(filter);

        assert_eq!(stream.filter().topics.len(), 1);
        assert_eq!(stream.filter().topics[0], EventTopic::Requests);
    }
}
