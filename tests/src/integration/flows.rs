//! # Integration Test Flows
//!
//! End-to-end scenarios exercising the subsystems together over one
//! in-memory store and one event bus:
//!
//! 1. **Request Engine (4) → Notify (5)**: critical request alarms the
//!    donor; acceptance alerts the patient.
//! 2. **Request Engine (4) → Visibility (2)**: acceptance unmasks the
//!    pair in both directions, permanently.
//! 3. **Contact Graph (3) → Visibility (2)**: adding a contact unmasks.
//! 4. **Concurrency**: two sessions racing on one accept resolve to one
//!    winner and one patient alert.
//! 5. **Reconnect**: a donor that was offline replays pending requests
//!    through resync without duplicating live events.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use chrono::Utc;
    use hl_01_profile_store::{MemoryStore, ProfileStore};
    use hl_02_visibility::{resolve_via_store, AccessReason, VisibilityDecision};
    use hl_03_contact_graph::{AddOutcome, ContactGraph};
    use hl_04_request_engine::RequestEngine;
    use hl_05_notify::{AlertPattern, ClientAlert, ProfileSubscription, Role};
    use shared_bus::InMemoryEventBus;
    use shared_types::{
        AccountId, BloodGroup, CoreError, NewBloodRequest, Profile, ProfileId, RequestStatus,
        Urgency, Visibility,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Node {
        store: Arc<MemoryStore>,
        bus: Arc<InMemoryEventBus>,
        engine: RequestEngine<MemoryStore, InMemoryEventBus>,
        graph: ContactGraph<MemoryStore>,
    }

    fn node() -> Node {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        Node {
            engine: RequestEngine::new(Arc::clone(&store), Arc::clone(&bus)),
            graph: ContactGraph::new(Arc::clone(&store)),
            store,
            bus,
        }
    }

    fn person(name: &str, is_donor: bool, visibility: Visibility) -> Profile {
        let now = Utc::now();
        Profile {
            id: ProfileId::new(),
            account_id: AccountId::new(),
            full_name: name.to_string(),
            blood_group: BloodGroup::ONeg,
            is_donor,
            is_available: is_donor,
            visibility,
            phone: Some("5551234567".to_string()),
            area_id: None,
            district: None,
            state: None,
            last_donation_date: None,
            is_on_medication: false,
            medication_details: None,
            has_medical_condition: false,
            medical_condition_details: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn register(node: &Node, profile: Profile) -> ProfileId {
        let id = profile.id;
        node.store.insert_profile(profile).await.unwrap();
        id
    }

    fn targeted_request(patient: ProfileId, donor: ProfileId, urgency: Urgency) -> NewBloodRequest {
        NewBloodRequest {
            patient_id: patient,
            donor_id: Some(donor),
            blood_group: BloodGroup::ONeg,
            urgency,
            units_required: 2,
            hospital_name: Some("City Hospital".to_string()),
            message: None,
            medical_report_path: None,
        }
    }

    async fn next_alert(sub: &mut ProfileSubscription) -> ClientAlert {
        timeout(Duration::from_millis(500), sub.next_alert())
            .await
            .expect("timed out waiting for alert")
            .expect("bus closed")
    }

    // =============================================================================
    // SCENARIO: CRITICAL REQUEST END TO END
    // =============================================================================

    /// A critical request alarms the donor; acceptance alerts the patient
    /// and unmasks both directions.
    #[tokio::test]
    async fn test_critical_request_flow() {
        let node = node();
        let donor = register(&node, person("Donor", true, Visibility::ContactsOnly)).await;
        let patient = register(&node, person("Patient", false, Visibility::ContactsOnly)).await;

        let mut donor_client = ProfileSubscription::subscribe(&node.bus, donor, Role::Donor);
        let mut patient_client = ProfileSubscription::subscribe(&node.bus, patient, Role::Patient);

        // Before anything happens, both see each other masked
        let donor_row = node.store.profile(donor).await.unwrap();
        let decision = resolve_via_store(patient, &donor_row, node.store.as_ref())
            .await
            .unwrap();
        assert!(!decision.phone_visible());

        let request = node
            .engine
            .create_request(targeted_request(patient, donor, Urgency::Critical))
            .await
            .unwrap();

        // Donor hears the urgent alarm
        let alert = next_alert(&mut donor_client).await;
        assert!(matches!(
            alert,
            ClientAlert::NewRequest {
                urgency: Urgency::Critical,
                alert: AlertPattern::UrgentAlarm,
                ..
            }
        ));

        node.engine
            .transition(request.id, donor, RequestStatus::Accepted)
            .await
            .unwrap();

        // Patient is told their request was accepted
        let alert = next_alert(&mut patient_client).await;
        assert!(matches!(
            alert,
            ClientAlert::RequestAccepted {
                contact_now_visible: true,
                ..
            }
        ));

        // Both directions now resolve unmasked
        let donor_row = node.store.profile(donor).await.unwrap();
        let patient_row = node.store.profile(patient).await.unwrap();
        let patient_sees = resolve_via_store(patient, &donor_row, node.store.as_ref())
            .await
            .unwrap();
        let donor_sees = resolve_via_store(donor, &patient_row, node.store.as_ref())
            .await
            .unwrap();
        assert!(patient_sees.phone_visible());
        assert!(donor_sees.phone_visible());
        assert_eq!(patient_sees.reason(), AccessReason::AcceptedRequest);
    }

    /// The acceptance exception outlives a later visibility lockdown.
    #[tokio::test]
    async fn test_unmasking_survives_policy_change() {
        let node = node();
        let donor = register(&node, person("Donor", true, Visibility::Everyone)).await;
        let patient = register(&node, person("Patient", false, Visibility::Everyone)).await;

        let request = node
            .engine
            .create_request(targeted_request(patient, donor, Urgency::Normal))
            .await
            .unwrap();
        node.engine
            .transition(request.id, donor, RequestStatus::Accepted)
            .await
            .unwrap();

        node.store
            .update_visibility(donor, Visibility::ContactsOnly)
            .await
            .unwrap();

        let donor_row = node.store.profile(donor).await.unwrap();
        let decision = resolve_via_store(patient, &donor_row, node.store.as_ref())
            .await
            .unwrap();
        assert!(decision.phone_visible());
    }

    // =============================================================================
    // SCENARIO: CONTACT GRAPH DRIVES VISIBILITY
    // =============================================================================

    #[tokio::test]
    async fn test_contact_add_unmasks_and_is_idempotent() {
        let node = node();
        let owner = register(&node, person("Owner", false, Visibility::Everyone)).await;
        let donor = register(&node, person("Donor", true, Visibility::ContactsOnly)).await;

        assert_eq!(
            node.graph.add_contact(owner, donor).await.unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            node.graph.add_contact(owner, donor).await.unwrap(),
            AddOutcome::AlreadyContact
        );
        assert_eq!(node.graph.list_contacts(owner).await.unwrap().len(), 1);

        let donor_row = node.store.profile(donor).await.unwrap();
        let decision = resolve_via_store(owner, &donor_row, node.store.as_ref())
            .await
            .unwrap();
        assert!(decision.phone_visible());
        assert_eq!(decision.reason(), AccessReason::ContactEdge);
    }

    #[tokio::test]
    async fn test_phone_import_then_bulk_add() {
        let node = node();
        let owner = register(&node, person("Owner", false, Visibility::Everyone)).await;
        let mut known = person("Known Donor", true, Visibility::Everyone);
        known.phone = Some("+1 (555) 123-4567".to_string());
        let known = register(&node, known).await;

        let matches = node
            .graph
            .import_by_phone_match(owner, &["5551234567".to_string(), "12345".to_string()])
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].profile.id, known);

        let ids: Vec<ProfileId> = matches.iter().map(|m| m.profile.id).collect();
        let outcomes = node.graph.add_contacts_bulk(owner, &ids).await;
        assert!(outcomes
            .iter()
            .all(|(_, o)| matches!(o, hl_03_contact_graph::BulkOutcome::Added)));
    }

    // =============================================================================
    // SCENARIO: CONCURRENT ACCEPTS
    // =============================================================================

    /// Two sessions of the donor race on one request. Exactly one wins,
    /// the patient gets exactly one accepted alert.
    #[tokio::test]
    async fn test_double_accept_single_winner() {
        let node = node();
        let donor = register(&node, person("Donor", true, Visibility::Everyone)).await;
        let patient = register(&node, person("Patient", false, Visibility::Everyone)).await;
        let mut patient_client = ProfileSubscription::subscribe(&node.bus, patient, Role::Patient);

        let request = node
            .engine
            .create_request(targeted_request(patient, donor, Urgency::Urgent))
            .await
            .unwrap();

        let session_a = RequestEngine::new(Arc::clone(&node.store), Arc::clone(&node.bus));
        let session_b = RequestEngine::new(Arc::clone(&node.store), Arc::clone(&node.bus));
        let id = request.id;
        let a = tokio::spawn(async move {
            session_a.transition(id, donor, RequestStatus::Accepted).await
        });
        let b = tokio::spawn(async move {
            session_b.transition(id, donor, RequestStatus::Accepted).await
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.as_ref().unwrap_err(),
            CoreError::Conflict(_) | CoreError::IllegalTransition { .. }
        ));

        // One accepted alert, then silence (the duplicate event, if any,
        // is swallowed by the dispatcher)
        let alert = next_alert(&mut patient_client).await;
        assert!(matches!(alert, ClientAlert::RequestAccepted { .. }));
        loop {
            match patient_client.try_next_alert() {
                Some(ClientAlert::SilentRefresh) => continue,
                Some(other) => panic!("unexpected second alert: {other:?}"),
                None => break,
            }
        }

        assert_eq!(
            node.store.request(id).await.unwrap().status,
            RequestStatus::Accepted
        );
        let notes = node.store.notifications_for(patient, 10).await.unwrap();
        assert_eq!(notes.len(), 1);
    }

    // =============================================================================
    // SCENARIO: RECONNECT AND RESYNC
    // =============================================================================

    /// A donor that reconnects replays pending requests from the store
    /// and does not re-alert for events it already covered.
    #[tokio::test]
    async fn test_offline_donor_resyncs() {
        let node = node();
        let donor = register(&node, person("Donor", true, Visibility::Everyone)).await;
        let patient = register(&node, person("Patient", false, Visibility::Everyone)).await;

        // Request raised while the donor has no subscription
        node.engine
            .create_request(targeted_request(patient, donor, Urgency::Critical))
            .await
            .unwrap();

        let mut donor_client = ProfileSubscription::subscribe(&node.bus, donor, Role::Donor);
        let replayed = donor_client.resync(node.store.as_ref()).await.unwrap();
        assert_eq!(replayed.len(), 1);
        assert!(matches!(
            replayed[0],
            ClientAlert::NewRequest {
                alert: AlertPattern::UrgentAlarm,
                ..
            }
        ));

        // A second resync replays nothing
        assert!(donor_client
            .resync(node.store.as_ref())
            .await
            .unwrap()
            .is_empty());

        // A fresh request still comes through live
        node.engine
            .create_request(targeted_request(patient, donor, Urgency::Normal))
            .await
            .unwrap();
        let alert = next_alert(&mut donor_client).await;
        assert!(matches!(
            alert,
            ClientAlert::NewRequest {
                alert: AlertPattern::Buzzer,
                ..
            }
        ));
    }

    // =============================================================================
    // SCENARIO: LIFECYCLE GUARDRAILS
    // =============================================================================

    #[tokio::test]
    async fn test_declined_request_stays_declined() {
        let node = node();
        let donor = register(&node, person("Donor", true, Visibility::Everyone)).await;
        let patient = register(&node, person("Patient", false, Visibility::Everyone)).await;

        let request = node
            .engine
            .create_request(targeted_request(patient, donor, Urgency::Normal))
            .await
            .unwrap();
        node.engine
            .transition(request.id, donor, RequestStatus::Declined)
            .await
            .unwrap();

        let err = node
            .engine
            .transition(request.id, donor, RequestStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition { .. }));

        // Declining never unmasks
        let donor_row = node.store.profile(donor).await.unwrap();
        let decision = resolve_via_store(patient, &donor_row, node.store.as_ref())
            .await
            .unwrap();
        assert!(!decision.phone_visible());
    }
}
