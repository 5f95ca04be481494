//! # HemoLink Node Runtime
//!
//! Single-node entry point wiring the matching core end to end:
//!
//! ```text
//! Contact Graph(3) ──┐
//!                    │            publish after commit
//! Request Engine(4) ─┼─→ Profile Store(1) ─────→ Event Bus
//!                    │                               │
//! Visibility(2) ─────┘                               ↓
//!                                       Notify Dispatcher(5)
//!                                       (one subscription per profile)
//! ```
//!
//! ## Startup sequence
//!
//! 1. Load configuration from environment
//! 2. Initialize tracing
//! 3. Wire store, bus, engines
//! 4. Run the demo flow (register, connect, request, accept)
//! 5. Wait for Ctrl+C

mod container;
mod telemetry;
mod wiring;

use anyhow::{Context, Result};
use chrono::Utc;
use container::RuntimeConfig;
use hl_01_profile_store::{BlobStore, IdentityProvider, ProfileStore};
use hl_02_visibility::{resolve_all_via_store, resolve_via_store, VisibilityDecision};
use hl_05_notify::{ProfileSubscription, Role};
use shared_types::{
    AccountId, BloodGroup, NewBloodRequest, Profile, ProfileId, RequestStatus, Urgency,
    Visibility,
};
use tracing::info;
use wiring::Subsystems;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    config.validate().context("invalid configuration")?;
    telemetry::init(&config.log.level)?;

    info!("===========================================");
    info!("  HemoLink Node Runtime v0.1.0");
    info!("===========================================");

    let subsystems = Subsystems::build(&config).context("failed to wire subsystems")?;

    if config.demo.run_demo_flow {
        run_demo(&subsystems).await.context("demo flow failed")?;
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown complete");
    Ok(())
}

/// End-to-end walkthrough of the core flows; living documentation of the
/// wiring. Registers a donor and a patient, connects them, raises a
/// critical request, and accepts it.
async fn run_demo(subsystems: &Subsystems) -> Result<()> {
    let account = subsystems
        .identity
        .current_account()
        .await?
        .context("no signed-in account")?;
    info!(%account, "Signed in");

    let areas = subsystems.store.areas().await?;
    let districts = subsystems.store.districts().await?;
    let states = subsystems.store.states().await?;
    info!(
        areas = areas.len(),
        districts = districts.len(),
        states = states.len(),
        "Reference data loaded"
    );
    let area = areas.first().map(|a| a.id);

    let donor = demo_profile("Demo Donor", BloodGroup::ONeg, true, area);
    let patient = demo_profile("Demo Patient", BloodGroup::ONeg, false, area);
    let (donor_id, patient_id) = (donor.id, patient.id);
    subsystems.store.insert_profile(donor).await?;
    subsystems.store.insert_profile(patient).await?;
    info!(%donor_id, %patient_id, "Demo profiles registered");

    // The donor's client comes online
    let mut donor_client = ProfileSubscription::subscribe(&subsystems.bus, donor_id, Role::Donor);
    let mut patient_client =
        ProfileSubscription::subscribe(&subsystems.bus, patient_id, Role::Patient);

    // Patient finds the donor through area search; strangers come back masked
    let donors = subsystems
        .store
        .donors_in_area(area.context("no areas seeded")?, patient_id)
        .await?;
    let decisions =
        resolve_all_via_store(patient_id, &donors, subsystems.store.as_ref()).await?;
    let masked = decisions.iter().filter(|d| !d.phone_visible()).count();
    info!(found = donors.len(), masked, "Area search results");

    // Donor keeps the patient in their network
    let outcome = subsystems.graph.add_contact(donor_id, patient_id).await?;
    info!(?outcome, "Donor added patient as contact");

    // Patient uploads a report, then raises a critical request
    let report_path = format!("{patient_id}/report.pdf");
    subsystems
        .blobs
        .upload(&report_path, b"demo report".to_vec())
        .await?;
    let request = subsystems
        .engine
        .create_request(NewBloodRequest {
            patient_id,
            donor_id: Some(donor_id),
            blood_group: BloodGroup::ONeg,
            urgency: Urgency::Critical,
            units_required: 2,
            hospital_name: Some("City Hospital".to_string()),
            message: Some("Surgery scheduled tomorrow morning".to_string()),
            medical_report_path: Some(report_path),
        })
        .await?;
    if let Some(url) = subsystems
        .engine
        .report_url(&request, subsystems.blobs.as_ref())
        .await?
    {
        info!(%url, "Signed report link minted");
    }

    if let Some(alert) = donor_client.next_alert().await {
        info!(?alert, "Donor client alerted");
    }

    // Donor accepts; the patient is alerted and the pair unmasks
    subsystems
        .engine
        .transition(request.id, donor_id, RequestStatus::Accepted)
        .await?;
    if let Some(alert) = patient_client.next_alert().await {
        info!(?alert, "Patient client alerted");
    }

    let donor_row = subsystems.store.profile(donor_id).await?;
    let decision = resolve_via_store(patient_id, &donor_row, subsystems.store.as_ref()).await?;
    match decision {
        VisibilityDecision::Contact { profile, reason } => {
            info!(phone = ?profile.phone, ?reason, "Donor contact details now visible");
        }
        other => info!(?other, "Unexpected visibility decision"),
    }

    Ok(())
}

fn demo_profile(
    name: &str,
    blood_group: BloodGroup,
    is_donor: bool,
    area: Option<shared_types::AreaId>,
) -> Profile {
    let now = Utc::now();
    Profile {
        id: ProfileId::new(),
        account_id: AccountId::new(),
        full_name: name.to_string(),
        blood_group,
        is_donor,
        is_available: is_donor,
        visibility: Visibility::Everyone,
        phone: Some("5551234567".to_string()),
        area_id: area,
        district: Some("Dhaka".to_string()),
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
