//! Builds and connects the subsystems for single-node operation.

use crate::container::RuntimeConfig;
use hl_01_profile_store::{MemoryBlobStore, MemoryStore, StaticIdentityProvider};
use hl_03_contact_graph::ContactGraph;
use hl_04_request_engine::RequestEngine;
use shared_bus::InMemoryEventBus;
use shared_types::{AccountId, Area, AreaId, District, StateRegion, StoreError};
use std::sync::Arc;
use tracing::info;

/// All wired subsystems sharing one store and one bus.
pub struct Subsystems {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub blobs: Arc<MemoryBlobStore>,
    pub identity: Arc<StaticIdentityProvider>,
    pub engine: RequestEngine<MemoryStore, InMemoryEventBus>,
    pub graph: ContactGraph<MemoryStore>,
}

impl Subsystems {
    /// Build the store, bus, and engines, and seed reference data.
    pub fn build(config: &RuntimeConfig) -> Result<Self, StoreError> {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.capacity));
        let blobs = Arc::new(MemoryBlobStore::new());
        let identity = Arc::new(StaticIdentityProvider::new(AccountId::new()));

        seed_reference_data(&store)?;

        let engine = RequestEngine::new(Arc::clone(&store), Arc::clone(&bus));
        let graph = ContactGraph::new(Arc::clone(&store));

        info!(bus_capacity = config.bus.capacity, "Subsystems wired");
        Ok(Self {
            store,
            bus,
            blobs,
            identity,
            engine,
            graph,
        })
    }
}

fn seed_reference_data(store: &MemoryStore) -> Result<(), StoreError> {
    for name in ["Dhanmondi", "Gulshan", "Mirpur", "Uttara"] {
        store.seed_area(Area {
            id: AreaId::new(),
            name: name.to_string(),
        })?;
    }
    for name in ["Dhaka", "Chattogram", "Sylhet"] {
        store.seed_district(District {
            id: AreaId::new(),
            name: name.to_string(),
        })?;
    }
    for name in ["Dhaka Division", "Khulna Division", "Rajshahi Division"] {
        store.seed_state(StateRegion {
            id: AreaId::new(),
            name: name.to_string(),
        })?;
    }
    Ok(())
}
