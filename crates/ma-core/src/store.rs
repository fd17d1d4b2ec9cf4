//! In-memory entity state store
//!
//! The store is the host-side view of every entity state. Sensors in current
//! mode only ever see it through the read-only [`StateLookup`] trait.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::{EntityId, State};

/// Read-only access to entity states by entity id
pub trait StateLookup: Send + Sync {
    /// Get the current state of an entity
    fn get(&self, entity_id: &str) -> Option<State>;

    /// Check whether an entity currently has a state
    fn contains(&self, entity_id: &str) -> bool {
        self.get(entity_id).is_some()
    }
}

/// Concurrent store of entity states, keyed by entity_id string
#[derive(Debug, Default)]
pub struct StateStore {
    states: DashMap<String, State>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state of an entity
    ///
    /// If the entity already has a state, `last_changed` is only moved when
    /// the state value actually differs.
    #[instrument(skip(self, state, attributes), fields(entity_id = %entity_id))]
    pub fn set(
        &self,
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
    ) -> State {
        let key = entity_id.to_string();

        let new_state = match self.states.get(&key) {
            Some(existing) => existing.with_update(state, attributes),
            None => State::new(entity_id, state, attributes),
        };

        debug!(state = %new_state.state, "Setting entity state");
        self.states.insert(key, new_state.clone());

        new_state
    }

    /// Insert a fully formed state, e.g. one loaded from a seed file
    pub fn insert(&self, state: State) {
        trace!(entity_id = %state.entity_id, "Inserting entity state");
        self.states.insert(state.entity_id.to_string(), state);
    }

    /// Get the state value as a string, or None if entity doesn't exist
    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get(entity_id).map(|s| s.state.clone())
    }

    /// Get all entity IDs for a domain
    pub fn entity_ids(&self, domain: &str) -> Vec<String> {
        self.states
            .iter()
            .filter(|r| r.value().entity_id.domain() == domain)
            .map(|r| r.key().clone())
            .collect()
    }

    /// Remove an entity's state
    pub fn remove(&self, entity_id: &str) -> Option<State> {
        self.states.remove(entity_id).map(|(_, s)| s)
    }

    pub fn entity_count(&self) -> usize {
        self.states.len()
    }
}

impl StateLookup for StateStore {
    fn get(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id).map(|s| s.clone())
    }
}

/// Thread-safe shared state store
pub type SharedStateStore = Arc<StateStore>;
