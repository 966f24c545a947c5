// ==========================================
// AuditGov - Resolution cache
// ==========================================
// normalized key -> store id, one map per entity kind
// Entries are only added during a run; a hit is never re-validated because
// entity rows are immutable once created
// Owned by one run: never global, never shared between runs
// ==========================================

use crate::db::normalize_key;
use crate::domain::types::{EntityId, EntityKind};
use std::collections::HashMap;

/// Separator between city name and region in the city key
pub const CITY_KEY_SEPARATOR: char = '|';

/// Agency key: normalized name
pub fn agency_key(name: &str) -> String {
    normalize_key(name)
}

/// City key: `NAME|REGION`, both normalized
pub fn city_key(name: &str, region: &str) -> String {
    format!(
        "{}{}{}",
        normalize_key(name),
        CITY_KEY_SEPARATOR,
        normalize_key(region)
    )
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    agencies: HashMap<String, EntityId>,
    cities: HashMap<String, EntityId>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: EntityKind) -> &HashMap<String, EntityId> {
        match kind {
            EntityKind::Agency => &self.agencies,
            EntityKind::City => &self.cities,
        }
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Option<EntityId> {
        self.map(kind).get(key).copied()
    }

    /// Record an id; an existing entry for the key is kept
    pub fn insert(&mut self, kind: EntityKind, key: String, id: EntityId) -> EntityId {
        let map = match kind {
            EntityKind::Agency => &mut self.agencies,
            EntityKind::City => &mut self.cities,
        };
        *map.entry(key).or_insert(id)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.agencies.is_empty() && self.cities.is_empty()
    }

    pub fn clear_agencies(&mut self) {
        self.agencies.clear();
    }

    pub fn clear_cities(&mut self) {
        self.cities.clear();
    }

    pub fn clear_all(&mut self) {
        self.clear_agencies();
        self.clear_cities();
    }
}
