// ==========================================
// AuditGov - Entity resolver
// ==========================================
// get-or-insert of Agency / City, in order:
//   1. normalized key -> cache hit: no store access
//   2. store lookup by the same normalized key -> cache + return
//   3. insert the original text -> cache + return
// Single writer: the resolver is `&mut self` and owned by one run, so
// steps 1-3 cannot interleave for the same key
// ==========================================

use crate::db::normalize_key;
use crate::domain::types::{EntityId, EntityKind};
use crate::domain::{Agency, City};
use crate::engine::resolution_cache::{agency_key, city_key, ResolutionCache};
use crate::repository::{RepositoryError, RepositoryResult, TripImportRepository};
use std::sync::Arc;
use tracing::instrument;

/// Something the resolver can map to an id
#[derive(Debug, Clone, Copy)]
pub enum EntityCandidate<'a> {
    Agency(&'a Agency),
    City(&'a City),
}

impl EntityCandidate<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityCandidate::Agency(_) => EntityKind::Agency,
            EntityCandidate::City(_) => EntityKind::City,
        }
    }
}

/// Store ids must be positive
fn checked_id(kind: EntityKind, id: EntityId) -> RepositoryResult<EntityId> {
    if id <= 0 {
        return Err(RepositoryError::InvalidIdentifier { kind, id });
    }
    Ok(id)
}

// ==========================================
// EntityResolver
// ==========================================
pub struct EntityResolver {
    repo: Arc<dyn TripImportRepository>,
    cache: ResolutionCache,
    agencies_created: usize,
    cities_created: usize,
}

impl EntityResolver {
    /// Fresh resolver with an empty cache
    pub fn new(repo: Arc<dyn TripImportRepository>) -> Self {
        Self {
            repo,
            cache: ResolutionCache::new(),
            agencies_created: 0,
            cities_created: 0,
        }
    }

    /// Resolve either kind of candidate
    pub fn resolve(&mut self, candidate: EntityCandidate<'_>) -> RepositoryResult<EntityId> {
        match candidate {
            EntityCandidate::Agency(agency) => self.resolve_agency(agency),
            EntityCandidate::City(city) => self.resolve_city(city),
        }
    }

    #[instrument(level = "trace", skip(self, agency), fields(name = %agency.name))]
    pub fn resolve_agency(&mut self, agency: &Agency) -> RepositoryResult<EntityId> {
        let key = agency_key(&agency.name);

        if let Some(id) = self.cache.get(EntityKind::Agency, &key) {
            return Ok(id);
        }

        if let Some(id) = self.repo.find_agency_id(&key)? {
            let id = checked_id(EntityKind::Agency, id)?;
            return Ok(self.cache.insert(EntityKind::Agency, key, id));
        }

        let id = checked_id(EntityKind::Agency, self.repo.insert_agency(agency)?)?;
        self.agencies_created += 1;
        tracing::debug!(agency_id = id, key = %key, "agency created");
        Ok(self.cache.insert(EntityKind::Agency, key, id))
    }

    #[instrument(level = "trace", skip(self, city), fields(name = %city.name, region = %city.region))]
    pub fn resolve_city(&mut self, city: &City) -> RepositoryResult<EntityId> {
        let key = city_key(&city.name, &city.region);

        if let Some(id) = self.cache.get(EntityKind::City, &key) {
            return Ok(id);
        }

        let name = normalize_key(&city.name);
        let region = normalize_key(&city.region);
        if let Some(id) = self.repo.find_city_id(&name, &region)? {
            let id = checked_id(EntityKind::City, id)?;
            return Ok(self.cache.insert(EntityKind::City, key, id));
        }

        let id = checked_id(EntityKind::City, self.repo.insert_city(city)?)?;
        self.cities_created += 1;
        tracing::debug!(city_id = id, key = %key, "city created");
        Ok(self.cache.insert(EntityKind::City, key, id))
    }

    // ===== Monitoring / maintenance =====

    pub fn cache_size(&self, kind: EntityKind) -> usize {
        self.cache.len(kind)
    }

    /// Rows inserted by this resolver, per kind
    pub fn created(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Agency => self.agencies_created,
            EntityKind::City => self.cities_created,
        }
    }

    pub fn clear_agencies(&mut self) {
        self.cache.clear_agencies();
    }

    pub fn clear_cities(&mut self) {
        self.cache.clear_cities();
    }

    /// Forget every cached id; later calls re-query the store
    pub fn clear_all(&mut self) {
        self.cache.clear_all();
    }
}
