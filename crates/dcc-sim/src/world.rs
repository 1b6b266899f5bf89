//! Campaign registry.
//!
//! `World` wraps a hecs world in which every entity is an
//! `(EntityMeta, <record>)` pair, and keeps the per-coalition query indexes
//! in step with entity state. All reads and writes of campaign entities go
//! through this type; ids are stable across snapshot round-trips.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dcc_core::components::*;
use dcc_core::enums::{Coalition, EntityType, QueryKey};
use dcc_core::types::EntityId;

use crate::error::CampaignError;

/// A record component type stored in the registry.
pub trait Record: hecs::Component + Clone {
    /// Human-readable kind used in wrong-type errors.
    const KIND: &'static str;

    /// Wrap into an [`EntityRecord`] of the given entity type.
    fn into_record(self, entity_type: EntityType) -> EntityRecord;
}

impl Record for Aircraft {
    const KIND: &'static str = "Aircraft";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::Aircraft(self)
    }
}

impl Record for HomeBase {
    const KIND: &'static str = "HomeBase";
    fn into_record(self, entity_type: EntityType) -> EntityRecord {
        match entity_type {
            EntityType::Farp => EntityRecord::Farp(self),
            EntityType::Carrier => EntityRecord::Carrier(self),
            _ => EntityRecord::Airdrome(self),
        }
    }
}

impl Record for FlightGroup {
    const KIND: &'static str = "FlightGroup";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::FlightGroup(self)
    }
}

impl Record for GroundGroup {
    const KIND: &'static str = "GroundGroup";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::GroundGroup(self)
    }
}

impl Record for GroundUnit {
    const KIND: &'static str = "GroundUnit";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::GroundUnit(self)
    }
}

impl Record for Objective {
    const KIND: &'static str = "Objective";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::Objective(self)
    }
}

impl Record for Package {
    const KIND: &'static str = "Package";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::Package(self)
    }
}

impl Record for Structure {
    const KIND: &'static str = "Structure";
    fn into_record(self, entity_type: EntityType) -> EntityRecord {
        match entity_type {
            EntityType::UnitCamp => EntityRecord::UnitCamp(self),
            _ => EntityRecord::Building(self),
        }
    }
}

impl Record for SamSite {
    const KIND: &'static str = "SAM";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::Sam(self)
    }
}

impl Record for DownedPilot {
    const KIND: &'static str = "DownedPilot";
    fn into_record(self, _: EntityType) -> EntityRecord {
        EntityRecord::DownedPilot(self)
    }
}

fn spawn_record(ecs: &mut hecs::World, meta: EntityMeta, record: EntityRecord) -> hecs::Entity {
    match record {
        EntityRecord::Aircraft(r) => ecs.spawn((meta, r)),
        EntityRecord::Airdrome(r) | EntityRecord::Farp(r) | EntityRecord::Carrier(r) => {
            ecs.spawn((meta, r))
        }
        EntityRecord::FlightGroup(r) => ecs.spawn((meta, r)),
        EntityRecord::GroundGroup(r) => ecs.spawn((meta, r)),
        EntityRecord::GroundUnit(r) => ecs.spawn((meta, r)),
        EntityRecord::Objective(r) => ecs.spawn((meta, r)),
        EntityRecord::Package(r) => ecs.spawn((meta, r)),
        EntityRecord::Building(r) | EntityRecord::UnitCamp(r) => ecs.spawn((meta, r)),
        EntityRecord::Sam(r) => ecs.spawn((meta, r)),
        EntityRecord::DownedPilot(r) => ecs.spawn((meta, r)),
    }
}

/// Query membership that disagrees with the entity's state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMismatch {
    pub id: EntityId,
    pub expected: Vec<(Coalition, QueryKey)>,
    pub found: Vec<(Coalition, QueryKey)>,
}

pub struct World {
    ecs: hecs::World,
    handles: BTreeMap<EntityId, hecs::Entity>,
    queries: HashMap<(Coalition, QueryKey), BTreeSet<EntityId>>,
    next_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            ecs: hecs::World::new(),
            handles: BTreeMap::new(),
            queries: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// All live ids in ascending order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.handles.keys().copied().collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Id the next `create` will hand out.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn reserve_ids_below(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    // --- Creation ---

    /// Register a new entity and index it in every query its state satisfies.
    pub fn create(&mut self, coalition: Coalition, record: EntityRecord) -> EntityId {
        let id = EntityId(self.next_id);
        self.insert(id, coalition, record);
        id
    }

    /// Register an entity under a known id.
    pub(crate) fn insert(&mut self, id: EntityId, coalition: Coalition, record: EntityRecord) {
        let keys = record.queries();
        let meta = EntityMeta {
            id,
            coalition,
            entity_type: record.entity_type(),
        };
        let handle = spawn_record(&mut self.ecs, meta, record);
        self.handles.insert(id, handle);
        for key in keys {
            self.queries.entry((coalition, key)).or_default().insert(id);
        }
        self.next_id = self.next_id.max(id.0 + 1);
    }

    // --- Lookup ---

    fn handle(&self, id: EntityId) -> Result<hecs::Entity, CampaignError> {
        self.handles
            .get(&id)
            .copied()
            .ok_or(CampaignError::NotFound(id))
    }

    pub fn meta(&self, id: EntityId) -> Result<EntityMeta, CampaignError> {
        let handle = self.handle(id)?;
        self.ecs
            .get::<&EntityMeta>(handle)
            .map(|m| *m)
            .map_err(|_| CampaignError::NotFound(id))
    }

    pub fn coalition(&self, id: EntityId) -> Result<Coalition, CampaignError> {
        Ok(self.meta(id)?.coalition)
    }

    pub fn entity_type(&self, id: EntityId) -> Result<EntityType, CampaignError> {
        Ok(self.meta(id)?.entity_type)
    }

    fn wrong_type(&self, id: EntityId, expected: &'static str) -> CampaignError {
        match self.meta(id) {
            Ok(meta) => CampaignError::WrongEntityType {
                id,
                expected,
                found: meta.entity_type,
            },
            Err(e) => e,
        }
    }

    /// Borrow the record of `id` as `T`.
    pub fn get<T: Record>(&self, id: EntityId) -> Result<hecs::Ref<'_, T>, CampaignError> {
        let handle = self.handle(id)?;
        self.ecs
            .get::<&T>(handle)
            .map_err(|_| self.wrong_type(id, T::KIND))
    }

    pub fn get_cloned<T: Record>(&self, id: EntityId) -> Result<T, CampaignError> {
        Ok(T::clone(&*self.get::<T>(id)?))
    }

    /// Owned copy of any entity's record.
    pub fn record(&self, id: EntityId) -> Result<EntityRecord, CampaignError> {
        let meta = self.meta(id)?;
        Ok(match meta.entity_type {
            EntityType::Aircraft => self.get_cloned::<Aircraft>(id)?.into_record(meta.entity_type),
            EntityType::Airdrome | EntityType::Farp | EntityType::Carrier => {
                self.get_cloned::<HomeBase>(id)?.into_record(meta.entity_type)
            }
            EntityType::FlightGroup => {
                self.get_cloned::<FlightGroup>(id)?.into_record(meta.entity_type)
            }
            EntityType::GroundGroup => {
                self.get_cloned::<GroundGroup>(id)?.into_record(meta.entity_type)
            }
            EntityType::GroundUnit => {
                self.get_cloned::<GroundUnit>(id)?.into_record(meta.entity_type)
            }
            EntityType::Objective => self.get_cloned::<Objective>(id)?.into_record(meta.entity_type),
            EntityType::Package => self.get_cloned::<Package>(id)?.into_record(meta.entity_type),
            EntityType::Building | EntityType::UnitCamp => {
                self.get_cloned::<Structure>(id)?.into_record(meta.entity_type)
            }
            EntityType::Sam => self.get_cloned::<SamSite>(id)?.into_record(meta.entity_type),
            EntityType::DownedPilot => {
                self.get_cloned::<DownedPilot>(id)?.into_record(meta.entity_type)
            }
        })
    }

    /// Every entity carrying record `T`, sorted by id.
    pub fn iter<T: Record>(&self) -> Vec<(EntityMeta, T)> {
        let mut out: Vec<(EntityMeta, T)> = self
            .ecs
            .query::<(&EntityMeta, &T)>()
            .iter()
            .map(|(_, (meta, record))| (*meta, record.clone()))
            .collect();
        out.sort_by_key(|(meta, _)| meta.id);
        out
    }

    /// Ids of every entity of one type, ascending.
    pub fn ids_of_type(&self, entity_type: EntityType) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .ecs
            .query::<&EntityMeta>()
            .iter()
            .filter(|(_, meta)| meta.entity_type == entity_type)
            .map(|(_, meta)| meta.id)
            .collect();
        ids.sort();
        ids
    }

    // --- Mutation ---

    /// Mutate a record and re-index the entity's query memberships.
    pub fn update<T: Record, R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, CampaignError> {
        let out = self.modify(id, f)?;
        self.sync_queries(id)?;
        Ok(out)
    }

    /// Mutate a record without touching query membership. Only for fields
    /// no query predicate reads.
    pub(crate) fn modify<T: Record, R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, CampaignError> {
        let handle = self.handle(id)?;
        let mut record = self
            .ecs
            .get::<&mut T>(handle)
            .map_err(|_| self.wrong_type(id, T::KIND))?;
        Ok(f(&mut *record))
    }

    /// Mutate an owner that may already be gone; a missing owner is skipped.
    fn detach<T: Record>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut T),
    ) -> Result<(), CampaignError> {
        if self.contains(id) {
            self.modify(id, f)?;
        }
        Ok(())
    }

    /// Atomically re-index `id` from one query to another.
    pub fn move_query(
        &mut self,
        id: EntityId,
        from: QueryKey,
        to: QueryKey,
    ) -> Result<(), CampaignError> {
        let coalition = self.coalition(id)?;
        if let Some(set) = self.queries.get_mut(&(coalition, from)) {
            set.remove(&id);
        }
        self.queries.entry((coalition, to)).or_default().insert(id);
        Ok(())
    }

    /// Hand an entity over to another coalition.
    pub fn set_coalition(&mut self, id: EntityId, coalition: Coalition) -> Result<(), CampaignError> {
        let handle = self.handle(id)?;
        for set in self.queries.values_mut() {
            set.remove(&id);
        }
        {
            let mut meta = self
                .ecs
                .get::<&mut EntityMeta>(handle)
                .map_err(|_| CampaignError::NotFound(id))?;
            meta.coalition = coalition;
        }
        self.sync_queries(id)
    }

    fn sync_queries(&mut self, id: EntityId) -> Result<(), CampaignError> {
        let coalition = self.coalition(id)?;
        let expected: BTreeSet<QueryKey> = self.record(id)?.queries().into_iter().collect();
        for key in QueryKey::ALL {
            if expected.contains(&key) {
                self.queries.entry((coalition, key)).or_default().insert(id);
            } else if let Some(set) = self.queries.get_mut(&(coalition, key)) {
                set.remove(&id);
            }
        }
        Ok(())
    }

    // --- Queries ---

    /// Members of a coalition's query, ascending by id.
    pub fn query(&self, coalition: Coalition, key: QueryKey) -> Vec<EntityId> {
        self.queries
            .get(&(coalition, key))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn query_count(&self, coalition: Coalition, key: QueryKey) -> usize {
        self.queries
            .get(&(coalition, key))
            .map(|set| set.len())
            .unwrap_or(0)
    }

    pub fn query_contains(&self, coalition: Coalition, key: QueryKey, id: EntityId) -> bool {
        self.queries
            .get(&(coalition, key))
            .map(|set| set.contains(&id))
            .unwrap_or(false)
    }

    /// Queries `id` currently belongs to, under its own coalition.
    pub fn memberships(&self, id: EntityId) -> Result<Vec<QueryKey>, CampaignError> {
        let coalition = self.coalition(id)?;
        Ok(QueryKey::ALL
            .into_iter()
            .filter(|key| self.query_contains(coalition, *key, id))
            .collect())
    }

    /// Entities whose indexed membership disagrees with their state.
    pub fn query_mismatches(&self) -> Vec<QueryMismatch> {
        let mut found: BTreeMap<EntityId, Vec<(Coalition, QueryKey)>> = BTreeMap::new();
        for ((coalition, key), set) in &self.queries {
            for id in set {
                found.entry(*id).or_default().push((*coalition, *key));
            }
        }

        let mut mismatches = Vec::new();
        let mut ids: BTreeSet<EntityId> = self.handles.keys().copied().collect();
        ids.extend(found.keys().copied());
        for id in ids {
            let mut expected: Vec<(Coalition, QueryKey)> = match (self.meta(id), self.record(id)) {
                (Ok(meta), Ok(record)) => record
                    .queries()
                    .into_iter()
                    .map(|key| (meta.coalition, key))
                    .collect(),
                _ => Vec::new(),
            };
            let mut actual = found.remove(&id).unwrap_or_default();
            expected.sort();
            actual.sort();
            if expected != actual {
                mismatches.push(QueryMismatch {
                    id,
                    expected,
                    found: actual,
                });
            }
        }
        mismatches
    }

    // --- Aircraft tasking ---

    /// Task an idle aircraft into a flight group.
    pub fn assign_aircraft(
        &mut self,
        id: EntityId,
        flight_group_id: EntityId,
        call_sign: CallSign,
        name: String,
        loadout: Loadout,
    ) -> Result<(), CampaignError> {
        self.modify::<Aircraft, _>(id, |a| {
            a.flight_group_id = Some(flight_group_id);
            a.call_sign = Some(call_sign);
            a.name = Some(name);
            a.loadout = Some(loadout);
        })?;
        self.move_query(id, QueryKey::AircraftIdle, QueryKey::AircraftInUse)
    }

    /// Return a tasked aircraft to the idle pool.
    pub fn release_aircraft(&mut self, id: EntityId) -> Result<(), CampaignError> {
        self.modify::<Aircraft, _>(id, |a| {
            a.flight_group_id = None;
            a.call_sign = None;
            a.name = None;
            a.loadout = None;
            a.is_client = false;
        })?;
        self.move_query(id, QueryKey::AircraftInUse, QueryKey::AircraftIdle)
    }

    // --- Ground war ---

    /// Mark a ground unit killed. The group goes away with its last living
    /// unit; returns whether that happened.
    pub fn kill_ground_unit(&mut self, id: EntityId, time: f64) -> Result<bool, CampaignError> {
        let group_id = self.update::<GroundUnit, _>(id, |u| {
            u.alive = false;
            u.destroyed_time.get_or_insert(time);
            u.group_id
        })?;
        if !self.contains(group_id) {
            return Ok(false);
        }
        let units: Vec<EntityId> = self.get::<GroundGroup>(group_id)?.all_unit_ids().collect();
        for unit in units {
            if self.get::<GroundUnit>(unit)?.alive {
                return Ok(false);
            }
        }
        self.destroy(group_id)?;
        Ok(true)
    }

    // --- Destruction ---

    /// Remove an entity and everything it owns; owners and referrers drop
    /// their references to it. Returns the removed record.
    pub fn destroy(&mut self, id: EntityId) -> Result<EntityRecord, CampaignError> {
        let record = self.record(id)?;
        self.remove_entity(id)?;

        match &record {
            EntityRecord::Aircraft(a) => {
                self.detach::<HomeBase>(a.home_base_id, |b| b.aircraft_ids.retain(|x| *x != id))?;
                if let Some(fg) = a.flight_group_id {
                    self.detach::<FlightGroup>(fg, |g| {
                        let before = g.aircraft_ids.len();
                        g.aircraft_ids.retain(|x| *x != id);
                        if g.aircraft_ids.len() < before {
                            g.losses += 1;
                        }
                    })?;
                }
            }
            EntityRecord::Airdrome(b) | EntityRecord::Farp(b) | EntityRecord::Carrier(b) => {
                let homed: Vec<EntityId> = self
                    .iter::<FlightGroup>()
                    .into_iter()
                    .filter(|(_, fg)| fg.home_base_id == id)
                    .map(|(meta, _)| meta.id)
                    .collect();
                for fg in homed {
                    self.destroy_if_present(fg)?;
                }
                for aircraft in &b.aircraft_ids {
                    self.destroy_if_present(*aircraft)?;
                }
            }
            EntityRecord::FlightGroup(fg) => {
                for aircraft in &fg.aircraft_ids {
                    if self.contains(*aircraft) {
                        self.release_aircraft(*aircraft)?;
                    }
                }
                self.detach::<Package>(fg.package_id, |p| p.flight_group_ids.retain(|x| *x != id))?;
            }
            EntityRecord::Package(p) => {
                for fg in &p.flight_group_ids {
                    self.destroy_if_present(*fg)?;
                }
            }
            EntityRecord::GroundGroup(g) => {
                for unit in g.all_unit_ids() {
                    self.destroy_if_present(unit)?;
                }
                let objectives: Vec<EntityId> = self
                    .iter::<Objective>()
                    .into_iter()
                    .filter(|(_, o)| o.incoming_ground_groups.values().any(|g| *g == id))
                    .map(|(meta, _)| meta.id)
                    .collect();
                for objective in objectives {
                    self.modify::<Objective, _>(objective, |o| {
                        o.incoming_ground_groups.retain(|_, g| *g != id)
                    })?;
                }
            }
            EntityRecord::GroundUnit(u) => {
                self.detach::<GroundGroup>(u.group_id, |g| {
                    g.unit_ids.retain(|x| *x != id);
                    g.shorad_unit_ids.retain(|x| *x != id);
                })?;
            }
            EntityRecord::Objective(o) => {
                for structure in &o.structure_ids {
                    self.destroy_if_present(*structure)?;
                }
                for sam in &o.sam_ids {
                    self.destroy_if_present(*sam)?;
                }
                let groups: Vec<EntityId> = self
                    .iter::<GroundGroup>()
                    .into_iter()
                    .filter(|(_, g)| g.start_objective_id == id || g.target_objective_id == id)
                    .map(|(meta, _)| meta.id)
                    .collect();
                for group in groups {
                    self.destroy_if_present(group)?;
                }
            }
            EntityRecord::Building(s) | EntityRecord::UnitCamp(s) => {
                self.detach::<Objective>(s.objective_id, |o| o.structure_ids.retain(|x| *x != id))?;
            }
            EntityRecord::Sam(s) => {
                self.detach::<Objective>(s.objective_id, |o| o.sam_ids.retain(|x| *x != id))?;
            }
            EntityRecord::DownedPilot(_) => {}
        }

        self.clear_task_targets(id)?;
        Ok(record)
    }

    fn destroy_if_present(&mut self, id: EntityId) -> Result<(), CampaignError> {
        if self.contains(id) {
            self.destroy(id)?;
        }
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<(), CampaignError> {
        let handle = self
            .handles
            .remove(&id)
            .ok_or(CampaignError::NotFound(id))?;
        for set in self.queries.values_mut() {
            set.remove(&id);
        }
        self.ecs
            .despawn(handle)
            .map_err(|_| CampaignError::NotFound(id))
    }

    fn clear_task_targets(&mut self, id: EntityId) -> Result<(), CampaignError> {
        let referrers: Vec<EntityId> = self
            .iter::<FlightGroup>()
            .into_iter()
            .filter(|(_, fg)| fg.task.target_id() == Some(id))
            .map(|(meta, _)| meta.id)
            .collect();
        for fg in referrers {
            self.modify::<FlightGroup, _>(fg, |g| g.task.clear_target())?;
        }
        Ok(())
    }
}
