//! World snapshots.
//!
//! A snapshot is a flat, versioned list of JSON objects, one per entity:
//! the record's own fields plus the `entityType`, `id`, `coalition` and
//! `queries` header. Restoring validates the whole list first (header,
//! record schema, duplicate ids, query membership and every cross
//! reference) and only then builds a new `World`, so a rejected snapshot
//! never yields a partial registry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use dcc_core::components::EntityRecord;
use dcc_core::constants::SNAPSHOT_VERSION;
use dcc_core::enums::{Coalition, EntityType, QueryKey};
use dcc_core::types::EntityId;

use crate::campaign::CampaignMeta;
use crate::world::World;

const ENTITY_TYPE: &str = "entityType";
const ID: &str = "id";
const COALITION: &str = "coalition";
const QUERIES: &str = "queries";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("entity #{index} is not an object")]
    NotAnObject { index: usize },
    #[error("entity #{index} has unknown entity type {value}")]
    UnknownEntityType { index: usize, value: String },
    #[error("entity #{index} is missing field `{field}`")]
    MissingField { index: usize, field: String },
    #[error("entity #{index} is invalid: {message}")]
    InvalidField { index: usize, message: String },
    #[error("duplicate entity id {0}")]
    DuplicateId(EntityId),
    #[error("entity {id} field `{field}` points at {target}, which is missing or of the wrong type")]
    DanglingReference {
        id: EntityId,
        field: &'static str,
        target: EntityId,
    },
    #[error("entity {id} query membership {found:?} does not match its state {expected:?}")]
    InconsistentQueries {
        id: EntityId,
        expected: Vec<QueryKey>,
        found: Vec<QueryKey>,
    },
    #[error("failed to encode entity {id}: {message}")]
    Encode { id: EntityId, message: String },
}

/// Serialized registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    /// Id counter at save time; restored worlds never hand out a lower id.
    #[serde(default)]
    pub next_id: u64,
    pub entities: Vec<Value>,
}

/// Campaign save: the campaign state beside its world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: u32,
    pub campaign: CampaignMeta,
    pub world: Snapshot,
}

pub fn serialize(world: &World) -> Result<Snapshot, SnapshotError> {
    let mut entities = Vec::with_capacity(world.len());
    for id in world.ids() {
        let encode = |message: String| SnapshotError::Encode { id, message };
        let meta = world.meta(id).map_err(|e| encode(e.to_string()))?;
        let record = world.record(id).map_err(|e| encode(e.to_string()))?;
        let mut queries = world.memberships(id).map_err(|e| encode(e.to_string()))?;
        queries.sort();

        let Value::Object(mut object) = record.to_value().map_err(|e| encode(e.to_string()))? else {
            return Err(encode("record is not an object".to_string()));
        };
        let header = [
            (ENTITY_TYPE, serde_json::to_value(meta.entity_type)),
            (ID, serde_json::to_value(id)),
            (COALITION, serde_json::to_value(meta.coalition)),
            (QUERIES, serde_json::to_value(&queries)),
        ];
        for (key, value) in header {
            object.insert(key.to_string(), value.map_err(|e| encode(e.to_string()))?);
        }
        entities.push(Value::Object(object));
    }
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        next_id: world.next_id(),
        entities,
    })
}

/// Entity decoded from a snapshot, not yet registered.
struct Decoded {
    id: EntityId,
    coalition: Coalition,
    queries: Vec<QueryKey>,
    record: EntityRecord,
}

fn take_field<T: for<'de> Deserialize<'de>>(
    object: &mut Map<String, Value>,
    index: usize,
    field: &str,
) -> Result<T, SnapshotError> {
    let value = object.remove(field).ok_or_else(|| SnapshotError::MissingField {
        index,
        field: field.to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| SnapshotError::InvalidField {
        index,
        message: format!("{field}: {e}"),
    })
}

/// Turn a record decode failure into a structured error naming the field.
fn record_error(index: usize, error: serde_json::Error) -> SnapshotError {
    let message = error.to_string();
    if let Some(rest) = message.strip_prefix("missing field `") {
        if let Some(end) = rest.find('`') {
            return SnapshotError::MissingField {
                index,
                field: rest[..end].to_string(),
            };
        }
    }
    SnapshotError::InvalidField { index, message }
}

fn decode(index: usize, value: &Value) -> Result<Decoded, SnapshotError> {
    let Value::Object(object) = value else {
        return Err(SnapshotError::NotAnObject { index });
    };
    let mut object = object.clone();

    let raw_type = object
        .remove(ENTITY_TYPE)
        .ok_or_else(|| SnapshotError::MissingField {
            index,
            field: ENTITY_TYPE.to_string(),
        })?;
    let entity_type: EntityType =
        serde_json::from_value(raw_type.clone()).map_err(|_| SnapshotError::UnknownEntityType {
            index,
            value: raw_type.to_string(),
        })?;
    let id: EntityId = take_field(&mut object, index, ID)?;
    let coalition: Coalition = take_field(&mut object, index, COALITION)?;
    let queries: Vec<QueryKey> = take_field(&mut object, index, QUERIES)?;

    let record = EntityRecord::from_value(entity_type, Value::Object(object))
        .map_err(|e| record_error(index, e))?;
    Ok(Decoded {
        id,
        coalition,
        queries,
        record,
    })
}

/// Validate a snapshot and build the world it describes.
pub fn deserialize(snapshot: &Snapshot) -> Result<World, SnapshotError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.version,
        });
    }

    let mut decoded: BTreeMap<EntityId, Decoded> = BTreeMap::new();
    for (index, value) in snapshot.entities.iter().enumerate() {
        let entity = decode(index, value)?;
        if decoded.contains_key(&entity.id) {
            return Err(SnapshotError::DuplicateId(entity.id));
        }
        decoded.insert(entity.id, entity);
    }

    for entity in decoded.values() {
        let expected: BTreeSet<QueryKey> = entity.record.queries().into_iter().collect();
        let found: BTreeSet<QueryKey> = entity.queries.iter().copied().collect();
        if expected != found || found.len() != entity.queries.len() {
            return Err(SnapshotError::InconsistentQueries {
                id: entity.id,
                expected: expected.into_iter().collect(),
                found: entity.queries.clone(),
            });
        }
        for reference in entity.record.references() {
            let resolved = decoded
                .get(&reference.id)
                .map(|target| reference.expected.contains(&target.record.entity_type()))
                .unwrap_or(false);
            if !resolved {
                return Err(SnapshotError::DanglingReference {
                    id: entity.id,
                    field: reference.field,
                    target: reference.id,
                });
            }
        }
    }

    let mut world = World::new();
    let mut next_id = snapshot.next_id;
    for (id, entity) in decoded {
        next_id = next_id.max(id.0 + 1);
        world.insert(id, entity.coalition, entity.record);
    }
    world.reserve_ids_below(next_id);

    tracing::debug!(
        target: "dcc::snapshot",
        entities = world.len(),
        next_id = world.next_id(),
        "snapshot restored"
    );
    Ok(world)
}
