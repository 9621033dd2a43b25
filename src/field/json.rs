//! The saved form of a farm, used for local storage and for file export/import.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::*;
use crate::error::StoreError;

const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct FarmJson {
    version: u32,
    #[serde(default)]
    farm_name: String,
    #[serde(default)]
    season: String,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    next_id: u64,
    fields: Vec<FieldJson>,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Serialize, Deserialize)]
struct FieldJson {
    id: FieldId,
    name: String,
    #[serde(default)]
    kind: AreaKind,
    color: String,
    points: Vec<Point>,
    /// Written for readers of the file. Ignored when loading.
    #[serde(default)]
    area: f64,
    #[serde(default)]
    agronomy: Agronomy,
}

impl FieldStore {
    pub fn save(&self, exported_at: DateTime<Utc>) -> String {
        let json = FarmJson {
            version: VERSION,
            farm_name: self.farm_name.clone(),
            season: self.season.clone(),
            exported_at: Some(exported_at),
            next_id: self.next_id,
            fields: self
                .fields
                .iter()
                .map(|field| FieldJson {
                    id: field.id,
                    name: field.name.clone(),
                    kind: field.kind,
                    color: field.color.clone(),
                    points: field.points.clone(),
                    area: field.area,
                    agronomy: field.agronomy.clone(),
                })
                .collect(),
            tasks: self.tasks.clone(),
        };
        // Cannot fail: there are no maps with non-string keys. Non-finite floats would be
        // written as `null`, so `edit` keeps agronomy finite and outlines only ever come
        // from finite pointer positions.
        serde_json::to_string_pretty(&json).unwrap()
    }

    /// Restores a saved farm. Areas are recomputed from the outlines with `area_scale`.
    pub fn load(json: &str, area_scale: f64) -> Result<Self, StoreError> {
        let json: FarmJson = serde_json::from_str(json)?;
        if json.version != VERSION {
            return Err(StoreError::UnsupportedVersion(json.version));
        }

        let mut ids = HashSet::new();
        for field in &json.fields {
            if !ids.insert(field.id) {
                return Err(StoreError::DuplicateId(field.id));
            }
        }
        if let Some(task) = json.tasks.iter().find(|task| !ids.contains(&task.field)) {
            return Err(StoreError::OrphanTask {
                task: task.id.clone(),
                field: task.field,
            });
        }

        if json.next_id > MAX_FIELD_ID + 1 {
            return Err(StoreError::IdOutOfRange(json.next_id));
        }
        if let Some(field) = json.fields.iter().find(|field| field.id.0 > MAX_FIELD_ID) {
            return Err(StoreError::IdOutOfRange(field.id.0));
        }
        let next_id = json
            .fields
            .iter()
            .map(|field| field.id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(json.next_id);

        let mut store = FieldStore::new(area_scale);
        store.farm_name = json.farm_name;
        store.season = json.season;
        store.next_id = next_id;
        store.tasks = json.tasks;
        store.fields = json
            .fields
            .into_iter()
            .map(|field| {
                let mut boundary = FieldBoundary::new(
                    field.id,
                    field.name,
                    field.kind,
                    field.color,
                    field.points,
                    area_scale,
                );
                boundary.agronomy = field.agronomy;
                boundary
            })
            .collect();

        tracing::info!(fields = store.fields.len(), tasks = store.tasks.len(), "farm loaded");
        Ok(store)
    }
}
