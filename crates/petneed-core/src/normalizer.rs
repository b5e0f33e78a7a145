//! Upstream payload → `Pet` records.
//!
//! Two upstream shapes are recognized: the envelope (`{"result": {"results":
//! [...]}}`) whose rows are already `Pet`-shaped, and a flat array of raw
//! animal rows from the national adoption dataset. The shape is detected per
//! payload unless a [`SchemaHint`] forces one.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{lenient_string, Pet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaHint {
    #[default]
    Auto,
    Envelope,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSchema {
    Envelope,
    Flat,
}

impl UpstreamSchema {
    pub fn detect(value: &Value) -> Option<Self> {
        if value.pointer("/result/results").is_some_and(Value::is_array) {
            Some(Self::Envelope)
        } else if value.is_array() {
            Some(Self::Flat)
        } else {
            None
        }
    }
}

/// One row of the flat dataset. Only the columns that feed `Pet` are kept.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnimal {
    #[serde(deserialize_with = "lenient_string")]
    animal_id: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_subid: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_kind: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_sex: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_bodytype: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_colour: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_age: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_sterilization: String,
    #[serde(deserialize_with = "lenient_string")]
    animal_remark: String,
    #[serde(deserialize_with = "lenient_string")]
    shelter_name: String,
    #[serde(deserialize_with = "lenient_string")]
    shelter_address: String,
    #[serde(deserialize_with = "lenient_string")]
    shelter_tel: String,
    #[serde(deserialize_with = "lenient_string")]
    album_file: String,
}

impl From<RawAnimal> for Pet {
    fn from(raw: RawAnimal) -> Self {
        let type_label = if raw.animal_colour.is_empty() {
            raw.animal_kind.clone()
        } else {
            format!("{} ({})", raw.animal_kind, raw.animal_colour)
        };
        let resettlement = if raw.shelter_address.is_empty() {
            raw.shelter_name
        } else {
            format!("{}({})", raw.shelter_name, raw.shelter_address)
        };
        Pet {
            id: raw.animal_id,
            name: raw.animal_subid.clone(),
            accept_num: raw.animal_subid,
            sex: raw.animal_sex,
            type_label,
            build: raw.animal_bodytype,
            age: raw.animal_age,
            variety: raw.animal_kind,
            is_sterilization: raw.animal_sterilization,
            hair_type: raw.animal_colour,
            note: raw.animal_remark,
            resettlement,
            phone: raw.shelter_tel,
            image_name: raw.album_file,
            ..Pet::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    hint: SchemaHint,
}

impl Normalizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_schema(hint: SchemaHint) -> Self { Self { hint } }

    pub fn normalize(&self, payload: &[u8]) -> Result<Vec<Pet>> {
        let mut value: Value = serde_json::from_slice(payload)?;
        let schema = match self.hint {
            SchemaHint::Auto => UpstreamSchema::detect(&value)
                .ok_or_else(|| Error::Parse("unrecognized upstream payload shape".to_string()))?,
            SchemaHint::Envelope => UpstreamSchema::Envelope,
            SchemaHint::Flat => UpstreamSchema::Flat,
        };
        let pets: Vec<Pet> = match schema {
            UpstreamSchema::Envelope => {
                let results = value
                    .pointer_mut("/result/results")
                    .map(Value::take)
                    .ok_or_else(|| Error::Parse("envelope without result.results".to_string()))?;
                serde_json::from_value(results)?
            }
            UpstreamSchema::Flat => serde_json::from_value::<Vec<RawAnimal>>(value)?
                .into_iter()
                .map(Pet::from)
                .collect(),
        };
        debug!(?schema, records = pets.len(), "normalized upstream payload");
        Ok(dedupe(pets))
    }
}

/// Normalize with schema detection.
pub fn normalize(payload: &[u8]) -> Result<Vec<Pet>> { Normalizer::new().normalize(payload) }

// Keeps the first record per non-empty identifier.
fn dedupe(pets: Vec<Pet>) -> Vec<Pet> {
    let mut seen = HashSet::new();
    pets.into_iter()
        .filter(|p| {
            let keep = p.id.is_empty() || seen.insert(p.id.clone());
            if !keep {
                warn!(id = %p.id, "dropping duplicate pet identifier");
            }
            keep
        })
        .collect()
}
