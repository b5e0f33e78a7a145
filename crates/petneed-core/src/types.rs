//! Domain types shared by the store, the chat layer and the collaborators.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub type PetId = String;

/// A normalized adoption record.
///
/// Field names on the wire follow the envelope upstream (`_id`, `Name`,
/// `HairType`, ...), so envelope rows deserialize directly and favorites
/// round-trip in the same shape. Every field is a string; absent, null or
/// numeric upstream values are folded into strings by [`lenient_string`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pet {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: PetId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sex: String,
    #[serde(rename = "Type", default, deserialize_with = "lenient_string")]
    pub type_label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub build: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub variety: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accept_num: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chip_num: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_sterilization: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hair_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resettlement: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "ChildreAnlong", default, deserialize_with = "lenient_string")]
    pub children_along: String,
    #[serde(rename = "AnimalAnlong", default, deserialize_with = "lenient_string")]
    pub animal_along: String,
    #[serde(rename = "Bodyweight", default, deserialize_with = "lenient_string")]
    pub body_weight: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_name: String,
}

impl Pet {
    /// Derived species. The type label wins; flat upstream rows carry a
    /// composite label there, so the variety is consulted next.
    pub fn species(&self) -> Species {
        match Species::classify(&self.type_label) {
            Species::Unclassified => Species::classify(&self.variety),
            species => species,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Unclassified,
}

/// Upstream label tokens, matched exactly.
const SPECIES_TOKENS: &[(&str, Species)] = &[
    ("犬", Species::Dog),
    ("狗", Species::Dog),
    ("貓", Species::Cat),
];

impl Species {
    pub fn classify(label: &str) -> Self {
        SPECIES_TOKENS
            .iter()
            .find(|(token, _)| *token == label)
            .map_or(Species::Unclassified, |(_, species)| *species)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Unclassified => "unclassified",
        };
        f.write_str(s)
    }
}

/// Optional-field query. Every present, non-empty field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SearchCriteria {
    pub fn new() -> Self { Self::default() }

    pub fn kind(mut self, v: impl Into<String>) -> Self {
        self.kind = Some(v.into());
        self
    }
    pub fn sex(mut self, v: impl Into<String>) -> Self {
        self.sex = Some(v.into());
        self
    }
    pub fn body_type(mut self, v: impl Into<String>) -> Self {
        self.body_type = Some(v.into());
        self
    }
    pub fn age(mut self, v: impl Into<String>) -> Self {
        self.age = Some(v.into());
        self
    }
    pub fn color(mut self, v: impl Into<String>) -> Self {
        self.color = Some(v.into());
        self
    }

    /// True when no field would constrain a match.
    pub fn is_empty(&self) -> bool {
        [&self.kind, &self.sex, &self.body_type, &self.age, &self.color]
            .iter()
            .all(|f| f.as_deref().map_or(true, str::is_empty))
    }
}

/// Deserialize any JSON scalar as a string: null becomes "", numbers and
/// booleans are rendered.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
