use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user profile as returned by `GET /user?email=`.
///
/// Only the fields that drive recommendations are read. Other stored fields
/// (name, degree, years of experience, ...) are ignored whatever their type.
/// Every field tolerates absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub industries: Vec<String>,
    #[serde(default)]
    pub skills: Option<SkillsRepresentation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interested_roles: Vec<String>,
}

/// The stored `skills` field. Different writers in the backend store it as a
/// flat list or as a map of category to group, so both shapes are accepted
/// and anything else lands in `Unrecognized` instead of failing the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillsRepresentation {
    Flat(Vec<Value>),
    Nested(BTreeMap<String, SkillGroup>),
    Unrecognized(Value),
}

/// One category's worth of skills inside a nested representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillGroup {
    /// `["Python", "SQL"]`
    List(Vec<Value>),
    /// `{"Python": "Advanced"}`: the keys are the skill names.
    Levels(Map<String, Value>),
    /// `"Python"`
    Single(String),
    Unrecognized(Value),
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}
