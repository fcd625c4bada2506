//! Resource Schema - Load the resource type schema from JSON
//!
//! The `Brianterry::Unicorn::Maker` schema is embedded at compile time and
//! drives required-property validation.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded resource schema (compiled into the binary)
const SCHEMA_JSON: &str = include_str!("../resources/unicorn.json");

/// Property definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub property_type: String,
}

/// Root structure of resources/unicorn.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub properties: BTreeMap<String, PropertyDef>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ResourceSchema {
    /// Property names that must be present on create
    pub fn required_properties(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(|s| s.as_str())
    }
}

/// Global schema loaded from JSON
static SCHEMA: OnceLock<ResourceSchema> = OnceLock::new();

/// Get the resource schema (parses the embedded JSON on first access)
pub fn get_schema() -> &'static ResourceSchema {
    SCHEMA.get_or_init(|| {
        serde_json::from_str(SCHEMA_JSON)
            .unwrap_or_else(|e| panic!("Failed to parse embedded resource schema: {}", e))
    })
}

/// The schema document as embedded, for printing
pub fn schema_document() -> Value {
    serde_json::from_str(SCHEMA_JSON).unwrap_or(Value::Null)
}
