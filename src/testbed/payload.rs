//! Integration payload types
//!
//! Parse targets for the JSON document an integration writes to stdout.
//! Only the fields the validator counts are typed; metric sets are kept as
//! raw maps because their keys vary per fixture.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Top level integration payload
#[derive(Deserialize, Debug, Clone)]
pub struct IntegrationOutput {
    /// Integration name (e.g. "com.newrelic.nri-flex"), empty when absent
    #[serde(default)]
    pub name: String,
    /// Protocol version of the payload, empty when absent
    #[serde(default)]
    pub protocol_version: String,
    /// Integration version, absent in some payloads
    #[serde(default)]
    pub integration_version: Option<String>,
    /// Entities, in emission order
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<EntityData>,
}

/// One entity's collected data
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EntityData {
    /// Entity key, absent for the local entity
    #[serde(default)]
    pub entity: Option<EntityKey>,
    /// Metric sets collected for this entity
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<MetricSet>,
    /// Inventory items
    #[serde(default, deserialize_with = "null_as_default")]
    pub inventory: Map<String, Value>,
    /// Events
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Value>,
}

/// Entity identity
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EntityKey {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// A single sample: arbitrary key/value measurements
pub type MetricSet = Map<String, Value>;

/// Read an explicit `null` collection as an empty one
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl IntegrationOutput {
    /// Parse a payload from JSON text
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.data.len()
    }

    /// Metric sets across all entities
    pub fn metric_count(&self) -> usize {
        self.data.iter().map(|e| e.metrics.len()).sum()
    }

    /// Events across all entities
    pub fn event_count(&self) -> usize {
        self.data.iter().map(|e| e.events.len()).sum()
    }
}
