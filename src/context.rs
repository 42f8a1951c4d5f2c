use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely typed evaluation context supplied by callers.
///
/// All fields, including `targeting_key`, `key` and `kind`, live in one
/// attribute map. Nothing is validated here; see
/// [`ContextConverter`](crate::context_converter::ContextConverter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationContext {
    fields: Map<String, Value>,
}

impl EvaluationContext {
    pub const TARGETING_KEY: &'static str = "targeting_key";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targeting_key(targeting_key: impl Into<String>) -> Self {
        Self::new().with(Self::TARGETING_KEY, targeting_key.into())
    }

    /// Builder-style attribute setter; replaces any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn targeting_key(&self) -> Option<&Value> {
        self.field(Self::TARGETING_KEY)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for EvaluationContext {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
