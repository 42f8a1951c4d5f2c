use std::fmt;

use clap::ValueEnum;
use serde_json::{Number, Value};

/// The value type a caller asks a flag to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FlagType {
    Boolean,
    String,
    Integer,
    Float,
    Number,
    /// A JSON object or array.
    Object,
}

impl FlagType {
    /// Whether an engine-resolved `value` is acceptable for this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object() || value.is_array(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rust types a flag can be fetched as.
pub trait FlagValue: Clone + Sized {
    const FLAG_TYPE: FlagType;

    /// Extract from a value that already passed `FLAG_TYPE.matches`.
    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl FlagValue for bool {
    const FLAG_TYPE: FlagType = FlagType::Boolean;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FlagValue for String {
    const FLAG_TYPE: FlagType = FlagType::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl FlagValue for i64 {
    const FLAG_TYPE: FlagType = FlagType::Integer;

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl FlagValue for f64 {
    const FLAG_TYPE: FlagType = FlagType::Float;

    fn from_value(value: Value) -> Option<Self> {
        value.is_f64().then(|| value.as_f64()).flatten()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl FlagValue for Number {
    const FLAG_TYPE: FlagType = FlagType::Number;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl FlagValue for Value {
    const FLAG_TYPE: FlagType = FlagType::Object;

    fn from_value(value: Value) -> Option<Self> {
        (value.is_object() || value.is_array()).then_some(value)
    }

    fn into_value(self) -> Value {
        self
    }
}
