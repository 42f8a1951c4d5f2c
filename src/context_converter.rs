use serde_json::{Map, Value};

use crate::context::EvaluationContext;
use crate::diagnostics::Diagnostics;
use crate::targeting::{AttributeRef, SingleContext, TargetingContext, DEFAULT_KIND, MULTI_KIND};

/// Attribute names consumed by key and kind resolution.
const RESERVED_ATTRIBUTES: [&str; 3] = ["key", "targeting_key", "kind"];

pub const MISSING_KEY_MESSAGE: &str =
    "The EvaluationContext must contain either a 'targeting_key' or a 'key' and the type must be a string.";

/// Turns inbound [`EvaluationContext`]s into [`TargetingContext`]s.
///
/// Conversion never fails. Malformed fields are dropped and reported to the
/// injected [`Diagnostics`]; an unresolvable key yields an invalid context.
#[derive(Debug, Clone, Default)]
pub struct ContextConverter<D> {
    diagnostics: D,
}

impl<D: Diagnostics> ContextConverter<D> {
    pub fn new(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn to_targeting_context(&self, context: &EvaluationContext) -> TargetingContext {
        let kind = match context.field("kind") {
            Some(Value::String(kind)) if kind == MULTI_KIND => {
                return self.build_multi_context(context.fields());
            }
            Some(Value::String(kind)) => kind.as_str(),
            None | Some(Value::Null) => DEFAULT_KIND,
            Some(_) => {
                self.diagnostics
                    .warn("'kind' was set to a non-string value; defaulting to user");
                DEFAULT_KIND
            }
        };

        let key = self.resolve_key(context.targeting_key(), context.field("key"));
        self.build_single_context(context.fields(), kind, key).into()
    }

    /// Picks the identifier, preferring a non-empty string `targeting_key`
    /// over a string `key`. Returns an empty string when neither is usable.
    fn resolve_key(&self, targeting_key: Option<&Value>, key: Option<&Value>) -> String {
        let targeting_key = targeting_key.filter(|v| !v.is_null());
        let key = key.filter(|v| !v.is_null());
        let string_key = key.and_then(Value::as_str);

        // An empty targeting key does not count as supplied here.
        let targeting_key_supplied = targeting_key.is_some_and(|v| v.as_str() != Some(""));
        if targeting_key_supplied && string_key.is_some() {
            self.diagnostics
                .warn("EvaluationContext contained both a 'key' and 'targeting_key'.");
        }

        if key.is_some() && string_key.is_none() {
            self.diagnostics
                .error("A non-string 'key' attribute was provided.");
        }

        let resolved = targeting_key
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .or(string_key)
            .filter(|k| !k.is_empty());

        match resolved {
            Some(k) => k.to_string(),
            None => {
                self.diagnostics.error(MISSING_KEY_MESSAGE);
                String::new()
            }
        }
    }

    fn build_multi_context(&self, fields: &Map<String, Value>) -> TargetingContext {
        let contexts = fields
            .iter()
            .filter(|(kind, _)| kind.as_str() != "kind")
            .filter_map(|(kind, attributes)| self.build_member_context(kind, attributes))
            .collect();
        TargetingContext::multi(contexts)
    }

    fn build_member_context(&self, kind: &str, attributes: &Value) -> Option<SingleContext> {
        let Value::Object(attributes) = attributes else {
            self.diagnostics
                .warn("Top level attributes in a multi-kind context should be dictionaries");
            return None;
        };

        // A member with a non-string targeting key is skipped without further checks.
        let targeting_key = attributes.get("targeting_key");
        if !matches!(targeting_key, None | Some(Value::Null | Value::String(_))) {
            return None;
        }

        let key = self.resolve_key(targeting_key, attributes.get("key"));
        Some(self.build_single_context(attributes, kind, key))
    }

    fn build_single_context(
        &self,
        attributes: &Map<String, Value>,
        kind: &str,
        key: String,
    ) -> SingleContext {
        let mut builder = SingleContext::builder(kind, key);

        for (name, value) in attributes {
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            builder = match (name.as_str(), value) {
                ("name", Value::String(n)) => builder.name(n.clone()),
                ("name", _) => {
                    self.diagnostics.error("The attribute 'name' must be a string");
                    builder
                }
                ("anonymous", Value::Bool(a)) => builder.anonymous(*a),
                ("anonymous", _) => {
                    self.diagnostics
                        .error("The attribute 'anonymous' must be a boolean");
                    builder
                }
                ("privateAttributes", Value::Array(items)) => {
                    items.iter().fold(builder, |builder, item| match item {
                        Value::String(path) => builder.private_attribute(AttributeRef::new(path.clone())),
                        _ => {
                            self.diagnostics
                                .error("'privateAttributes' must be an array of only string values");
                            builder
                        }
                    })
                }
                ("privateAttributes", _) => {
                    self.diagnostics
                        .error("The attribute 'privateAttributes' must be an array");
                    builder
                }
                _ => builder.set(name.clone(), value.clone()),
            };
        }

        builder.build()
    }
}
