use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProviderError, Result};
use crate::evaluation::{ErrorKind, EvaluationDetail, EvaluationReason};
use crate::targeting::TargetingContext;

/// The flag evaluation engine the provider delegates to.
///
/// Implementations must accept invalid contexts and answer them with an
/// error-reason detail rather than panicking.
pub trait EvaluationEngine: Send + Sync {
    fn variation_detail(
        &self,
        flag_key: &str,
        context: &TargetingContext,
        default_value: &Value,
    ) -> EvaluationDetail;
}

impl<F> EvaluationEngine for F
where
    F: Fn(&str, &TargetingContext, &Value) -> EvaluationDetail + Send + Sync,
{
    fn variation_detail(
        &self,
        flag_key: &str,
        context: &TargetingContext,
        default_value: &Value,
    ) -> EvaluationDetail {
        self(flag_key, context, default_value)
    }
}

/// Configuration of one flag in [`TestData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagData {
    #[serde(default = "default_on")]
    pub on: bool,
    pub variations: Vec<Value>,
    #[serde(default)]
    pub off_variation: Option<usize>,
    #[serde(default)]
    pub fallthrough_variation: Option<usize>,
}

fn default_on() -> bool {
    true
}

impl FlagData {
    /// A boolean flag serving `true` when on and `false` when off.
    pub fn boolean() -> Self {
        Self {
            on: true,
            variations: vec![Value::Bool(true), Value::Bool(false)],
            off_variation: Some(1),
            fallthrough_variation: Some(0),
        }
    }

    pub fn variations(mut self, variations: impl IntoIterator<Item = Value>) -> Self {
        self.variations = variations.into_iter().collect();
        self
    }

    pub fn variation_for_all(mut self, index: usize) -> Self {
        self.on = true;
        self.fallthrough_variation = Some(index);
        self
    }

    pub fn on(mut self, on: bool) -> Self {
        self.on = on;
        self
    }

    fn validate(&self, flag: &str) -> Result<()> {
        let indices = [
            ("offVariation", self.off_variation),
            ("fallthroughVariation", self.fallthrough_variation),
        ];
        for (field, index) in indices {
            if let Some(i) = index.filter(|i| *i >= self.variations.len()) {
                return Err(ProviderError::InvalidFlag {
                    flag: flag.to_string(),
                    message: format!(
                        "{field} {i} is out of range for {} variations",
                        self.variations.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// In-memory evaluation engine over a fixed flag table.
///
/// Serves the fallthrough variation when a flag is on and the off variation
/// when it is off; there are no targeting rules.
#[derive(Debug, Clone, Default)]
pub struct TestData {
    flags: Arc<HashMap<String, FlagData>>,
}

impl TestData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of flag key to [`FlagData`].
    pub fn from_json(json: &str) -> Result<Self> {
        let flags: HashMap<String, FlagData> = serde_json::from_str(json)?;
        for (key, flag) in &flags {
            flag.validate(key)?;
        }
        Ok(Self {
            flags: Arc::new(flags),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn update(&mut self, key: impl Into<String>, flag: FlagData) {
        Arc::make_mut(&mut self.flags).insert(key.into(), flag);
    }

    pub fn flag(&self, key: &str) -> Option<&FlagData> {
        self.flags.get(key)
    }
}

impl EvaluationEngine for TestData {
    fn variation_detail(
        &self,
        flag_key: &str,
        context: &TargetingContext,
        default_value: &Value,
    ) -> EvaluationDetail {
        let error = |kind| EvaluationDetail::new(default_value.clone(), None, EvaluationReason::error(kind));

        if !context.is_valid() {
            return error(ErrorKind::UserNotSpecified);
        }
        let Some(flag) = self.flags.get(flag_key) else {
            return error(ErrorKind::FlagNotFound);
        };

        let (index, reason) = if flag.on {
            (flag.fallthrough_variation, EvaluationReason::fallthrough())
        } else {
            match flag.off_variation {
                Some(i) => (Some(i), EvaluationReason::Off),
                None => return EvaluationDetail::new(default_value.clone(), None, EvaluationReason::Off),
            }
        };

        match index.and_then(|i| flag.variations.get(i).map(|v| (i, v))) {
            Some((i, value)) => EvaluationDetail::new(value.clone(), Some(i), reason),
            None => error(ErrorKind::MalformedFlag),
        }
    }
}
