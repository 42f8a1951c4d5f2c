use serde_json::{Number, Value};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::context::EvaluationContext;
use crate::context_converter::ContextConverter;
use crate::details_converter::DetailsConverter;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::engine::EvaluationEngine;
use crate::resolution::{ErrorCode, ResolutionDetails};
use crate::value::FlagValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub name: String,
}

/// Resolves typed flag values by translating the caller's context, asking the
/// engine, and translating the engine's answer back.
///
/// Every fetch returns a [`ResolutionDetails`]; failures are reported through
/// its reason and error code. Calls share no mutable state.
pub struct Provider<E, D = TracingDiagnostics> {
    engine: E,
    context_converter: ContextConverter<D>,
    details_converter: DetailsConverter,
    metadata: ProviderMetadata,
}

impl<E: EvaluationEngine> Provider<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, ProviderConfig::default())
    }

    pub fn with_config(engine: E, config: ProviderConfig) -> Self {
        Self::with_diagnostics(engine, config, TracingDiagnostics)
    }
}

impl<E: EvaluationEngine, D: Diagnostics> Provider<E, D> {
    pub fn with_diagnostics(engine: E, config: ProviderConfig, diagnostics: D) -> Self {
        Self {
            engine,
            context_converter: ContextConverter::new(diagnostics),
            details_converter: DetailsConverter::new(),
            metadata: ProviderMetadata { name: config.name },
        }
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn fetch_boolean_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<bool> {
        self.resolve_value(flag_key, default_value, context)
    }

    pub fn fetch_string_value(
        &self,
        flag_key: &str,
        default_value: impl Into<String>,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<String> {
        self.resolve_value(flag_key, default_value.into(), context)
    }

    pub fn fetch_number_value(
        &self,
        flag_key: &str,
        default_value: impl Into<Number>,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<Number> {
        self.resolve_value(flag_key, default_value.into(), context)
    }

    pub fn fetch_integer_value(
        &self,
        flag_key: &str,
        default_value: i64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<i64> {
        self.resolve_value(flag_key, default_value, context)
    }

    pub fn fetch_float_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<f64> {
        self.resolve_value(flag_key, default_value, context)
    }

    /// `default_value` should be a JSON object or array.
    pub fn fetch_object_value(
        &self,
        flag_key: &str,
        default_value: Value,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<Value> {
        self.resolve_value(flag_key, default_value, context)
    }

    /// The pipeline behind every `fetch_*_value` method.
    pub fn resolve_value<T: FlagValue>(
        &self,
        flag_key: &str,
        default_value: T,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<T> {
        let Some(context) = context else {
            debug!(flag_key, "no evaluation context supplied");
            return ResolutionDetails::error(default_value, ErrorCode::TargetingKeyMissing);
        };

        let targeting_context = self.context_converter.to_targeting_context(context);
        let detail = self.engine.variation_detail(
            flag_key,
            &targeting_context,
            &default_value.clone().into_value(),
        );

        let flag_type = T::FLAG_TYPE;
        if !flag_type.matches(&detail.value) {
            debug!(flag_key, %flag_type, value = %detail.value, "flag value has the wrong type");
            return ResolutionDetails::error(default_value, ErrorCode::TypeMismatch);
        }

        self.details_converter
            .to_resolution_details(detail)
            .try_map(T::from_value)
            .unwrap_or_else(|| ResolutionDetails::error(default_value, ErrorCode::TypeMismatch))
    }
}
