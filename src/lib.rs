pub mod config;
pub mod context;
pub mod context_converter;
pub mod details_converter;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod evaluation;
pub mod provider;
pub mod resolution;
pub mod targeting;
pub mod value;

pub use config::ProviderConfig;
pub use context::EvaluationContext;
pub use context_converter::ContextConverter;
pub use details_converter::DetailsConverter;
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use engine::{EvaluationEngine, FlagData, TestData};
pub use errors::{ProviderError, Result};
pub use evaluation::{ErrorKind, EvaluationDetail, EvaluationReason, ReasonKind};
pub use provider::{Provider, ProviderMetadata};
pub use resolution::{ErrorCode, Reason, ResolutionDetails};
pub use targeting::{AttributeRef, ContextError, MultiContext, SingleContext, TargetingContext};
pub use value::{FlagType, FlagValue};
