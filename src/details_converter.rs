use serde_json::Value;

use crate::evaluation::{ErrorKind, EvaluationDetail, ReasonKind};
use crate::resolution::{ErrorCode, Reason, ResolutionDetails};

/// Turns engine [`EvaluationDetail`]s into [`ResolutionDetails`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailsConverter;

impl DetailsConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn to_resolution_details(&self, detail: EvaluationDetail) -> ResolutionDetails<Value> {
        let reason_kind = detail.reason.kind();
        let error_code = (reason_kind == ReasonKind::Error)
            .then(|| error_kind_to_code(detail.reason.error_kind()));

        ResolutionDetails {
            value: detail.value,
            error_code,
            error_message: None,
            reason: kind_to_reason(reason_kind),
            variant: detail.variation_index.map(|index| index.to_string()),
        }
    }
}

fn kind_to_reason(kind: ReasonKind) -> Reason {
    match kind {
        ReasonKind::Off => Reason::Disabled,
        ReasonKind::TargetMatch => Reason::TargetingMatch,
        ReasonKind::Error => Reason::Error,
        // RULE_MATCH, FALLTHROUGH and PREREQUISITE_FAILED keep their own label
        other => Reason::Other(other.as_str().to_string()),
    }
}

fn error_kind_to_code(error_kind: Option<ErrorKind>) -> ErrorCode {
    match error_kind {
        Some(ErrorKind::ClientNotReady) => ErrorCode::ProviderNotReady,
        Some(ErrorKind::FlagNotFound) => ErrorCode::FlagNotFound,
        Some(ErrorKind::MalformedFlag) => ErrorCode::ParseError,
        Some(ErrorKind::UserNotSpecified) => ErrorCode::TargetingKeyMissing,
        Some(ErrorKind::Exception) | None => ErrorCode::General,
    }
}
