use serde_json::Value;

/// Result of one flag evaluation as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetail {
    pub value: Value,
    /// `None` when the engine fell back to the caller's default value.
    pub variation_index: Option<usize>,
    pub reason: EvaluationReason,
}

impl EvaluationDetail {
    pub fn new(value: Value, variation_index: Option<usize>, reason: EvaluationReason) -> Self {
        Self {
            value,
            variation_index,
            reason,
        }
    }

    pub fn is_default_value(&self) -> bool {
        self.variation_index.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationReason {
    Off,
    TargetMatch,
    RuleMatch {
        rule_index: usize,
        rule_id: String,
        in_experiment: bool,
    },
    Fallthrough {
        in_experiment: bool,
    },
    PrerequisiteFailed {
        prerequisite_key: String,
    },
    /// `error_kind` is `None` when the engine did not say what went wrong.
    Error {
        error_kind: Option<ErrorKind>,
    },
}

impl EvaluationReason {
    pub fn fallthrough() -> Self {
        Self::Fallthrough {
            in_experiment: false,
        }
    }

    pub fn error(error_kind: ErrorKind) -> Self {
        Self::Error {
            error_kind: Some(error_kind),
        }
    }

    pub fn kind(&self) -> ReasonKind {
        match self {
            Self::Off => ReasonKind::Off,
            Self::TargetMatch => ReasonKind::TargetMatch,
            Self::RuleMatch { .. } => ReasonKind::RuleMatch,
            Self::Fallthrough { .. } => ReasonKind::Fallthrough,
            Self::PrerequisiteFailed { .. } => ReasonKind::PrerequisiteFailed,
            Self::Error { .. } => ReasonKind::Error,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Error { error_kind } => *error_kind,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonKind {
    Off,
    TargetMatch,
    RuleMatch,
    Fallthrough,
    PrerequisiteFailed,
    Error,
}

impl ReasonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::TargetMatch => "TARGET_MATCH",
            Self::RuleMatch => "RULE_MATCH",
            Self::Fallthrough => "FALLTHROUGH",
            Self::PrerequisiteFailed => "PREREQUISITE_FAILED",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ClientNotReady,
    FlagNotFound,
    MalformedFlag,
    /// The context was missing or invalid.
    UserNotSpecified,
    Exception,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reason_kinds() {
        let rule = EvaluationReason::RuleMatch {
            rule_index: 0,
            rule_id: "rule id".into(),
            in_experiment: false,
        };
        assert_eq!(rule.kind().as_str(), "RULE_MATCH");
        assert_eq!(EvaluationReason::fallthrough().kind(), ReasonKind::Fallthrough);
        assert_eq!(EvaluationReason::Off.error_kind(), None);
        assert_eq!(
            EvaluationReason::error(ErrorKind::FlagNotFound).error_kind(),
            Some(ErrorKind::FlagNotFound)
        );
    }

    #[test]
    fn default_value_detection() {
        let fallback = EvaluationDetail::new(json!(true), None, EvaluationReason::Off);
        assert!(fallback.is_default_value());
        let served = EvaluationDetail::new(json!(true), Some(0), EvaluationReason::fallthrough());
        assert!(!served.is_default_value());
    }
}
