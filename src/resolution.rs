use std::fmt;

use serde::{Serialize, Serializer};

/// Vendor-neutral evaluation result returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionDetails<T> {
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub reason: Reason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl<T> ResolutionDetails<T> {
    /// An error result carrying the caller's default value.
    pub fn error(default_value: T, error_code: ErrorCode) -> Self {
        Self {
            value: default_value,
            error_code: Some(error_code),
            error_message: None,
            reason: Reason::Error,
            variant: None,
        }
    }

    /// Replace the value, keeping everything else. Returns `None` if `f` rejects it.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Option<U>) -> Option<ResolutionDetails<U>> {
        Some(ResolutionDetails {
            value: f(self.value)?,
            error_code: self.error_code,
            error_message: self.error_message,
            reason: self.reason,
            variant: self.variant,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Disabled,
    TargetingMatch,
    Error,
    /// Any other label, passed through verbatim.
    Other(String),
}

impl Reason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Disabled => "DISABLED",
            Self::TargetingMatch => "TARGETING_MATCH",
            Self::Error => "ERROR",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ProviderNotReady,
    FlagNotFound,
    ParseError,
    TypeMismatch,
    TargetingKeyMissing,
    General,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProviderNotReady => "PROVIDER_NOT_READY",
            Self::FlagNotFound => "FLAG_NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::TargetingKeyMissing => "TARGETING_KEY_MISSING",
            Self::General => "GENERAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
