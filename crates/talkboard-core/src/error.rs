use std::fmt;

use thiserror::Error;

use crate::model::lifecycle::InvalidTransition;
use crate::model::ParseEnumError;

/// Machine-readable error codes for scripts and agents driving `tb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    StoreUnavailable,
    RecordNotFound,
    InvalidStateTransition,
    DeleteNotOffered,
    ValidationMissing,
    ValidationInvalid,
    InvalidEnumValue,
    Unauthenticated,
    AuthFailed,
    AlreadyRegistered,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::StoreUnavailable => "E1003",
            Self::RecordNotFound => "E2001",
            Self::InvalidStateTransition => "E2002",
            Self::DeleteNotOffered => "E2003",
            Self::ValidationMissing => "E2004",
            Self::ValidationInvalid => "E2005",
            Self::InvalidEnumValue => "E2006",
            Self::Unauthenticated => "E3001",
            Self::AuthFailed => "E3002",
            Self::AlreadyRegistered => "E3003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Board not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::StoreUnavailable => "Record store unavailable",
            Self::RecordNotFound => "Record not found",
            Self::InvalidStateTransition => "Invalid status transition",
            Self::DeleteNotOffered => "Delete not offered at this status",
            Self::ValidationMissing => "Required field missing",
            Self::ValidationInvalid => "Field value rejected",
            Self::InvalidEnumValue => "Invalid theme/priority/status value",
            Self::Unauthenticated => "Sign-in required",
            Self::AuthFailed => "Sign-in failed",
            Self::AlreadyRegistered => "Account already registered",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `tb init` to create the board in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .talkboard/config.toml and retry."),
            Self::StoreUnavailable => Some("Check the database path and permissions, then retry."),
            Self::RecordNotFound => Some("List records to find a valid ID."),
            Self::InvalidStateTransition => {
                Some("Advance one step at a time: the next status is shown in list output.")
            }
            Self::DeleteNotOffered => Some("Mark the action as Done before deleting it."),
            Self::ValidationMissing => Some("Provide a non-blank value for the field."),
            Self::ValidationInvalid => None,
            Self::InvalidEnumValue => Some("Use one of the documented values."),
            Self::Unauthenticated => Some("Run `tb login` first."),
            Self::AuthFailed => Some("Check the email and secret, then retry."),
            Self::AlreadyRegistered => Some("Run `tb login` with the existing account."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every failure a board operation can report.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Backend failure on read or write.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid transition from '{}' to '{}': {}", .0.from, .0.to, .0.reason)]
    InvalidTransition(InvalidTransition),

    #[error("required field missing: {0}")]
    ValidationMissing(&'static str),

    #[error("invalid {field}: {reason}")]
    ValidationInvalid { field: &'static str, reason: String },

    #[error(transparent)]
    InvalidEnumValue(#[from] ParseEnumError),

    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("delete is not offered for {id} at status '{status}'")]
    DeleteNotOffered { id: String, status: &'static str },

    /// A gated operation was attempted without a signed-in caller.
    #[error("sign-in required to {0}")]
    Unauthenticated(&'static str),

    #[error("invalid email or secret")]
    AuthFailed,

    #[error("account already registered: {0}")]
    AlreadyRegistered(String),
}

impl BoardError {
    /// Error code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            Self::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            Self::ValidationMissing(_) => ErrorCode::ValidationMissing,
            Self::ValidationInvalid { .. } => ErrorCode::ValidationInvalid,
            Self::InvalidEnumValue(_) => ErrorCode::InvalidEnumValue,
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::DeleteNotOffered { .. } => ErrorCode::DeleteNotOffered,
            Self::Unauthenticated(_) => ErrorCode::Unauthenticated,
            Self::AuthFailed => ErrorCode::AuthFailed,
            Self::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
        }
    }

    /// Stable `E####` identifier.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        self.code().code()
    }

    /// Remediation text, falling back to the generic code message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::ValidationMissing(field) => format!("provide a non-blank --{field}"),
            Self::ValidationInvalid { field, .. } => format!("fix the --{field} value and retry"),
            other => other
                .code()
                .hint()
                .unwrap_or_else(|| other.code().message())
                .to_string(),
        }
    }

    /// Whether the failure came from the store rather than the caller.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<InvalidTransition> for BoardError {
    fn from(value: InvalidTransition) -> Self {
        Self::InvalidTransition(value)
    }
}

impl From<rusqlite::Error> for BoardError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(value: serde_json::Error) -> Self {
        Self::StoreUnavailable(format!("malformed document: {value}"))
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
