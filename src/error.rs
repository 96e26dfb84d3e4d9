//! Error types shared by the API client and the view-model components.
//!
//! Network and server failures come back from [`crate::api_client::FlightApi`] as
//! [`ApiError`]. Draft validation happens before any request is issued and produces a
//! [`ValidationError`] instead.

use std::fmt;

use thiserror::Error;

use crate::edit_session::DraftField;

/// Failure of a single API round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was obtained (connection refused, DNS, timeout, ...).
    #[error("network error during {operation}: {message}")]
    Network {
        operation: &'static str,
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("server error {status} during {operation}: {message}")]
    Server {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("failed to decode response for {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn network(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    pub fn server(operation: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            message: message.into(),
        }
    }

    /// Name of the API operation that failed (e.g. `"list_flights"`).
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Network { operation, .. }
            | Self::Server { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }

    /// HTTP status for server errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What is wrong with a single draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    Malformed,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Missing => write!(f, "required"),
            FieldIssue::Malformed => write!(f, "invalid format"),
        }
    }
}

/// A draft was submitted with required fields empty or unparsable.
///
/// Always non-empty; fields are listed in form order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("flight draft is incomplete: {}", describe_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<(DraftField, FieldIssue)>,
}

impl ValidationError {
    /// Fields that were left empty
    pub fn missing_fields(&self) -> Vec<DraftField> {
        self.issues
            .iter()
            .filter(|(_, issue)| *issue == FieldIssue::Missing)
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn contains(&self, field: DraftField) -> bool {
        self.issues.iter().any(|(f, _)| *f == field)
    }
}

fn describe_issues(issues: &[(DraftField, FieldIssue)]) -> String {
    issues
        .iter()
        .map(|(field, issue)| format!("{} ({})", field.label(), issue))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a submit did not reach the server or did not succeed there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("no flight form is open")]
    NotOpen,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Why a confirmed deletion did not happen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    #[error("no deletion is awaiting confirmation")]
    NothingPending,

    #[error(transparent)]
    Api(#[from] ApiError),
}
