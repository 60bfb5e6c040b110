use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Classified failures of a prediction or health request.
///
/// Classification happens once, at the client boundary, and the variant is
/// carried unmodified into the request lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Transport failed before any response arrived (DNS, connection refused, reset).
    NetworkUnreachable(String),
    /// No complete response within the client-side bound.
    Timeout(Duration),
    /// The service answered with a non-success status.
    ServerError {
        /// HTTP status code returned by the service.
        status: u16,
        /// Human-readable message extracted from the error body.
        message: String,
    },
    /// Success status, but the body is not a valid response shape.
    MalformedResponse(String),
    /// Input rejected before reaching the transport.
    Validation(String),
}

/// Discriminant of [`PredictionError`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkUnreachable,
    Timeout,
    ServerError,
    MalformedResponse,
    Validation,
}

impl fmt::Display for PredictionError {
    /// Technical description, meant for logs rather than end users.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::NetworkUnreachable(msg) => write!(f, "Network unreachable: {}", msg),
            PredictionError::Timeout(after) => {
                write!(f, "Request timed out after {}s", after.as_secs_f64())
            }
            PredictionError::ServerError { status, message } => {
                write!(f, "Server returned {}: {}", status, message)
            }
            PredictionError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            PredictionError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for PredictionError {}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            PredictionError::Timeout(_) => ErrorKind::Timeout,
            PredictionError::ServerError { .. } => ErrorKind::ServerError,
            PredictionError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            PredictionError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Whether waiting and asking again may succeed.
    ///
    /// A sleeping backend shows up as unreachable, as a timeout, or as a 5xx
    /// from the hosting proxy while the process boots.
    pub fn is_transient(&self) -> bool {
        match self {
            PredictionError::NetworkUnreachable(_) | PredictionError::Timeout(_) => true,
            PredictionError::ServerError { status, .. } => *status >= 500,
            PredictionError::MalformedResponse(_) | PredictionError::Validation(_) => false,
        }
    }

    /// Actionable message shown to the user. Never includes the raw
    /// transport error; only the server's own `detail` text is passed through.
    pub fn user_message(&self) -> String {
        match self {
            PredictionError::NetworkUnreachable(_) => {
                "Failed to predict churn. Cannot connect to the prediction service. \
                 Please check that the backend is running and accessible."
                    .to_string()
            }
            PredictionError::Timeout(_) => {
                "Failed to predict churn. The prediction service did not answer in time; \
                 it may be waking up from sleep. Please wait 30-60 seconds and try again."
                    .to_string()
            }
            PredictionError::ServerError { message, .. } => {
                format!("Failed to predict churn. The server rejected the request: {}", message)
            }
            PredictionError::MalformedResponse(_) => {
                "Failed to predict churn. The prediction service returned an unexpected \
                 response. Please try again later."
                    .to_string()
            }
            PredictionError::Validation(msg) => format!("Invalid input: {}", msg),
        }
    }
}

/// What the lifecycle keeps for a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// User-facing text.
    pub message: String,
    /// Technical text, for logs only.
    #[serde(skip)]
    pub detail: String,
}

impl From<&PredictionError> for ErrorReport {
    fn from(err: &PredictionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

impl From<PredictionError> for ErrorReport {
    fn from(err: PredictionError) -> Self {
        ErrorReport::from(&err)
    }
}
