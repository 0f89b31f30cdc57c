//! Failure taxonomy. Every variant ends up as banner text at the session
//! boundary; nothing here is fatal to a running session.

use crate::input_guard::MIN_CHARS;

/// Local input rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Nothing but whitespace was entered.
    #[error("input is empty")]
    EmptyInput,
    /// Fewer than [`MIN_CHARS`] characters after trimming.
    #[error("input is shorter than {} characters", MIN_CHARS)]
    TooShort,
}

/// A request that was sent (or attempted) and did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never completed: refused connection, DNS failure, offline.
    #[error("request failed: {0}")]
    Network(String),
    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {status}")]
    Http {
        status: u16,
        /// The service's own `error` field, when the body carried one.
        detail: Option<String>,
    },
    /// The body was not a well-formed analysis result.
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Anything that ends an analysis attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AnalysisError {
    /// Banner text for this failure. `endpoint` is named in network errors so
    /// the user knows which backend to check.
    pub fn user_message(&self, endpoint: &str) -> String {
        match self {
            AnalysisError::Validation(ValidationError::EmptyInput) => {
                "Please enter some text to analyze.".to_string()
            }
            AnalysisError::Validation(ValidationError::TooShort) => {
                format!("Please enter at least {MIN_CHARS} characters.")
            }
            AnalysisError::Transport(TransportError::Network(_)) => format!(
                "Could not reach the analysis service. Check that the backend is running at {endpoint}."
            ),
            AnalysisError::Transport(TransportError::Http { status, detail }) => match detail {
                Some(detail) => format!("The analysis service returned HTTP {status}: {detail}"),
                None => format!("The analysis service returned HTTP {status}."),
            },
            AnalysisError::Transport(TransportError::Parse(_)) => {
                "The analysis service sent a response that could not be understood.".to_string()
            }
        }
    }
}

/// Startup configuration that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
