//! Error types for the EventPush provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider request.
///
/// `Transport` and `Signing` are the only failures of a lifecycle step
/// itself; the remaining variants describe requests the provider could not
/// interpret.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Sending to the queue or topic failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The signing service rejected the request or returned no signature.
    #[error("Signing error: {0}")]
    Signing(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lifecycle step could not deliver its message.
    ///
    /// `summary` names the destination; `source` is the transport or
    /// signing failure.
    #[error("{summary} {source}")]
    Send {
        /// Host-facing summary, e.g. "Error sending message to SQS queue."
        summary: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) => msg,
            Self::Signing(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Send { source, .. } => source.message(),
        }
    }

    /// Report a transport or signing failure under `summary`.
    ///
    /// Other errors are returned unchanged.
    pub fn while_sending(self, summary: &'static str) -> Self {
        match self {
            Self::Transport(_) | Self::Signing(_) => Self::Send {
                summary,
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// The innermost error, looking through [`ProviderError::Send`].
    pub fn cause(&self) -> &ProviderError {
        match self {
            Self::Send { source, .. } => source.cause(),
            other => other,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport error",
            Self::Signing(_) => "Signing error",
            Self::Validation(_) => "Validation error",
            Self::Configuration(_) => "Configuration error",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Serialization(_) => "Serialization error",
            Self::Send { summary, .. } => *summary,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        let detail = match err.cause() {
            ProviderError::Serialization(e) => e.to_string(),
            cause => cause.message().to_string(),
        };
        Diagnostic::error(err.summary()).with_detail(detail)
    }
}
