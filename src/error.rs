use thiserror::Error;

/// Failure talking to the agent endpoint.
///
/// `Request` and `Status` happen before any streaming starts; `Stream` is an
/// I/O failure while reading the response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to '{url}' failed: {message}")]
    Request { url: String, message: String },
    #[error("request failed ({status_code}): {body}")]
    Status { status_code: u16, body: String },
    #[error("response stream failed: {0}")]
    Stream(String),
}

/// A frame that was expected to carry well-formed JSON did not.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed '{event}' payload: {source}")]
    Json {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid '{event}' payload: {message}")]
    Shape { event: String, message: String },
}

impl DecodeError {
    pub fn json(event: &str, source: serde_json::Error) -> Self {
        Self::Json {
            event: event.to_string(),
            source,
        }
    }

    pub fn shape(event: &str, message: impl Into<String>) -> Self {
        Self::Shape {
            event: event.to_string(),
            message: message.into(),
        }
    }

    pub fn event(&self) -> &str {
        match self {
            Self::Json { event, .. } | Self::Shape { event, .. } => event,
        }
    }
}

/// Why a stream ended in the `Errored` state.
#[derive(Debug, Error)]
pub enum StreamFailure {
    #[error("Error: {message} (code: {})", code.as_deref().unwrap_or(""))]
    Agent {
        code: Option<String>,
        message: String,
    },
    #[error("Agent error: {0}")]
    AgentRaw(String),
    #[error("Failed to decode agent response: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
