use super::api_types::{ChartPayload, Message, ResultSet, TablePayload};
use serde_json::Value;

/// Event name used when an SSE record carries no `event:` line.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// One SSE record: its event name and the newline-joined `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Typed agent event decoded from a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Status {
        message: String,
    },
    TextDelta {
        content_index: usize,
        text: String,
    },
    ThinkingDelta {
        content_index: usize,
        text: String,
    },
    Thinking {
        content_index: usize,
        text: String,
    },
    Table {
        content_index: usize,
        table: TablePayload,
        result_set: ResultSet,
    },
    Chart {
        content_index: usize,
        chart: ChartPayload,
        spec: Value,
    },
    /// Tool invocation payload; `{"raw": <payload>}` when it was not JSON.
    ToolUse(Value),
    ToolResult(Value),
    Error {
        code: Option<String>,
        message: String,
    },
    /// Error payload that was not JSON, kept verbatim.
    RawError(String),
    FinalResponse(Message),
    /// Event name outside the known set, surfaced with its raw payload.
    Unrecognized {
        event: String,
        data: String,
    },
}

impl AgentEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::Status { .. } => "status",
            Self::TextDelta { .. } => "text_delta",
            Self::ThinkingDelta { .. } => "thinking_delta",
            Self::Thinking { .. } => "thinking",
            Self::Table { .. } => "table",
            Self::Chart { .. } => "chart",
            Self::ToolUse(_) => "tool_use",
            Self::ToolResult(_) => "tool_result",
            Self::Error { .. } | Self::RawError(_) => "error",
            Self::FinalResponse(_) => "response",
            Self::Unrecognized { event, .. } => event,
        }
    }
}
