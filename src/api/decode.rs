use crate::error::DecodeError;
use crate::types::{AgentEvent, ChartPayload, ContentBlock, Frame, Message, TablePayload};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub const EVENT_STATUS: &str = "response.status";
pub const EVENT_TEXT_DELTA: &str = "response.text.delta";
pub const EVENT_THINKING_DELTA: &str = "response.thinking.delta";
pub const EVENT_THINKING: &str = "response.thinking";
pub const EVENT_TABLE: &str = "response.table";
pub const EVENT_CHART: &str = "response.chart";
pub const EVENT_TOOL_USE: &str = "response.tool_use";
pub const EVENT_TOOL_RESULT: &str = "response.tool_result";
pub const EVENT_ERROR: &str = "error";
pub const EVENT_RESPONSE: &str = "response";

const DEFAULT_STATUS_MESSAGE: &str = "Working...";
const DEFAULT_ERROR_MESSAGE: &str = "Agent error";

type DecodeFn = fn(&str, &str) -> Result<AgentEvent, DecodeError>;

const DECODERS: &[(&str, DecodeFn)] = &[
    (EVENT_STATUS, decode_status),
    (EVENT_TEXT_DELTA, decode_text_delta),
    (EVENT_THINKING_DELTA, decode_thinking_delta),
    (EVENT_THINKING, decode_thinking),
    (EVENT_TABLE, decode_table),
    (EVENT_CHART, decode_chart),
    (EVENT_TOOL_USE, decode_tool_use),
    (EVENT_TOOL_RESULT, decode_tool_result),
    (EVENT_ERROR, decode_error),
    (EVENT_RESPONSE, decode_response),
];

/// Turns a frame into a typed event.
///
/// Unknown event names never fail; they come back as
/// [`AgentEvent::Unrecognized`]. Only the incremental, table, chart, status
/// and thinking kinds can return `Err`.
pub fn decode_frame(frame: &Frame) -> Result<AgentEvent, DecodeError> {
    match DECODERS.iter().find(|(name, _)| *name == frame.event) {
        Some((name, decode)) => decode(name, &frame.data),
        None => Ok(AgentEvent::Unrecognized {
            event: frame.event.clone(),
            data: frame.data.clone(),
        }),
    }
}

pub fn is_known_event(event: &str) -> bool {
    DECODERS.iter().any(|(name, _)| *name == event)
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TextBody {
    content_index: usize,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct IndexBody {
    content_index: usize,
}

fn parse<T: DeserializeOwned>(event: &str, data: &str) -> Result<T, DecodeError> {
    serde_json::from_str(data).map_err(|source| DecodeError::json(event, source))
}

fn decode_status(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let body: StatusBody = parse(event, data)?;
    Ok(AgentEvent::Status {
        message: body
            .message
            .unwrap_or_else(|| DEFAULT_STATUS_MESSAGE.to_string()),
    })
}

fn decode_text_delta(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let TextBody {
        content_index,
        text,
    } = parse(event, data)?;
    Ok(AgentEvent::TextDelta {
        content_index,
        text,
    })
}

fn decode_thinking_delta(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let TextBody {
        content_index,
        text,
    } = parse(event, data)?;
    Ok(AgentEvent::ThinkingDelta {
        content_index,
        text,
    })
}

fn decode_thinking(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let TextBody {
        content_index,
        text,
    } = parse(event, data)?;
    Ok(AgentEvent::Thinking {
        content_index,
        text,
    })
}

fn decode_table(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let value: Value = parse(event, data)?;
    let IndexBody { content_index } =
        serde_json::from_value(value.clone()).map_err(|source| DecodeError::json(event, source))?;
    let table: TablePayload =
        serde_json::from_value(value).map_err(|source| DecodeError::json(event, source))?;
    let result_set = table
        .result_set
        .to_result_set()
        .map_err(|message| DecodeError::shape(event, message))?;

    Ok(AgentEvent::Table {
        content_index,
        table,
        result_set,
    })
}

fn decode_chart(event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let value: Value = parse(event, data)?;
    let IndexBody { content_index } =
        serde_json::from_value(value.clone()).map_err(|source| DecodeError::json(event, source))?;
    let chart: ChartPayload =
        serde_json::from_value(value).map_err(|source| DecodeError::json(event, source))?;
    let spec = chart
        .spec()
        .map_err(|error| DecodeError::shape(event, format!("chart_spec is not JSON: {error}")))?;

    Ok(AgentEvent::Chart {
        content_index,
        chart,
        spec,
    })
}

fn lenient_json(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| json!({ "raw": data }))
}

fn decode_tool_use(_event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    Ok(AgentEvent::ToolUse(lenient_json(data)))
}

fn decode_tool_result(_event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    Ok(AgentEvent::ToolResult(lenient_json(data)))
}

fn decode_error(_event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let Ok(value) = serde_json::from_str::<Value>(data) else {
        return Ok(AgentEvent::RawError(data.to_string()));
    };

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string();
    let code = match value.get("code") {
        Some(Value::String(code)) => Some(code.clone()),
        Some(Value::Number(code)) => Some(code.to_string()),
        _ => None,
    };

    Ok(AgentEvent::Error { code, message })
}

fn decode_response(_event: &str, data: &str) -> Result<AgentEvent, DecodeError> {
    let message = serde_json::from_str::<Message>(data).unwrap_or_else(|_| {
        Message::assistant(vec![ContentBlock::Text {
            text: data.to_string(),
        }])
    });
    Ok(AgentEvent::FinalResponse(message))
}
