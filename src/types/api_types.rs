use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// One entry of the transcript, in the exact shape the agent endpoint accepts
/// back as conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: ROLE_ASSISTANT.to_string(),
            content,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ROLE_USER
    }
}

/// Persisted content of a finalized message.
///
/// Blocks with an unknown `type`, or a known `type` whose body does not match
/// the expected shape, are kept verbatim as `Other` so history replays and
/// re-submits without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ContentBlock {
    Text { text: String },
    Table { table: TablePayload },
    Chart { chart: ChartPayload },
    Other { raw: Value },
}

impl ContentBlock {
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Table { .. } => "table",
            Self::Chart { .. } => "chart",
            Self::Other { raw } => raw.get("type").and_then(Value::as_str).unwrap_or("content"),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Table {
        table: TablePayload,
    },
    Chart {
        chart: ChartPayload,
    },
}

impl From<Value> for ContentBlock {
    fn from(value: Value) -> Self {
        let known = matches!(
            value.get("type").and_then(Value::as_str),
            Some("text" | "table" | "chart")
        );
        if !known {
            return Self::Other { raw: value };
        }

        match serde_json::from_value::<KnownBlock>(value.clone()) {
            Ok(KnownBlock::Text { text }) => Self::Text { text },
            Ok(KnownBlock::Table { table }) => Self::Table { table },
            Ok(KnownBlock::Chart { chart }) => Self::Chart { chart },
            Err(_) => Self::Other { raw: value },
        }
    }
}

impl From<ContentBlock> for Value {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => json!({ "type": "text", "text": text }),
            ContentBlock::Table { table } => json!({ "type": "table", "table": table }),
            ContentBlock::Chart { chart } => json!({ "type": "chart", "chart": chart }),
            ContentBlock::Other { raw } => raw,
        }
    }
}

/// Body of a `response.table` event, stored as-is inside a table block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub result_set: ResultSetEnvelope,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query result as delivered by the agent: row-major cells plus column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSetEnvelope {
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
    pub result_set_meta_data: ResultSetMetaData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSetMetaData {
    #[serde(default)]
    pub row_type: Vec<RowType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowType {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Column-checked table: every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSetEnvelope {
    pub fn column_names(&self) -> Vec<String> {
        self.result_set_meta_data
            .row_type
            .iter()
            .map(|column| column.name.clone())
            .collect()
    }

    pub fn to_result_set(&self) -> Result<ResultSet, String> {
        let columns = self.column_names();
        if let Some((row_index, row)) = self
            .data
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(format!(
                "row {row_index} has {} cells but the result set declares {} columns",
                row.len(),
                columns.len()
            ));
        }

        Ok(ResultSet {
            columns,
            rows: self.data.clone(),
        })
    }
}

impl ResultSet {
    /// Cells rendered for display: strings unquoted, nulls empty.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(display_cell).collect())
            .collect()
    }
}

pub fn display_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Body of a `response.chart` event; `chart_spec` is a Vega-Lite document
/// encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub chart_spec: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartPayload {
    pub fn spec(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.chart_spec)
    }
}
