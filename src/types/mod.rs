mod api_types;
mod events;

pub use api_types::{
    ChartPayload, ContentBlock, Message, ResultSet, ResultSetEnvelope, ResultSetMetaData,
    RowType, TablePayload, ROLE_ASSISTANT, ROLE_USER,
};
pub use events::{AgentEvent, Frame, DEFAULT_EVENT_NAME};
