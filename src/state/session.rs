mod core;
mod state;
mod streaming;


pub use state::{
    ChatSession, StreamAggregator, StreamOutcome, StreamState, DIAGNOSTICS_INDEX, SENDING_STATUS,
    THINKING_LABEL, WAITING_STATUS,
};
