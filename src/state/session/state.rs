use super::super::region::RegionAccumulator;
use super::super::transcript::Transcript;
use crate::api::AgentClient;
use crate::error::StreamFailure;
use std::sync::Arc;

pub const SENDING_STATUS: &str = "Sending request...";
pub const WAITING_STATUS: &str = "Waiting for response...";
pub const THINKING_LABEL: &str = "Thinking";

/// Content index of the shared region for tool and unrecognized events.
pub const DIAGNOSTICS_INDEX: usize = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
    Completed,
    Errored,
}

#[derive(Debug)]
pub enum StreamOutcome {
    /// `committed` is the transcript position of the assistant message the
    /// stream produced, if it produced one.
    Completed { committed: Option<usize> },
    Errored(StreamFailure),
}

impl StreamOutcome {
    pub fn state(&self) -> StreamState {
        match self {
            Self::Completed { .. } => StreamState::Completed,
            Self::Errored(_) => StreamState::Errored,
        }
    }

    pub fn failure(&self) -> Option<&StreamFailure> {
        match self {
            Self::Completed { .. } => None,
            Self::Errored(failure) => Some(failure),
        }
    }
}

/// Folds one SSE response into the transcript.
///
/// Borrows the transcript for exactly one stream; the accumulation state is
/// dropped with the aggregator when the stream reaches a terminal state.
pub struct StreamAggregator<'t> {
    pub(super) transcript: &'t mut Transcript,
    pub(super) regions: RegionAccumulator,
    pub(super) state: StreamState,
    pub(super) final_response: Option<usize>,
}

/// Conversation owner across turns.
pub struct ChatSession {
    pub(super) client: Arc<AgentClient>,
    pub(super) transcript: Transcript,
}

impl ChatSession {
    pub fn new(client: AgentClient) -> Self {
        Self {
            client: Arc::new(client),
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    pub fn client(&self) -> Arc<AgentClient> {
        Arc::clone(&self.client)
    }
}
