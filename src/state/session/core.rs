use super::super::render::{Renderer, StatusIndicator};
use super::super::transcript::Transcript;
use super::{ChatSession, StreamAggregator, StreamOutcome, StreamState};
use super::{SENDING_STATUS, WAITING_STATUS};
use crate::api::decode::decode_frame;
use crate::api::logging::emit_frame_decode_error;
use crate::api::stream::frame_stream;
use crate::error::{StreamFailure, TransportError};
use crate::state::region::RegionAccumulator;
use crate::types::{Frame, Message};
use futures::{Stream, StreamExt};
use std::ops::ControlFlow;
use std::pin::pin;

impl<'t> StreamAggregator<'t> {
    pub fn new(transcript: &'t mut Transcript) -> Self {
        Self {
            transcript,
            regions: RegionAccumulator::new(),
            state: StreamState::Idle,
            final_response: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Consumes the line stream to a terminal state.
    ///
    /// Frames are pulled one at a time and applied in order. An `error`
    /// event, a malformed critical frame, or a broken connection stops the
    /// stream and drops the newest transcript message. The status line is
    /// ended exactly once on every path.
    pub async fn run<S, R>(mut self, lines: S, renderer: &mut R) -> StreamOutcome
    where
        S: Stream<Item = Result<String, TransportError>> + Unpin,
        R: Renderer + ?Sized,
    {
        self.state = StreamState::Streaming;
        tracing::debug!(history = self.transcript.len(), "stream started");

        let mut status = StatusIndicator::begin(renderer, WAITING_STATUS);
        let mut frames = pin!(frame_stream(lines));

        while let Some(next) = frames.next().await {
            let flow = match next {
                Ok(frame) => self.dispatch(&frame, &mut *status),
                Err(error) => ControlFlow::Break(StreamFailure::Transport(error)),
            };
            if let ControlFlow::Break(failure) = flow {
                return self.abort(failure, &mut *status);
            }
        }

        drop(status);
        let committed = self.finish();
        tracing::debug!(?committed, "stream completed");
        StreamOutcome::Completed { committed }
    }

    fn dispatch<R: Renderer + ?Sized>(
        &mut self,
        frame: &Frame,
        renderer: &mut R,
    ) -> ControlFlow<StreamFailure> {
        match decode_frame(frame) {
            Ok(event) => self.apply(event, renderer),
            Err(error) => {
                emit_frame_decode_error(&error, &frame.data);
                ControlFlow::Break(StreamFailure::Decode(error))
            }
        }
    }

    fn abort<R: Renderer + ?Sized>(
        &mut self,
        failure: StreamFailure,
        renderer: &mut R,
    ) -> StreamOutcome {
        tracing::warn!(%failure, "stream aborted");
        renderer.show_error(&failure.to_string());
        if let Some(dropped) = self.transcript.pop_last() {
            tracing::debug!(role = %dropped.role, "dropped newest transcript message");
        }
        self.state = StreamState::Errored;
        StreamOutcome::Errored(failure)
    }

    fn finish(&mut self) -> Option<usize> {
        self.state = StreamState::Completed;
        if self.final_response.is_some() {
            return self.final_response;
        }
        if self.regions.is_empty() {
            return None;
        }

        let content = self.regions.fallback_content();
        Some(self.transcript.push(Message::assistant(content)))
    }
}

impl ChatSession {
    /// Runs one user turn end to end.
    ///
    /// A transport failure before streaming is shown and returned; the user
    /// message stays in the transcript. Stream-level failures come back as
    /// `Ok(StreamOutcome::Errored(..))`.
    pub async fn send<R: Renderer + ?Sized>(
        &mut self,
        prompt: String,
        renderer: &mut R,
    ) -> Result<StreamOutcome, TransportError> {
        renderer.show_user(&prompt);
        self.transcript.push(Message::user(prompt));

        let submitted = {
            let _sending = StatusIndicator::begin(renderer, SENDING_STATUS);
            self.client.submit(self.transcript.messages()).await
        };
        let stream = match submitted {
            Ok(stream) => stream,
            Err(error) => {
                tracing::error!(%error, "agent run failed before streaming");
                renderer.show_error(&error.to_string());
                return Err(error);
            }
        };

        if let Some(request_id) = &stream.request_id {
            renderer.show_notice(&format!("request_id: {request_id}"));
        }

        let outcome = StreamAggregator::new(&mut self.transcript)
            .run(stream.lines, renderer)
            .await;
        tracing::info!(state = ?outcome.state(), history = self.transcript.len(), "turn finished");
        Ok(outcome)
    }
}
