use super::super::render::{RegionContent, Renderer};
use super::{StreamAggregator, DIAGNOSTICS_INDEX, THINKING_LABEL};
use crate::error::StreamFailure;
use crate::types::{AgentEvent, ContentBlock, Message};
use serde_json::Value;
use std::ops::ControlFlow;

impl StreamAggregator<'_> {
    pub(super) fn apply<R: Renderer + ?Sized>(
        &mut self,
        event: AgentEvent,
        renderer: &mut R,
    ) -> ControlFlow<StreamFailure> {
        tracing::trace!(kind = event.kind(), "agent event");

        match event {
            AgentEvent::Status { message } => renderer.update_status(&message),
            AgentEvent::TextDelta {
                content_index,
                text,
            } => {
                let region = self.regions.get_or_create_region(content_index, renderer);
                let full = self.regions.append(content_index, &text).to_string();
                renderer.render(region, RegionContent::Markdown(full));
            }
            AgentEvent::ThinkingDelta {
                content_index,
                text,
            } => {
                let region = self.regions.get_or_create_region(content_index, renderer);
                let full = self.regions.append(content_index, &text).to_string();
                renderer.render(region, thinking(full, true));
            }
            AgentEvent::Thinking {
                content_index,
                text,
            } => {
                let region = self.regions.get_or_create_region(content_index, renderer);
                renderer.render(region, thinking(text, false));
            }
            AgentEvent::Table {
                content_index,
                table,
                result_set,
            } => {
                let region = self.regions.get_or_create_region(content_index, renderer);
                renderer.render(
                    region,
                    RegionContent::Table {
                        rows: result_set.display_rows(),
                        columns: result_set.columns,
                    },
                );
                self.regions
                    .place(content_index, ContentBlock::Table { table });
            }
            AgentEvent::Chart {
                content_index,
                chart,
                spec,
            } => {
                let region = self.regions.get_or_create_region(content_index, renderer);
                renderer.render(region, RegionContent::Chart { spec });
                self.regions
                    .place(content_index, ContentBlock::Chart { chart });
            }
            AgentEvent::ToolUse(value) => self.render_diagnostic("Tool Use", value, renderer),
            AgentEvent::ToolResult(value) => self.render_diagnostic("Tool Result", value, renderer),
            AgentEvent::Error { code, message } => {
                return ControlFlow::Break(StreamFailure::Agent { code, message });
            }
            AgentEvent::RawError(payload) => {
                return ControlFlow::Break(StreamFailure::AgentRaw(payload));
            }
            AgentEvent::FinalResponse(message) => self.commit_final_response(message),
            AgentEvent::Unrecognized { event, data } => {
                render_unrecognized(&event, data, renderer);
            }
        }

        ControlFlow::Continue(())
    }

    /// Tool traffic shares one collapsed diagnostics region and never
    /// reaches the transcript.
    fn render_diagnostic<R: Renderer + ?Sized>(
        &mut self,
        label: &str,
        value: Value,
        renderer: &mut R,
    ) {
        let region = self
            .regions
            .get_or_create_region(DIAGNOSTICS_INDEX, renderer);
        renderer.render(
            region,
            RegionContent::Json {
                label: label.to_string(),
                value,
                expanded: false,
            },
        );
    }

    /// A later `response` replaces the one committed earlier in this stream.
    fn commit_final_response(&mut self, message: Message) {
        if let Some(index) = self
            .final_response
            .filter(|index| *index < self.transcript.len())
        {
            tracing::debug!(index, "replacing earlier final response");
            self.transcript.replace(index, message);
            return;
        }
        self.final_response = Some(self.transcript.push(message));
    }
}

fn thinking(body: String, expanded: bool) -> RegionContent {
    RegionContent::Expandable {
        label: THINKING_LABEL.to_string(),
        body,
        expanded,
    }
}

/// Shown in a fresh region; leaves accumulation state untouched.
fn render_unrecognized<R: Renderer + ?Sized>(event: &str, data: String, renderer: &mut R) {
    tracing::debug!(event, "unrecognized agent event");
    let value = serde_json::from_str(&data).unwrap_or(Value::String(data));
    let region = renderer.create_region(DIAGNOSTICS_INDEX);
    renderer.render(
        region,
        RegionContent::Json {
            label: event.to_string(),
            value,
            expanded: false,
        },
    );
}
