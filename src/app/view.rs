use crate::state::{RegionContent, RegionHandle, UiUpdate};
use crate::types::Message;
use crate::ui::text::{message_lines, region_lines, speaker_line};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

#[derive(Debug, Clone, PartialEq)]
enum LiveEntry {
    User(String),
    Notice(String),
    Error(String),
    Region {
        region: RegionHandle,
        content: Option<RegionContent>,
    },
}

/// Everything the history pane shows.
///
/// Committed messages come from the last transcript snapshot; live entries
/// belong to the turn in flight and are replaced by the next snapshot.
/// Errors outlive the snapshot, and so does the user's prompt when the
/// snapshot did not grow, so a rolled-back turn still shows what was asked.
#[derive(Debug, Default)]
pub struct ChatView {
    history: Vec<Message>,
    live: Vec<LiveEntry>,
    status: Option<String>,
    scroll_back: usize,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::UserMessage(text) => {
                self.live
                    .retain(|entry| !matches!(entry, LiveEntry::Error(_) | LiveEntry::User(_)));
                self.live.push(LiveEntry::User(text));
                self.scroll_back = 0;
            }
            UiUpdate::Notice(text) => self.live.push(LiveEntry::Notice(text)),
            UiUpdate::Error(message) => self.live.push(LiveEntry::Error(message)),
            UiUpdate::RegionCreated { region, .. } => self.live.push(LiveEntry::Region {
                region,
                content: None,
            }),
            UiUpdate::RegionRender { region, content } => self.render_region(region, content),
            UiUpdate::StatusBegin(message) | UiUpdate::StatusUpdate(message) => {
                self.status = Some(message);
            }
            UiUpdate::StatusEnd => self.status = None,
            UiUpdate::TurnFinished { transcript } => {
                let rolled_back = transcript.len() <= self.history.len();
                self.history = transcript;
                self.live.retain(|entry| match entry {
                    LiveEntry::Error(_) => true,
                    LiveEntry::User(_) => rolled_back,
                    _ => false,
                });
                self.status = None;
            }
        }
    }

    fn render_region(&mut self, handle: RegionHandle, next: RegionContent) {
        let slot = self.live.iter_mut().find_map(|entry| match entry {
            LiveEntry::Region { region, content } if *region == handle => Some(content),
            _ => None,
        });
        match slot {
            Some(content) => *content = Some(next),
            None => tracing::debug!(region = handle.id(), "render for unknown region"),
        }
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.live.push(LiveEntry::Notice(text.into()));
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.live.push(LiveEntry::Error(message.into()));
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.live.clear();
        self.status = None;
        self.scroll_back = 0;
    }

    /// Flips every live expandable region to the opposite of the newest one.
    pub fn toggle_expanded(&mut self) -> bool {
        let newest = self.live.iter().rev().find_map(|entry| match entry {
            LiveEntry::Region {
                content:
                    Some(
                        RegionContent::Expandable { expanded, .. }
                        | RegionContent::Json { expanded, .. },
                    ),
                ..
            } => Some(*expanded),
            _ => None,
        });
        let Some(newest) = newest else {
            return false;
        };

        for entry in &mut self.live {
            if let LiveEntry::Region {
                content:
                    Some(
                        RegionContent::Expandable { expanded, .. }
                        | RegionContent::Json { expanded, .. },
                    ),
                ..
            } = entry
            {
                *expanded = !newest;
            }
        }
        true
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(rows);
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &self.history {
            lines.extend(message_lines(message));
            lines.push(Line::default());
        }

        let mut agent_header = false;
        for entry in &self.live {
            match entry {
                LiveEntry::User(text) => {
                    lines.push(speaker_line(true));
                    lines.extend(text.lines().map(|line| Line::from(line.to_string())));
                    lines.push(Line::default());
                    agent_header = false;
                }
                LiveEntry::Notice(text) => lines.push(Line::styled(
                    text.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                LiveEntry::Error(message) => lines.push(Line::styled(
                    message.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                LiveEntry::Region {
                    content: Some(content),
                    ..
                } => {
                    if !agent_header {
                        lines.push(speaker_line(false));
                        agent_header = true;
                    }
                    lines.extend(region_lines(content));
                }
                LiveEntry::Region { content: None, .. } => {}
            }
        }
        lines
    }
}
