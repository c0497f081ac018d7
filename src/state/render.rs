use crate::types::Message;
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use tokio::sync::mpsc;

/// Opaque id of one on-screen region, issued by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(u64);

impl RegionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// What a region currently shows. Each render replaces the previous content.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionContent {
    Markdown(String),
    Expandable {
        label: String,
        body: String,
        expanded: bool,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Chart {
        spec: Value,
    },
    Json {
        label: String,
        value: Value,
        expanded: bool,
    },
}

/// Side-effecting display surface driven by the stream aggregator.
pub trait Renderer {
    fn create_region(&mut self, content_index: usize) -> RegionHandle;
    fn render(&mut self, region: RegionHandle, content: RegionContent);
    fn begin_status(&mut self, message: &str);
    fn update_status(&mut self, message: &str);
    fn end_status(&mut self);
    fn show_error(&mut self, message: &str);
    fn show_notice(&mut self, text: &str);
    fn show_user(&mut self, text: &str);
}

/// Live status line for the lifetime of the guard.
///
/// `end_status` runs exactly once, when the guard drops. The renderer stays
/// reachable through `Deref` while the status is shown.
pub struct StatusIndicator<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
}

impl<'a, R: Renderer + ?Sized> StatusIndicator<'a, R> {
    pub fn begin(renderer: &'a mut R, message: &str) -> Self {
        renderer.begin_status(message);
        Self { renderer }
    }

    pub fn update(&mut self, message: &str) {
        self.renderer.update_status(message);
    }
}

impl<R: Renderer + ?Sized> Deref for StatusIndicator<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> DerefMut for StatusIndicator<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> Drop for StatusIndicator<'_, R> {
    fn drop(&mut self) {
        self.renderer.end_status();
    }
}

/// Messages from a running turn to the terminal UI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    UserMessage(String),
    Notice(String),
    RegionCreated {
        region: RegionHandle,
        content_index: usize,
    },
    RegionRender {
        region: RegionHandle,
        content: RegionContent,
    },
    StatusBegin(String),
    StatusUpdate(String),
    StatusEnd,
    Error(String),
    TurnFinished {
        transcript: Vec<Message>,
    },
}

/// Renderer that forwards every call to the UI task.
///
/// Sends are fire-and-forget; a closed receiver only means nobody is
/// watching any more.
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<UiUpdate>,
    next_region: u64,
}

impl ChannelRenderer {
    pub fn new(tx: mpsc::UnboundedSender<UiUpdate>) -> Self {
        Self { tx, next_region: 0 }
    }

    fn emit(&self, update: UiUpdate) {
        let _ = self.tx.send(update);
    }
}

impl Renderer for ChannelRenderer {
    fn create_region(&mut self, content_index: usize) -> RegionHandle {
        let region = RegionHandle::new(self.next_region);
        self.next_region += 1;
        self.emit(UiUpdate::RegionCreated {
            region,
            content_index,
        });
        region
    }

    fn render(&mut self, region: RegionHandle, content: RegionContent) {
        self.emit(UiUpdate::RegionRender { region, content });
    }

    fn begin_status(&mut self, message: &str) {
        self.emit(UiUpdate::StatusBegin(message.to_string()));
    }

    fn update_status(&mut self, message: &str) {
        self.emit(UiUpdate::StatusUpdate(message.to_string()));
    }

    fn end_status(&mut self) {
        self.emit(UiUpdate::StatusEnd);
    }

    fn show_error(&mut self, message: &str) {
        self.emit(UiUpdate::Error(message.to_string()));
    }

    fn show_notice(&mut self, text: &str) {
        self.emit(UiUpdate::Notice(text.to_string()));
    }

    fn show_user(&mut self, text: &str) {
        self.emit(UiUpdate::UserMessage(text.to_string()));
    }
}
