mod view;

pub use view::ChatView;

use crate::api::AgentClient;
use crate::config::Config;
use crate::state::{ChannelRenderer, ChatSession, UiUpdate};
use crate::terminal::{TerminalGuard, TerminalType};
use crate::ui::editor::{EditorAction, PromptEditor};
use crate::ui::layout::split_chat_layout;
use crate::ui::render::{
    input_visual_rows, render_header, render_history, render_input, render_status_line,
};
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task;

const TITLE: &str = "Hospital Operations Assistant";
const TUI_TICK_INTERVAL: Duration = Duration::from_millis(50);
const PAGE_ROWS: usize = 10;

/// Built-in prompts behind `/1` to `/4`.
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "What are the operating hours for the emergency room?",
    "What is the SOP for patient admission?",
    "What is the current capacity of the ICU?",
    "Where is the radiology department located?",
];

/// Work handed to the session task; one request is processed at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest {
    Send(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(name) = trimmed.strip_prefix('/') else {
        return Command::Ask(trimmed.to_string());
    };

    match name {
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => match name.parse::<usize>() {
            Ok(number @ 1..=4) => Command::Ask(EXAMPLE_QUESTIONS[number - 1].to_string()),
            _ => Command::Unknown(trimmed.to_string()),
        },
    }
}

fn help_lines() -> Vec<String> {
    let mut lines = vec!["Commands:".to_string()];
    lines.extend(
        EXAMPLE_QUESTIONS
            .iter()
            .enumerate()
            .map(|(i, question)| format!("  /{}  {question}", i + 1)),
    );
    lines.push("  /clear  start a new conversation".to_string());
    lines.push("  Esc or Ctrl-C  quit".to_string());
    lines
}

async fn run_turns(
    mut session: ChatSession,
    mut requests: mpsc::UnboundedReceiver<TurnRequest>,
    updates: mpsc::UnboundedSender<UiUpdate>,
) {
    while let Some(request) = requests.recv().await {
        match request {
            TurnRequest::Send(prompt) => {
                let mut renderer = ChannelRenderer::new(updates.clone());
                if let Err(error) = session.send(prompt, &mut renderer).await {
                    tracing::debug!(%error, "turn ended before streaming");
                }
            }
            TurnRequest::Clear => {
                session.clear();
                tracing::info!("conversation cleared");
            }
        }

        let transcript = session.transcript().messages().to_vec();
        if updates.send(UiUpdate::TurnFinished { transcript }).is_err() {
            break;
        }
    }
}

pub struct App {
    requests: mpsc::UnboundedSender<TurnRequest>,
    updates: mpsc::UnboundedReceiver<UiUpdate>,
    view: ChatView,
    editor: PromptEditor,
    turn_in_progress: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = AgentClient::new(&config)?;
        tracing::info!(url = client.run_url(), "agent client ready");
        Ok(Self::with_session(ChatSession::new(client)))
    }

    /// Spawns the session task; must run inside a tokio runtime.
    pub fn with_session(session: ChatSession) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        task::spawn(run_turns(session, request_rx, update_tx));

        Self {
            requests: request_tx,
            updates: update_rx,
            view: ChatView::new(),
            editor: PromptEditor::new(),
            turn_in_progress: false,
            should_quit: false,
        }
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    pub fn is_turn_in_progress(&self) -> bool {
        self.turn_in_progress
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> Result<()> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            bail!("wardline needs an interactive terminal");
        }

        let mut guard = TerminalGuard::new()?;
        self.view
            .push_notice("Ask a question, or type /help for the example prompts.");

        let mut tick = tokio::time::interval(TUI_TICK_INTERVAL);
        while !self.should_quit {
            self.draw(guard.terminal_mut())?;
            self.process_terminal_events()?;
            self.drain_updates_nonblocking();

            tokio::select! {
                _ = tick.tick() => {}
                update = self.updates.recv() => self.handle_update(update),
            }
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut TerminalType) -> Result<()> {
        let lines = self.view.lines();
        let busy = self.turn_in_progress;

        terminal.draw(|frame| {
            let area = frame.area();
            let input_rows = input_visual_rows(self.editor.buffer(), area.width as usize);
            let panes = split_chat_layout(area, u16::try_from(input_rows).unwrap_or(u16::MAX));

            render_header(frame, panes.header, TITLE, self.view.history().len());
            render_history(frame, panes.history, lines, self.view.scroll_back());
            render_status_line(frame, panes.status, self.view.status(), busy);
            render_input(
                frame,
                panes.input,
                self.editor.buffer(),
                self.editor.cursor(),
                busy,
            );
        })?;
        Ok(())
    }

    fn process_terminal_events(&mut self) -> Result<()> {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Paste(text) => self.editor.insert_str(&text),
                Event::Key(key)
                    if key.kind == KeyEventKind::Press || key.kind == KeyEventKind::Repeat =>
                {
                    self.handle_key(key);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn drain_updates_nonblocking(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.handle_update(Some(update));
        }
    }

    fn handle_update(&mut self, update: Option<UiUpdate>) {
        match update {
            Some(update @ UiUpdate::TurnFinished { .. }) => {
                self.turn_in_progress = false;
                self.view.apply(update);
            }
            Some(update) => self.view.apply(update),
            None => {
                tracing::error!("session task stopped");
                self.should_quit = true;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Tab => {
                self.view.toggle_expanded();
            }
            KeyCode::PageUp => self.view.scroll_up(PAGE_ROWS),
            KeyCode::PageDown => self.view.scroll_down(PAGE_ROWS),
            KeyCode::Enter
                if self.turn_in_progress && !key.modifiers.contains(KeyModifiers::SHIFT) => {}
            _ => {
                if let EditorAction::Submit(text) = self.editor.apply_key(key) {
                    self.submit(&text);
                }
            }
        }
    }

    pub fn submit(&mut self, text: &str) {
        if self.turn_in_progress {
            return;
        }

        match parse_command(text) {
            Command::Ask(prompt) => self.dispatch(TurnRequest::Send(prompt)),
            Command::Clear => {
                self.view.clear();
                self.dispatch(TurnRequest::Clear);
            }
            Command::Help => {
                for line in help_lines() {
                    self.view.push_notice(line);
                }
            }
            Command::Quit => self.should_quit = true,
            Command::Unknown(command) => {
                self.view
                    .push_error(format!("Unknown command '{command}' (try /help)"));
            }
        }
    }

    fn dispatch(&mut self, request: TurnRequest) {
        if self.requests.send(request).is_err() {
            self.view.push_error("The session task has stopped.");
            return;
        }
        self.turn_in_progress = true;
    }

    /// Applies updates until the in-flight turn reports back.
    pub async fn wait_for_turn(&mut self) {
        while self.turn_in_progress && !self.should_quit {
            let update = self.updates.recv().await;
            self.handle_update(update);
        }
    }
}
