//! The assistant panel application
//!
//! State + event loop for the terminal panel: a prompt input, an
//! attached-file list, an include-history toggle, and one response pane
//! per generation request. Panel events stream in over the bridge and
//! are applied between terminal polls, so deltas render as they arrive.

use super::events::{Event, EventHandler};
use super::markdown::render_markdown;
use crate::config::Config;
use crate::core::{GenerationOutcome, GenerationRequest, Orchestrator, RequestId};
use crate::panel::{PanelBridge, PanelCommand, PanelEvent};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;
use unicode_width::UnicodeWidthStr;

/// How many ticks between config-file refreshes (50ms tick -> ~500ms)
const CONFIG_REFRESH_TICKS: u32 = 10;

/// What the input box is currently collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Prompt,
    FilePath,
}

/// One response container, keyed by request id
#[derive(Debug)]
pub struct ResponsePane {
    pub id: RequestId,
    pub prompt: String,
    pub model: String,
    pub text: String,
    pub finalized: bool,
}

/// Panel state
pub struct App {
    input: String,
    cursor: usize, // char index into input
    mode: InputMode,
    files: Vec<PathBuf>,
    include_history: bool,
    panes: Vec<ResponsePane>,
    scroll: u16,
    follow: bool,
    notice: Option<String>,
    config: Config,
    bridge: PanelBridge,
    orchestrator: Orchestrator,
    tick_count: u32,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, bridge: PanelBridge, orchestrator: Orchestrator) -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            mode: InputMode::Prompt,
            files: Vec::new(),
            include_history: false,
            panes: Vec::new(),
            scroll: 0,
            follow: true,
            notice: None,
            config,
            bridge,
            orchestrator,
            tick_count: 0,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn panes(&self) -> &[ResponsePane] {
        &self.panes
    }

    /// React to one terminal event
    pub fn handle_event(&mut self, event: Event) {
        if event.is_quit() {
            self.should_quit = true;
            return;
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                for ch in text.chars().filter(|c| *c != '\n' && *c != '\r') {
                    self.insert_char(ch);
                }
            }
            Event::Resize(..) => {}
            Event::Tick => self.on_tick(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('f') => self.dispatch(PanelCommand::SelectFiles),
                KeyCode::Char('h') => {
                    self.include_history = !self.include_history;
                }
                KeyCode::Char('l') => {
                    self.panes.clear();
                    self.files.clear();
                    self.scroll = 0;
                    self.dispatch(PanelCommand::ClearHistory);
                }
                KeyCode::Char('s') => self.save_latest_document(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if self.mode == InputMode::FilePath {
                    self.mode = InputMode::Prompt;
                    self.input.clear();
                    self.cursor = 0;
                }
            }
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let byte = byte_index(&self.input, self.cursor);
                    self.input.remove(byte);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.input.chars().count() {
                    let byte = byte_index(&self.input, self.cursor);
                    self.input.remove(byte);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.input.chars().count());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.chars().count(),
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                self.follow = false;
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                self.follow = false;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                self.follow = true;
            }
            _ => {}
        }
    }

    fn insert_char(&mut self, ch: char) {
        let byte = byte_index(&self.input, self.cursor);
        self.input.insert(byte, ch);
        self.cursor += 1;
    }

    fn submit(&mut self) {
        match self.mode {
            InputMode::Prompt => {
                let prompt = self.input.trim().to_string();
                if prompt.is_empty() {
                    self.notice = Some("Please provide a prompt to generate code.".to_string());
                    return;
                }
                self.dispatch(PanelCommand::Generate {
                    prompt,
                    files: self.files.clone(),
                    include_history: self.include_history,
                });
                self.input.clear();
                self.cursor = 0;
            }
            InputMode::FilePath => {
                let path = self.input.trim().to_string();
                if !path.is_empty() {
                    let mut files = self.files.clone();
                    files.push(PathBuf::from(path));
                    self.bridge.send(PanelEvent::FilesSelected { files });
                }
                self.input.clear();
                self.cursor = 0;
                self.mode = InputMode::Prompt;
            }
        }
    }

    /// Route an inbound command the way the host would
    fn dispatch(&mut self, command: PanelCommand) {
        match command {
            PanelCommand::Generate {
                prompt,
                files,
                include_history,
            } => {
                // Config is read fresh per request so edits apply live.
                let config = Config::load().unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "config reload failed, using defaults");
                    Config::default()
                });
                let request = GenerationRequest::new(prompt)
                    .with_files(files)
                    .with_history(include_history);
                let orchestrator = self.orchestrator.clone();
                let provider_config = config.active();
                tokio::spawn(async move {
                    orchestrator
                        .generate_and_notify(request, provider_config)
                        .await;
                });
            }
            PanelCommand::SelectFiles => {
                self.mode = InputMode::FilePath;
                self.input.clear();
                self.cursor = 0;
            }
            PanelCommand::ClearHistory => {
                let orchestrator = self.orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator.clear_history().await;
                });
                self.notice = Some("Cleared responses and conversation history.".to_string());
            }
        }
    }

    /// Apply one event from the bridge
    pub fn apply_event(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::ResponseStarted { id, prompt } => {
                self.panes.push(ResponsePane {
                    id,
                    prompt,
                    model: self.config.active_model().to_string(),
                    text: String::new(),
                    finalized: false,
                });
                self.follow = true;
            }
            PanelEvent::ResponseDelta { id, text } => {
                if let Some(pane) = self.panes.iter_mut().find(|p| p.id == id) {
                    pane.text.push_str(&text);
                }
            }
            PanelEvent::ResponseFinalized { id, text } => {
                if let Some(pane) = self.panes.iter_mut().find(|p| p.id == id) {
                    pane.text = text;
                    pane.finalized = true;
                }
            }
            PanelEvent::FilesSelected { files } => {
                self.files = files;
            }
            PanelEvent::ConfigUpdated { .. } => {
                // Status line reads straight from self.config, refreshed
                // on tick; the event only forces a redraw.
            }
            PanelEvent::Notice(text) => {
                self.notice = Some(text);
            }
        }
    }

    fn on_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.tick_count % CONFIG_REFRESH_TICKS != 0 {
            return;
        }
        if let Ok(fresh) = Config::load() {
            if fresh != self.config {
                self.config = fresh;
                self.bridge.send(PanelEvent::ConfigUpdated {
                    provider: self.config.provider.clone(),
                    model: self.config.active_model().to_string(),
                    max_tokens: self.config.max_tokens,
                });
            }
        }
    }

    fn save_latest_document(&mut self) {
        let Some(pane) = self.panes.iter().rev().find(|p| p.finalized) else {
            self.notice = Some("No finalized response to save yet.".to_string());
            return;
        };
        let outcome = GenerationOutcome {
            request_id: pane.id,
            prompt: pane.prompt.clone(),
            model: pane.model.clone(),
            response: pane.text.clone(),
        };
        let path = PathBuf::from(format!("aicoder-gen-{}.md", pane.id));
        match std::fs::write(&path, outcome.document()) {
            Ok(()) => self.notice = Some(format!("Saved {}", path.display())),
            Err(err) => self.notice = Some(format!("Failed to save document: {err}")),
        }
    }

    /// Draw the panel
    pub fn draw(&mut self, frame: &mut Frame) {
        let file_rows = if self.files.is_empty() { 0 } else { 1 };
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(file_rows),
            Constraint::Length(3),
        ])
        .split(frame.area());

        self.draw_status(frame, chunks[0]);
        self.draw_responses(frame, chunks[1]);
        if file_rows > 0 {
            self.draw_files(frame, chunks[2]);
        }
        self.draw_input(frame, chunks[3]);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let history = if self.include_history { "on" } else { "off" };
        let mut spans = vec![
            Span::styled(
                format!(
                    " {} · {} · max {} ",
                    self.config.provider,
                    self.config.active_model(),
                    self.config.max_tokens
                ),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(
                "| history {history} | ^F file  ^H history  ^L clear  ^S save  ^Q quit "
            )),
        ];
        if let Some(notice) = &self.notice {
            spans.push(Span::styled(
                format!("| {notice}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_responses(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for pane in &self.panes {
            let marker = if pane.finalized { "●" } else { "◌" };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{marker} #{} ", pane.id),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    pane.prompt.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            if pane.finalized {
                lines.extend(render_markdown(&pane.text));
            } else {
                for text_line in pane.text.lines() {
                    lines.push(Line::from(text_line.to_string()));
                }
                lines.push(Line::from(Span::styled(
                    "▌",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::default());
        }

        let inner_height = area.height.saturating_sub(2);
        let total = lines.len() as u16;
        if self.follow {
            self.scroll = total.saturating_sub(inner_height);
        } else {
            self.scroll = self.scroll.min(total.saturating_sub(1));
        }

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Responses "))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(widget, area);
    }

    fn draw_files(&self, frame: &mut Frame, area: Rect) {
        let listed = self
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" files: ", Style::default().fg(Color::DarkGray)),
                Span::raw(listed),
            ])),
            area,
        );
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let title = match self.mode {
            InputMode::Prompt => " Prompt (Enter to generate) ",
            InputMode::FilePath => " Attach file path (Esc to cancel) ",
        };
        let widget = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, area);

        let prefix: String = self.input.chars().take(self.cursor).collect();
        let x = area.x + 1 + prefix.width() as u16;
        frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Run the panel until the user quits
pub async fn run(config: Config) -> Result<()> {
    let (bridge, rx) = PanelBridge::channel();
    let orchestrator = Orchestrator::new(bridge.clone());
    let app = App::new(config, bridge, orchestrator);
    run_with(app, rx).await
}

async fn run_with(mut app: App, mut rx: UnboundedReceiver<PanelEvent>) -> Result<()> {
    use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let events = EventHandler::new();
    let result = loop {
        if let Err(err) = terminal.draw(|frame| app.draw(frame)) {
            break Err(err.into());
        }

        match events.poll() {
            Ok(event) => app.handle_event(event),
            Err(err) => break Err(err),
        }

        // Drain everything the orchestrator pushed since the last poll
        while let Ok(event) = rx.try_recv() {
            app.apply_event(event);
        }

        if app.should_quit() {
            break Ok(());
        }
    };

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    result
}
