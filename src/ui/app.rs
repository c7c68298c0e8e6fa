//! Main TUI application state and logic

use crate::player::{PlaybackStatus, PlayerConfig, TracePlayer};
use crate::scene::{SceneProjector, VisualizationKind};
use crate::trace::CompilationResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use super::panes::{
    render_output_pane, render_scene_pane, render_source_pane, render_status_bar,
    SceneScrollState, SourceScrollState, StatusRenderData,
};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Scene,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> scene)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Scene,
            FocusedPane::Scene => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Scene,
            FocusedPane::Output => FocusedPane::Source,
            FocusedPane::Scene => FocusedPane::Output,
        }
    }
}

/// Player notifications the UI reacts to between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewerEvent {
    Line(Option<u32>),
    Finished,
}

/// The main application state
pub struct App {
    pub player: TracePlayer,
    pub projector: SceneProjector,

    /// The C source being replayed (may be empty)
    pub source_code: String,

    /// The service response the trace came from
    pub result: CompilationResult,

    /// Set when the trace was rejected
    pub load_error: Option<String>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub scene_scroll: SceneScrollState,
    pub output_scroll: usize,

    /// Line marked in the source pane, fed by the line channel
    pub highlighted_line: Option<u32>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Origin of the player's virtual clock
    started: Instant,

    /// Last time space was pressed (for debouncing)
    last_space_press: Instant,

    events: Receiver<ViewerEvent>,
}

impl App {
    /// Build the app and start playback of `result`'s trace.
    ///
    /// A malformed trace leaves the player empty and puts the reason in the
    /// status bar; the output pane still shows what the service reported.
    pub fn new(
        result: CompilationResult,
        source_code: String,
        kind: VisualizationKind,
        config: PlayerConfig,
    ) -> Self {
        let (tx, events) = mpsc::channel();
        let mut player: TracePlayer = TracePlayer::new(config);

        let line_tx = tx.clone();
        player.on_line_changed(move |line| {
            let _ = line_tx.send(ViewerEvent::Line(line));
        });
        player.on_finished(move || {
            let _ = tx.send(ViewerEvent::Finished);
        });

        let (status_message, load_error) = match player.load(&result.clone().into_trace_steps()) {
            Ok(()) if player.is_empty() => ("No execution trace to replay".to_string(), None),
            Ok(()) => ("Playing...".to_string(), None),
            Err(e) => {
                let message = format!("Could not parse execution trace: {}", e);
                (message.clone(), Some(message))
            }
        };

        App {
            player,
            projector: SceneProjector::new(kind),
            source_code,
            result,
            load_error,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            scene_scroll: SceneScrollState::default(),
            output_scroll: 0,
            highlighted_line: None,
            should_quit: false,
            status_message,
            started: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
            events,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.player.advance_to(self.started.elapsed());
            self.drain_events();

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Poll with a timeout so autoplay keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                        self.drain_events();
                    }
                }
            }
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ViewerEvent::Line(line) => self.highlighted_line = line,
                ViewerEvent::Finished => {
                    self.status_message = "Playback complete".to_string();
                }
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(pane_area);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            self.highlighted_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        render_output_pane(
            frame,
            left_rows[1],
            &self.result,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        let scene = self.projector.project(self.player.current_step());
        render_scene_pane(
            frame,
            columns[1],
            &scene,
            self.focused_pane == FocusedPane::Scene,
            &mut self.scene_scroll,
        );

        let position = self.player.position_label();
        render_status_bar(
            frame,
            status_area,
            StatusRenderData {
                message: &self.status_message,
                position: &position,
                status: self.player.status(),
                is_at_start: self.player.current_index() == Some(0),
                has_error: self.load_error.is_some() || !self.result.success,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                let n = c.to_digit(10).unwrap_or(1) as i64;
                let before = self.player.current_index();
                if let Some(index) = before {
                    self.player.seek(index as i64 + n);
                }
                let stepped = match (before, self.player.current_index()) {
                    (Some(from), Some(to)) => to - from,
                    _ => 0,
                };
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => self.step(false),
            KeyCode::Right => self.step(true),
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => self.source_scroll.scroll_up(),
                FocusedPane::Scene => {
                    self.scene_scroll.offset = self.scene_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => self.source_scroll.scroll_down(),
                FocusedPane::Scene => {
                    self.scene_scroll.offset = self.scene_scroll.offset.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.player.toggle();
                    self.status_message = match self.player.status() {
                        PlaybackStatus::Playing => "Playing...",
                        PlaybackStatus::Paused => "Paused",
                        PlaybackStatus::Finished => "Already at the last step",
                        PlaybackStatus::Empty => "Nothing to play",
                    }
                    .to_string();
                }
            }
            KeyCode::Enter => {
                self.player.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.player.jump_to_start();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn step(&mut self, forward: bool) {
        let before = self.player.current_index();
        if forward {
            self.player.step_forward();
        } else {
            self.player.step_backward();
        }
        self.status_message = match (before, self.player.current_index()) {
            (None, _) => "No trace loaded".to_string(),
            (Some(from), Some(to)) if from == to && forward => {
                "Cannot step forward: already at the last step".to_string()
            }
            (Some(from), Some(to)) if from == to => {
                "Cannot step backward: already at the first step".to_string()
            }
            _ if forward => "Stepped forward".to_string(),
            _ => "Stepped backward".to_string(),
        };
    }
}
