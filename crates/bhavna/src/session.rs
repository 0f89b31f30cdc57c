//! The session controller: owns the UI state and drives one analysis at a
//! time from input to rendered result.
//!
//! ```text
//! Idle ──submit──▶ Loading ──ok──▶ ResultShown
//!  ▲                  │  └─err──▶ ErrorShown
//!  └──────clear───────┴────────────────┘
//! ```
//!
//! A guard failure goes straight to `ErrorShown` without entering `Loading`.

use std::sync::Arc;

use bhavna_core::{
    terminal_events, Command, Component, Model, Subscription, TaskKey, TerminalEvent,
};
use bhavna_widgets::key::{Binding, KeyCombination, KeyMap};
use bhavna_widgets::spinner::{self, Spinner};
use bhavna_widgets::text_box::{self, TextBox};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Frame;

use crate::analysis::{AnalysisResult, BackendStatus};
use crate::chart::{self, ChartPresenter};
use crate::config::ClientConfig;
use crate::error::{AnalysisError, TransportError};
use crate::input_guard::{validate, CharCounter};
use crate::renderer::{render, series, RenderedView};
use crate::transport::Analyzer;

/// Hides the error banner.
pub const BANNER_TIMER: TaskKey = TaskKey::new("error-banner");
/// Moves focus to a freshly shown result.
pub const REVEAL_TIMER: TaskKey = TaskKey::new("reveal-result");

/// Which phase the session is in. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading,
    ResultShown,
    ErrorShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Input(text_box::Message),
    Submit,
    Clear,
    ToggleFocus,
    Quit,
    /// Response for request number `seq`.
    Analyzed {
        seq: u64,
        outcome: Result<AnalysisResult, TransportError>,
    },
    HideBanner,
    RevealResult,
    Health(BackendStatus),
    Spinner(spinner::Message),
    Chart(chart::Message),
    Resized,
}

/// Startup inputs for [`Session`].
pub struct SessionFlags {
    pub config: ClientConfig,
    pub analyzer: Arc<dyn Analyzer>,
}

pub struct SessionKeys {
    pub submit: Binding,
    pub newline: Binding,
    pub clear: Binding,
    pub focus: Binding,
    pub select: Binding,
    pub quit: Binding,
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self {
            submit: Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze"),
            newline: Binding::with_keys(
                vec![
                    KeyCombination::shift(KeyCode::Enter),
                    KeyCombination::alt(KeyCode::Enter),
                ],
                "shift+enter",
                "newline",
            ),
            clear: Binding::new(KeyCombination::ctrl(KeyCode::Char('l')), "ctrl+l", "clear"),
            focus: Binding::new(KeyCombination::new(KeyCode::Tab), "tab", "focus"),
            select: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Left),
                    KeyCombination::new(KeyCode::Right),
                ],
                "←/→",
                "inspect",
            ),
            quit: Binding::with_keys(
                vec![
                    KeyCombination::ctrl(KeyCode::Char('c')),
                    KeyCombination::ctrl(KeyCode::Char('q')),
                ],
                "ctrl+q",
                "quit",
            ),
        }
    }
}

impl KeyMap for SessionKeys {
    fn hints(&self) -> Vec<&Binding> {
        let mut hints = vec![&self.submit, &self.newline, &self.clear, &self.focus];
        if self.select.enabled {
            hints.push(&self.select);
        }
        hints.push(&self.quit);
        hints
    }
}

pub struct Session {
    pub(crate) config: ClientConfig,
    analyzer: Arc<dyn Analyzer>,
    pub(crate) state: UiState,
    pub(crate) focus: Focus,
    pub(crate) input: TextBox,
    pub(crate) counter: CharCounter,
    pub(crate) spinner: Spinner,
    result: Option<AnalysisResult>,
    pub(crate) rendered: Option<RenderedView>,
    pub(crate) chart: ChartPresenter,
    pub(crate) banner: Option<String>,
    seq: u64,
    in_flight: Option<u64>,
    pub(crate) backend: BackendStatus,
    pub(crate) keys: SessionKeys,
}

impl Session {
    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Text of the visible error banner.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn rendered(&self) -> Option<&RenderedView> {
        self.rendered.as_ref()
    }

    pub fn chart(&self) -> &ChartPresenter {
        &self.chart
    }

    pub fn input_text(&self) -> String {
        self.input.text()
    }

    pub fn counter(&self) -> CharCounter {
        self.counter
    }

    pub fn submit_enabled(&self) -> bool {
        self.keys.submit.enabled
    }

    pub fn is_loading_indicator_shown(&self) -> bool {
        self.spinner.is_spinning()
    }

    /// Sequence number of the request awaiting a response.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    fn transition(&mut self, next: UiState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "session state");
            self.state = next;
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::Input => {
                self.input.focus();
                self.chart.blur();
            }
            Focus::Results => {
                self.input.blur();
                self.chart.focus();
            }
        }
        self.keys.select.set_enabled(focus == Focus::Results);
    }

    fn edit(&mut self, msg: text_box::Message) -> Command<Msg> {
        let cmd = self.input.update(msg).map(Msg::Input);
        self.refresh_counter();
        cmd
    }

    fn refresh_counter(&mut self) {
        self.counter = CharCounter::measure(&self.input.text());
        self.input.set_status(Some(crate::view::counter_line(&self.counter)));
    }

    fn end_loading(&mut self) {
        self.spinner.stop();
        self.keys.submit.set_enabled(true);
    }

    fn submit(&mut self) -> Command<Msg> {
        if self.state == UiState::Loading {
            tracing::debug!("submit ignored while a request is in flight");
            return Command::none();
        }
        let text = self.input.text();
        if let Err(err) = validate(&text) {
            tracing::info!(%err, "input rejected");
            return self.fail(err.into());
        }

        self.seq += 1;
        let seq = self.seq;
        self.in_flight = Some(seq);
        self.banner = None;
        self.spinner.start();
        self.keys.submit.set_enabled(false);
        self.transition(UiState::Loading);
        tracing::info!(seq, chars = text.chars().count(), "submitting text for analysis");

        let request = self.analyzer.analyze(text);
        Command::batch([
            Command::cancel(BANNER_TIMER),
            Command::cancel(REVEAL_TIMER),
            Command::perform(request, move |outcome| Msg::Analyzed { seq, outcome }),
        ])
    }

    fn finish(
        &mut self,
        seq: u64,
        outcome: Result<AnalysisResult, TransportError>,
    ) -> Command<Msg> {
        if self.in_flight != Some(seq) {
            tracing::debug!(seq, latest = self.seq, "discarding stale response");
            return Command::none();
        }
        self.in_flight = None;
        self.end_loading();

        match outcome {
            Ok(result) => {
                let view = render(&result);
                tracing::info!(
                    seq,
                    emotion = %result.emotion,
                    percent = view.percent,
                    "analysis complete"
                );
                self.chart.present(series(&view, &self.config.chart));
                self.result = Some(result);
                self.rendered = Some(view);
                self.banner = None;
                self.transition(UiState::ResultShown);
                Command::batch([
                    Command::cancel(BANNER_TIMER),
                    Command::schedule(REVEAL_TIMER, self.config.reveal_delay, Msg::RevealResult),
                ])
            }
            Err(err) => {
                tracing::warn!(seq, %err, "analysis failed");
                self.fail(err.into())
            }
        }
    }

    fn fail(&mut self, err: AnalysisError) -> Command<Msg> {
        self.banner = Some(err.user_message(self.analyzer.endpoint()));
        self.transition(UiState::ErrorShown);
        Command::batch([
            Command::cancel(REVEAL_TIMER),
            Command::schedule(BANNER_TIMER, self.config.error_display, Msg::HideBanner),
        ])
    }

    fn clear(&mut self) -> Command<Msg> {
        if let Some(seq) = self.in_flight.take() {
            tracing::info!(seq, "clear abandoned the request in flight");
        }
        self.end_loading();
        let cmd = self.edit(text_box::Message::Clear);
        self.result = None;
        self.rendered = None;
        self.chart.clear();
        self.banner = None;
        self.set_focus(Focus::Input);
        self.transition(UiState::Idle);
        Command::batch([
            cmd,
            Command::cancel(BANNER_TIMER),
            Command::cancel(REVEAL_TIMER),
        ])
    }

    fn toggle_focus(&mut self) {
        match self.focus {
            Focus::Input if self.state == UiState::ResultShown => self.set_focus(Focus::Results),
            Focus::Input => {}
            Focus::Results => self.set_focus(Focus::Input),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Msg> {
        if key.kind == KeyEventKind::Release {
            return Command::none();
        }
        if self.keys.quit.matches(&key) {
            return self.update(Msg::Quit);
        }
        if self.keys.clear.matches(&key) {
            return self.clear();
        }
        if self.keys.focus.matches(&key) {
            self.toggle_focus();
            return Command::none();
        }
        if self.keys.submit.matches(&key) {
            return self.submit();
        }
        if self.keys.select.matches(&key) {
            let msg = if key.code == KeyCode::Left {
                chart::Message::SelectPrev
            } else {
                chart::Message::SelectNext
            };
            return self.chart.update(msg).map(Msg::Chart);
        }
        if self.focus != Focus::Input {
            // Editing keys hand focus back to the input.
            let editing = matches!(
                key.code,
                KeyCode::Char(_) | KeyCode::Backspace | KeyCode::Delete
            ) && !key.modifiers.contains(KeyModifiers::CONTROL);
            if !editing {
                return Command::none();
            }
            self.set_focus(Focus::Input);
        }
        if self.keys.newline.matches(&key) {
            return self.edit(text_box::Message::Newline);
        }
        self.edit(text_box::Message::KeyPress(key))
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Command<Msg> {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_)
                if self.state == UiState::ResultShown =>
            {
                let hover = chart::Message::Hover {
                    column: mouse.column,
                    row: mouse.row,
                };
                self.chart.update(hover).map(Msg::Chart)
            }
            _ => Command::none(),
        }
    }
}

impl Model for Session {
    type Message = Msg;
    type Flags = SessionFlags;

    fn init(flags: SessionFlags) -> (Self, Command<Msg>) {
        let SessionFlags { config, analyzer } = flags;
        let chart = ChartPresenter::new(config.chart.clone());
        let mut session = Session {
            analyzer,
            state: UiState::Idle,
            focus: Focus::Input,
            input: TextBox::new("Your text")
                .with_placeholder("How are you feeling today? Type here and press Enter."),
            counter: CharCounter::default(),
            spinner: Spinner::new("loading").with_title("Analyzing…"),
            result: None,
            rendered: None,
            chart,
            banner: None,
            seq: 0,
            in_flight: None,
            backend: BackendStatus::Unknown,
            keys: SessionKeys::default(),
            config,
        };
        session.set_focus(Focus::Input);
        session.refresh_counter();
        tracing::info!(endpoint = %session.config.endpoint, "session started");

        let health = session.analyzer.health();
        (session, Command::perform(health, Msg::Health))
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Input(msg) => self.edit(msg),
            Msg::Submit => self.submit(),
            Msg::Clear => self.clear(),
            Msg::ToggleFocus => {
                self.toggle_focus();
                Command::none()
            }
            Msg::Quit => {
                tracing::info!("quit requested");
                Command::quit()
            }
            Msg::Analyzed { seq, outcome } => self.finish(seq, outcome),
            Msg::HideBanner => {
                if self.banner.take().is_some() {
                    tracing::debug!("error banner hidden");
                }
                Command::none()
            }
            Msg::RevealResult => {
                if self.state == UiState::ResultShown {
                    self.set_focus(Focus::Results);
                }
                Command::none()
            }
            Msg::Health(status) => {
                tracing::info!(status = %status.label(), "backend health");
                self.backend = status;
                Command::none()
            }
            Msg::Spinner(msg) => self.spinner.update(msg).map(Msg::Spinner),
            Msg::Chart(msg) => self.chart.update(msg).map(Msg::Chart),
            Msg::Resized => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        crate::view::draw(self, frame);
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|event| match event {
            TerminalEvent::Key(key) => Some(Msg::Key(key)),
            TerminalEvent::Mouse(mouse) => Some(Msg::Mouse(mouse)),
            TerminalEvent::Paste(text) => Some(Msg::Input(text_box::Message::Paste(text))),
            TerminalEvent::Resize(..) => Some(Msg::Resized),
            TerminalEvent::Focus(_) => None,
        })];
        subs.extend(
            self.spinner
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Msg::Spinner)),
        );
        subs.extend(
            self.chart
                .subscriptions()
                .into_iter()
                .map(|s| s.map(Msg::Chart)),
        );
        subs
    }
}
