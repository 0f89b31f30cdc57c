use crate::command::{Action, Command, CommandInner, TaskKey};
use crate::model::Model;
use crate::subscription::SubscriptionSet;
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Once;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

/// Stream the UI is drawn on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    /// Use when stdout is redirected.
    Stderr,
}

impl OutputTarget {
    fn writer(self) -> Box<dyn Write + Send> {
        match self {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Errors from setting up, drawing to, or restoring the terminal.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal options for a [`Program`].
///
/// Override only what you need with struct update syntax:
///
/// ```rust,ignore
/// let opts = ProgramOptions {
///     mouse_capture: true,
///     title: Some("bhavna".into()),
///     ..ProgramOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Redraw rate cap (default 60, clamped to 1..=120).
    pub fps: u32,
    /// Draw on the alternate screen (default: true).
    pub alt_screen: bool,
    /// Report mouse motion and clicks (default: false).
    pub mouse_capture: bool,
    /// Deliver pastes as a single event (default: true).
    pub bracketed_paste: bool,
    pub title: Option<String>,
    /// Restore the terminal before a panic message prints (default: true).
    pub catch_panics: bool,
    /// Stop on a Ctrl+C signal (default: true).
    pub handle_signals: bool,
    pub output: OutputTarget,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            alt_screen: true,
            mouse_capture: false,
            bracketed_paste: true,
            title: None,
            catch_panics: true,
            handle_signals: true,
            output: OutputTarget::Stdout,
        }
    }
}

/// Keyed delayed messages. At most one pending task per key.
struct Scheduler<Msg> {
    tx: mpsc::UnboundedSender<Msg>,
    pending: HashMap<TaskKey, AbortHandle>,
}

impl<Msg: Send + 'static> Scheduler<Msg> {
    fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            tx,
            pending: HashMap::new(),
        }
    }

    fn schedule(&mut self, key: TaskKey, delay: Duration, msg: Msg) {
        let tx = self.tx.clone();
        // The deadline is fixed now, not when the task first runs.
        let timer = tokio::time::sleep(delay);
        let task = tokio::spawn(async move {
            timer.await;
            let _ = tx.send(msg);
        });
        if let Some(replaced) = self.pending.insert(key, task.abort_handle()) {
            replaced.abort();
            tracing::trace!(task = key.name(), "rescheduled");
        }
    }

    fn cancel(&mut self, key: TaskKey) {
        if let Some(task) = self.pending.remove(&key) {
            task.abort();
            tracing::trace!(task = key.name(), "cancelled");
        }
    }

    fn cancel_all(&mut self) {
        for (_, task) in self.pending.drain() {
            task.abort();
        }
    }
}

/// Raw mode and screen settings held for the life of a [`Program`].
/// Dropping it puts the terminal back.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Box<dyn Write + Send>>>,
    alt_screen: bool,
    output: OutputTarget,
    restored: bool,
}

impl TerminalGuard {
    fn enter(options: &ProgramOptions) -> Result<Self, ProgramError> {
        if options.catch_panics {
            install_panic_hook(options.alt_screen, options.output);
        }

        enable_raw_mode()?;
        let mut out = options.output.writer();
        if options.alt_screen {
            execute!(out, EnterAlternateScreen)?;
        }
        if options.bracketed_paste {
            execute!(out, EnableBracketedPaste)?;
        }
        if options.mouse_capture {
            execute!(out, EnableMouseCapture)?;
        }
        if let Some(title) = &options.title {
            execute!(out, SetTitle(title))?;
        }
        execute!(out, cursor::Hide)?;

        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(out))?,
            alt_screen: options.alt_screen,
            output: options.output,
            restored: false,
        })
    }

    fn leave(&mut self) -> io::Result<()> {
        self.restored = true;
        restore(self.alt_screen, self.output)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = restore(self.alt_screen, self.output);
        }
    }
}

fn install_panic_hook(alt_screen: bool, output: OutputTarget) {
    // One hook per process; chaining another per program would restore twice.
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore(alt_screen, output);
            previous(info);
        }));
    });
}

/// Undo every terminal mode [`TerminalGuard::enter`] may have set. Each step
/// runs even if an earlier one fails; the raw-mode result is reported.
fn restore(alt_screen: bool, output: OutputTarget) -> io::Result<()> {
    let raw = disable_raw_mode();
    let mut out = output.writer();
    let _ = execute!(out, DisableBracketedPaste);
    let _ = execute!(out, DisableMouseCapture);
    let _ = execute!(out, cursor::Show);
    if alt_screen {
        let _ = execute!(out, LeaveAlternateScreen);
    }
    raw
}

/// Drives a [`Model`] on a real terminal until it returns
/// [`Command::quit()`]. Owns the message channel, running subscriptions and
/// scheduled tasks.
///
/// ```rust,ignore
/// let session = Program::<Session>::with_options(flags, options)?.run().await?;
/// ```
pub struct Program<M: Model> {
    model: M,
    screen: TerminalGuard,
    rx: mpsc::UnboundedReceiver<M::Message>,
    tx: mpsc::UnboundedSender<M::Message>,
    subscriptions: SubscriptionSet<M::Message>,
    scheduler: Scheduler<M::Message>,
    options: ProgramOptions,
    dirty: bool,
    quitting: bool,
}

impl<M: Model> Program<M> {
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Set up the terminal, run [`Model::init`], and start the initial
    /// subscriptions. Must be called inside a tokio runtime.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        let screen = TerminalGuard::enter(&options)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (model, init) = M::init(flags);

        let mut program = Self {
            model,
            screen,
            subscriptions: SubscriptionSet::new(tx.clone()),
            scheduler: Scheduler::new(tx.clone()),
            rx,
            tx,
            options,
            dirty: true,
            quitting: false,
        };
        tracing::debug!("program initialized");

        program.execute(init);
        program.subscriptions.sync(program.model.subscriptions());
        Ok(program)
    }

    /// Run until quit and hand back the final model.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let outcome = self.event_loop().await;

        tracing::debug!("shutting down");
        self.subscriptions.stop_all();
        self.scheduler.cancel_all();
        self.screen.leave()?;

        outcome.map(|()| self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        self.draw()?;

        let period = Duration::from_secs_f64(1.0 / f64::from(self.options.fps.clamp(1, 120)));
        let mut frames = tokio::time::interval(period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let signals = self.options.handle_signals;

        while !self.quitting {
            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c(), if signals => {
                    tracing::info!("interrupted by ctrl+c signal");
                    break;
                }

                Some(msg) = self.rx.recv() => {
                    self.handle(msg);
                    // Take whatever else is already queued, for at most 100µs,
                    // before giving the frame timer a turn.
                    let budget = Instant::now() + Duration::from_micros(100);
                    while !self.quitting && Instant::now() < budget {
                        let Ok(msg) = self.rx.try_recv() else { break };
                        self.handle(msg);
                    }
                }

                _ = frames.tick(), if self.dirty => {
                    self.draw()?;
                    self.dirty = false;
                }
            }
        }
        Ok(())
    }

    fn handle(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute(cmd);
        self.subscriptions.sync(self.model.subscriptions());
        self.dirty = true;
    }

    fn execute(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => {
                let _ = self.tx.send(msg);
            }
            CommandInner::Action(Action::Quit) => self.quitting = true,
            CommandInner::Future(fut) => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(fut.await);
                });
            }
            CommandInner::Batch(cmds) => cmds.into_iter().for_each(|cmd| self.execute(cmd)),
            CommandInner::Schedule { key, delay, msg } => self.scheduler.schedule(key, delay, msg),
            CommandInner::Cancel(key) => self.scheduler.cancel(key),
        }
    }

    fn draw(&mut self) -> Result<(), ProgramError> {
        let model = &self.model;
        self.screen.terminal.draw(|frame| model.view(frame))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDE: TaskKey = TaskKey::new("hide");

    #[tokio::test(start_paused = true)]
    async fn scheduled_message_arrives_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        scheduler.schedule(HIDE, Duration::from_secs(5), "hide");

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some("hide"));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_drops_the_earlier_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        scheduler.schedule(HIDE, Duration::from_secs(5), "first");
        tokio::time::advance(Duration::from_secs(3)).await;
        scheduler.schedule(HIDE, Duration::from_secs(5), "second");

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, Some("second"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_message_never_arrives() {
        let (tx, mut rx) = mpsc::unbounded_channel::<&str>();
        let mut scheduler = Scheduler::new(tx);
        scheduler.schedule(HIDE, Duration::from_secs(5), "hide");
        scheduler.cancel(HIDE);
        scheduler.cancel(TaskKey::new("unknown"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn default_options() {
        let opts = ProgramOptions::default();
        assert_eq!(opts.fps, 60);
        assert!(opts.alt_screen && opts.bracketed_paste && opts.catch_panics);
        assert!(!opts.mouse_capture);
        assert_eq!(opts.output, OutputTarget::Stdout);
    }
}
