use crate::command::{Action, Command, CommandInner, TaskKey};
use crate::model::Model;
use futures::future::BoxFuture;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::time::Duration;

/// A headless harness that drives a [`Model`] without a terminal.
///
/// * Immediate messages ([`Command::message`]) are queued and flushed with
///   [`drain_messages`](TestProgram::drain_messages).
/// * Async work ([`Command::perform`]) is parked until
///   [`settle`](TestProgram::settle) awaits it and feeds the results back.
/// * Scheduled tasks ([`Command::schedule`]) run on a simulated clock moved
///   forward with [`advance`](TestProgram::advance); cancelling and
///   rescheduling behave as in the real runtime.
///
/// ```rust,ignore
/// let mut prog = TestProgram::<Session>::new(flags);
/// prog.send(Msg::Submit);
/// prog.settle().await;                       // the fake analyzer answers
/// prog.advance(Duration::from_secs(5));      // banner auto-hide fires
/// assert!(prog.render_string(80, 24).contains("Happy"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    pending_futures: Vec<BoxFuture<'static, M::Message>>,
    scheduled: Vec<Scheduled<M::Message>>,
    clock: Duration,
    quit_requested: bool,
}

struct Scheduled<Msg> {
    key: TaskKey,
    due: Duration,
    msg: Msg,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            pending_futures: Vec::new(),
            scheduled: Vec::new(),
            clock: Duration::ZERO,
            quit_requested: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message through [`Model::update`] and flush any immediate
    /// messages it produces.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
        self.drain_messages();
    }

    /// Process queued immediate messages until none are left.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Await every parked future and deliver its message, repeating until
    /// updates stop producing new async work.
    pub async fn settle(&mut self) {
        while !self.pending_futures.is_empty() {
            let futures: Vec<_> = self.pending_futures.drain(..).collect();
            for msg in futures::future::join_all(futures).await {
                let cmd = self.model.update(msg);
                self.collect(cmd);
                self.drain_messages();
            }
        }
    }

    /// Number of futures waiting for [`settle`](TestProgram::settle).
    pub fn pending_futures(&self) -> usize {
        self.pending_futures.len()
    }

    /// Move the simulated clock forward, firing due scheduled tasks in
    /// deadline order.
    pub fn advance(&mut self, by: Duration) {
        let target = self.clock + by;
        while let Some(idx) = self.next_due(target) {
            let task = self.scheduled.remove(idx);
            self.clock = task.due;
            let cmd = self.model.update(task.msg);
            self.collect(cmd);
            self.drain_messages();
        }
        self.clock = target;
    }

    /// Whether a task is pending under `key`.
    pub fn is_scheduled(&self, key: TaskKey) -> bool {
        self.scheduled.iter().any(|task| task.key == key)
    }

    /// Simulated time elapsed since the program was created.
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    /// Whether any update returned [`Command::quit`].
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test backend never fails");
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .expect("test backend never fails");
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as a plain string,
    /// one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        let buf = self.render(width, height);
        let area = Rect::new(0, 0, width, height);
        let mut output = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                output.push_str(buf[(x, y)].symbol());
            }
            if y < area.bottom() - 1 {
                output.push('\n');
            }
        }
        output
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.scheduled
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= target)
            .min_by_key(|(idx, task)| (task.due, *idx))
            .map(|(idx, _)| idx)
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => self.pending_messages.push(msg),
            CommandInner::Action(Action::Quit) => self.quit_requested = true,
            CommandInner::Future(fut) => self.pending_futures.push(fut),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
            CommandInner::Schedule { key, delay, msg } => {
                self.scheduled.retain(|task| task.key != key);
                self.scheduled.push(Scheduled {
                    key,
                    due: self.clock + delay,
                    msg,
                });
            }
            CommandInner::Cancel(key) => self.scheduled.retain(|task| task.key != key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    const FLASH: TaskKey = TaskKey::new("flash");

    /// Shows a flash message that disappears after two seconds.
    struct Flash {
        text: Option<String>,
        fetched: Vec<u32>,
    }

    #[derive(Debug)]
    enum FlashMsg {
        Show(&'static str),
        Hide,
        Dismiss,
        Fetch(u32),
        Fetched(u32),
        Quit,
    }

    impl Model for Flash {
        type Message = FlashMsg;
        type Flags = ();

        fn init(_: ()) -> (Self, Command<FlashMsg>) {
            (
                Flash {
                    text: None,
                    fetched: Vec::new(),
                },
                Command::none(),
            )
        }

        fn update(&mut self, msg: FlashMsg) -> Command<FlashMsg> {
            match msg {
                FlashMsg::Show(text) => {
                    self.text = Some(text.to_string());
                    Command::schedule(FLASH, Duration::from_secs(2), FlashMsg::Hide)
                }
                FlashMsg::Hide => {
                    self.text = None;
                    Command::none()
                }
                FlashMsg::Dismiss => Command::cancel(FLASH),
                FlashMsg::Fetch(n) => Command::perform(async move { n * 10 }, FlashMsg::Fetched),
                FlashMsg::Fetched(n) => {
                    self.fetched.push(n);
                    if n < 100 {
                        Command::message(FlashMsg::Fetch(n))
                    } else {
                        Command::none()
                    }
                }
                FlashMsg::Quit => Command::quit(),
            }
        }

        fn view(&self, frame: &mut ratatui::Frame) {
            let text = self.text.as_deref().unwrap_or("-");
            frame.render_widget(Paragraph::new(text), frame.area());
        }
    }

    #[test]
    fn scheduled_task_fires_after_delay() {
        let mut prog = TestProgram::<Flash>::new(());
        prog.send(FlashMsg::Show("saved"));
        prog.advance(Duration::from_millis(1999));
        assert_eq!(prog.model().text.as_deref(), Some("saved"));
        prog.advance(Duration::from_millis(1));
        assert_eq!(prog.model().text, None);
        assert!(!prog.is_scheduled(FLASH));
    }

    #[test]
    fn rescheduling_replaces_pending_task() {
        let mut prog = TestProgram::<Flash>::new(());
        prog.send(FlashMsg::Show("first"));
        prog.advance(Duration::from_secs(1));
        prog.send(FlashMsg::Show("second"));
        prog.advance(Duration::from_millis(1500));
        assert_eq!(prog.model().text.as_deref(), Some("second"));
        prog.advance(Duration::from_millis(500));
        assert_eq!(prog.model().text, None);
        assert_eq!(prog.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut prog = TestProgram::<Flash>::new(());
        prog.send(FlashMsg::Show("kept"));
        prog.send(FlashMsg::Dismiss);
        assert!(!prog.is_scheduled(FLASH));
        prog.advance(Duration::from_secs(10));
        assert_eq!(prog.model().text.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn settle_runs_chained_futures() {
        let mut prog = TestProgram::<Flash>::new(());
        prog.send(FlashMsg::Fetch(1));
        assert_eq!(prog.pending_futures(), 1);
        prog.settle().await;
        assert_eq!(prog.model().fetched, vec![10, 100]);
        assert_eq!(prog.pending_futures(), 0);
    }

    #[test]
    fn quit_is_recorded() {
        let mut prog = TestProgram::<Flash>::new(());
        assert!(!prog.quit_requested());
        prog.send(FlashMsg::Quit);
        assert!(prog.quit_requested());
    }

    #[test]
    fn render_string_reflects_state() {
        let mut prog = TestProgram::<Flash>::new(());
        assert!(prog.render_string(20, 1).starts_with('-'));
        prog.send(FlashMsg::Show("hello"));
        assert!(prog.render_string(20, 1).starts_with("hello"));
    }
}
