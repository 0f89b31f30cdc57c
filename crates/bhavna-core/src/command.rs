use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A side effect returned from [`Model::update`](crate::Model::update) or
/// [`Model::init`](crate::Model::init).
///
/// Commands describe work the runtime performs on the model's behalf: async
/// futures whose output comes back as a message, immediate messages, keyed
/// deferred messages that can be cancelled before they fire, and quitting.
///
/// # Examples
///
/// ```rust,ignore
/// // Run an async request and map its result to a message:
/// let cmd = Command::perform(analyzer.analyze(text), Msg::Analyzed);
///
/// // Deliver a message later, unless cancelled first:
/// const HIDE: TaskKey = TaskKey::new("hide-banner");
/// let cmd = Command::schedule(HIDE, Duration::from_secs(5), Msg::HideBanner);
/// let cancel = Command::<Msg>::cancel(HIDE);
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Action(Action<Msg>),
    Future(BoxFuture<'static, Msg>),
    Batch(Vec<Command<Msg>>),
    /// Deliver `msg` after `delay`. A later schedule with the same key
    /// replaces this one.
    Schedule {
        key: TaskKey,
        delay: Duration,
        msg: Msg,
    },
    /// Abort a pending scheduled task. Unknown keys are ignored.
    Cancel(TaskKey),
}

/// Actions handled synchronously by the runtime, without spawning a task.
pub enum Action<Msg> {
    /// Send a message immediately.
    Message(Msg),
    /// Quit the program.
    Quit,
}

/// Name of a scheduled task.
///
/// At most one task per key is pending at a time, so a key doubles as the
/// handle used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey(&'static str);

impl TaskKey {
    /// Create a key from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The key's name, for logging.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Run an async future, map the result to a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Command {
            inner: CommandInner::Future(Box::pin(async move { map(future.await) })),
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Action(Action::Message(msg)),
        }
    }

    /// Quit the program.
    pub fn quit() -> Self {
        Command {
            inner: CommandInner::Action(Action::Quit),
        }
    }

    /// Deliver `msg` once `delay` has elapsed.
    ///
    /// Scheduling a key that is already pending replaces the earlier task, so
    /// its message is never delivered.
    pub fn schedule(key: TaskKey, delay: Duration, msg: Msg) -> Self {
        Command {
            inner: CommandInner::Schedule { key, delay, msg },
        }
    }

    /// Cancel the pending task scheduled under `key`, if any.
    pub fn cancel(key: TaskKey) -> Self {
        Command {
            inner: CommandInner::Cancel(key),
        }
    }

    /// Run multiple commands concurrently.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.pop().unwrap_or_else(Command::none),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        let inner = match self.inner {
            CommandInner::None => CommandInner::None,
            CommandInner::Action(Action::Message(msg)) => {
                CommandInner::Action(Action::Message(f(msg)))
            }
            CommandInner::Action(Action::Quit) => CommandInner::Action(Action::Quit),
            CommandInner::Future(fut) => {
                CommandInner::Future(Box::pin(async move { f(fut.await) }))
            }
            CommandInner::Batch(cmds) => CommandInner::Batch(
                cmds.into_iter()
                    .map(|cmd| cmd.map_with(f.clone()))
                    .collect(),
            ),
            CommandInner::Schedule { key, delay, msg } => CommandInner::Schedule {
                key,
                delay,
                msg: f(msg),
            },
            CommandInner::Cancel(key) => CommandInner::Cancel(key),
        };
        Command { inner }
    }

    // --- Inspection methods (useful for testing) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Returns `true` if this command (or any command in a batch) quits.
    pub fn is_quit(&self) -> bool {
        match &self.inner {
            CommandInner::Action(Action::Quit) => true,
            CommandInner::Batch(cmds) => cmds.iter().any(Command::is_quit),
            _ => false,
        }
    }

    /// If this command is an immediate message action, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Action(Action::Message(msg)) => Some(msg),
            _ => None,
        }
    }

    /// If this command is a batch, return the inner commands.
    pub fn into_batch(self) -> Option<Vec<Command<Msg>>> {
        match self.inner {
            CommandInner::Batch(cmds) => Some(cmds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: TaskKey = TaskKey::new("banner");

    #[test]
    fn command_none_is_none() {
        let cmd: Command<()> = Command::none();
        assert!(cmd.is_none());
    }

    #[test]
    fn command_message_creates_action() {
        let cmd: Command<i32> = Command::message(42);
        assert_eq!(cmd.into_message(), Some(42));
    }

    #[test]
    fn command_quit_creates_quit() {
        let cmd: Command<()> = Command::quit();
        assert!(cmd.is_quit());
    }

    #[test]
    fn batch_drops_noops_and_unwraps_single() {
        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::message(1)]);
        assert_eq!(cmd.into_message(), Some(1));

        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::none()]);
        assert!(cmd.is_none());
    }

    #[test]
    fn batch_keeps_multiple() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(1), Command::quit()]);
        assert!(cmd.is_quit());
        assert_eq!(cmd.into_batch().map(|cmds| cmds.len()), Some(2));
    }

    #[test]
    fn map_rewrites_scheduled_message() {
        let cmd: Command<i32> = Command::schedule(BANNER, Duration::from_secs(5), 7);
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        match mapped.inner {
            CommandInner::Schedule { key, delay, msg } => {
                assert_eq!(key, BANNER);
                assert_eq!(delay, Duration::from_secs(5));
                assert_eq!(msg, "7");
            }
            _ => panic!("Expected Schedule"),
        }
    }

    #[test]
    fn map_preserves_cancel_and_quit() {
        let cancel: Command<String> = Command::<i32>::cancel(BANNER).map(|n| n.to_string());
        assert!(matches!(cancel.inner, CommandInner::Cancel(key) if key == BANNER));

        let quit: Command<String> = Command::<i32>::quit().map(|n| n.to_string());
        assert!(quit.is_quit());
    }

    #[tokio::test]
    async fn map_wraps_future_output() {
        let cmd: Command<i32> = Command::perform(async { 20 }, |n: i32| n + 1);
        let mapped: Command<String> = cmd.map(|n| format!("got {n}"));
        match mapped.inner {
            CommandInner::Future(fut) => assert_eq!(fut.await, "got 21"),
            _ => panic!("Expected Future"),
        }
    }

    #[test]
    fn task_key_name() {
        assert_eq!(BANNER.name(), "banner");
    }
}
