use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// The top-level application trait, following the [Elm Architecture].
///
/// The runtime drives an **init -> update -> view** cycle:
///
/// 1. [`init`](Model::init) builds the initial state and may return a
///    [`Command`] for startup work (e.g. probing a backend).
/// 2. [`view`](Model::view) draws the current state into a [`ratatui::Frame`].
/// 3. Terminal input, timers and finished async work arrive as messages.
/// 4. [`update`](Model::update) applies each message and returns a
///    [`Command`] describing follow-up side effects.
///
/// All state changes happen inside `update`; `view` only reads.
///
/// [Elm Architecture]: https://guide.elm-lang.org/architecture/
pub trait Model: Sized + Send + 'static {
    /// Every event that can affect the application state.
    type Message: Send + 'static;

    /// Startup data handed to [`Model::init`]. Use `()` when none is needed.
    type Flags: Send + 'static;

    /// Create the initial model state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process a message, mutate state, and return a command for side effects.
    ///
    /// After `update` returns, the runtime re-renders and reconciles
    /// [`subscriptions`](Model::subscriptions).
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the current state to a ratatui [`Frame`].
    fn view(&self, frame: &mut Frame);

    /// Declare the subscriptions that should be active for the current state.
    ///
    /// Called after every update. The runtime starts subscriptions whose id is
    /// new and stops those that are no longer returned.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}
