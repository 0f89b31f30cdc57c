//! Runtime for the **bhavna** emotion analysis client.
//!
//! The client is written in the [Elm Architecture]: state lives in a
//! [`Model`], every input becomes a message handled by [`Model::update`], and
//! side effects are described as [`Command`]s that the runtime executes.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application trait (init / update / view) |
//! | [`Component`] | Sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | Async work, immediate messages, cancellable scheduled tasks, quit |
//! | [`Subscription`] | Long-lived event source (terminal input, repeating timers) |
//! | [`Program`] | Wires a [`Model`] to a real terminal and drives the event loop |
//! | [`TestProgram`](testing::TestProgram) | Headless harness with a simulated clock |
//!
//! [Elm Architecture]: https://guide.elm-lang.org/architecture/

pub mod command;
pub mod component;
pub mod event;
pub mod model;
pub mod runtime;
pub mod subscription;
pub mod subscriptions;
pub mod testing;

pub use command::{Command, TaskKey};
pub use component::Component;
pub use event::TerminalEvent;
pub use model::Model;
pub use runtime::{OutputTarget, Program, ProgramError, ProgramOptions};
pub use subscription::{Emitter, Subscription, SubscriptionId};
pub use subscriptions::{every, terminal_events};

/// Run a model with custom options until it quits.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
