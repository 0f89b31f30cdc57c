use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`].
///
/// Components differ from [`Model`](crate::Model) only in that the parent
/// decides *where* they draw. A parent wraps the component's message type in
/// one of its own variants and lifts returned commands with [`Command::map`]:
///
/// ```rust,ignore
/// Msg::Input(m) => self.input.update(m).map(Msg::Input),
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message and return a [`Command`] in the component's own
    /// message type.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into `area`. Implementations must stay inside the rectangle.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Subscriptions for this component. The parent collects and maps them.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently has keyboard focus.
    fn focused(&self) -> bool {
        false
    }
}
