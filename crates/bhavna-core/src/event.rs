use crossterm::event::{KeyEvent, MouseEvent};

/// Terminal input delivered through the
/// [`terminal_events`](crate::subscriptions::terminal_events) subscription.
///
/// Each variant carries the crossterm payload unchanged, so handlers can match
/// on key codes, modifiers and mouse positions directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event (clicks, wheel, motion when capture is enabled).
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Terminal window gained (`true`) or lost (`false`) focus.
    Focus(bool),
    /// Bracketed paste content.
    Paste(String),
}

impl From<crossterm::event::Event> for TerminalEvent {
    fn from(event: crossterm::event::Event) -> Self {
        use crossterm::event::Event;
        match event {
            Event::Key(k) => TerminalEvent::Key(k),
            Event::Mouse(m) => TerminalEvent::Mouse(m),
            Event::Resize(w, h) => TerminalEvent::Resize(w, h),
            Event::FocusGained => TerminalEvent::Focus(true),
            Event::FocusLost => TerminalEvent::Focus(false),
            Event::Paste(s) => TerminalEvent::Paste(s),
        }
    }
}
