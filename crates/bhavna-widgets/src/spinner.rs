//! Animated loading indicator shown while a request is in flight.

use bhavna_core::command::Command;
use bhavna_core::component::Component;
use bhavna_core::subscription::Subscription;
use bhavna_core::subscriptions::every;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::time::Duration;

/// Braille dot frames.
pub const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Messages for the spinner component.
#[derive(Debug, Clone)]
pub enum Message {
    /// Advance to the next frame.
    Tick,
}

/// A spinner that animates only while started.
pub struct Spinner {
    frame_index: usize,
    title: String,
    style: Style,
    interval: Duration,
    spinning: bool,
    id: &'static str,
}

impl Spinner {
    /// Create a stopped spinner; `id` names its frame timer.
    pub fn new(id: &'static str) -> Self {
        Self {
            frame_index: 0,
            title: String::new(),
            style: Style::default().fg(Color::Yellow),
            interval: Duration::from_millis(80),
            spinning: false,
            id,
        }
    }

    /// Text displayed after the spinner frame.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Start animating from the first frame.
    pub fn start(&mut self) {
        self.spinning = true;
        self.frame_index = 0;
    }

    /// Stop animating. A stopped spinner renders nothing.
    pub fn stop(&mut self) {
        self.spinning = false;
    }

    /// Whether the spinner is animating.
    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// The frame currently displayed.
    pub fn frame(&self) -> &'static str {
        DOTS[self.frame_index]
    }
}

impl Component for Spinner {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Tick => {
                if self.spinning {
                    self.frame_index = (self.frame_index + 1) % DOTS.len();
                }
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if !self.spinning || area.is_empty() {
            return;
        }
        let line = Line::from(vec![
            Span::styled(self.frame(), self.style),
            Span::raw(" "),
            Span::raw(self.title.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.spinning {
            vec![every(self.interval, self.id).map(|_| Message::Tick)]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_advance_while_spinning() {
        let mut spinner = Spinner::new("test");
        spinner.update(Message::Tick);
        assert_eq!(spinner.frame(), DOTS[0]);

        spinner.start();
        spinner.update(Message::Tick);
        spinner.update(Message::Tick);
        assert_eq!(spinner.frame(), DOTS[2]);
    }

    #[test]
    fn frames_wrap_around() {
        let mut spinner = Spinner::new("test");
        spinner.start();
        for _ in 0..DOTS.len() {
            spinner.update(Message::Tick);
        }
        assert_eq!(spinner.frame(), DOTS[0]);
    }

    #[test]
    fn subscription_follows_spinning_state() {
        let mut spinner = Spinner::new("test");
        assert!(spinner.subscriptions().is_empty());
        spinner.start();
        assert_eq!(spinner.subscriptions().len(), 1);
        spinner.stop();
        assert!(spinner.subscriptions().is_empty());
    }

    #[test]
    fn restart_resets_frame() {
        let mut spinner = Spinner::new("test");
        spinner.start();
        spinner.update(Message::Tick);
        spinner.stop();
        spinner.start();
        assert_eq!(spinner.frame(), DOTS[0]);
    }
}
