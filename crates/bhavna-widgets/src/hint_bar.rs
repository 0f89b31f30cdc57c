//! A one-row footer: key hints on the left, a status note on the right.
//!
//! Stateless; rebuilt on every frame from the current bindings.

use crate::key::Binding;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Key hints plus a right-aligned status.
pub struct HintBar<'a> {
    bindings: Vec<&'a Binding>,
    status: Option<Line<'a>>,
}

impl<'a> HintBar<'a> {
    /// Hints for the given bindings, in order.
    pub fn new(bindings: Vec<&'a Binding>) -> Self {
        Self {
            bindings,
            status: None,
        }
    }

    /// Right-aligned status content.
    pub fn status(mut self, status: impl Into<Line<'a>>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The hint line: `label description` pairs separated by a dot. Disabled
    /// bindings are dimmed.
    pub fn hint_line(&self) -> Line<'a> {
        let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::with_capacity(self.bindings.len() * 4);
        for (idx, binding) in self.bindings.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" · ", dim));
            }
            let (key, desc) = if binding.enabled {
                (key_style, Style::default())
            } else {
                (dim, dim)
            };
            spans.push(Span::styled(binding.label.clone(), key));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(binding.description.clone(), desc));
        }
        Line::from(spans)
    }

    /// Render into a single-row area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status_width = self
            .status
            .as_ref()
            .map_or(0, |line| line.width() as u16 + 1);
        let [hints, status] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(status_width)])
                .areas(area);

        frame.render_widget(Paragraph::new(self.hint_line()), hints);
        if let Some(ref line) = self.status {
            frame.render_widget(Paragraph::new(line.clone()).right_aligned(), status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyCombination;
    use crossterm::event::KeyCode;

    #[test]
    fn hint_line_lists_bindings_in_order() {
        let submit = Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze");
        let clear = Binding::new(KeyCombination::ctrl(KeyCode::Char('l')), "ctrl+l", "clear");
        let text = HintBar::new(vec![&submit, &clear]).hint_line().to_string();
        assert_eq!(text, "enter analyze · ctrl+l clear");
    }

    #[test]
    fn disabled_binding_is_dimmed() {
        let mut submit = Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze");
        submit.set_enabled(false);
        let line = HintBar::new(vec![&submit]).hint_line();
        assert_eq!(line.spans[0].style.fg, Some(Color::DarkGray));
    }
}
