//! Screen layout for [`Session`].

use bhavna_core::Component;
use bhavna_widgets::chrome::{banner_block, banner_style, focus_block};
use bhavna_widgets::hint_bar::HintBar;
use bhavna_widgets::key::KeyMap;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::analysis::BackendStatus;
use crate::input_guard::CharCounter;
use crate::renderer::RenderedView;
use crate::session::{Focus, Session, UiState};

const INPUT_HEIGHT: u16 = 7;
const BANNER_HEIGHT: u16 = 3;
const SUMMARY_WIDTH: u16 = 26;

/// Counter shown in the input border; yellow from the warning threshold on.
pub(crate) fn counter_line(counter: &CharCounter) -> Line<'static> {
    let style = if counter.warning {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!(" {} ", counter.label()), style))
}

pub(crate) fn draw(session: &Session, frame: &mut Frame) {
    let banner_height = if session.banner.is_some() {
        BANNER_HEIGHT
    } else {
        0
    };
    let [header, input, banner, status, results, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(banner_height),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, header);
    session.input.view(frame, input);
    if let Some(message) = &session.banner {
        let paragraph = Paragraph::new(message.as_str())
            .style(banner_style())
            .wrap(Wrap { trim: true })
            .block(banner_block());
        frame.render_widget(paragraph, banner);
    }
    session.spinner.view(frame, status);
    draw_results(session, frame, results);

    HintBar::new(session.keys.hints())
        .status(backend_line(&session.backend))
        .render(frame, footer);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " BHAVNA ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" emotion analysis", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_results(session: &Session, frame: &mut Frame, area: Rect) {
    let block = focus_block("Result", session.focus == Focus::Results);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.is_empty() {
        return;
    }

    let view = match (&session.rendered, session.state) {
        (Some(view), UiState::ResultShown) => view,
        (_, state) => {
            let hint = match state {
                UiState::Loading => "Waiting for the analysis service…",
                UiState::ErrorShown => "No result. Fix the problem above and try again.",
                _ => "Results will appear here.",
            };
            let placeholder =
                Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                    .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
            return;
        }
    };

    let [summary, _, chart] = Layout::horizontal([
        Constraint::Length(SUMMARY_WIDTH.min(inner.width)),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);
    draw_summary(view, frame, summary);
    session.chart.view(frame, chart);
}

fn draw_summary(view: &RenderedView, frame: &mut Frame, area: Rect) {
    let [headline, _, caption, gauge] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let line = Line::from(vec![
        Span::raw(view.glyph),
        Span::raw("  "),
        Span::styled(view.label.clone(), Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(line), headline);
    frame.render_widget(
        Paragraph::new(Span::styled("Confidence", Style::default().fg(Color::DarkGray))),
        caption,
    );
    let ratio = (view.percent as f64 / 100.0).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .ratio(ratio)
            .label(format!("{}%", view.percent))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray)),
        gauge,
    );
}

fn backend_line(status: &BackendStatus) -> Line<'static> {
    let color = match status {
        BackendStatus::Online { .. } => Color::Green,
        BackendStatus::Offline => Color::Red,
        BackendStatus::Unknown => Color::DarkGray,
    };
    Line::from(Span::styled(status.label(), Style::default().fg(color)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_line_text() {
        let line = counter_line(&CharCounter::measure("hello"));
        assert_eq!(line.to_string(), " 5 / 1000 ");
    }

    #[test]
    fn counter_turns_yellow_at_warning() {
        let calm = counter_line(&CharCounter::measure("abc"));
        let warn = counter_line(&CharCounter::measure(&"a".repeat(950)));
        assert_eq!(calm.spans[0].style.fg, Some(Color::DarkGray));
        assert_eq!(warn.spans[0].style.fg, Some(Color::Yellow));
    }
}
