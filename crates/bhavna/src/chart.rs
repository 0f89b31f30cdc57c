//! The score chart: one bar per emotion, a fixed 0–100 % axis, a grow-in
//! animation, and a tooltip for the highlighted bar.
//!
//! [`ChartPresenter`] owns at most one live [`ChartInstance`]. Presenting a
//! new series always destroys the old instance first.

use std::cell::Cell;
use std::time::Duration;

use bhavna_core::{every, Command, Component, Subscription};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Paragraph};
use ratatui::Frame;

/// Chart appearance and behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Axis range. Values are clamped into it.
    pub y_bounds: (u64, u64),
    /// Number of labelled ticks on the axis, ends included.
    pub y_ticks: usize,
    pub tick_suffix: String,
    pub tooltip_suffix: String,
    /// Bar colors, reused from the start when there are more bars.
    pub palette: Vec<Color>,
    /// Length of the grow-in animation. Zero disables it.
    pub animation: Duration,
    /// Animation frame period.
    pub frame_interval: Duration,
    pub show_legend: bool,
    pub max_bar_width: u16,
    pub bar_gap: u16,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            y_bounds: (0, 100),
            y_ticks: 5,
            tick_suffix: "%".to_string(),
            tooltip_suffix: "%".to_string(),
            palette: vec![
                Color::Rgb(255, 206, 86),
                Color::Rgb(54, 162, 235),
                Color::Rgb(255, 99, 132),
                Color::Rgb(201, 203, 207),
                Color::Rgb(153, 102, 255),
            ],
            animation: Duration::from_millis(600),
            frame_interval: Duration::from_millis(16),
            show_legend: false,
            max_bar_width: 9,
            bar_gap: 2,
        }
    }
}

impl ChartConfig {
    /// Color of bar `index`.
    pub fn color_at(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return Color::Gray;
        }
        self.palette[index % self.palette.len()]
    }

    /// Tick values from the bottom of the axis to the top.
    pub fn tick_values(&self) -> Vec<u64> {
        let (lo, hi) = self.y_bounds;
        match self.y_ticks {
            0 => vec![],
            1 => vec![hi],
            n => {
                let steps = (n - 1) as u64;
                (0..=steps).map(|k| lo + (hi - lo) * k / steps).collect()
            }
        }
    }
}

/// One bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub label: String,
    pub percent: u64,
    pub color: Color,
}

/// The bars of one result, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartSeries {
    pub points: Vec<SeriesPoint>,
}

/// A drawn chart. Created by [`ChartPresenter::present`], destroyed by the
/// next `present` or by [`ChartPresenter::clear`].
#[derive(Debug)]
pub struct ChartInstance {
    id: u64,
    series: ChartSeries,
    elapsed: Duration,
}

impl ChartInstance {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn series(&self) -> &ChartSeries {
        &self.series
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BarLayout {
    area: Rect,
    width: u16,
    gap: u16,
    count: usize,
}

impl BarLayout {
    fn bar_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area.contains((column, row).into()) {
            return None;
        }
        let offset = column - self.area.x;
        let stride = self.stride();
        let index = (offset / stride) as usize;
        (offset % stride < self.width && index < self.count).then_some(index)
    }

    fn stride(&self) -> u16 {
        self.width.saturating_add(self.gap).max(1)
    }

    /// Bars that start inside the area.
    fn visible(&self) -> usize {
        let fit = usize::from(self.area.width.div_ceil(self.stride()));
        self.count.min(fit)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    /// Advance the grow-in animation by one frame.
    Frame,
    /// Pointer moved to a terminal cell.
    Hover { column: u16, row: u16 },
    SelectNext,
    SelectPrev,
}

/// Owns the chart and its lifecycle counters.
pub struct ChartPresenter {
    config: ChartConfig,
    current: Option<ChartInstance>,
    created: u64,
    destroyed: u64,
    selected: Option<usize>,
    focus: bool,
    layout: Cell<Option<BarLayout>>,
}

impl ChartPresenter {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            current: None,
            created: 0,
            destroyed: 0,
            selected: None,
            focus: false,
            layout: Cell::new(None),
        }
    }

    /// Replace whatever is shown with a chart of `series`.
    pub fn present(&mut self, series: ChartSeries) {
        self.destroy();
        self.created += 1;
        let id = self.created;
        tracing::debug!(chart = id, bars = series.points.len(), "chart created");
        self.current = Some(ChartInstance {
            id,
            series,
            elapsed: Duration::ZERO,
        });
    }

    /// Destroy the chart, if any, without replacing it.
    pub fn clear(&mut self) {
        self.destroy();
    }

    fn destroy(&mut self) {
        if let Some(old) = self.current.take() {
            self.destroyed += 1;
            tracing::debug!(chart = old.id, "chart destroyed");
        }
        self.selected = None;
        self.layout.set(None);
    }

    pub fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// Instances created and not yet destroyed. Never more than one.
    pub fn live_instances(&self) -> u64 {
        self.created - self.destroyed
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn is_animating(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|chart| chart.elapsed < self.config.animation)
    }

    /// Animation progress in `[0, 1]`, eased out.
    fn progress(&self, chart: &ChartInstance) -> f64 {
        if self.config.animation.is_zero() {
            return 1.0;
        }
        let t = (chart.elapsed.as_secs_f64() / self.config.animation.as_secs_f64()).min(1.0);
        1.0 - (1.0 - t).powi(3)
    }

    /// Bar heights as currently drawn, mid-animation included.
    pub fn displayed_values(&self) -> Vec<u64> {
        let Some(chart) = &self.current else {
            return vec![];
        };
        let progress = self.progress(chart);
        let (lo, hi) = self.config.y_bounds;
        chart
            .series
            .points
            .iter()
            .map(|p| (p.percent.clamp(lo, hi) as f64 * progress).round() as u64)
            .collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// `"<label>: <value>%"` for the highlighted bar.
    pub fn tooltip(&self) -> Option<String> {
        let chart = self.current.as_ref()?;
        let point = chart.series.points.get(self.selected?)?;
        Some(format!(
            "{}: {}{}",
            point.label, point.percent, self.config.tooltip_suffix
        ))
    }

    pub fn focus(&mut self) {
        self.focus = true;
    }

    pub fn blur(&mut self) {
        self.focus = false;
    }

    fn bar_count(&self) -> usize {
        self.current.as_ref().map_or(0, |c| c.series.points.len())
    }

    fn step_selection(&mut self, forward: bool) {
        let count = self.bar_count();
        if count == 0 {
            return;
        }
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    fn axis_lines(&self, height: u16) -> Vec<Line<'static>> {
        // The bottom row of the bar area holds the bar labels.
        let plot = height.saturating_sub(1);
        let mut lines = vec![Line::default(); height as usize];
        if plot == 0 {
            return lines;
        }
        let (lo, hi) = self.config.y_bounds;
        let span = (hi - lo).max(1);
        for value in self.config.tick_values() {
            let from_bottom = ((value - lo) * u64::from(plot - 1) + span / 2) / span;
            let row = (plot - 1) as usize - from_bottom as usize;
            lines[row] = Line::from(format!("{value}{}", self.config.tick_suffix))
                .style(Style::default().fg(Color::DarkGray))
                .right_aligned();
        }
        lines
    }

    fn legend(&self, chart: &ChartInstance) -> Line<'static> {
        let mut spans = Vec::new();
        for point in &chart.series.points {
            spans.push(Span::styled("■ ", Style::default().fg(point.color)));
            spans.push(Span::raw(format!("{}  ", point.label)));
        }
        Line::from(spans)
    }
}

impl Component for ChartPresenter {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Frame => {
                let frame = self.config.frame_interval;
                if let Some(chart) = self.current.as_mut() {
                    chart.elapsed += frame;
                }
            }
            Message::Hover { column, row } => {
                if let Some(layout) = self.layout.get() {
                    self.selected = layout.bar_at(column, row);
                }
            }
            Message::SelectNext => self.step_selection(true),
            Message::SelectPrev => self.step_selection(false),
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let Some(chart) = &self.current else {
            self.layout.set(None);
            return;
        };
        if area.is_empty() {
            return;
        }

        let legend_height = u16::from(self.config.show_legend);
        let [body, legend_area, tooltip_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(legend_height),
            Constraint::Length(1),
        ])
        .areas(area);

        let gutter = self
            .config
            .tick_values()
            .iter()
            .map(|v| format!("{v}{}", self.config.tick_suffix).len() as u16)
            .max()
            .unwrap_or(0);
        let [axis_area, _, bars_area] = Layout::horizontal([
            Constraint::Length(gutter),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(body);

        frame.render_widget(Paragraph::new(self.axis_lines(axis_area.height)), axis_area);

        // Every bar is at least one cell wide, so at most `width` can show.
        let count = chart
            .series
            .points
            .len()
            .clamp(1, usize::from(bars_area.width.max(1)));
        let count = u16::try_from(count).unwrap_or(u16::MAX);
        let gap = self.config.bar_gap;
        let width = (bars_area.width.saturating_sub(gap.saturating_mul(count - 1)) / count)
            .clamp(1, self.config.max_bar_width.max(1));
        let layout = BarLayout {
            area: bars_area,
            width,
            gap,
            count: chart.series.points.len(),
        };
        let visible = layout.visible();
        self.layout.set(Some(layout));

        let values = self.displayed_values();
        let bars: Vec<Bar> = chart
            .series
            .points
            .iter()
            .zip(values)
            .take(visible)
            .enumerate()
            .map(|(i, (point, value))| {
                let mut style = Style::default().fg(point.color);
                if self.selected == Some(i) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Bar::default()
                    .value(value)
                    .label(Line::from(point.label.clone()))
                    .text_value(format!("{value}{}", self.config.tick_suffix))
                    .style(style)
                    .value_style(Style::default().fg(Color::Black).bg(point.color))
            })
            .collect();

        let widget = BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(width)
            .bar_gap(gap)
            .max(self.config.y_bounds.1);
        frame.render_widget(widget, bars_area);

        if self.config.show_legend {
            frame.render_widget(Paragraph::new(self.legend(chart)), legend_area);
        }

        let tooltip = match self.tooltip() {
            Some(text) => Line::from(Span::styled(
                text,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            None if self.focus => Line::from(Span::styled(
                "←/→ to inspect a bar",
                Style::default().fg(Color::DarkGray),
            )),
            None => Line::default(),
        };
        frame.render_widget(Paragraph::new(tooltip), tooltip_area);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.is_animating() {
            vec![every(self.config.frame_interval, "chart-animation").map(|_| Message::Frame)]
        } else {
            vec![]
        }
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
