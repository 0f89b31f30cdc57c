//! Multi-line text entry with a cursor, vertical scrolling, and an optional
//! status line in the bottom border (used for the character counter).
//!
//! The box only edits text. Whether `Enter` submits or inserts a newline is
//! the parent's decision: it sends [`Message::Newline`] for the latter.

use bhavna_core::command::Command;
use bhavna_core::component::Component;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use crate::chrome::focus_block;

/// Messages for the text box.
#[derive(Debug, Clone)]
pub enum Message {
    /// An editing key (characters, backspace, delete, arrows, home/end).
    KeyPress(KeyEvent),
    /// Insert a line break at the cursor.
    Newline,
    /// Insert pasted text at the cursor.
    Paste(String),
    /// Remove all text.
    Clear,
}

/// A bordered multi-line text editor.
pub struct TextBox {
    text: Vec<char>,
    cursor: usize,
    focus: bool,
    title: String,
    placeholder: String,
    status: Option<Line<'static>>,
}

impl TextBox {
    /// An empty box with the given border title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            text: Vec::new(),
            cursor: 0,
            focus: false,
            title: title.into(),
            placeholder: String::new(),
            status: None,
        }
    }

    /// Dimmed text shown while the box is empty.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The full content.
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Content length in characters.
    pub fn char_count(&self) -> usize {
        self.text.len()
    }

    /// Cursor position as a character offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Status shown right-aligned in the bottom border.
    pub fn set_status(&mut self, status: Option<Line<'static>>) {
        self.status = status;
    }

    /// Give the box keyboard focus.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += 1;
    }

    fn insert_str(&mut self, s: &str) {
        for ch in s.chars().filter(|c| *c != '\r') {
            self.insert(ch);
        }
    }

    /// Start offset of the line containing `pos`.
    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |idx| idx + 1)
    }

    /// End offset (exclusive, at the newline) of the line containing `pos`.
    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .iter()
            .position(|c| *c == '\n')
            .map_or(self.text.len(), |idx| pos + idx)
    }

    fn move_vertical(&mut self, down: bool) {
        let start = self.line_start(self.cursor);
        let column = self.cursor - start;
        if down {
            let end = self.line_end(self.cursor);
            if end == self.text.len() {
                return;
            }
            let next_start = end + 1;
            let next_end = self.line_end(next_start);
            self.cursor = (next_start + column).min(next_end);
        } else {
            if start == 0 {
                return;
            }
            let prev_start = self.line_start(start - 1);
            self.cursor = (prev_start + column).min(start - 1);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(ch) if !ctrl => self.insert(ch),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.text.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.text.len() => {
                self.text.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.text.len()),
            KeyCode::Home => self.cursor = self.line_start(self.cursor),
            KeyCode::End => self.cursor = self.line_end(self.cursor),
            KeyCode::Up => self.move_vertical(false),
            KeyCode::Down => self.move_vertical(true),
            _ => {}
        }
    }

    /// Lines of the content with the cursor's (row, column) in characters.
    fn layout(&self) -> (Vec<&[char]>, usize, usize) {
        let lines: Vec<&[char]> = self.text.split(|c| *c == '\n').collect();
        let row = self.text[..self.cursor].iter().filter(|c| **c == '\n').count();
        let col = self.cursor - self.line_start(self.cursor);
        (lines, row, col)
    }
}

impl Default for TextBox {
    fn default() -> Self {
        Self::new("")
    }
}

/// Characters of `line` to skip so that column `col` fits in `width` cells.
fn horizontal_offset(line: &[char], col: usize, width: usize) -> usize {
    let mut used = 1; // the cursor cell itself
    let mut start = col.min(line.len());
    while start > 0 {
        let w = line[start - 1].width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start -= 1;
    }
    start
}

impl Component for TextBox {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::Newline => self.insert('\n'),
            Message::Paste(text) => self.insert_str(&text),
            Message::Clear => {
                self.text.clear();
                self.cursor = 0;
            }
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut block = focus_block(&self.title, self.focus);
        if let Some(ref status) = self.status {
            block = block.title_bottom(status.clone().right_aligned());
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.is_empty() {
            return;
        }

        if self.text.is_empty() && !self.placeholder.is_empty() {
            let mut spans = Vec::new();
            if self.focus {
                spans.push(Span::styled(" ", cursor_style()));
            }
            spans.push(Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(Paragraph::new(Line::from(spans)), inner);
            return;
        }

        let (lines, cursor_row, cursor_col) = self.layout();
        let height = inner.height as usize;
        let top = (cursor_row + 1).saturating_sub(height);

        let rendered: Vec<Line> = lines
            .iter()
            .enumerate()
            .skip(top)
            .take(height)
            .map(|(row, chars)| {
                if row != cursor_row || !self.focus {
                    return Line::from(chars.iter().collect::<String>());
                }
                let skip = horizontal_offset(chars, cursor_col, inner.width as usize);
                let before: String = chars[skip..cursor_col].iter().collect();
                let at = chars.get(cursor_col).map_or(" ".to_string(), |c| c.to_string());
                let after: String = chars.iter().skip(cursor_col + 1).collect();
                Line::from(vec![
                    Span::raw(before),
                    Span::styled(at, cursor_style()),
                    Span::raw(after),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(rendered), inner);
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

fn cursor_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
