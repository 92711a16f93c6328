use std::collections::VecDeque;
use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};
use tracing::warn;

/// Source of user input the controller asks for while handling an action.
pub trait Prompter {
    /// Asks for a line of text prefilled with `default`. `None` when dismissed.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;

    fn confirm(&mut self, message: &str) -> bool;
}

/// Modal popup drawn over the last rendered board frame.
pub struct TerminalPrompter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    background: Buffer,
}

impl<'a, B: Backend> TerminalPrompter<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>, background: Buffer) -> Self {
        Self {
            terminal,
            background,
        }
    }

    fn draw(&mut self, title: &str, body: Line<'_>) -> io::Result<()> {
        let background = &self.background;
        self.terminal.draw(|f| {
            f.buffer_mut().merge(background);
            let area = popup_area(f.area(), 60, 3);
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new(body).block(
                    Block::default()
                        .title(title.to_string())
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                ),
                area,
            );
        })?;
        Ok(())
    }

    fn read_line(&mut self, message: &str, default: &str) -> io::Result<Option<String>> {
        let mut input = default.to_string();
        loop {
            let body = Line::from(vec![
                Span::raw(input.as_str()),
                Span::styled("_", Style::default().fg(Color::DarkGray)),
            ]);
            self.draw(message, body)?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => return Ok(Some(input)),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => {}
                }
            }
        }
    }

    fn read_confirm(&mut self, message: &str) -> io::Result<bool> {
        loop {
            self.draw(message, Line::from("[y] yes   [n] no"))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }
}

impl<B: Backend> Prompter for TerminalPrompter<'_, B> {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.read_line(message, default).unwrap_or_else(|e| {
            warn!("prompt failed: {}", e);
            None
        })
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.read_confirm(message).unwrap_or_else(|e| {
            warn!("confirmation failed: {}", e);
            false
        })
    }
}

fn popup_area(area: Rect, percent_x: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

/// Replays canned answers. Running out of answers behaves like the user dismissing
/// the prompt or declining the confirmation.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    /// Every message shown, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, answer: Option<&str>) -> Self {
        self.answers.push_back(answer.map(str::to_string));
        self
    }

    pub fn confirmation(mut self, confirmed: bool) -> Self {
        self.confirmations.push_back(confirmed);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str, _default: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }
}
