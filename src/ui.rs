use crate::api::TaskApi;
use crate::controller::Controller;
use crate::drag::DragState;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::task::{Task, TaskId, TaskStatus};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Margin, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);
const HELP: &str =
    "a add  e edit  d delete  [ ] move  1-3 set status  drag cards with the mouse  q quit";

/// Which part of the screen receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Board,
    Title,
    Description,
}

/// Key presses that need more than the board itself: quitting, or a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Quit,
    Edit(TaskId),
    Delete(TaskId),
}

pub struct App<A: TaskApi> {
    controller: Controller<A>,
    pub selected_status: usize,
    pub selected_task: usize,
    focus: Focus,
    drag: DragState,
    columns: [Rect; 3],
}

impl<A: TaskApi> App<A> {
    pub fn new(controller: Controller<A>) -> Self {
        Self {
            controller,
            selected_status: 0,
            selected_task: 0,
            focus: Focus::Board,
            drag: DragState::default(),
            columns: [Rect::default(); 3],
        }
    }

    pub fn controller(&self) -> &Controller<A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<A> {
        &mut self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// Screen area of a column as of the last render.
    pub fn column_area(&self, index: usize) -> Rect {
        self.columns.get(index).copied().unwrap_or_default()
    }

    /// Applies finished requests and keeps the selection inside its column.
    pub fn tick(&mut self) -> bool {
        let changed = self.controller.drain();
        let len = self
            .controller
            .board()
            .grouped()
            .column(self.selected_status)
            .len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
        changed
    }

    pub fn selected(&self) -> Option<&Task> {
        self.controller
            .board()
            .grouped()
            .column(self.selected_status)
            .get(self.selected_task)
            .copied()
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected().map(|t| t.id.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        match self.focus {
            Focus::Board => self.handle_board_key(key),
            Focus::Title | Focus::Description => {
                self.handle_form_key(key);
                None
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Option<Request> {
        match key.code {
            KeyCode::Char('q') => return Some(Request::Quit),
            KeyCode::Char('a') => self.focus = Focus::Title,
            KeyCode::Char('e') => return self.selected_id().map(Request::Edit),
            KeyCode::Char('d') => return self.selected_id().map(Request::Delete),
            KeyCode::Char('[') => self.shift_selected(-1),
            KeyCode::Char(']') => self.shift_selected(1),
            KeyCode::Char(c @ '1'..='3') => {
                if let (Some(id), Some(status)) = (
                    self.selected_id(),
                    TaskStatus::from_column(c as usize - '1' as usize),
                ) {
                    self.controller.move_task(&id, status);
                }
            }
            KeyCode::Left => {
                if self.selected_status > 0 {
                    self.selected_status -= 1;
                    self.selected_task = 0;
                }
            }
            KeyCode::Right => {
                if self.selected_status < TaskStatus::COLUMNS.len() - 1 {
                    self.selected_status += 1;
                    self.selected_task = 0;
                }
            }
            KeyCode::Up => {
                if self.selected_task > 0 {
                    self.selected_task -= 1;
                }
            }
            KeyCode::Down => {
                let max_tasks = self
                    .controller
                    .board()
                    .grouped()
                    .column(self.selected_status)
                    .len();
                if self.selected_task + 1 < max_tasks {
                    self.selected_task += 1;
                }
            }
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Board,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Title => Focus::Description,
                    _ => Focus::Title,
                }
            }
            KeyCode::Enter => self.controller.add_task(),
            KeyCode::Backspace => {
                self.form_field().pop();
            }
            KeyCode::Char(c) => self.form_field().push(c),
            _ => {}
        }
    }

    fn form_field(&mut self) -> &mut String {
        let form = &mut self.controller.board_mut().form;
        match self.focus {
            Focus::Description => &mut form.description,
            _ => &mut form.title,
        }
    }

    /// Moves the selected card one column left or right.
    fn shift_selected(&mut self, direction: isize) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let target = (self.selected_status as isize + direction)
            .clamp(0, TaskStatus::COLUMNS.len() as isize - 1) as usize;
        if let Some(status) = TaskStatus::from_column(target) {
            self.controller.move_task(&id, status);
        }
    }

    pub fn edit(&mut self, id: &TaskId, prompter: &mut dyn Prompter) {
        self.controller.edit_task(id, prompter);
    }

    pub fn delete(&mut self, id: &TaskId, prompter: &mut dyn Prompter) {
        self.controller.delete_task(id, prompter);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // A release outside the terminal never reaches us.
                self.drag.cancel();
                let Some(column) = self.column_at(mouse.column, mouse.row) else {
                    return;
                };
                let Some(index) = self.card_at(column, mouse.row) else {
                    return;
                };
                self.selected_status = column;
                self.selected_task = index;
                if let Some(id) = self.selected_id() {
                    self.drag.start(&id);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                match self
                    .column_at(mouse.column, mouse.row)
                    .and_then(TaskStatus::from_column)
                {
                    Some(status) => self.drag.over(status),
                    None => self.drag.leave(),
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let target = self
                    .column_at(mouse.column, mouse.row)
                    .and_then(TaskStatus::from_column);
                match (target, self.drag.drop_payload()) {
                    (Some(status), Some(payload)) => self.controller.drop_task(status, &payload),
                    _ => self.drag.cancel(),
                }
            }
            _ => {}
        }
    }

    fn column_at(&self, x: u16, y: u16) -> Option<usize> {
        self.columns
            .iter()
            .position(|area| area.contains(Position::new(x, y)))
    }

    fn card_at(&self, column: usize, y: u16) -> Option<usize> {
        let area = self.columns[column].inner(Margin::new(1, 1));
        if y < area.y || y >= area.bottom() {
            return None;
        }
        let board = self.controller.board();
        let columns = board.grouped();
        let mut top = area.y;
        for (index, task) in columns.column(column).iter().enumerate() {
            top += card_height(task);
            if y < top {
                return Some(index);
            }
        }
        None
    }

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_form(f, chunks[0]);
        self.render_status(f, chunks[1]);
        self.render_columns(f, chunks[2]);
        f.render_widget(
            Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let board = self.controller.board();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Percentage(40),
                Constraint::Percentage(45),
                Constraint::Percentage(15),
            ])
            .split(area);

        let input = |title: &'static str, value: &str, focused: bool| {
            Paragraph::new(value.to_string()).block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(if focused {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
        };
        f.render_widget(
            input("Task title", &board.form.title, self.focus == Focus::Title),
            chunks[0],
        );
        f.render_widget(
            input(
                "Description (optional)",
                &board.form.description,
                self.focus == Focus::Description,
            ),
            chunks[1],
        );

        let button = if board.saving { "Saving..." } else { "Add" };
        f.render_widget(
            Paragraph::new(button)
                .style(if board.saving {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                })
                .block(Block::default().borders(Borders::ALL)),
            chunks[2],
        );
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let board = self.controller.board();
        let mut spans = Vec::new();
        if board.loading {
            spans.push(Span::styled("Loading...", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" "));
        }
        if !board.error.is_empty() {
            spans.push(Span::styled(
                board.error.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_columns(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ])
            .split(area);
        for (i, chunk) in chunks.iter().enumerate().take(self.columns.len()) {
            self.columns[i] = *chunk;
        }

        let board = self.controller.board();
        let grouped = board.grouped();
        for (i, status) in TaskStatus::COLUMNS.iter().enumerate() {
            let tasks = grouped.get(status);
            let items: Vec<ListItem> = tasks
                .iter()
                .enumerate()
                .map(|(j, t)| {
                    let selected = self.selected_status == i && self.selected_task == j;
                    card(t, selected)
                })
                .collect();

            let over = self.drag.is_over(status);
            let border_style = if over {
                Style::default().fg(Color::Yellow)
            } else if self.selected_status == i {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };

            let list = List::new(items).block(
                Block::default()
                    .title(format!("{} ({})", status.title(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );

            f.render_widget(list, chunks[i]);
        }
    }
}

fn card_height(task: &Task) -> u16 {
    if task.description.is_empty() {
        1
    } else {
        2
    }
}

fn card(task: &Task, selected: bool) -> ListItem<'_> {
    let title_style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("[#{}] ", task.id)),
        Span::styled(task.title.as_str(), title_style),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("      {}", task.description),
            Style::default().fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

pub fn run_app<B: Backend, A: TaskApi>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> io::Result<()> {
    app.controller_mut().start();
    loop {
        app.tick();
        let background = terminal.draw(|f| app.render(f))?.buffer.clone();

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match app.handle_key(key) {
                Some(Request::Quit) => return Ok(()),
                Some(Request::Edit(id)) => {
                    let mut prompter = TerminalPrompter::new(terminal, background);
                    app.edit(&id, &mut prompter);
                }
                Some(Request::Delete(id)) => {
                    let mut prompter = TerminalPrompter::new(terminal, background);
                    app.delete(&id, &mut prompter);
                }
                None => {}
            },
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }
}
