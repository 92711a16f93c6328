mod common;

use common::{task, MemoryApi};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, Terminal};
use taskboard::prompt::ScriptedPrompter;
use taskboard::ui::{App, Focus, Request};
use taskboard::{Controller, Task, TaskId, TaskStatus};

async fn app_with(tasks: Vec<Task>) -> (App<MemoryApi>, MemoryApi) {
    let api = MemoryApi::with_tasks(tasks);
    let mut app = App::new(Controller::current(api.clone()));
    app.controller_mut().start();
    settle(&mut app).await;
    (app, api)
}

async fn settle(app: &mut App<MemoryApi>) {
    app.controller_mut().settle().await;
    app.tick();
}

fn draw(app: &mut App<MemoryApi>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content()
        .chunks(buffer.area.width as usize)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[tokio::test]
async fn renders_columns_and_cards() {
    let (mut app, _) = app_with(vec![
        task("1", "Buy milk", TaskStatus::Todo),
        task("2", "Ship", TaskStatus::Done),
    ])
    .await;

    let screen = draw(&mut app);

    assert!(screen.contains("To Do (1)"));
    assert!(screen.contains("In Progress (0)"));
    assert!(screen.contains("Done (1)"));
    assert!(screen.contains("Buy milk"));
    assert!(!screen.contains("Loading..."));
}

#[tokio::test]
async fn shows_error_banner() {
    let api = MemoryApi::new();
    api.fail_next(500, "backend down");
    let mut app = App::new(Controller::current(api.clone()));
    app.controller_mut().start();
    assert!(draw(&mut app).contains("Loading..."));

    settle(&mut app).await;
    assert!(draw(&mut app).contains("backend down"));
}

#[tokio::test]
async fn typing_into_the_form_creates_a_task() {
    let (mut app, _) = app_with(vec![]).await;

    app.handle_key(key(KeyCode::Char('a')));
    assert_eq!(app.focus(), Focus::Title);
    for c in "Buy milk".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Tab));
    for c in "2l".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    assert!(draw(&mut app).contains("Saving..."));
    settle(&mut app).await;

    let created = app.selected().unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.description, "2l");
    assert!(app.controller().board().form.title.is_empty());

    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.focus(), Focus::Board);
}

#[tokio::test]
async fn q_quits_only_from_the_board() {
    let (mut app, _) = app_with(vec![]).await;
    assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Some(Request::Quit));

    app.handle_key(key(KeyCode::Char('a')));
    assert_eq!(app.handle_key(key(KeyCode::Char('q'))), None);
    assert_eq!(app.controller().board().form.title, "q");
}

#[tokio::test]
async fn brackets_move_the_selected_card() {
    let (mut app, api) = app_with(vec![task("1", "Ship", TaskStatus::Todo)]).await;

    app.handle_key(key(KeyCode::Char(']')));
    settle(&mut app).await;
    assert_eq!(api.tasks()[0].status, TaskStatus::InProgress);

    // selection stays on the first column, which is now empty
    assert!(app.selected().is_none());
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Char('3')));
    settle(&mut app).await;
    assert_eq!(
        app.controller().board().tasks()[0].status,
        TaskStatus::Done
    );
}

#[tokio::test]
async fn edit_and_delete_go_through_the_prompter() {
    let (mut app, _) = app_with(vec![task("1", "Old", TaskStatus::Todo)]).await;

    let request = app.handle_key(key(KeyCode::Char('e')));
    assert_eq!(request, Some(Request::Edit(TaskId::from("1"))));
    let mut prompter = ScriptedPrompter::new().answer(Some("New")).answer(Some(""));
    app.edit(&TaskId::from("1"), &mut prompter);
    settle(&mut app).await;
    assert_eq!(app.selected().unwrap().title, "New");

    let request = app.handle_key(key(KeyCode::Char('d')));
    assert_eq!(request, Some(Request::Delete(TaskId::from("1"))));
    let mut prompter = ScriptedPrompter::new().confirmation(true);
    app.delete(&TaskId::from("1"), &mut prompter);
    settle(&mut app).await;
    assert!(app.controller().board().tasks().is_empty());
}

#[tokio::test]
async fn drag_and_drop_moves_a_card() {
    let (mut app, api) = app_with(vec![task("1", "Drag me", TaskStatus::Todo)]).await;
    draw(&mut app);

    let todo = app.column_area(0);
    let done = app.column_area(2);
    app.handle_mouse(mouse(
        MouseEventKind::Down(MouseButton::Left),
        todo.x + 2,
        todo.y + 1,
    ));
    assert!(app.drag().is_dragging());

    app.handle_mouse(mouse(
        MouseEventKind::Drag(MouseButton::Left),
        done.x + 2,
        done.y + 2,
    ));
    assert!(app.drag().is_over(&TaskStatus::Done));

    app.handle_mouse(mouse(
        MouseEventKind::Up(MouseButton::Left),
        done.x + 2,
        done.y + 2,
    ));
    assert!(!app.drag().is_over(&TaskStatus::Done));
    settle(&mut app).await;

    assert_eq!(api.calls()[1].path, "/tasks/1");
    let board = app.controller().board();
    assert_eq!(board.grouped().get(&TaskStatus::Done).len(), 1);
    assert!(board.grouped().get(&TaskStatus::Todo).is_empty());
}

#[tokio::test]
async fn releasing_outside_a_column_cancels_the_drag() {
    let (mut app, api) = app_with(vec![task("1", "Drag me", TaskStatus::Todo)]).await;
    draw(&mut app);

    let todo = app.column_area(0);
    app.handle_mouse(mouse(
        MouseEventKind::Down(MouseButton::Left),
        todo.x + 2,
        todo.y + 1,
    ));
    app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0));
    app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0));

    assert!(!app.drag().is_dragging());
    assert_eq!(app.controller().pending(), 0);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn press_on_empty_space_forgets_an_unreleased_drag() {
    let (mut app, api) = app_with(vec![task("1", "Drag me", TaskStatus::Todo)]).await;
    draw(&mut app);

    let todo = app.column_area(0);
    let done = app.column_area(2);
    app.handle_mouse(mouse(
        MouseEventKind::Down(MouseButton::Left),
        todo.x + 2,
        todo.y + 1,
    ));
    assert!(app.drag().is_dragging());

    // No release arrives; the next press lands on an empty column.
    app.handle_mouse(mouse(
        MouseEventKind::Down(MouseButton::Left),
        done.x + 2,
        done.y + 5,
    ));
    assert!(!app.drag().is_dragging());

    app.handle_mouse(mouse(
        MouseEventKind::Drag(MouseButton::Left),
        done.x + 2,
        done.y + 2,
    ));
    app.handle_mouse(mouse(
        MouseEventKind::Up(MouseButton::Left),
        done.x + 2,
        done.y + 2,
    ));
    settle(&mut app).await;

    assert_eq!(api.calls().len(), 1);
    assert_eq!(app.controller().board().tasks()[0].status, TaskStatus::Todo);
}
