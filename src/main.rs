use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use taskboard::config::Config;
use taskboard::logger::logger_init;
use taskboard::ui::{run_app, App};
use taskboard::{ApiClient, Controller};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger_init(&config.logger())?;
    info!(base_url = %config.base_url, "starting taskboard");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let controller = Controller::new(ApiClient::new(&config.base_url), runtime.handle().clone());
    let mut app = App::new(controller);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.controller_mut().shutdown();

    if let Err(err) = result {
        error!("board exited with error: {}", err);
        eprintln!("{:?}", err);
    }
    info!("taskboard stopped");
    Ok(())
}
