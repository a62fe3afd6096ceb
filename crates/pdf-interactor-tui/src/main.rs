mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use pdf_interactor_core::Config;
use tracing::{error, info, warn};

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the UI still runs without a log file
    let log_path = logging::init().ok();

    let config = Config::load_or_create().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    info!(log = ?log_path, "starting pdf-interactor v{}", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(&config);
    app.probe_backend();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        error!(error = %e, "exited with error");
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(tui::TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }

        app.poll_tasks().await;
    }

    info!("shutting down");
    Ok(())
}
