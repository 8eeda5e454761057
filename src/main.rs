use anyhow::Result;

mod app;
mod client;
mod config;
mod handler;
mod trip;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Teardown: drop the terminal state and any request still in flight
    tui::restore()?;
    if let Some(pending) = app.pending.take() {
        pending.task.abort();
    }

    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Settle a finished request before the next event; ticks arrive
        // every 300ms, so completions are picked up promptly
        app.poll_pending().await;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
