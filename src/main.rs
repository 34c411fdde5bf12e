mod app;
mod config;
mod error;
mod models;
mod parser;
mod session;
mod store;
mod system;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::system::init_logging;
use crate::ui::render_app;

fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config).context("failed to set up logging")?;
    info!(data_file = %config.data_file.display(), "starting fillgo");

    let terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;

    let app = App::load(config);
    let result = run_app(terminal, app);

    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();
    result
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    loop {
        if app.needs_redraw {
            terminal.clear()?;
            app.needs_redraw = false;
        }
        terminal.draw(|frame| render_app(frame, &mut app))?;

        if app.should_quit {
            info!("quitting");
            break;
        }

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        app.on_key(key);
                    }
                }
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
    }
    Ok(())
}
