pub mod app;
pub mod components;
pub mod compose;
pub mod events;
pub mod history;
pub mod layout;
pub mod lists;
pub mod modal;
pub mod templates;
pub mod view;

use anyhow::Result;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::info;

pub use app::OutreachApp;
use events::{EventSource, TuiEvent};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Run the main TUI application
pub fn run_app(app: &mut OutreachApp) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let mut events = EventSource::new(TICK_RATE);
    info!("🖥️ TUI started");

    // Main application loop
    let result = loop {
        let now = Instant::now();
        if let Err(e) = app.update(now) {
            break Err(e);
        }
        if let Err(e) = terminal.draw(|f| app.draw(f, now)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(TuiEvent::Key(key)) => {
                if let Err(e) = app.handle_key(key, Instant::now()) {
                    break Err(e);
                }
            }
            Ok(TuiEvent::Resize(_, _)) | Ok(TuiEvent::Tick) => {}
            Err(e) => break Err(e),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Cleanup terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    info!("TUI closed");
    result
}
