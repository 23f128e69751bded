use std::io;
use std::path::PathBuf;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::storage::FileStore;
use crate::store::TaskStore;

mod app;
mod filter;
mod present;
mod storage;
mod store;
mod task;
mod theme;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = dirs::data_dir()
        .map(|dir| dir.join("taskman"))
        .unwrap_or_else(|| PathBuf::from("."));
    let backend = FileStore::open(data_dir)?;
    let store = TaskStore::load(Box::new(backend.clone()));
    let mut app = App::new(store, Box::new(backend));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}
