use std::io;

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::CrosstermBackend;

pub type Terminal = ratatui::Terminal<CrosstermBackend<io::Stdout>>;

/// Switches to raw mode on the alternate screen with the cursor hidden.
pub fn init() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let terminal = ratatui::Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Undoes [`init`]. Call it even when the event loop failed.
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}
