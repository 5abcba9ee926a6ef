use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use crate::app::{App, AppEvent};

/// How often the dashboard redraws and checks for changes from other sessions.
const TICK_RATE: Duration = Duration::from_millis(500);

/// Waits up to `timeout` for a key press. Anything else, including a
/// timeout, counts as a tick.
pub fn poll(timeout: Duration) -> Result<AppEvent> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(AppEvent::KeyPress(key.code));
            }
        }
    }
    Ok(AppEvent::Tick)
}

pub fn run(app: &mut App, terminal: &mut crate::tui::Terminal) -> Result<()> {
    while app.running {
        terminal.draw(|frame| crate::ui::draw(frame, app))?;
        let event = poll(TICK_RATE)?;
        app.update(event);
    }
    Ok(())
}
