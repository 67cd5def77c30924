use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stdout, Write, stdout};
use tracing::{debug, warn};

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen with mouse reporting on.
///
/// On failure whatever was already switched on is switched back off.
pub fn setup() -> anyhow::Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut out = stdout();
    if let Err(e) = execute!(out, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let mut terminal = match Terminal::new(CrosstermBackend::new(out)) {
        Ok(terminal) => terminal,
        Err(e) => {
            cleanup();
            return Err(e).context("Failed to create terminal");
        }
    };

    if let Err(e) = terminal.clear() {
        warn!(error = %e, "failed to clear terminal");
    }
    if let Err(e) = execute!(stdout(), cursor::Hide) {
        warn!(error = %e, "failed to hide cursor");
    }

    install_panic_hook();
    debug!("terminal ready");
    Ok(terminal)
}

/// Restore the terminal. Safe to call more than once.
pub fn cleanup() {
    let mut out = stdout();

    if let Err(e) = execute!(out, DisableMouseCapture, LeaveAlternateScreen, cursor::Show) {
        warn!(error = %e, "failed to restore screen");
    }
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "failed to disable raw mode");
    }
    let _ = out.flush();
    debug!("terminal restored");
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        cleanup();
        previous(info);
    }));
}
