//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the editor,
//! and translates keyboard events into key strings for
//! [`Editor::handle_key`](crate::core::editor::Editor::handle_key).
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! ```text
//! draw ─► poll (500ms) ─► key? ─► editor.handle_key(key, store)
//!   ▲                                    │
//!   └──────── Effect::None ◄─────────────┤
//!                                        └─► Effect::Quit / Err → restore, return
//! ```
//!
//! One event is fully processed before the next is read. The terminal is
//! restored on every exit path, including errors from a failed write.

mod component;
mod components;
pub mod event;
mod ui;

use log::info;
use std::io::stdout;
use std::time::Duration;

use crossterm::cursor::SetCursorStyle;
use crossterm::execute;

use crate::core::editor::{Editor, Effect, ListSink};
use crate::core::error::Result;
use crate::tui::event::{TuiEvent, poll_event_timeout};

const POLL_TIMEOUT: Duration = Duration::from_millis(500);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Non-blinking: ratatui resets the blink timer on every draw
        execute!(stdout(), SetCursorStyle::SteadyBlock)?;
        info!("Terminal modes enabled (steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetCursorStyle::DefaultUserShape);
    }
}

/// Run an interactive session until the user quits. Returns the editor so
/// the caller can inspect the final state.
pub fn run(mut editor: Editor, sink: &mut dyn ListSink) -> Result<Editor> {
    info!("Opening list {:?} ({} tasks)", editor.list().name(), editor.list().len());
    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new();

    let result = event_loop(&mut terminal, &mut editor, sink);

    drop(guard);
    ratatui::restore();
    result.map(|()| editor)
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    editor: &mut Editor,
    sink: &mut dyn ListSink,
) -> Result<()> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, editor))?;
            needs_redraw = false;
        }

        match poll_event_timeout(POLL_TIMEOUT)? {
            Some(TuiEvent::Key(key)) => {
                needs_redraw = true;
                if editor.handle_key(&key, sink)? == Effect::Quit {
                    info!("Closing list {:?}", editor.list().name());
                    return Ok(());
                }
            }
            Some(TuiEvent::Resize) => needs_redraw = true,
            None => {}
        }
    }
}
