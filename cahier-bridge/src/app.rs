//! Terminal session and event loop.
//!
//! Three sources feed the engine: terminal input, run completions, and the
//! animation tick. All of them end up as one `dispatch` call each, and the
//! frame is redrawn after every event.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use cahier_core::notebook::Intent;
use cahier_core::runner::CompletionReceiver;
use cahier_core::{Flow, NotebookEngine};
use crossterm::cursor::Show;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::keyboard::map_key;
use crate::renderer::{self, Rainbow};

pub const TICK: Duration = Duration::from_millis(200);

/// Raw mode plus alternate screen, undone on drop (also on panic unwind).
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("entering alternate screen");
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show);
    }
}

pub async fn run(mut engine: NotebookEngine, mut completions: CompletionReceiver) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);
    let mut rainbow = Rainbow::default();

    tracing::info!(cells = engine.state().commands().len(), "session started");

    loop {
        guard
            .terminal()
            .draw(|frame| renderer::draw(frame, engine.state(), &rainbow))
            .context("drawing frame")?;

        let intent = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => map_key(engine.state().mode(), key),
                Some(Ok(_)) => None,
                Some(Err(e)) => return Err(e).context("reading terminal input"),
                None => break,
            },
            Some(done) = completions.recv() => Some(Intent::RunFinished(done)),
            _ = ticker.tick() => {
                rainbow.advance();
                None
            }
        };

        let Some(intent) = intent else { continue };
        if engine.dispatch(intent)? == Flow::Quit {
            break;
        }
    }

    tracing::info!("session ended");
    Ok(())
}
