use std::io::{self, Stdout};

use anyhow::Context;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::{
    broadcast,
    mpsc::{self, UnboundedReceiver},
};
use tokio_stream::StreamExt;

use crate::{
    state_store::{action::Action, State},
    ui_management::components::{Component, ComponentRender},
    Interrupted,
};

use super::pages::AppRouter;

/// Terminal in raw mode on the alternate screen, handed back to the shell when dropped
struct ChatTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ChatTerminal {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("could not enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(ChatTerminal {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
        })
    }

    fn draw(&mut self, app_router: &AppRouter) -> anyhow::Result<()> {
        self.terminal
            .draw(|frame| app_router.render(frame, ()))
            .context("could not render to the terminal")?;

        Ok(())
    }
}

impl Drop for ChatTerminal {
    fn drop(&mut self) {
        // nothing left to report to, the shell gets whatever state could be restored
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Owns the terminal: forwards key presses to the active page and redraws whenever
/// a key, a resize or a new state arrives
pub struct UiManager {
    action_tx: mpsc::UnboundedSender<Action>,
}

impl UiManager {
    pub fn new() -> (Self, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        (Self { action_tx }, action_rx)
    }

    pub async fn main_loop(
        self,
        mut state_rx: UnboundedReceiver<State>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let state = state_rx
            .recv()
            .await
            .context("the state store closed before sending the initial state")?;
        let mut app_router = AppRouter::new(&state, self.action_tx.clone());

        let mut terminal = ChatTerminal::enter()?;
        let mut crossterm_events = EventStream::new();

        terminal.draw(&app_router)?;

        loop {
            tokio::select! {
                maybe_event = crossterm_events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => app_router.handle_key_event(key),
                    Some(Ok(Event::Resize(_, _))) => (),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err).context("could not read terminal events"),
                    None => return Ok(Interrupted::UserInt),
                },
                maybe_state = state_rx.recv() => match maybe_state {
                    Some(state) => app_router = app_router.move_with_state(&state),
                    // the store has stopped, the interrupt tells why
                    None => match interrupt_rx.recv().await {
                        Ok(interrupted) => return Ok(interrupted),
                        Err(_) => return Ok(Interrupted::UserInt),
                    },
                },
                Ok(interrupted) = interrupt_rx.recv() => return Ok(interrupted),
            }

            terminal.draw(&app_router)?;
        }
    }
}
