use crossterm::event::KeyEvent;
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ServerConnectionStatus, State};

use self::{chat_page::ChatPage, connect_page::ConnectPage};

use super::components::{Component, ComponentRender};

mod chat_page;
mod connect_page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivePage {
    Chat,
    Connect,
}

impl From<&ServerConnectionStatus> for ActivePage {
    fn from(status: &ServerConnectionStatus) -> Self {
        match status {
            ServerConnectionStatus::Connected { .. } => ActivePage::Chat,
            _ => ActivePage::Connect,
        }
    }
}

/// Routes key presses and rendering to the chat page while connected, to the connect page otherwise
pub struct AppRouter {
    active_page: ActivePage,
    chat_page: ChatPage,
    connect_page: ConnectPage,
}

impl Component for AppRouter {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        AppRouter {
            active_page: ActivePage::from(&state.server_connection_status),
            chat_page: ChatPage::new(state, action_tx.clone()),
            connect_page: ConnectPage::new(state, action_tx),
        }
    }

    fn move_with_state(self, state: &State) -> Self {
        AppRouter {
            active_page: ActivePage::from(&state.server_connection_status),
            chat_page: self.chat_page.move_with_state(state),
            connect_page: self.connect_page.move_with_state(state),
        }
    }

    fn name(&self) -> &str {
        match self.active_page {
            ActivePage::Chat => self.chat_page.name(),
            ActivePage::Connect => self.connect_page.name(),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match self.active_page {
            ActivePage::Chat => self.chat_page.handle_key_event(key),
            ActivePage::Connect => self.connect_page.handle_key_event(key),
        }
    }
}

impl ComponentRender<()> for AppRouter {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: ()) {
        match self.active_page {
            ActivePage::Chat => self.chat_page.render(frame, props),
            ActivePage::Connect => self.connect_page.render(frame, props),
        }
    }
}
