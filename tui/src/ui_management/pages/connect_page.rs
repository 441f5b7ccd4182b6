use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    state_store::{action::Action, ServerConnectionStatus, State},
    ui_management::components::{
        input_box::{self, InputBox},
        Component, ComponentRender,
    },
};

struct Props {
    connection_status: ServerConnectionStatus,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            connection_status: state.server_connection_status.clone(),
        }
    }
}

/// ConnectPage asks for the server address and reports failed attempts
pub struct ConnectPage {
    action_tx: UnboundedSender<Action>,
    props: Props,
    addr_input: InputBox,
}

impl Component for ConnectPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            action_tx,
            props: Props::from(state),
            addr_input: InputBox::with_text(&state.server_addr),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Connect Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Enter => {
                if self.props.connection_status != ServerConnectionStatus::Connecting
                    && !self.addr_input.is_empty()
                {
                    let _ = self.action_tx.send(Action::ConnectToServerRequest {
                        addr: self.addr_input.text().trim().to_string(),
                    });
                }
            }
            KeyCode::Esc => {
                let _ = self.action_tx.send(Action::Exit);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let _ = self.action_tx.send(Action::Exit);
            }
            _ => self.addr_input.handle_key_event(key),
        }
    }
}

impl ComponentRender<()> for ConnectPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [_, vertical_centered, _] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Ratio(1, 3),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 3),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [_, both_centered, _] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Ratio(1, 3),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 3),
                ]
                .as_ref(),
            )
            .split(vertical_centered)
        else {
            panic!("The horizontal layout should have 3 chunks")
        };

        let [container_addr_input, container_status, container_help_text] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Length(2),
                    Constraint::Length(2),
                ]
                .as_ref(),
            )
            .split(both_centered)
        else {
            panic!("The centered layout should have 3 chunks")
        };

        self.addr_input.render(
            frame,
            input_box::RenderProps {
                title: "Server Host and Port".into(),
                area: container_addr_input,
                border_color: Color::Yellow,
                show_cursor: true,
            },
        );

        let status_line = match &self.props.connection_status {
            ServerConnectionStatus::Uninitalized | ServerConnectionStatus::Connected { .. } => {
                Line::from("")
            }
            ServerConnectionStatus::Connecting => Line::from("Connecting...".italic()),
            ServerConnectionStatus::Errored { err } => {
                Line::from(Span::from(format!("Disconnected: {}", err)).red())
            }
        };
        let status = Paragraph::new(Text::from(status_line)).wrap(Wrap { trim: true });
        frame.render_widget(status, container_status);

        let help_text = Paragraph::new(Text::from(Line::from(vec![
            "Press ".into(),
            "<Enter>".bold(),
            " to connect, ".into(),
            "<Esc>".bold(),
            " to exit.".into(),
        ])));
        frame.render_widget(help_text, container_help_text);
    }
}
