use chrono::Local;
use circular_queue::CircularQueue;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    state_store::{action::Action, MessageBoxItem, State},
    ui_management::components::{
        input_box::{self, InputBox},
        Component, ComponentRender,
    },
};

struct Props {
    connection_id: String,
    has_joined: bool,
    preferred_name: String,
    users: Vec<String>,
    messages: CircularQueue<MessageBoxItem>,
    typing_user: Option<String>,
    timer: usize,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            connection_id: state.connection_id.clone(),
            has_joined: state.has_joined,
            preferred_name: state.preferred_name.clone(),
            users: state.users.clone(),
            messages: state.messages.clone(),
            typing_user: state.typing_user.clone(),
            timer: state.timer,
        }
    }
}

/// ChatPage lets the user join under a display name, chat, and leave again
///
/// The single input box doubles as the name box until the join is sent,
/// and as the message box afterwards.
pub struct ChatPage {
    action_tx: UnboundedSender<Action>,
    props: Props,
    /// Key presses go to the input box while editing
    is_editing: bool,
    input_box: InputBox,
}

impl ChatPage {
    fn submit(&mut self) {
        let text = self.input_box.text().trim().to_string();
        if text.is_empty() {
            return;
        }

        let action = if self.props.has_joined {
            Action::SendMessage { content: text }
        } else {
            Action::JoinChatRoom { name: text }
        };

        let _ = self.action_tx.send(action);
        self.input_box.reset();
    }

    fn edit(&mut self, key: KeyEvent) {
        let before = self.input_box.text().len();

        self.input_box.handle_key_event(key);

        // feeds the typing debounce
        if self.props.has_joined && before != self.input_box.text().len() {
            let _ = self.action_tx.send(Action::KeyStroke);
        }
    }
}

impl Component for ChatPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        let input_box = if state.has_joined {
            InputBox::with_text("")
        } else {
            InputBox::with_text(&state.preferred_name)
        };

        ChatPage {
            action_tx,
            props: Props::from(state),
            is_editing: false,
            input_box,
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        let mut input_box = self.input_box;

        // after a leave or a reconnect, offer the remembered name again
        if self.props.has_joined && !state.has_joined {
            input_box.set_text(&state.preferred_name);
        }

        ChatPage {
            props: Props::from(state),
            input_box,
            ..self
        }
    }

    fn name(&self) -> &str {
        "Chat Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let _ = self.action_tx.send(Action::Exit);
            return;
        }

        if self.is_editing {
            match key.code {
                KeyCode::Esc => self.is_editing = false,
                KeyCode::Enter => self.submit(),
                _ => self.edit(key),
            }

            return;
        }

        match key.code {
            KeyCode::Char('e') | KeyCode::Enter => self.is_editing = true,
            KeyCode::Char('l') if self.props.has_joined => {
                let _ = self.action_tx.send(Action::LeaveChatRoom);
            }
            KeyCode::Char('q') => {
                let _ = self.action_tx.send(Action::Exit);
            }
            _ => {}
        }
    }
}

fn calculate_list_offset(height: u16, items_len: usize) -> usize {
    // go back by (container height - 2 for borders) to get the offset
    items_len.saturating_sub((height as usize).saturating_sub(2))
}

fn message_line(item: &MessageBoxItem) -> Line<'_> {
    match item {
        MessageBoxItem::Message {
            username,
            content,
            timestamp,
            mine,
        } => {
            let time = Span::from(format!(
                "[{}] ",
                timestamp.with_timezone(&Local).format("%H:%M:%S")
            ))
            .dark_gray();
            let name = if *mine {
                Span::from(format!("{} (you)", username)).bold().cyan()
            } else {
                Span::from(username.as_str()).bold()
            };

            Line::from(vec![time, name, ": ".into(), Span::raw(content.as_str())])
        }
        MessageBoxItem::Notification(content) => Line::from(Span::raw(content.as_str()).italic()),
    }
}

impl ComponentRender<()> for ChatPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [left, right] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
            .split(frame.size())
        else {
            panic!("The main layout should have 2 chunks")
        };

        let [container_messages, container_typing, container_input] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(3),
                ]
                .as_ref(),
            )
            .split(left)
        else {
            panic!("The left layout should have 3 chunks")
        };

        let message_offset =
            calculate_list_offset(container_messages.height, self.props.messages.len());
        let messages = self
            .props
            .messages
            .asc_iter()
            .skip(message_offset)
            .map(|item| ListItem::new(message_line(item)))
            .collect::<Vec<ListItem>>();
        let messages =
            List::new(messages).block(Block::default().borders(Borders::ALL).title("Messages"));
        frame.render_widget(messages, container_messages);

        let typing = match self.props.typing_user.as_ref() {
            Some(username) => Line::from(Span::from(format!(" {} is typing...", username)).italic()),
            None => Line::from(""),
        };
        frame.render_widget(Paragraph::new(typing), container_typing);

        self.input_box.render(
            frame,
            input_box::RenderProps {
                title: if self.props.has_joined {
                    "Message".into()
                } else {
                    "Display Name".into()
                },
                area: container_input,
                border_color: if self.is_editing {
                    Color::Yellow
                } else {
                    Color::Reset
                },
                show_cursor: self.is_editing,
            },
        );

        let [container_users, container_user_info, container_usage] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(1),
                    Constraint::Length(5),
                    Constraint::Length(7),
                ]
                .as_ref(),
            )
            .split(right)
        else {
            panic!("The right layout should have 3 chunks")
        };

        let users_offset = calculate_list_offset(container_users.height, self.props.users.len());
        let users = self
            .props
            .users
            .iter()
            .skip(users_offset)
            .map(|username| ListItem::new(Line::from(format!("@{}", username))))
            .collect::<Vec<ListItem>>();
        let users = List::new(users).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Room Users ({})", self.props.users.len())),
        );
        frame.render_widget(users, container_users);

        let user_info = Paragraph::new(Text::from(vec![
            Line::from(if self.props.has_joined {
                format!("User: @{}", self.props.preferred_name)
            } else {
                String::from("User: not joined")
            }),
            Line::from(format!("Connection: {}", self.props.connection_id)),
            Line::from(format!("Connected for: {} secs", self.props.timer)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("User Information"),
        );
        frame.render_widget(user_info, container_user_info);

        let usage_lines: Vec<Line> = if self.is_editing {
            let submit = if self.props.has_joined {
                " to send"
            } else {
                " to join"
            };

            vec![
                Line::from(vec!["<Enter>".bold(), submit.into()]),
                Line::from(vec!["<Esc>".bold(), " to stop editing".into()]),
            ]
        } else {
            let mut lines = vec![
                Line::from(vec!["e".bold(), " to edit".into()]),
                Line::from(vec!["q".bold(), " to exit".into()]),
            ];
            if self.props.has_joined {
                lines.push(Line::from(vec!["l".bold(), " to leave the room".into()]));
            }
            lines
        };
        let usage = Paragraph::new(Text::from(usage_lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Usage"));
        frame.render_widget(usage, container_usage);
    }
}
