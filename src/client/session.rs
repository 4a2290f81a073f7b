//! Executes state machine commands against the server.

use tracing::{debug, info};

use super::api::ServerApi;
use super::state::{Command, State};
use super::transport::Transport;
use crate::store::{DeliveryOutcome, InsertOutcome, Message, BROADCAST_ADDRESSEE};
use crate::Result;

/// One user's walk through the menus.
pub struct Session<T> {
    api: ServerApi<T>,
    state: State,
}

impl<T: Transport> Session<T> {
    /// Start a session at the entry menu.
    pub fn new(transport: T) -> Self {
        Self {
            api: ServerApi::new(transport),
            state: State::Start,
        }
    }

    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Prompt for the current state.
    pub fn prompt(&self) -> &'static str {
        self.state.prompt()
    }

    /// Whether the user chose to exit.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// The server API this session talks through.
    pub fn api(&self) -> &ServerApi<T> {
        &self.api
    }

    /// Feed one input line and return the lines to show the user.
    ///
    /// The state is left unchanged when the server cannot be reached.
    pub async fn handle_line(&mut self, line: &str) -> Result<Vec<String>> {
        let command = self.state.clone().on_input(line);
        let (next, output) = self.execute(command).await?;
        if next != self.state {
            debug!("Session state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(output)
    }

    async fn execute(&mut self, command: Command) -> Result<(State, Vec<String>)> {
        let result = match command {
            Command::Goto(state) => (state, vec![]),

            Command::CheckLogin { login } => {
                if self.api.is_login_registered(&login).await? {
                    (State::PasswordInput { login }, vec![])
                } else {
                    let msg = format!("Login \"{login}\" is not registered.");
                    (State::LoginUnregistered, vec![msg])
                }
            }

            Command::CheckNewLogin { login } => {
                if self.api.is_login_registered(&login).await? {
                    let msg = format!("Login \"{login}\" is already taken.");
                    (State::LoginRegistered { login }, vec![msg])
                } else {
                    (State::CreateNickname { login }, vec![])
                }
            }

            Command::CheckNickname { login, name } => {
                if name == BROADCAST_ADDRESSEE {
                    let msg = format!("Nickname \"{name}\" is reserved.");
                    (State::NicknameTaken { login }, vec![msg])
                } else if self.api.is_nickname_registered(&name).await? {
                    let msg = format!("Nickname \"{name}\" is already taken.");
                    (State::NicknameTaken { login }, vec![msg])
                } else {
                    (State::CreatePassword { login, name }, vec![])
                }
            }

            Command::Authenticate { login, digest } => {
                if self.api.authenticate(&login, digest).await? {
                    let name = self.api.nickname(&login).await?.unwrap_or_else(|| login.clone());
                    info!("Logged in as {}", login);
                    (State::InChat, vec![format!("Welcome, {name}!")])
                } else {
                    (
                        State::PasswordIncorrect { login },
                        vec!["Wrong password.".to_string()],
                    )
                }
            }

            Command::Register {
                login,
                name,
                digest,
            } => match self.api.register(&name, &login, digest).await? {
                InsertOutcome::Inserted => {
                    info!("Registered as {}", login);
                    (
                        State::InChat,
                        vec![format!("Account created. Welcome, {name}!")],
                    )
                }
                InsertOutcome::Rejected(reason) => (
                    State::CreateLogin,
                    vec![format!("Registration failed: {}.", reason.describe())],
                ),
            },

            Command::CheckAddressee { name } => {
                if name == BROADCAST_ADDRESSEE || self.api.is_nickname_registered(&name).await? {
                    (State::MessageInput { addressee: name }, vec![])
                } else {
                    let msg = format!("No user named \"{name}\".");
                    (State::AddresseeMissing, vec![msg])
                }
            }

            Command::Send { addressee, text } => {
                let msg = match self.api.send(&addressee, &text).await? {
                    DeliveryOutcome::Delivered { recipients: 1 } => "Message sent.".to_string(),
                    DeliveryOutcome::Delivered { recipients } => {
                        format!("Message sent to {recipients} users.")
                    }
                    DeliveryOutcome::AddresseeUnknown => {
                        format!("No user named \"{addressee}\"; message dropped.")
                    }
                    DeliveryOutcome::EmptySender => "Message was not sent.".to_string(),
                };
                (State::InChat, vec![msg])
            }

            Command::ReadMessages => {
                let messages = self.api.load_messages().await?;
                (State::InChat, render_messages(&messages))
            }

            Command::ListUsers => {
                let count = self.api.count_users().await?;
                let names = self.api.list_nicknames().await?;
                let mut output = vec![format!("Users ({count}):")];
                output.extend(names.into_iter().map(|name| format!("  {name}")));
                (State::InChat, output)
            }

            Command::Logout => {
                self.api.logout().await?;
                info!("Logged out");
                (State::Start, vec!["Logged out.".to_string()])
            }

            Command::DeleteAccount => {
                self.api.remove_account().await?;
                info!("Account deleted");
                (State::Start, vec!["Account deleted.".to_string()])
            }
        };
        Ok(result)
    }
}

fn render_messages(messages: &[Message]) -> Vec<String> {
    if messages.is_empty() {
        return vec!["No new messages.".to_string()];
    }
    messages.iter().map(Message::format).collect()
}
