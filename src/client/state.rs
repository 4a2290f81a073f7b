//! Session states of the console client.
//!
//! Every state consumes one line of input and yields a [`Command`]: either a
//! direct move to another state, or a server check whose answer picks the
//! next state. Deciding the command is pure and total; all I/O happens in
//! [`Session`](super::Session).
//!
//! Menu states accept a single digit. Anything else (more than one
//! character, a non-digit, or a digit the menu does not offer) keeps the
//! session where it is. Text states stay put on empty input.

use crate::auth::{digest, PasswordDigest};

/// Where the user is in the login, registration and chat flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Entry menu.
    Start,
    /// Typing a login to sign in with.
    LoginInput,
    /// The login typed at sign-in does not exist.
    LoginUnregistered,
    /// The login chosen during registration already exists.
    LoginRegistered { login: String },
    /// Typing the password for `login`.
    PasswordInput { login: String },
    /// The password for `login` did not match.
    PasswordIncorrect { login: String },
    /// Choosing a login for a new account.
    CreateLogin,
    /// Choosing a nickname for the new `login`.
    CreateNickname { login: String },
    /// The chosen nickname is already in use.
    NicknameTaken { login: String },
    /// Choosing a password for the new account.
    CreatePassword { login: String, name: String },
    /// Logged in, at the chat menu.
    InChat,
    /// Typing the nickname to write to.
    AddresseeInput,
    /// The typed nickname does not exist.
    AddresseeMissing,
    /// Typing the message for `addressee`.
    MessageInput { addressee: String },
    /// The session is over.
    Exit,
}

/// What a state decided to do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move to a state without talking to the server.
    Goto(State),
    /// Sign-in: does this login exist?
    CheckLogin { login: String },
    /// Registration: is this login still free?
    CheckNewLogin { login: String },
    /// Registration: is this nickname still free?
    CheckNickname { login: String, name: String },
    /// Sign-in: verify the password.
    Authenticate {
        login: String,
        digest: PasswordDigest,
    },
    /// Registration: create the account.
    Register {
        login: String,
        name: String,
        digest: PasswordDigest,
    },
    /// Can messages be addressed to this nickname?
    CheckAddressee { name: String },
    /// Send the message.
    Send { addressee: String, text: String },
    /// Show and clear the mailbox.
    ReadMessages,
    /// Show everyone registered.
    ListUsers,
    /// Leave the chat and return to the entry menu.
    Logout,
    /// Delete the account and return to the entry menu.
    DeleteAccount,
}

/// Parse a menu line: exactly one character, and that character a digit.
pub fn parse_choice(line: &str) -> Option<u32> {
    let mut chars = line.chars();
    let choice = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    choice.to_digit(10)
}

impl State {
    /// Text shown before reading input in this state.
    pub fn prompt(&self) -> &'static str {
        match self {
            State::Start => "| 1 - Log in | 2 - Register | 3 - Exit | : ",
            State::LoginInput => "Login: ",
            State::LoginUnregistered => "| 1 - Enter login again | 2 - Register | : ",
            State::LoginRegistered { .. } => {
                "| 1 - Log in with this login | 2 - Back to registration | : "
            }
            State::PasswordInput { .. } => "Password: ",
            State::PasswordIncorrect { .. } => "| 1 - Enter password again | 2 - Cancel login | : ",
            State::CreateLogin => "New login: ",
            State::CreateNickname { .. } => "Nickname: ",
            State::NicknameTaken { .. } => "| 1 - Choose another nickname | 2 - Cancel registration | : ",
            State::CreatePassword { .. } => "New password: ",
            State::InChat => {
                "| 1 - Write | 2 - Read messages | 3 - Users | 4 - Log out | 5 - Delete account | : "
            }
            State::AddresseeInput => "To (nickname or \"all\"): ",
            State::AddresseeMissing => "| 1 - Enter nickname again | 2 - Cancel message | : ",
            State::MessageInput { .. } => "Message: ",
            State::Exit => "",
        }
    }

    /// Whether this state reads a menu digit rather than free text.
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            State::Start
                | State::LoginUnregistered
                | State::LoginRegistered { .. }
                | State::PasswordIncorrect { .. }
                | State::NicknameTaken { .. }
                | State::InChat
                | State::AddresseeMissing
        )
    }

    /// Whether the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Exit)
    }

    /// Decide what to do with one line of input.
    ///
    /// Never fails: unusable input maps to `Goto(self)`.
    pub fn on_input(self, line: &str) -> Command {
        if self.is_menu() {
            return match parse_choice(line) {
                Some(choice) => self.on_choice(choice),
                None => Command::Goto(self),
            };
        }

        if line.is_empty() {
            return Command::Goto(self);
        }

        match self {
            State::LoginInput => Command::CheckLogin {
                login: line.to_string(),
            },
            State::PasswordInput { login } => Command::Authenticate {
                login,
                digest: digest(line),
            },
            State::CreateLogin => Command::CheckNewLogin {
                login: line.to_string(),
            },
            State::CreateNickname { login } => Command::CheckNickname {
                login,
                name: line.to_string(),
            },
            State::CreatePassword { login, name } => Command::Register {
                login,
                name,
                digest: digest(line),
            },
            State::AddresseeInput => Command::CheckAddressee {
                name: line.to_string(),
            },
            State::MessageInput { addressee } => Command::Send {
                addressee,
                text: line.to_string(),
            },
            other => Command::Goto(other),
        }
    }

    /// Dispatch a parsed menu digit.
    fn on_choice(self, choice: u32) -> Command {
        match (self, choice) {
            (State::Start, 1) => Command::Goto(State::LoginInput),
            (State::Start, 2) => Command::Goto(State::CreateLogin),
            (State::Start, 3) => Command::Goto(State::Exit),

            (State::LoginUnregistered, 1) => Command::Goto(State::LoginInput),
            (State::LoginUnregistered, 2) => Command::Goto(State::CreateLogin),

            (State::LoginRegistered { login }, 1) => Command::Goto(State::PasswordInput { login }),
            (State::LoginRegistered { .. }, 2) => Command::Goto(State::CreateLogin),

            (State::PasswordIncorrect { login }, 1) => {
                Command::Goto(State::PasswordInput { login })
            }
            (State::PasswordIncorrect { .. }, 2) => Command::Goto(State::Start),

            (State::NicknameTaken { login }, 1) => Command::Goto(State::CreateNickname { login }),
            (State::NicknameTaken { .. }, 2) => Command::Goto(State::Start),

            (State::InChat, 1) => Command::Goto(State::AddresseeInput),
            (State::InChat, 2) => Command::ReadMessages,
            (State::InChat, 3) => Command::ListUsers,
            (State::InChat, 4) => Command::Logout,
            (State::InChat, 5) => Command::DeleteAccount,

            (State::AddresseeMissing, 1) => Command::Goto(State::AddresseeInput),
            (State::AddresseeMissing, 2) => Command::Goto(State::InChat),

            (state, _) => Command::Goto(state),
        }
    }
}
