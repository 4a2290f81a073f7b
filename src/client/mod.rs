//! Console client: transports, typed server API and the menu state machine.

mod api;
pub mod console;
mod session;
mod state;
mod transport;

pub use api::ServerApi;
pub use session::Session;
pub use state::{parse_choice, Command, State};
pub use transport::{LocalTransport, RemoteTransport, Transport};
