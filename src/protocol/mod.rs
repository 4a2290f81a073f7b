//! Wire protocol between the console client and the server.
//!
//! Every exchange is one request frame followed by one response frame.

mod framing;
mod messages;

pub use framing::{read_frame, write_frame, DEFAULT_MAX_FRAME_BYTES, DEFAULT_MAX_RESPONSE_BYTES};
pub use messages::{Request, Response, NOT_LOGGED_IN};
