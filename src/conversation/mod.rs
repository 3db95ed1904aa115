//! In-memory chat conversation: message log, busy guard and the session
//! driver that runs requests against a transport.

pub mod machine;
pub mod message;
pub mod session;

pub use machine::{APOLOGY_MESSAGE, ConversationState, PendingRequest, Phase, WELCOME_MESSAGE};
pub use message::{Message, Role};
pub use session::ChatSession;
