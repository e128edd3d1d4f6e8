mod handler;
mod model;

pub use handler::{ask_rag, clear_session, submit_feedback};
pub use model::{ConversationResponse, StatusResponse};
