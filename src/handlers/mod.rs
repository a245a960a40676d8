// Handlers module

pub mod chat;
pub mod rejection;

pub use chat::chat_handler;
pub use rejection::handle_rejection;
