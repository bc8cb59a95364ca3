//! Port definitions (interfaces to infrastructure and presentation)

pub mod chat_gateway;
pub mod chat_observer;
pub mod conversation_logger;
pub mod session_store;
