//! HTTP client adapter for the chat gateway port.

pub mod gateway;

pub use gateway::HttpChatGateway;
