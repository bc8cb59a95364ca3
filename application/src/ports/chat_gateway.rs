//! Chat gateway port
//!
//! Defines the interface for talking to the relay (and through it, the
//! backend that actually answers questions).

use async_trait::async_trait;
use cvchat_domain::{Message, SendOptions, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-OK HTTP status. `message` carries the relayed response body
    /// text, or `HTTP <status>` when the body was empty.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request was superseded or reset before it finished.
    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

/// Handle for receiving streaming events from an in-flight chat request.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The sender side lives in the
/// gateway's reader task, which stops (dropping the sender) when the
/// stream ends or the cancellation token fires.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => return Ok(text),
                StreamEvent::Error(message) => {
                    return Err(GatewayError::Connection(message));
                }
            }
        }
        Ok(full_text)
    }
}

/// Gateway for chat communication.
///
/// The application layer sees two shapes of a send: a single-shot answer
/// and a stream of deltas. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post a question with its prior history and wait for the full answer.
    async fn ask(
        &self,
        question: &str,
        history: &[Message],
        options: &SendOptions,
        cancel: CancellationToken,
    ) -> Result<String, GatewayError>;

    /// Post a question and return a handle yielding the answer chunk by
    /// chunk. Cancelling the token stops the underlying read loop.
    async fn ask_streaming(
        &self,
        question: &str,
        history: &[Message],
        options: &SendOptions,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_concatenates_deltas() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("Hel".to_string())).await.unwrap();
        tx.send(StreamEvent::Delta("lo".to_string())).await.unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn collect_text_prefers_completed_payload() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("Hel".to_string())).await.unwrap();
        tx.send(StreamEvent::Completed("Hello".to_string()))
            .await
            .unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn collect_text_surfaces_stream_errors() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Error("connection reset".to_string()))
            .await
            .unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
