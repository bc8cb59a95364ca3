//! reqwest-backed implementation of [`ChatGateway`].
//!
//! Talks to the relay's two routes: `POST /api/chat` for a single-shot
//! answer and `POST /api/chat/stream` for a chunked text stream. The
//! streaming variant hands the response body to a background reader task
//! that decodes each chunk as UTF-8 text and forwards it as a
//! [`StreamEvent::Delta`], ending with [`StreamEvent::Completed`] carrying
//! the accumulated answer.

use async_trait::async_trait;
use cvchat_application::ports::chat_gateway::{ChatGateway, GatewayError, StreamHandle};
use cvchat_domain::{ChatAnswer, ChatRequest, Message, SendOptions, StreamEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Relay route for single-shot answers.
pub const CHAT_ROUTE: &str = "/api/chat";
/// Relay route for streamed answers.
pub const CHAT_STREAM_ROUTE: &str = "/api/chat/stream";

/// Chat gateway speaking HTTP to the relay.
pub struct HttpChatGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatGateway {
    /// Create a gateway for the relay at `base_url` (scheme + authority,
    /// no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a gateway with a caller-supplied client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// POST the payload, honouring cancellation, and surface non-OK
    /// statuses as [`GatewayError::Upstream`] carrying the body text.
    async fn post(
        &self,
        route: &str,
        payload: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, GatewayError> {
        let request = self.client.post(self.url(route)).json(payload).send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
            response = request => {
                response.map_err(|e| GatewayError::Connection(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            };
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn ask(
        &self,
        question: &str,
        history: &[Message],
        options: &SendOptions,
        cancel: CancellationToken,
    ) -> Result<String, GatewayError> {
        let payload = ChatRequest::new(question, history.to_vec(), options);
        let response = self.post(CHAT_ROUTE, &payload, &cancel).await?;

        let answer: ChatAnswer = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(answer.answer)
    }

    async fn ask_streaming(
        &self,
        question: &str,
        history: &[Message],
        options: &SendOptions,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, GatewayError> {
        let payload = ChatRequest::new(question, history.to_vec(), options);
        let response = self.post(CHAT_STREAM_ROUTE, &payload, &cancel).await?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut acc = String::new();

            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("stream read cancelled");
                        return;
                    }
                    chunk = stream.next() => chunk,
                };

                match chunk {
                    Some(Ok(bytes)) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        acc.push_str(&text);
                        if tx.send(StreamEvent::Delta(text)).await.is_err() {
                            // Receiver went away; stop reading.
                            return;
                        }
                    }
                    Some(Err(error)) => {
                        let _ = tx.send(StreamEvent::Error(error.to_string())).await;
                        return;
                    }
                    None => {
                        let _ = tx.send(StreamEvent::Completed(acc)).await;
                        return;
                    }
                }
            }
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::extract::Json;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::time::Duration;

    async fn spawn_relay(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn ask_returns_the_answer_field() {
        async fn handler(Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(body["question"], "hello");
            assert_eq!(body["k"], 5);
            Json(json!({ "answer": "Hi there" }))
        }
        let base = spawn_relay(Router::new().route(CHAT_ROUTE, post(handler))).await;

        let gateway = HttpChatGateway::new(base);
        let answer = gateway
            .ask(
                "hello",
                &[],
                &SendOptions::default(),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(answer, "Hi there");
    }

    #[tokio::test]
    async fn non_ok_status_carries_the_body_text() {
        async fn handler() -> impl IntoResponse {
            (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
        }
        let base = spawn_relay(Router::new().route(CHAT_ROUTE, post(handler))).await;

        let gateway = HttpChatGateway::new(base);
        let error = gateway
            .ask("q", &[], &SendOptions::default(), CancellationToken::new())
            .await
            .unwrap_err();

        match error {
            GatewayError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_http_status() {
        async fn handler() -> impl IntoResponse {
            StatusCode::BAD_GATEWAY
        }
        let base = spawn_relay(Router::new().route(CHAT_ROUTE, post(handler))).await;

        let gateway = HttpChatGateway::new(base);
        let error = gateway
            .ask("q", &[], &SendOptions::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "HTTP 502");
    }

    #[tokio::test]
    async fn streaming_collects_chunks_in_order() {
        async fn handler() -> impl IntoResponse {
            let chunks: Vec<Result<&'static str, std::io::Error>> = vec![Ok("Hel"), Ok("lo")];
            Body::from_stream(futures::stream::iter(chunks))
        }
        let base = spawn_relay(Router::new().route(CHAT_STREAM_ROUTE, post(handler))).await;

        let gateway = HttpChatGateway::new(base);
        let handle = gateway
            .ask_streaming(
                "hello",
                &[],
                &SendOptions::default(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let text = handle.collect_text().await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn cancellation_stops_the_reader_task() {
        async fn handler() -> impl IntoResponse {
            let head = futures::stream::iter(vec![Ok::<_, std::io::Error>("first")]);
            Body::from_stream(head.chain(futures::stream::pending()))
        }
        let base = spawn_relay(Router::new().route(CHAT_STREAM_ROUTE, post(handler))).await;

        let cancel = CancellationToken::new();
        let gateway = HttpChatGateway::new(base);
        let mut handle = gateway
            .ask_streaming("hello", &[], &SendOptions::default(), cancel.clone())
            .await
            .unwrap();

        assert_eq!(
            handle.receiver.recv().await,
            Some(StreamEvent::Delta("first".to_string()))
        );

        cancel.cancel();
        // Reader exits without a terminal event: the channel just closes.
        let next = tokio::time::timeout(Duration::from_secs(1), handle.receiver.recv())
            .await
            .expect("receiver should close after cancellation");
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let gateway = HttpChatGateway::new("http://localhost:9999///");
        assert_eq!(gateway.url(CHAT_ROUTE), "http://localhost:9999/api/chat");
    }
}
