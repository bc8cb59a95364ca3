//! Wire payloads exchanged with the relay and backend.

use crate::chat::entities::Message;
use crate::chat::options::{Rerank, SendOptions};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/chat` and `POST /api/chat/stream`.
///
/// `history` carries the prior turns only — the current question travels
/// in `question` and is never duplicated into the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub history: Vec<Message>,
    pub k: u32,
    pub model: String,
    pub temperature: f32,
    pub use_hyde: bool,
    pub rerank: Rerank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_top_n: Option<u32>,
}

impl ChatRequest {
    /// Build a request from the question, the transcript as it existed
    /// before the question was appended, and the send options.
    pub fn new(question: impl Into<String>, history: Vec<Message>, options: &SendOptions) -> Self {
        Self {
            question: question.into(),
            history,
            k: options.k,
            model: options.model.clone(),
            temperature: options.temperature,
            use_hyde: options.use_hyde,
            rerank: options.rerank,
            rerank_top_n: options.rerank_top_n,
        }
    }
}

/// Response body of the non-streaming route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_not_duplicated_into_history() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let request = ChatRequest::new("what next?", history, &SendOptions::default());

        assert_eq!(request.question, "what next?");
        assert_eq!(request.history.len(), 2);
        assert!(request.history.iter().all(|m| m.content != "what next?"));
    }

    #[test]
    fn rerank_top_n_is_omitted_when_unset() {
        let request = ChatRequest::new("q", Vec::new(), &SendOptions::default());
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("rerank_top_n").is_none());
        assert_eq!(json["k"], 5);
        assert_eq!(json["rerank"], "none");
    }

    #[test]
    fn rerank_top_n_is_present_when_set() {
        let options = SendOptions::default().with_rerank_top_n(7);
        let request = ChatRequest::new("q", Vec::new(), &options);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["rerank_top_n"], 7);
    }

    #[test]
    fn answer_parses_from_backend_json() {
        let answer: ChatAnswer = serde_json::from_str(r#"{"answer":"Hi there"}"#).unwrap();
        assert_eq!(answer.answer, "Hi there");
    }
}
