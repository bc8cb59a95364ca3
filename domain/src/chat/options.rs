//! Per-send options forwarded to the backend.
//!
//! Everything here is an opaque passthrough: the backend interprets `k`,
//! `rerank` and friends; the client only supplies defaults and serializes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default model identifier sent when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Reranking strategy applied by the backend to retrieved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rerank {
    #[default]
    None,
    Cheap,
    Llm,
}

impl fmt::Display for Rerank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rerank::None => "none",
            Rerank::Cheap => "cheap",
            Rerank::Llm => "llm",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Rerank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Rerank::None),
            "cheap" => Ok(Rerank::Cheap),
            "llm" => Ok(Rerank::Llm),
            other => Err(format!("unknown rerank mode: {}", other)),
        }
    }
}

/// Options for a single send.
///
/// `stream` picks the relay route; the rest rides along in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOptions {
    /// Use the streaming route (default) or the single-shot one.
    pub stream: bool,
    /// Number of retrieved context chunks the backend should consider.
    pub k: u32,
    /// Model identifier, understood only by the backend.
    pub model: String,
    pub temperature: f32,
    /// Ask the backend to expand the question with a hypothetical answer
    /// before retrieval.
    pub use_hyde: bool,
    pub rerank: Rerank,
    /// How many candidates survive reranking. Omitted from the payload
    /// when unset.
    pub rerank_top_n: Option<u32>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            stream: true,
            k: 5,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            use_hyde: false,
            rerank: Rerank::None,
            rerank_top_n: None,
        }
    }
}

impl SendOptions {
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_use_hyde(mut self, use_hyde: bool) -> Self {
        self.use_hyde = use_hyde;
        self
    }

    pub fn with_rerank(mut self, rerank: Rerank) -> Self {
        self.rerank = rerank;
        self
    }

    pub fn with_rerank_top_n(mut self, n: u32) -> Self {
        self.rerank_top_n = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let options = SendOptions::default();
        assert!(options.stream);
        assert_eq!(options.k, 5);
        assert_eq!(options.model, "openai/gpt-4o-mini");
        assert_eq!(options.temperature, 0.2);
        assert!(!options.use_hyde);
        assert_eq!(options.rerank, Rerank::None);
        assert_eq!(options.rerank_top_n, None);
    }

    #[test]
    fn builders_override_fields() {
        let options = SendOptions::default()
            .with_stream(false)
            .with_k(12)
            .with_model("openai/gpt-4o")
            .with_rerank(Rerank::Cheap)
            .with_rerank_top_n(3);
        assert!(!options.stream);
        assert_eq!(options.k, 12);
        assert_eq!(options.model, "openai/gpt-4o");
        assert_eq!(options.rerank, Rerank::Cheap);
        assert_eq!(options.rerank_top_n, Some(3));
    }

    #[test]
    fn rerank_parses_and_displays() {
        assert_eq!("none".parse::<Rerank>().unwrap(), Rerank::None);
        assert_eq!("cheap".parse::<Rerank>().unwrap(), Rerank::Cheap);
        assert_eq!("llm".parse::<Rerank>().unwrap(), Rerank::Llm);
        assert!("best".parse::<Rerank>().is_err());
        assert_eq!(Rerank::Cheap.to_string(), "cheap");
    }

    #[test]
    fn rerank_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Rerank::Llm).unwrap(), r#""llm""#);
    }
}
