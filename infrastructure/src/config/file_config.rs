//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file and are
//! deserialized directly, with defaults matching the backend contract.

use cvchat_domain::{Rerank, SendOptions};
use serde::{Deserialize, Serialize};

/// Relay-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRelayConfig {
    /// Upstream backend origin. Unset is tolerated at startup; requests
    /// then fail with a configuration error.
    pub backend_url: Option<String>,
    /// Credential forwarded to the backend; empty when unset.
    pub api_key: String,
    /// Listen address for `cvchat serve`.
    pub bind: String,
}

impl Default for FileRelayConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            api_key: String::new(),
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Client-side chat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Relay origin the chat client talks to.
    pub relay_url: String,
    /// Stream answers (default) or wait for the whole reply.
    pub stream: bool,
    pub k: u32,
    pub model: String,
    pub temperature: f32,
    pub use_hyde: bool,
    /// One of "none", "cheap", "llm".
    pub rerank: String,
    pub rerank_top_n: Option<u32>,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        let defaults = SendOptions::default();
        Self {
            relay_url: "http://127.0.0.1:8787".to_string(),
            stream: defaults.stream,
            k: defaults.k,
            model: defaults.model,
            temperature: defaults.temperature,
            use_hyde: defaults.use_hyde,
            rerank: defaults.rerank.to_string(),
            rerank_top_n: defaults.rerank_top_n,
        }
    }
}

impl FileChatConfig {
    /// Convert to [`SendOptions`], falling back to the default rerank
    /// mode when the configured string does not parse.
    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            stream: self.stream,
            k: self.k,
            model: self.model.clone(),
            temperature: self.temperature,
            use_hyde: self.use_hyde,
            rerank: self.rerank.parse().unwrap_or(Rerank::None),
            rerank_top_n: self.rerank_top_n,
        }
    }
}

/// Session persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Persist the transcript across runs.
    pub persist: bool,
    /// Session file override; the platform cache directory when unset.
    pub file: Option<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            file: None,
        }
    }
}

/// Conversation log configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// JSONL conversation log path; logging is off when unset.
    pub conversation_file: Option<String>,
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub relay: FileRelayConfig,
    pub chat: FileChatConfig,
    pub session: FileSessionConfig,
    pub log: FileLogConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_send_options() {
        let config = FileConfig::default();
        assert_eq!(config.chat.send_options(), SendOptions::default());
        assert_eq!(config.relay.bind, "127.0.0.1:8787");
        assert!(config.relay.backend_url.is_none());
        assert!(config.session.persist);
    }

    #[test]
    fn unknown_rerank_string_falls_back_to_none() {
        let config = FileChatConfig {
            rerank: "fancy".to_string(),
            ..Default::default()
        };
        assert_eq!(config.send_options().rerank, Rerank::None);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [chat]
            model = "openai/gpt-4o"
            stream = false
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.model, "openai/gpt-4o");
        assert!(!config.chat.stream);
        assert_eq!(config.chat.k, 5);
    }
}
