//! Chat turns use case.
//!
//! [`ChatTurns`] owns the transcript and drives one send at a time against
//! the [`ChatGateway`]: optimistic user append, streamed or single-shot
//! answer, inline error rendering, and persistence through the
//! [`SessionStore`] on every change.
//!
//! # Concurrency discipline
//!
//! At most one request is outstanding. Starting a new send cancels the
//! previous one's [`CancellationToken`]; the superseded turn stops reading
//! chunks and stops mutating state, but whatever it already appended stays
//! in the transcript (a partial answer is kept, not rolled back). There is
//! no retry and no timeout anywhere — a request waits until it finishes,
//! fails, or is cancelled by a newer send or a reset.

use crate::ports::chat_gateway::{ChatGateway, GatewayError};
use crate::ports::chat_observer::ChatObserver;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::session_store::SessionStore;
use cvchat_domain::{Message, SendOptions, StreamEvent};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct TurnState {
    messages: Vec<Message>,
    is_loading: bool,
}

/// Conversation state machine for the chat client.
///
/// Restores the transcript from the session store at construction and
/// saves it back after every mutation. Callers observe progress through
/// the [`ChatObserver`] passed to [`send`](Self::send) and through the
/// [`messages`](Self::messages) / [`is_loading`](Self::is_loading)
/// accessors.
pub struct ChatTurns {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<dyn SessionStore>,
    logger: Arc<dyn ConversationLogger>,
    state: Mutex<TurnState>,
    active: Mutex<Option<CancellationToken>>,
}

impl ChatTurns {
    /// Create the use case, restoring any unexpired session from `store`.
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Arc<dyn SessionStore>) -> Self {
        let messages = store.load().map(|r| r.messages).unwrap_or_default();
        if !messages.is_empty() {
            debug!("restored {} messages from saved session", messages.len());
        }

        Self {
            gateway,
            store,
            logger: Arc::new(NoConversationLogger),
            state: Mutex::new(TurnState {
                messages,
                is_loading: false,
            }),
            active: Mutex::new(None),
        }
    }

    /// Attach a conversation logger.
    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Current transcript, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    /// True while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().is_loading
    }

    /// Send a question and fold the answer into the transcript.
    ///
    /// Empty or whitespace-only input is a no-op: no request, no state
    /// change. Otherwise the user message is appended before any await,
    /// the previous in-flight request (if any) is cancelled, and the turn
    /// runs to completion, error, or cancellation. Nothing is returned;
    /// results land in the transcript.
    pub async fn send(&self, text: &str, options: &SendOptions, observer: &dyn ChatObserver) {
        let question = text.trim();
        if question.is_empty() {
            return;
        }

        // Snapshot the history before the optimistic append: the payload
        // carries the question separately from prior turns.
        let (history, slot) = {
            let mut state = self.state.lock().unwrap();
            let history = state.messages.clone();
            state.messages.push(Message::user(question));
            state.is_loading = true;
            (history, state.messages.len())
        };
        self.persist();
        observer.on_user_message(question);
        self.logger.log(ConversationEvent::new(
            "user_message",
            json!({ "content": question }),
        ));

        // One outstanding request at a time: a new send supersedes the old.
        let cancel = CancellationToken::new();
        if let Some(previous) = self.active.lock().unwrap().replace(cancel.clone()) {
            debug!("superseding in-flight request");
            previous.cancel();
        }

        debug!(
            "sending question ({} chars, {} prior turns, stream={})",
            question.len(),
            history.len(),
            options.stream
        );

        if options.stream {
            self.stream_turn(question, history, options, slot, &cancel, observer)
                .await;
        } else {
            self.single_turn(question, history, options, &cancel, observer)
                .await;
        }

        // Cleanup for the turn that still owns the active slot. A turn that
        // was superseded or reset leaves the flag to its successor.
        let mut active = self.active.lock().unwrap();
        if !cancel.is_cancelled() {
            active.take();
            self.state.lock().unwrap().is_loading = false;
        }
    }

    /// Abort any in-flight request, wipe the transcript, and delete the
    /// persisted record. No network call is made.
    pub fn reset(&self) {
        if let Some(active) = self.active.lock().unwrap().take() {
            active.cancel();
        }
        {
            let mut state = self.state.lock().unwrap();
            state.messages.clear();
            state.is_loading = false;
        }
        self.store.clear();
        self.logger
            .log(ConversationEvent::new("session_reset", json!({})));
    }

    /// Clean-exit hook: abort in-flight work and delete the persisted
    /// record, leaving the in-memory transcript untouched. The next run
    /// starts fresh, mirroring a session that ends when its window closes.
    pub fn end_session(&self) {
        if let Some(active) = self.active.lock().unwrap().take() {
            active.cancel();
        }
        self.store.clear();
    }

    async fn single_turn(
        &self,
        question: &str,
        history: Vec<Message>,
        options: &SendOptions,
        cancel: &CancellationToken,
        observer: &dyn ChatObserver,
    ) {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = self
                .gateway
                .ask(question, &history, options, cancel.clone()) => result,
        };

        match result {
            Ok(answer) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.messages.push(Message::assistant(answer.clone()));
                }
                self.persist();
                observer.on_assistant_message(&answer);
                self.logger.log(ConversationEvent::new(
                    "assistant_message",
                    json!({ "content": answer, "streamed": false }),
                ));
            }
            Err(error) if error.is_cancelled() => {}
            Err(error) => self.fail_turn(&error.to_string(), observer),
        }
    }

    async fn stream_turn(
        &self,
        question: &str,
        history: Vec<Message>,
        options: &SendOptions,
        slot: usize,
        cancel: &CancellationToken,
        observer: &dyn ChatObserver,
    ) {
        let handle = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = self
                .gateway
                .ask_streaming(question, &history, options, cancel.clone()) => match result {
                Ok(handle) => handle,
                Err(error) if error.is_cancelled() => return,
                Err(error) => {
                    self.fail_turn(&error.to_string(), observer);
                    return;
                }
            },
        };

        // Placeholder for the answer. Its index was fixed when this turn
        // started; the single-in-flight rule keeps it valid while chunks
        // are applied.
        {
            let mut state = self.state.lock().unwrap();
            state.messages.push(Message::assistant(""));
        }
        self.persist();

        let mut receiver = handle.receiver;
        let mut acc = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                event = receiver.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    acc.push_str(&chunk);
                    self.rewrite_slot(slot, &acc);
                    self.persist();
                    observer.on_assistant_delta(&chunk);
                }
                Some(StreamEvent::Completed(full)) => {
                    self.rewrite_slot(slot, &full);
                    self.persist();
                    observer.on_assistant_message(&full);
                    self.logger.log(ConversationEvent::new(
                        "assistant_message",
                        json!({ "content": full, "streamed": true }),
                    ));
                    return;
                }
                Some(StreamEvent::Error(message)) => {
                    self.fail_turn(&message, observer);
                    return;
                }
                None => {
                    // Stream ended without a terminal event; the last
                    // applied accumulator is the answer.
                    observer.on_assistant_message(&acc);
                    self.logger.log(ConversationEvent::new(
                        "assistant_message",
                        json!({ "content": acc, "streamed": true }),
                    ));
                    return;
                }
            }
        }
    }

    fn rewrite_slot(&self, slot: usize, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.messages[slot] = Message::assistant(content);
    }

    /// Append the inline error entry for a failed turn. No retry.
    fn fail_turn(&self, message: &str, observer: &dyn ChatObserver) {
        warn!("chat turn failed: {}", message);
        let content = format!("⚠️ {}", message);
        {
            let mut state = self.state.lock().unwrap();
            state.messages.push(Message::assistant(content.clone()));
        }
        self.persist();
        observer.on_turn_error(&content);
        self.logger.log(ConversationEvent::new(
            "turn_error",
            json!({ "content": content }),
        ));
    }

    fn persist(&self) {
        let messages = self.state.lock().unwrap().messages.clone();
        self.store.save(&messages);
    }
}
