//! Session domain.
//!
//! - [`record::SessionRecord`] — a saved transcript with its save time
//! - [`stream::StreamEvent`] — events in a streaming chat response

pub mod record;
pub mod stream;
