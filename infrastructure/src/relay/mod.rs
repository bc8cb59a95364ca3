//! Relay service fronting the answer backend.
//!
//! Two POST routes, one per transport mode, each forwarding the incoming
//! body to the configured backend origin and relaying status and body
//! back — byte-for-byte and unbuffered for the streaming route.

pub mod routes;

pub use routes::{RelayState, build_router, serve};
