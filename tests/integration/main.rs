//! Integration test binary -- all integration tests consolidated into a single
//! binary to keep link times down.
//!
//! Every test drives the public API against a real `HttpGateway` talking to a
//! wiremock server.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod audio_dispatch;
mod config_roundtrip;
mod text_dispatch;
