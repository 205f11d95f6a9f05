//! wa-render — WhatsApp image-generation relay.
//!
//! Receives WhatsApp Business webhook events, extracts a text prompt
//! from each inbound message, renders an image for it, and replies to
//! the sender with the result. Stateless: nothing outlives a single
//! webhook call except the process-wide configuration.

pub mod config;
pub mod error;
pub mod imagegen;
pub mod messaging;
pub mod webhook;
