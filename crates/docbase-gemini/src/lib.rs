//! # docbase-gemini
//!
//! Generative-language backend for docbase: the HTTP client, the prompt
//! catalogue, and best-effort parsing of model replies back into typed
//! document content.
//!
//! Everything here is optional from the caller's point of view. A missing
//! or failing backend degrades documentation operations; it never blocks
//! them.

pub mod backend;
pub mod client;
pub mod parse;
pub mod prompt;

pub use backend::GenerativeBackend;
pub use client::{GeminiClient, GenerationConfig, DEFAULT_BASE_URL};
pub use parse::{parse_content_reply, parse_ranked_ids};
