//! LLM provider implementations for CityGuide.
//!
//! The assistant talks to a single OpenAI-compatible gateway for both chat
//! completions and embeddings. It implements `cityguide_core::Provider`.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
