//! Security module for CityGuide: input guardrails.
//!
//! Provides:
//! - **Restricted topics**: a fixed list of subjects the assistant declines
//! - **Prompt attacks**: attempts to read or rewrite the assistant's instructions

pub mod guardrails;

pub use guardrails::{BlockReason, Guardrails, Verdict};
