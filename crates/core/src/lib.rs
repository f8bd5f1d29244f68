//! # CityGuide Core
//!
//! Domain types, traits, and error definitions for the CityGuide assistant.
//! This crate has **no I/O**: it defines the domain model that all other
//! crates implement against.
//!
//! Every external collaborator (text generation, embeddings, vector
//! collection, retrieval, tools) is a trait here. Implementations live in
//! their own crates, and tests substitute fakes.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod knowledge;

// Re-export key types at crate root for ergonomics
pub use error::Error;
pub use message::{Message, Role, ConversationId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolChoice};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use knowledge::{KnowledgeRecord, RecordMetadata, RetrievalHit, Retriever, VectorCollection};
