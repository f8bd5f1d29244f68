//! Knowledge base for CityGuide: vector collections, CSV ingestion and
//! similarity retrieval.

pub mod vector;
pub mod in_memory;
pub mod file_store;
pub mod ingest;
pub mod retrieval;

pub use in_memory::InMemoryCollection;
pub use file_store::{FileCollection, FileStore};
pub use ingest::read_csv;
pub use retrieval::RetrievalStore;
pub use vector::{cosine_distance, cosine_similarity, nearest};
