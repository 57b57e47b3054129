pub mod chunk_store;
pub mod document_store;
pub mod storage;

pub use chunk_store::ChunkStore;
pub use document_store::DocumentStore;
pub use storage::{Store, Tree};
