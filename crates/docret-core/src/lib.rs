//! Core building blocks for docret: data models, the text chunker and the
//! embedding provider abstraction.

pub mod chunker;
pub mod embeddings;
pub mod models;
