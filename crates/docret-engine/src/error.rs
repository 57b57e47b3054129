use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("document {0} not found")]
    DocumentNotFound(u64),
}
