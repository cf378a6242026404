use kanal::SendError;
use tokio::sync::AcquireError;
use tokio::task::JoinError;

#[derive(Debug, thiserror::Error)]
pub enum FibonacciError {
    #[error("input argument 'index' must be 0 or higher, got {index}")]
    InvalidArgument { index: i64 },
    /// Only reachable on targets where `usize` is narrower than `i64`.
    #[error("index {index} does not fit in an in-memory sequence on this platform")]
    IndexTooLarge { index: i64 },
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,
    #[error("at least one concurrent task must be allowed")]
    InvalidConcurrency,
    #[error("Tokio Join error: {0:?}")]
    TokioJoin(#[from] JoinError),
    #[error("Thread join error: {0}")]
    ThreadJoin(String),
    #[error("Acquire error: {0:?}")]
    Acquire(#[from] AcquireError),
    #[error("Send error: {0:?}")]
    Send(#[from] SendError),
    #[error("cannot start a runtime from within a runtime, await the async builder instead")]
    NestedRuntime,
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FibonacciError>;
