pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed input for {op}: {reason}")]
    MalformedInput { op: &'static str, reason: String },

    #[error("worker panic: {0}")]
    WorkerPanic(String),

    #[error("worker disconnected")]
    Disconnected,

    #[error("executor error: {0}")]
    Executor(String),

    #[cfg(feature = "gpu")]
    #[error("GPU error: {0}")]
    Gpu(String),

    #[cfg(feature = "async")]
    #[error("async error: {0}")]
    Async(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn malformed<S: Into<String>>(op: &'static str, reason: S) -> Self {
        Error::MalformedInput {
            op,
            reason: reason.into(),
        }
    }

    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }

    #[cfg(feature = "gpu")]
    pub fn gpu<S: Into<String>>(msg: S) -> Self {
        Error::Gpu(msg.into())
    }

    #[cfg(feature = "async")]
    pub fn async_error<S: Into<String>>(msg: S) -> Self {
        Error::Async(msg.into())
    }
}
