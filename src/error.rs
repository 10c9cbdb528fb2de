pub type FramemarkResult<T> = Result<T, FramemarkError>;

#[derive(thiserror::Error, Debug)]
pub enum FramemarkError {
    #[error("validation error: {0}")]
    Validation(String),

    /// The live display box has no positive size yet. Recovered locally by
    /// callers (defer or skip); never surfaced to the user as an error.
    #[error("viewport not ready: {0}")]
    NotReady(String),

    /// Nothing was drawn, so there is nothing to save. Distinct from a
    /// persisted record that happens to contain zero shapes.
    #[error("empty capture: {0}")]
    EmptyCapture(String),

    /// A persisted canvas envelope is structurally unusable. The viewer
    /// treats this as a no-render condition, not a crash.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A single shape failed to reconstruct into a visual object. The
    /// overlay skips that shape and continues with the rest.
    #[error("instantiation error: {0}")]
    Instantiation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramemarkError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    pub fn empty_capture(msg: impl Into<String>) -> Self {
        Self::EmptyCapture(msg.into())
    }

    pub fn malformed_record(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    pub fn instantiation(msg: impl Into<String>) -> Self {
        Self::Instantiation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
