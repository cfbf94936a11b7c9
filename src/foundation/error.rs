/// Result alias used across the crate.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors raised by buffer access and the codec.
#[derive(thiserror::Error, Debug)]
pub enum BufferError {
    /// The host refused to allocate a buffer (bad geometry or format, out of memory).
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A plane's memory could not be read during encode or copy.
    #[error("missing data for plane {plane}")]
    MissingPlaneData {
        /// Plane index.
        plane: usize,
    },

    /// A non-planar buffer's memory could not be read during encode or copy.
    #[error("missing buffer data")]
    MissingData,

    /// A record's bytes do not fit the buffer allocated for it.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// A record lacks a key its shape requires.
    #[error("missing key '{0}'")]
    MissingKey(String),

    /// The host rejected a lock or unlock.
    #[error("lock error: {0}")]
    Lock(String),

    /// Structured-format error, passed through unchanged.
    #[error(transparent)]
    Format(#[from] serde_json::Error),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BufferError {
    /// Build an [`BufferError::Allocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`BufferError::CorruptData`].
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptData(msg.into())
    }

    /// Build a [`BufferError::MissingKey`].
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }

    /// Build a [`BufferError::Lock`].
    pub fn lock(msg: impl Into<String>) -> Self {
        Self::Lock(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
