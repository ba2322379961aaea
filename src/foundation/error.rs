/// Convenience result type used across slidereel.
pub type SlideResult<T> = Result<T, SlideError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlideError {
    /// Missing, unreadable, or corrupt job configuration file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Page image that cannot be decoded or has degenerate dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Document rasterization failed or produced no pages.
    #[error("rasterize error: {0}")]
    Rasterize(String),

    /// Underlying video encoder failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Temporary artifacts could not be removed after a conversion.
    #[error("cleanup error: {0}")]
    Cleanup(String),

    /// Invalid caller-provided values (canvas size, fps, paths).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlideError {
    /// Build a [`SlideError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`SlideError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Build a [`SlideError::Rasterize`] value.
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Build a [`SlideError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`SlideError::Cleanup`] value.
    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    /// Build a [`SlideError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
