//! Central error handling for the post-processing chain.
//!
//! Fallible resource operations (render target creation, shader compilation)
//! return [`PostFxResult`]. Call-order contract violations are programmer
//! errors and are reported through `assert!` panics with a precondition
//! message instead; see the state machine docs on
//! [`crate::manager::PostFxManager`].

/// Centralized error type for all chain operations.
#[derive(thiserror::Error, Debug)]
pub enum PostFxError {
    #[error("Device error: {0}")]
    Device(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl PostFxError {
    /// Convenience constructors for common error categories.
    pub fn device<T: ToString>(msg: T) -> Self {
        PostFxError::Device(msg.to_string())
    }

    pub fn shader<T: ToString>(msg: T) -> Self {
        PostFxError::Shader(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        PostFxError::Render(msg.to_string())
    }
}

/// Result type alias for chain operations.
pub type PostFxResult<T> = Result<T, PostFxError>;
