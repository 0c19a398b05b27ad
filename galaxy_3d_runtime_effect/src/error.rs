//! Error types for Galaxy3D runtime effects
//!
//! Covers shader registration, pipeline construction, resource binding
//! and backend faults raised while assembling a runtime effect draw.

use std::fmt;

/// Result type for runtime effect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime effect errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (device, compiler, render pass)
    BackendError(String),

    /// Invalid resource (missing texture input, short uniform data, sealed buffer, etc.)
    InvalidResource(String),

    /// The backend compiler rejected or failed to build an entry point
    ShaderCompilationFailed(String),

    /// An entry point reported as registered could not be fetched back
    ShaderFunctionMissing(String),

    /// The backend rejected a pipeline descriptor
    PipelineCreationFailed(String),

    /// A uniform uses a type the binder cannot stage (binding stops there)
    UnsupportedUniformType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::ShaderCompilationFailed(entry_point) => {
                write!(f, "Shader compilation failed (entry point: {})", entry_point)
            }
            Error::ShaderFunctionMissing(entry_point) => {
                write!(f, "Shader function missing after registration (entry point: {})", entry_point)
            }
            Error::PipelineCreationFailed(label) => {
                write!(f, "Pipeline creation failed: {}", label)
            }
            Error::UnsupportedUniformType(name) => {
                write!(f, "Unsupported uniform type for {}", name)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
