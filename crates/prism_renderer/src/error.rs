//! Error types for the renderer.

use thiserror::Error;

/// Errors that can occur at the render-call boundary.
///
/// Misses, absorption and total internal reflection are ordinary outcomes of
/// the estimator and never show up here.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
