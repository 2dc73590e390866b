use thiserror::Error;

/// Classified failures that callers are expected to match on.
///
/// Loaders return `anyhow::Result`; these variants are raised through
/// `anyhow::bail!` so the original classification survives `downcast_ref`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid scene config: {0}")]
    InvalidConfig(String),
    #[error("scene construction failed: {0}")]
    Construction(String),
    #[error("carousel has no items")]
    EmptyCarousel,
}
