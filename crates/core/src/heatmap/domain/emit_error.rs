use thiserror::Error;

/// Reasons an emit cycle produced no artifact. None of these affect the
/// grid; the next qualifying tick simply tries again.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("could not allocate {bytes} byte scratch buffer")]
    ScratchAllocation {
        bytes: usize,
        #[source]
        source: std::collections::TryReserveError,
    },
    #[error("frame conversion failed: {0}")]
    Conversion(String),
    #[error("failed to write heatmap: {0}")]
    Write(String),
}
