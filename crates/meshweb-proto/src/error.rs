use crate::hash::ParseHashError;

/// Errors surfaced across the mesh-substrate boundary.
///
/// This mirrors the granularity of an `lxmf-sdk::error::SdkError`-style enum
/// without its machine-code/category apparatus, which is overkill for a
/// narrow substrate contract — the concrete adapters that implement
/// [`crate::adapter::MeshAdapter`] are expected to map their own richer
/// error types down into these variants.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("invalid destination hash: {0}")]
    InvalidHash(#[from] ParseHashError),

    #[error("no path known to {0} and path discovery timed out")]
    PathUnreachable(String),

    #[error("identity for {0} could not be loaded or created")]
    IdentityUnavailable(String),

    #[error("send to {destination} failed: {reason}")]
    SendFailed { destination: String, reason: String },

    #[error("announce failed: {0}")]
    AnnounceFailed(String),

    #[error("substrate transport error: {0}")]
    Transport(String),
}
