use thiserror::Error;

/// Failure kinds surfaced across collaborator boundaries.
///
/// Everything here degrades to a retryable state for the caller; nothing
/// is fatal to the process. Internal plumbing uses `anyhow` and converts
/// at the boundary of the operation that touched the collaborator.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// Camera/microphone permission denied or no device present.
    #[error("device access failed: {0}")]
    DeviceAccess(String),

    /// Network or API failure against the remote intelligence service.
    #[error("remote service failure: {0}")]
    RemoteService(String),
}

impl CompanionError {
    pub fn device_access(msg: impl Into<String>) -> Self {
        Self::DeviceAccess(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteService(msg.into())
    }
}
