use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: response code {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Transport error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

impl ApiError {
    /// Returns `true` if this error is a transport or server-side failure
    /// that a retry might resolve.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Bridge(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Decode { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
