use thiserror::Error;

/// Why a host request produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request aborted")]
    Aborted,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<protocol::ProtocolError> for FetchError {
    fn from(err: protocol::ProtocolError) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Map provider failures surfaced by [`crate::ports::MapCanvas::create_map`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Provider script absent or not finished loading.
    #[error("map provider not loaded")]
    ProviderUnavailable,
    /// The page has no element to host the canvas.
    #[error("map container #{0} not found")]
    ContainerMissing(String),
    #[error("map provider error: {0}")]
    Provider(String),
}
