use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cannot encode query string: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("cannot parse form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// Decodes a JSON response body.
pub fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(body)?)
}
