use anyhow::{anyhow, Context};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Empty id is not allowed")]
    EmptyId,

    #[error("Invalid vote type {0}, expected 1 or -1")]
    InvalidVoteType(i8),

    #[error("Backend error {code}: {message}")]
    Backend { code: String, message: String },
}

impl Error {
    /// Parses the JSON error body returned by the backend's REST layer
    ///
    /// The body looks like `{"code": "...", "message": "...", "details": ..., "hint": ...}`
    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = data
            .get("message")
            .and_then(|msg| msg.as_str())
            .ok_or_else(|| anyhow!("error message is not a string"))?;
        Ok(match data.get("code").and_then(|c| c.as_str()) {
            Some(code) => Error::Backend {
                code: String::from(code),
                message: String::from(message),
            },
            None => Error::Unknown(String::from(message)),
        })
    }
}
