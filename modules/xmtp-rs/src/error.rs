use thiserror::Error;

pub type Result<T> = std::result::Result<T, XmtpError>;

#[derive(Debug, Error)]
pub enum XmtpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),
}

impl From<reqwest::Error> for XmtpError {
    fn from(err: reqwest::Error) -> Self {
        XmtpError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for XmtpError {
    fn from(err: serde_json::Error) -> Self {
        XmtpError::Parse(err.to_string())
    }
}
