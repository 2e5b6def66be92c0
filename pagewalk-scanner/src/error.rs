use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
