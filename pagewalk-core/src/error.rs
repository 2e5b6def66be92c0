use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No seed addresses were given")]
    NoSeeds,

    #[error("No analysis selected (enable broken links, spelling, grammar or archive)")]
    NoCapabilities,

    #[error("Failed to load word list {path}: {source}")]
    WordList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Word list {0} contains no words")]
    EmptyWordList(String),

    #[error("Failed to archive {address}: {source}")]
    Archive {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
