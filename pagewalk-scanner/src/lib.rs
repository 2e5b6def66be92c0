pub mod address;
pub mod error;
pub mod extract;
pub mod fetch;

pub use address::Address;
pub use error::ScanError;
pub use extract::{Extractor, HtmlExtractor};
pub use fetch::{Fetcher, HttpFetcher};
