pub mod error;
pub mod extract;
pub mod fetcher;
pub mod resolve;
pub mod result;

pub use error::ScanError;
pub use extract::{find_json_objects, find_key};
pub use fetcher::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Fetcher, FetcherConfig};
pub use resolve::{resolve_page, resolve_variants, SelectionLabels};
pub use result::{FetchedPage, VariantListing, VariantRecord};
