use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{0}'")]
    SelectorError(String),

    #[error("Variant {variant_id} has no option label for trait '{trait_name}' (index {index})")]
    TraitLookup {
        variant_id: String,
        trait_name: String,
        index: i64,
    },

    #[error("Variant {variant_id} could not be decoded: {source}")]
    MalformedVariant {
        variant_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
