use thiserror::Error;

/// Import failure. The active collection is left untouched whenever one is returned.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON document must be an array of objects")]
    NotAnArray,

    #[error("JSON element {index} is not an object")]
    NotAnObject { index: usize },

    #[error("empty or invalid file")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("exported rows must serialize to key-value objects")]
    NotAnObject,

    #[error("record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8")]
    Utf8,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}
