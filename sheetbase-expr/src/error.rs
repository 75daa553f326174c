use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("bad filter format: {0}")]
    BadFilterFormat(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] sheetbase_catalog::error::Error),
}

#[inline]
pub(crate) fn bad_filter(msg: impl Into<String>) -> Error {
    Error::BadFilterFormat(msg.into())
}
