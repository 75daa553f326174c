use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    TypeMismatch(#[from] sheetbase_datatype::error::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] sheetbase_catalog::error::Error),
}
