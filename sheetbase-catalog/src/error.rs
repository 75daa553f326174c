use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("schema {0} already exists")]
    SchemaAlreadyExists(String),
    #[error("schema {0} not exists")]
    SchemaNotExists(String),
    #[error("table {0} already exists")]
    TableAlreadyExists(String),
    #[error("table {0} not exists")]
    TableNotExists(String),
    #[error("column {0} already exists")]
    ColumnAlreadyExists(String),
    #[error("column {0} not exists")]
    ColumnNotExists(String),
    #[error("constraint {0} already exists")]
    ConstraintAlreadyExists(String),
    #[error("constraint {0} not exists")]
    ConstraintNotExists(String),
    #[error("constraint must reference at least one column")]
    EmptyConstraint,
    #[error("multiple primary keys for table {0} are not allowed")]
    MultiplePrimaryKeys(String),
    #[error("column {0} is in a primary key")]
    ColumnInPrimaryKey(String),
    #[error("duplicate key value violates unique constraint {0}")]
    UniqueViolation(String),
    #[error("column {0} contains null values")]
    NotNullViolation(String),
    #[error("value {value} does not match type {ty} of column {column}")]
    ValueTypeMismatch {
        column: String,
        ty: String,
        value: String,
    },
    #[error("row has {actual} values, table has {expected} columns")]
    ValueCountMismatch { expected: usize, actual: usize },
    #[error("type {0} is not installed")]
    TypeNotInstalled(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
