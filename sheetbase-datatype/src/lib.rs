//! Catalog types, their option schemas and the semantic types
//! presented to users.
pub mod column_type;
pub mod db_type;
pub mod error;
pub mod hint;
pub mod options;
pub mod ui_type;
pub mod value;

pub use column_type::ColumnType;
pub use db_type::{DbType, TypeFamily};
pub use hint::{Hint, HintSet};
pub use options::{IntervalFields, OptionMap, TypeOptions, validate_options, validate_type_options};
pub use ui_type::{UiType, UiTypeHints, types_satisfying_hintset, ui_types_mapped_to_hintsets};
pub use value::Value;
