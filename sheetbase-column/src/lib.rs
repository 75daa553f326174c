//! Column lifecycle on top of the catalog: creation with validated
//! type options, duplication and automatic naming.
pub mod create;
pub mod data;
pub mod descriptor;
pub mod duplicate;
pub mod error;
pub mod naming;

pub use create::create_column;
pub use data::{ColumnData, CopyOptions};
pub use descriptor::{ColumnDescriptor, get_column_descriptor, get_column_descriptors};
pub use duplicate::duplicate_column;
pub use error::{Error, Result};
pub use naming::gen_col_name;
