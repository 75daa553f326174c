pub mod config;
pub mod error;
pub mod mem_impl;
pub mod spec;

use crate::error::{Error, Result};
use bitflags::bitflags;
use semistr::SemiStr;
use sheetbase_datatype::{ColumnType, DbType, Value};

pub use config::CatalogConfig;
pub use spec::*;

pub type ObjID = u64;
pub type TableID = ObjID;
pub type SchemaID = ObjID;
pub type ConstraintID = ObjID;

/// Read access to catalog metadata and table data.
///
/// Every method returns owned copies, callers never hold references
/// into catalog state. After a mutation, state must be read again.
pub trait CatalogRead {
    fn config(&self) -> &CatalogConfig;

    /// Catalog types usable for columns, custom types included
    /// only if installed.
    fn installed_types(&self) -> Vec<DbType>;

    fn all_schemas(&self) -> Vec<Schema>;

    fn find_schema_by_name(&self, schema_name: &str) -> Option<Schema>;

    fn find_schema(&self, schema_id: SchemaID) -> Option<Schema>;

    fn all_tables_in_schema(&self, schema_id: SchemaID) -> Vec<Table>;

    fn find_table_by_name(&self, schema_id: SchemaID, table_name: &str) -> Option<Table>;

    fn find_table(&self, table_id: TableID) -> Option<Table>;

    fn all_columns_in_table(&self, table_id: TableID) -> Vec<Column>;

    fn find_column(&self, table_id: TableID, attnum: AttNum) -> Option<Column>;

    fn find_column_by_name(&self, table_id: TableID, column_name: &str) -> Option<Column>;

    fn all_constraints_in_table(&self, table_id: TableID) -> Vec<Constraint>;

    /// Returns all rows, values ordered as `all_columns_in_table`.
    fn scan_rows(&self, table_id: TableID) -> Result<Vec<Vec<Value>>>;

    fn scan_column(&self, table_id: TableID, attnum: AttNum) -> Result<Vec<Value>>;

    #[inline]
    fn resolve_attnum(&self, table_id: TableID, column_name: &str) -> Result<AttNum> {
        if self.find_table(table_id).is_none() {
            return Err(Error::TableNotExists(format!("id={}", table_id)));
        }
        self.find_column_by_name(table_id, column_name)
            .map(|c| c.attnum)
            .ok_or_else(|| Error::ColumnNotExists(column_name.to_string()))
    }

    /// Returns constraints the column participates in, including
    /// multi-column constraints shared with other columns.
    #[inline]
    fn get_column_constraints(&self, table_id: TableID, attnum: AttNum) -> Vec<Constraint> {
        self.all_constraints_in_table(table_id)
            .into_iter()
            .filter(|c| c.contains(attnum))
            .collect()
    }

    #[inline]
    fn get_column_default(&self, table_id: TableID, attnum: AttNum) -> Result<Option<Value>> {
        self.find_column(table_id, attnum)
            .map(|c| c.default)
            .ok_or_else(|| Error::ColumnNotExists(format!("attnum={}", attnum)))
    }
}

/// Mutations of the catalog, applied atomically on commit.
///
/// A failed method leaves the transaction unchanged. Dropping the
/// transaction without commit discards every mutation.
pub trait CatalogTxn: CatalogRead {
    fn create_schema(&mut self, schema: SchemaSpec) -> Result<SchemaID>;

    fn drop_schema(&mut self, schema_name: &str) -> Result<()>;

    fn create_table(&mut self, schema_id: SchemaID, table_spec: TableSpec) -> Result<TableID>;

    fn drop_table(&mut self, schema_id: SchemaID, table_name: &str) -> Result<()>;

    /// Add a column at the end of the table. Existing rows get the
    /// column default, or null.
    fn add_column(&mut self, table_id: TableID, column: ColumnSpec) -> Result<AttNum>;

    /// Drop a column together with every constraint referencing it.
    fn drop_column(&mut self, table_id: TableID, attnum: AttNum) -> Result<()>;

    fn set_column_default(
        &mut self,
        table_id: TableID,
        attnum: AttNum,
        default: Option<Value>,
    ) -> Result<()>;

    fn set_column_nullable(&mut self, table_id: TableID, attnum: AttNum, nullable: bool)
    -> Result<()>;

    fn add_constraint(&mut self, table_id: TableID, constraint: ConstraintSpec)
    -> Result<ConstraintID>;

    fn drop_constraint(&mut self, table_id: TableID, constraint_name: &str) -> Result<()>;

    /// Overwrite values of column `to` with values of column `from` for all rows.
    fn copy_column_data(&mut self, table_id: TableID, from: AttNum, to: AttNum) -> Result<()>;

    /// Insert rows, values ordered as `all_columns_in_table`.
    fn insert_rows(&mut self, table_id: TableID, rows: Vec<Vec<Value>>) -> Result<usize>;

    fn commit(self) -> Result<()>
    where
        Self: Sized;
}

/// Catalog maintains metadata and data of all tables.
/// It could be shared between threads.
///
/// Structural edits run inside transactions, and one transaction is
/// active at a time.
pub trait Catalog: CatalogRead + Send + Sync {
    type Txn<'a>: CatalogTxn
    where
        Self: 'a;

    /// Start a transaction. Reads of the catalog itself block until
    /// the transaction ends, so use the transaction to read its state.
    fn begin(&self) -> Self::Txn<'_>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id: SchemaID,
    pub name: SemiStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: TableID,
    pub schema_id: SchemaID,
    pub name: SemiStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table_id: TableID,
    pub attnum: AttNum,
    pub name: SemiStr,
    pub ty: ColumnType,
    pub attr: ColumnAttributes,
    pub default: Option<Value>,
}

impl Column {
    #[inline]
    pub fn nullable(&self) -> bool {
        self.attr.contains(ColumnAttributes::NULLABLE)
    }
}

/// AttNum identifies a column within its table.
/// It is never reused, so it stays stable across renames and drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttNum(u32);

impl AttNum {
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for AttNum {
    fn from(src: u32) -> Self {
        AttNum(src)
    }
}

impl std::fmt::Display for AttNum {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    pub struct ColumnAttributes: u32 {
        // whether value can be null.
        const NULLABLE = 0x01;
        // whether it belongs to any key constraint.
        const KEY = 0x02;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    /// Single letter code of the constraint kind.
    #[inline]
    pub fn code(self) -> char {
        match self {
            ConstraintKind::PrimaryKey => 'p',
            ConstraintKind::Unique => 'u',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub id: ConstraintID,
    pub name: SemiStr,
    pub kind: ConstraintKind,
    pub columns: Vec<AttNum>,
}

impl Constraint {
    #[inline]
    pub fn contains(&self, attnum: AttNum) -> bool {
        self.columns.contains(&attnum)
    }
}
