use crate::{ColumnAttributes, ConstraintKind};
use semistr::SemiStr;
use sheetbase_datatype::{ColumnType, Value};

#[derive(Debug)]
pub struct SchemaSpec {
    pub schema_name: SemiStr,
}

impl SchemaSpec {
    #[inline]
    pub fn new(schema_name: &str) -> Self {
        Self {
            schema_name: SemiStr::new(schema_name),
        }
    }
}

#[derive(Debug)]
pub struct TableSpec {
    pub table_name: SemiStr,
    pub columns: Vec<ColumnSpec>,
    pub constraints: Vec<ConstraintSpec>,
}

impl TableSpec {
    #[inline]
    pub fn new(table_name: &str, columns: Vec<ColumnSpec>) -> Self {
        TableSpec {
            table_name: SemiStr::new(table_name),
            columns,
            constraints: vec![],
        }
    }

    #[inline]
    pub fn with_constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub column_name: SemiStr,
    pub column_type: ColumnType,
    pub column_attributes: ColumnAttributes,
    pub default: Option<Value>,
}

impl ColumnSpec {
    #[inline]
    pub fn new(
        column_name: &str,
        column_type: impl Into<ColumnType>,
        column_attributes: ColumnAttributes,
    ) -> Self {
        ColumnSpec {
            column_name: SemiStr::new(column_name),
            column_type: column_type.into(),
            column_attributes,
            default: None,
        }
    }

    #[inline]
    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }
}

/// Constraint on columns referenced by name.
/// Name is generated if not given.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub constraint_name: Option<SemiStr>,
    pub kind: ConstraintKind,
    pub columns: Vec<SemiStr>,
}

impl ConstraintSpec {
    #[inline]
    pub fn unique(columns: &[&str]) -> Self {
        Self::new(ConstraintKind::Unique, columns)
    }

    #[inline]
    pub fn primary_key(columns: &[&str]) -> Self {
        Self::new(ConstraintKind::PrimaryKey, columns)
    }

    #[inline]
    pub fn named(mut self, constraint_name: &str) -> Self {
        self.constraint_name = Some(SemiStr::new(constraint_name));
        self
    }

    #[inline]
    fn new(kind: ConstraintKind, columns: &[&str]) -> Self {
        ConstraintSpec {
            constraint_name: None,
            kind,
            columns: columns.iter().map(|c| SemiStr::new(c)).collect(),
        }
    }
}
