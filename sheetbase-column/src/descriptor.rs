use crate::error::Result;
use serde::Serialize;
use sheetbase_catalog::error::Error as CatalogError;
use sheetbase_catalog::{AttNum, CatalogRead, Column, Constraint, ConstraintKind, TableID};
use sheetbase_datatype::{OptionMap, Value};

/// Column as presented to clients.
///
/// Always built from a fresh catalog read, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub attnum: u32,
    pub name: String,
    pub plain_type: String,
    pub type_options: OptionMap,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<Value>,
}

impl ColumnDescriptor {
    #[inline]
    pub fn new(column: &Column, constraints: &[Constraint]) -> Self {
        let primary_key = constraints
            .iter()
            .any(|c| c.kind == ConstraintKind::PrimaryKey && c.contains(column.attnum));
        ColumnDescriptor {
            attnum: column.attnum.value(),
            name: column.name.as_str().to_string(),
            plain_type: column.ty.db_type.id().to_string(),
            type_options: column.ty.options.to_map(),
            nullable: column.nullable(),
            primary_key,
            default: column.default.clone(),
        }
    }

    #[inline]
    pub fn attnum(&self) -> AttNum {
        AttNum::from(self.attnum)
    }
}

pub fn get_column_descriptor<R: CatalogRead + ?Sized>(
    catalog: &R,
    table_id: TableID,
    attnum: AttNum,
) -> Result<ColumnDescriptor> {
    let column = catalog
        .find_column(table_id, attnum)
        .ok_or_else(|| CatalogError::ColumnNotExists(format!("attnum={}", attnum)))?;
    let constraints = catalog.get_column_constraints(table_id, attnum);
    Ok(ColumnDescriptor::new(&column, &constraints))
}

/// Returns descriptors of all columns of the table in column order.
pub fn get_column_descriptors<R: CatalogRead + ?Sized>(
    catalog: &R,
    table_id: TableID,
) -> Result<Vec<ColumnDescriptor>> {
    if catalog.find_table(table_id).is_none() {
        return Err(CatalogError::TableNotExists(format!("id={}", table_id)).into());
    }
    let constraints = catalog.all_constraints_in_table(table_id);
    Ok(catalog
        .all_columns_in_table(table_id)
        .iter()
        .map(|c| ColumnDescriptor::new(c, &constraints))
        .collect())
}
