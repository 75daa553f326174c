use crate::data::ColumnData;
use crate::descriptor::{ColumnDescriptor, get_column_descriptor};
use crate::error::Result;
use crate::naming::gen_col_name;
use log::{info, warn};
use sheetbase_catalog::{Catalog, CatalogRead, CatalogTxn, ColumnAttributes, ColumnSpec, TableID};
use sheetbase_datatype::error::Error as TypeError;
use sheetbase_datatype::{ColumnType, DbType, validate_type_options};

/// Create a column at the end of the table.
///
/// Type and options are validated before the catalog is touched.
/// Column, nullability and default are added in one transaction.
pub fn create_column<C: Catalog>(
    catalog: &C,
    table_id: TableID,
    data: ColumnData,
) -> Result<ColumnDescriptor> {
    let db_type = DbType::from_id(&data.type_id)
        .ok_or_else(|| TypeError::TypeMismatch(format!("unknown type {}", data.type_id)))?;
    let options = validate_type_options(db_type, &data.type_options)?;
    let ty = ColumnType::new(db_type, options);

    let mut txn = catalog.begin();
    let name = match data.name.filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => {
            let columns = txn.all_columns_in_table(table_id);
            gen_col_name(
                &txn.config().column_name_template,
                columns.iter().map(|c| c.name.as_str()),
                columns.len() as u64,
            )
        }
    };
    let attr = if data.nullable {
        ColumnAttributes::NULLABLE
    } else {
        ColumnAttributes::empty()
    };
    let spec = ColumnSpec::new(&name, ty, attr).with_default(data.default);
    let attnum = match txn.add_column(table_id, spec) {
        Ok(attnum) => attnum,
        Err(e) => {
            warn!("failed to create column {} in table {}: {}", name, table_id, e);
            return Err(e.into());
        }
    };
    txn.commit()?;
    info!(
        "created column {} (attnum={}) in table {}",
        name, attnum, table_id
    );
    get_column_descriptor(catalog, table_id, attnum)
}
