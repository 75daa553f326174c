use crate::data::CopyOptions;
use crate::descriptor::{ColumnDescriptor, get_column_descriptor};
use crate::error::Result;
use crate::naming::gen_col_name;
use log::{debug, info, warn};
use semistr::SemiStr;
use sheetbase_catalog::error::Error as CatalogError;
use sheetbase_catalog::{
    AttNum, Catalog, CatalogRead, CatalogTxn, ColumnAttributes, ColumnSpec, ConstraintKind, ConstraintSpec,
    TableID,
};

/// Duplicate a column of the table.
///
/// Type and type options are always copied, primary key status never.
/// The default is copied with data. Unique constraints and nullability
/// are copied only when both data and constraints are. All steps run in
/// one transaction, so a failed step leaves the table unchanged.
pub fn duplicate_column<C: Catalog>(
    catalog: &C,
    table_id: TableID,
    source: AttNum,
    new_name: Option<&str>,
    options: CopyOptions,
) -> Result<ColumnDescriptor> {
    let mut txn = catalog.begin();
    match duplicate_in_txn(&mut txn, table_id, source, new_name, options) {
        Ok(attnum) => {
            txn.commit()?;
            info!(
                "duplicated column {} to {} in table {}",
                source, attnum, table_id
            );
            get_column_descriptor(catalog, table_id, attnum)
        }
        Err(e) => {
            warn!(
                "failed to duplicate column {} in table {}: {}",
                source, table_id, e
            );
            Err(e)
        }
    }
}

pub(crate) fn duplicate_in_txn<T: CatalogTxn>(
    txn: &mut T,
    table_id: TableID,
    source: AttNum,
    new_name: Option<&str>,
    options: CopyOptions,
) -> Result<AttNum> {
    if txn.find_table(table_id).is_none() {
        return Err(CatalogError::TableNotExists(format!("id={}", table_id)).into());
    }
    let column = txn
        .find_column(table_id, source)
        .ok_or_else(|| CatalogError::ColumnNotExists(format!("attnum={}", source)))?;
    let name = match new_name.filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let columns = txn.all_columns_in_table(table_id);
            gen_col_name(
                &format!("{} ", column.name.as_str()),
                columns.iter().map(|c| c.name.as_str()),
                1,
            )
        }
    };
    let attnum = txn.add_column(
        table_id,
        ColumnSpec::new(&name, column.ty.clone(), ColumnAttributes::NULLABLE),
    )?;
    if !options.copy_data {
        return Ok(attnum);
    }

    debug!("copy data of column {} to {}", source, attnum);
    txn.copy_column_data(table_id, source, attnum)?;
    if column.default.is_some() {
        txn.set_column_default(table_id, attnum, column.default.clone())?;
    }
    if !options.copy_constraints {
        return Ok(attnum);
    }

    if !column.nullable() {
        txn.set_column_nullable(table_id, attnum, false)?;
    }
    for constraint in txn.get_column_constraints(table_id, source) {
        if constraint.kind != ConstraintKind::Unique {
            debug!("skip constraint {} of column {}", constraint.name.as_str(), source);
            continue;
        }
        let mut columns = Vec::with_capacity(constraint.columns.len());
        for col_attnum in &constraint.columns {
            if *col_attnum == source {
                columns.push(SemiStr::new(&name));
            } else {
                let other = txn.find_column(table_id, *col_attnum).ok_or_else(|| {
                    CatalogError::ColumnNotExists(format!("attnum={}", col_attnum))
                })?;
                columns.push(other.name);
            }
        }
        debug!(
            "copy constraint {} of column {} to {}",
            constraint.name.as_str(),
            source,
            attnum
        );
        txn.add_constraint(
            table_id,
            ConstraintSpec {
                constraint_name: None,
                kind: ConstraintKind::Unique,
                columns,
            },
        )?;
    }
    Ok(attnum)
}
