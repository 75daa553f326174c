use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::{
    AttNum, Catalog, CatalogRead, CatalogTxn, Column, ColumnAttributes, ColumnSpec, Constraint,
    ConstraintID, ConstraintKind, ConstraintSpec, ObjID, Schema, SchemaID, SchemaSpec, Table,
    TableID, TableSpec,
};
use indexmap::IndexMap;
use log::debug;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use semistr::SemiStr;
use sheetbase_datatype::{DbType, Value};
use std::collections::{HashMap, HashSet};

/// In-memory catalog holding metadata and rows of all tables.
#[derive(Debug)]
pub struct MemCatalog {
    inner: RwLock<Inner>,
    config: CatalogConfig,
}

impl Default for MemCatalog {
    #[inline]
    fn default() -> Self {
        MemCatalog::new(CatalogConfig::default())
    }
}

impl MemCatalog {
    #[inline]
    pub fn new(config: CatalogConfig) -> Self {
        let installed_types = DbType::ALL
            .into_iter()
            .filter(|ty| config.install_custom_types || !ty.is_custom())
            .collect();
        MemCatalog {
            inner: RwLock::new(Inner {
                installed_types,
                ..Default::default()
            }),
            config,
        }
    }

    /// Create a schema in its own transaction.
    #[inline]
    pub fn create_schema(&self, schema: SchemaSpec) -> Result<SchemaID> {
        let mut txn = self.begin();
        let schema_id = txn.create_schema(schema)?;
        txn.commit()?;
        Ok(schema_id)
    }

    /// Create a table in its own transaction.
    #[inline]
    pub fn create_table(&self, schema_id: SchemaID, table_spec: TableSpec) -> Result<TableID> {
        let mut txn = self.begin();
        let table_id = txn.create_table(schema_id, table_spec)?;
        txn.commit()?;
        Ok(table_id)
    }

    /// Insert rows in their own transaction.
    #[inline]
    pub fn insert_rows(&self, table_id: TableID, rows: Vec<Vec<Value>>) -> Result<usize> {
        let mut txn = self.begin();
        let count = txn.insert_rows(table_id, rows)?;
        txn.commit()?;
        Ok(count)
    }

    #[inline]
    fn inner_ref(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read()
    }
}

#[derive(Debug, Clone, Default)]
struct Inner {
    schemas: IndexMap<SemiStr, Schema>,
    tables: IndexMap<SchemaID, Vec<Table>>,
    table_details: HashMap<TableID, TableDetails>,
    obj_id_gen: ObjID,
    installed_types: Vec<DbType>,
}

#[inline]
fn table_not_exists(table_id: TableID) -> Error {
    Error::TableNotExists(format!("id={}", table_id))
}

#[inline]
fn schema_not_exists(schema_id: SchemaID) -> Error {
    Error::SchemaNotExists(format!("id={}", schema_id))
}

impl Inner {
    #[inline]
    fn installed_types(&self) -> Vec<DbType> {
        self.installed_types.clone()
    }

    #[inline]
    fn all_schemas(&self) -> Vec<Schema> {
        self.schemas.values().cloned().collect()
    }

    #[inline]
    fn exists_schema(&self, schema_name: &str) -> bool {
        self.schemas.contains_key(schema_name)
    }

    #[inline]
    fn find_schema_by_name(&self, schema_name: &str) -> Option<Schema> {
        self.schemas.get(schema_name).cloned()
    }

    #[inline]
    fn find_schema(&self, schema_id: SchemaID) -> Option<Schema> {
        self.schemas.values().find(|s| s.id == schema_id).cloned()
    }

    #[inline]
    fn all_tables_in_schema(&self, schema_id: SchemaID) -> Vec<Table> {
        self.tables.get(&schema_id).cloned().unwrap_or_default()
    }

    #[inline]
    fn exists_table(&self, schema_id: SchemaID, table_name: &str) -> bool {
        self.tables
            .get(&schema_id)
            .map(|ts| ts.iter().any(|t| t.name == table_name))
            .unwrap_or_default()
    }

    #[inline]
    fn find_table_by_name(&self, schema_id: SchemaID, table_name: &str) -> Option<Table> {
        self.tables
            .get(&schema_id)
            .and_then(|ts| ts.iter().find(|t| t.name == table_name).cloned())
    }

    #[inline]
    fn find_table(&self, table_id: TableID) -> Option<Table> {
        self.table_details
            .get(&table_id)
            .map(|twc| twc.table.clone())
    }

    #[inline]
    fn all_columns_in_table(&self, table_id: TableID) -> Vec<Column> {
        self.table_details
            .get(&table_id)
            .map(|twc| twc.columns.clone())
            .unwrap_or_default()
    }

    #[inline]
    fn find_column(&self, table_id: TableID, attnum: AttNum) -> Option<Column> {
        self.table_details
            .get(&table_id)
            .and_then(|twc| twc.columns.iter().find(|c| c.attnum == attnum).cloned())
    }

    #[inline]
    fn find_column_by_name(&self, table_id: TableID, column_name: &str) -> Option<Column> {
        self.table_details
            .get(&table_id)
            .and_then(|twc| twc.columns.iter().find(|c| c.name == column_name).cloned())
    }

    #[inline]
    fn all_constraints_in_table(&self, table_id: TableID) -> Vec<Constraint> {
        self.table_details
            .get(&table_id)
            .map(|twc| twc.constraints.clone())
            .unwrap_or_default()
    }

    #[inline]
    fn scan_rows(&self, table_id: TableID) -> Result<Vec<Vec<Value>>> {
        self.details(table_id).map(|twc| twc.rows.clone())
    }

    #[inline]
    fn scan_column(&self, table_id: TableID, attnum: AttNum) -> Result<Vec<Value>> {
        let twc = self.details(table_id)?;
        let pos = twc.position(attnum)?;
        Ok(twc.rows.iter().map(|row| row[pos].clone()).collect())
    }

    #[inline]
    fn details(&self, table_id: TableID) -> Result<&TableDetails> {
        self.table_details
            .get(&table_id)
            .ok_or_else(|| table_not_exists(table_id))
    }

    #[inline]
    fn details_mut(&mut self, table_id: TableID) -> Result<&mut TableDetails> {
        self.table_details
            .get_mut(&table_id)
            .ok_or_else(|| table_not_exists(table_id))
    }

    #[inline]
    fn create_schema(&mut self, schema: SchemaSpec) -> Result<SchemaID> {
        if self.exists_schema(&schema.schema_name) {
            return Err(Error::SchemaAlreadyExists(
                schema.schema_name.as_str().to_string(),
            ));
        }
        self.obj_id_gen += 1;
        let id = self.obj_id_gen;
        let name = schema.schema_name;
        let schema = Schema {
            id,
            name: name.clone(),
        };
        self.schemas.insert(name, schema);
        self.tables.insert(id, vec![]);
        Ok(id)
    }

    #[inline]
    fn drop_schema(&mut self, schema_name: &str) -> Result<()> {
        match self.schemas.shift_remove(schema_name) {
            None => Err(Error::SchemaNotExists(schema_name.to_string())),
            Some(schema) => {
                if let Some(tables) = self.tables.shift_remove(&schema.id) {
                    for table in tables {
                        self.table_details.remove(&table.id);
                    }
                }
                Ok(())
            }
        }
    }

    fn create_table(&mut self, schema_id: SchemaID, table_spec: TableSpec) -> Result<TableID> {
        if self.find_schema(schema_id).is_none() {
            return Err(schema_not_exists(schema_id));
        }
        if self.exists_table(schema_id, &table_spec.table_name) {
            return Err(Error::TableAlreadyExists(
                table_spec.table_name.as_str().to_string(),
            ));
        }
        let table_id = self.obj_id_gen + 1;
        let table = Table {
            id: table_id,
            schema_id,
            name: table_spec.table_name,
        };
        let mut details = TableDetails::new(table.clone());
        for column in table_spec.columns {
            details.add_column(column, &self.installed_types)?;
        }
        let mut obj_id = table_id;
        for constraint in table_spec.constraints {
            obj_id += 1;
            details.add_constraint(obj_id, constraint)?;
        }
        self.obj_id_gen = obj_id;
        self.tables.entry(schema_id).or_default().push(table);
        self.table_details.insert(table_id, details);
        Ok(table_id)
    }

    #[inline]
    fn drop_table(&mut self, schema_id: SchemaID, table_name: &str) -> Result<()> {
        let tables_in_schema = self
            .tables
            .get_mut(&schema_id)
            .ok_or_else(|| schema_not_exists(schema_id))?;
        match tables_in_schema.iter().position(|t| t.name == table_name) {
            None => Err(Error::TableNotExists(table_name.to_string())),
            Some(idx) => {
                let table = tables_in_schema.remove(idx);
                self.table_details.remove(&table.id);
                Ok(())
            }
        }
    }

    #[inline]
    fn add_column(&mut self, table_id: TableID, column: ColumnSpec) -> Result<AttNum> {
        let twc = self
            .table_details
            .get_mut(&table_id)
            .ok_or_else(|| table_not_exists(table_id))?;
        twc.add_column(column, &self.installed_types)
    }

    #[inline]
    fn add_constraint(&mut self, table_id: TableID, constraint: ConstraintSpec) -> Result<ConstraintID> {
        let id = self.obj_id_gen + 1;
        self.details_mut(table_id)?.add_constraint(id, constraint)?;
        self.obj_id_gen = id;
        Ok(id)
    }
}

#[derive(Debug, Clone)]
struct TableDetails {
    table: Table,
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
    // values of each row ordered as columns.
    rows: Vec<Vec<Value>>,
    next_attnum: u32,
}

impl TableDetails {
    #[inline]
    fn new(table: Table) -> Self {
        TableDetails {
            table,
            columns: vec![],
            constraints: vec![],
            rows: vec![],
            next_attnum: 1,
        }
    }

    #[inline]
    fn table_name(&self) -> &str {
        self.table.name.as_str()
    }

    #[inline]
    fn position(&self, attnum: AttNum) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.attnum == attnum)
            .ok_or_else(|| {
                Error::ColumnNotExists(format!("attnum={} in table {}", attnum, self.table_name()))
            })
    }

    fn add_column(&mut self, spec: ColumnSpec, installed: &[DbType]) -> Result<AttNum> {
        let column_name = spec.column_name.as_str();
        if self.columns.iter().any(|c| c.name == column_name) {
            return Err(Error::ColumnAlreadyExists(format!(
                "{}.{}",
                self.table_name(),
                column_name
            )));
        }
        let ty = spec.column_type.normalize();
        if !installed.contains(&ty.db_type) {
            return Err(Error::TypeNotInstalled(ty.db_type.id().to_string()));
        }
        let column = Column {
            table_id: self.table.id,
            attnum: AttNum::from(self.next_attnum),
            name: spec.column_name.clone(),
            ty,
            attr: spec.column_attributes & ColumnAttributes::NULLABLE,
            // null default is no default.
            default: spec.default.filter(|v| !v.is_null()),
        };
        if let Some(default) = &column.default {
            check_value(&column, default)?;
        }
        if !column.nullable() && column.default.is_none() && !self.rows.is_empty() {
            return Err(Error::NotNullViolation(column_name.to_string()));
        }
        let fill = column.default.clone().unwrap_or_default();
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        debug!(
            "add column {} {} to table {}",
            column_name,
            column.ty,
            self.table_name()
        );
        let attnum = column.attnum;
        self.columns.push(column);
        self.next_attnum += 1;
        Ok(attnum)
    }

    fn drop_column(&mut self, attnum: AttNum) -> Result<()> {
        let pos = self.position(attnum)?;
        self.columns.remove(pos);
        for row in &mut self.rows {
            row.remove(pos);
        }
        self.constraints.retain(|c| !c.contains(attnum));
        self.refresh_key_attributes();
        Ok(())
    }

    fn set_column_default(&mut self, attnum: AttNum, default: Option<Value>) -> Result<()> {
        let pos = self.position(attnum)?;
        let default = default.filter(|v| !v.is_null());
        if let Some(value) = &default {
            check_value(&self.columns[pos], value)?;
        }
        self.columns[pos].default = default;
        Ok(())
    }

    fn set_column_nullable(&mut self, attnum: AttNum, nullable: bool) -> Result<()> {
        let pos = self.position(attnum)?;
        let column_name = self.columns[pos].name.as_str();
        if nullable {
            if self
                .constraints
                .iter()
                .any(|c| c.kind == ConstraintKind::PrimaryKey && c.contains(attnum))
            {
                return Err(Error::ColumnInPrimaryKey(column_name.to_string()));
            }
        } else if self.rows.iter().any(|row| row[pos].is_null()) {
            return Err(Error::NotNullViolation(column_name.to_string()));
        }
        self.columns[pos]
            .attr
            .set(ColumnAttributes::NULLABLE, nullable);
        Ok(())
    }

    fn add_constraint(&mut self, id: ConstraintID, spec: ConstraintSpec) -> Result<ConstraintID> {
        let mut columns = Vec::with_capacity(spec.columns.len());
        for column_name in &spec.columns {
            let column = self
                .columns
                .iter()
                .find(|c| c.name == column_name.as_str())
                .ok_or_else(|| Error::ColumnNotExists(column_name.as_str().to_string()))?;
            if !columns.contains(&column.attnum) {
                columns.push(column.attnum);
            }
        }
        if columns.is_empty() {
            return Err(Error::EmptyConstraint);
        }
        if spec.kind == ConstraintKind::PrimaryKey
            && self
                .constraints
                .iter()
                .any(|c| c.kind == ConstraintKind::PrimaryKey)
        {
            return Err(Error::MultiplePrimaryKeys(self.table_name().to_string()));
        }
        let name = match spec.constraint_name {
            Some(name) => {
                if self.constraints.iter().any(|c| c.name == name.as_str()) {
                    return Err(Error::ConstraintAlreadyExists(name.as_str().to_string()));
                }
                name
            }
            None => SemiStr::new(&self.generate_constraint_name(spec.kind, &columns)),
        };
        let constraint = Constraint {
            id,
            name,
            kind: spec.kind,
            columns,
        };
        if constraint.kind == ConstraintKind::PrimaryKey {
            for attnum in &constraint.columns {
                let pos = self.position(*attnum)?;
                if self.rows.iter().any(|row| row[pos].is_null()) {
                    return Err(Error::NotNullViolation(
                        self.columns[pos].name.as_str().to_string(),
                    ));
                }
            }
        }
        self.check_unique(&constraint)?;
        if constraint.kind == ConstraintKind::PrimaryKey {
            for column in &mut self.columns {
                if constraint.contains(column.attnum) {
                    column.attr.remove(ColumnAttributes::NULLABLE);
                }
            }
        }
        debug!(
            "add constraint {} ({}) to table {}",
            constraint.name.as_str(),
            constraint.kind.code(),
            self.table_name()
        );
        self.constraints.push(constraint);
        self.refresh_key_attributes();
        Ok(id)
    }

    fn drop_constraint(&mut self, constraint_name: &str) -> Result<()> {
        match self
            .constraints
            .iter()
            .position(|c| c.name == constraint_name)
        {
            None => Err(Error::ConstraintNotExists(constraint_name.to_string())),
            Some(idx) => {
                self.constraints.remove(idx);
                self.refresh_key_attributes();
                Ok(())
            }
        }
    }

    fn copy_column_data(&mut self, from: AttNum, to: AttNum) -> Result<()> {
        let from_pos = self.position(from)?;
        let to_pos = self.position(to)?;
        for row in &self.rows {
            check_value(&self.columns[to_pos], &row[from_pos])?;
        }
        let saved: Vec<Value> = self
            .rows
            .iter_mut()
            .map(|row| {
                let value = row[from_pos].clone();
                std::mem::replace(&mut row[to_pos], value)
            })
            .collect();
        if let Err(e) = self.validate_column(to_pos) {
            for (row, value) in self.rows.iter_mut().zip(saved) {
                row[to_pos] = value;
            }
            return Err(e);
        }
        Ok(())
    }

    fn insert_rows(&mut self, rows: Vec<Vec<Value>>) -> Result<usize> {
        for row in &rows {
            if row.len() != self.columns.len() {
                return Err(Error::ValueCountMismatch {
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in self.columns.iter().zip(row) {
                check_value(column, value)?;
            }
        }
        let count = rows.len();
        let old_len = self.rows.len();
        self.rows.extend(rows);
        if let Err(e) = (0..self.columns.len()).try_for_each(|pos| self.validate_column(pos)) {
            self.rows.truncate(old_len);
            return Err(e);
        }
        Ok(count)
    }

    /// Generate constraint name the way PostgreSQL does:
    /// `{table}_pkey` or `{table}_{columns}_key`, numbered on conflict.
    fn generate_constraint_name(&self, kind: ConstraintKind, columns: &[AttNum]) -> String {
        let base = match kind {
            ConstraintKind::PrimaryKey => format!("{}_pkey", self.table_name()),
            ConstraintKind::Unique => {
                let mut s = String::from(self.table_name());
                for column in self.columns.iter().filter(|c| columns.contains(&c.attnum)) {
                    s.push('_');
                    s.push_str(column.name.as_str());
                }
                s.push_str("_key");
                s
            }
        };
        let mut name = base.clone();
        let mut n = 0;
        while self.constraints.iter().any(|c| c.name == name.as_str()) {
            n += 1;
            name = format!("{}{}", base, n);
        }
        name
    }

    #[inline]
    fn refresh_key_attributes(&mut self) {
        for column in &mut self.columns {
            let is_key = self.constraints.iter().any(|c| c.contains(column.attnum));
            column.attr.set(ColumnAttributes::KEY, is_key);
        }
    }

    fn validate_column(&self, pos: usize) -> Result<()> {
        let column = &self.columns[pos];
        if !column.nullable() && self.rows.iter().any(|row| row[pos].is_null()) {
            return Err(Error::NotNullViolation(column.name.as_str().to_string()));
        }
        for constraint in self.constraints.iter().filter(|c| c.contains(column.attnum)) {
            self.check_unique(constraint)?;
        }
        Ok(())
    }

    // Null values never conflict with each other.
    fn check_unique(&self, constraint: &Constraint) -> Result<()> {
        let positions = constraint
            .columns
            .iter()
            .map(|attnum| self.position(*attnum))
            .collect::<Result<Vec<_>>>()?;
        let mut keys = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            let key: Vec<&Value> = positions.iter().map(|pos| &row[*pos]).collect();
            if key.iter().any(|v| v.is_null()) {
                continue;
            }
            if !keys.insert(key) {
                return Err(Error::UniqueViolation(constraint.name.as_str().to_string()));
            }
        }
        Ok(())
    }
}

#[inline]
fn check_value(column: &Column, value: &Value) -> Result<()> {
    if column.ty.db_type.accepts(value) {
        Ok(())
    } else {
        Err(Error::ValueTypeMismatch {
            column: column.name.as_str().to_string(),
            ty: column.ty.to_string(),
            value: value.to_string(),
        })
    }
}

/// Transaction on MemCatalog.
///
/// It holds the write lock of the catalog and mutates a private copy
/// of catalog state, which replaces the shared state on commit.
pub struct MemTxn<'a> {
    guard: RwLockWriteGuard<'a, Inner>,
    work: Inner,
    config: &'a CatalogConfig,
    committed: bool,
}

impl MemTxn<'_> {
    #[inline]
    fn inner_ref(&self) -> &Inner {
        &self.work
    }
}

impl Drop for MemTxn<'_> {
    #[inline]
    fn drop(&mut self) {
        if !self.committed {
            debug!("rollback catalog transaction");
        }
    }
}

macro_rules! delegate_read {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            #[inline]
            fn $name(&self, $($arg: $ty),*) -> $ret {
                self.inner_ref().$name($($arg),*)
            }
        )*
    };
}

macro_rules! impl_catalog_read {
    ($target:ty) => {
        impl CatalogRead for $target {
            #[inline]
            fn config(&self) -> &CatalogConfig {
                &self.config
            }

            delegate_read! {
                installed_types() -> Vec<DbType>;
                all_schemas() -> Vec<Schema>;
                find_schema_by_name(schema_name: &str) -> Option<Schema>;
                find_schema(schema_id: SchemaID) -> Option<Schema>;
                all_tables_in_schema(schema_id: SchemaID) -> Vec<Table>;
                find_table_by_name(schema_id: SchemaID, table_name: &str) -> Option<Table>;
                find_table(table_id: TableID) -> Option<Table>;
                all_columns_in_table(table_id: TableID) -> Vec<Column>;
                find_column(table_id: TableID, attnum: AttNum) -> Option<Column>;
                find_column_by_name(table_id: TableID, column_name: &str) -> Option<Column>;
                all_constraints_in_table(table_id: TableID) -> Vec<Constraint>;
                scan_rows(table_id: TableID) -> Result<Vec<Vec<Value>>>;
                scan_column(table_id: TableID, attnum: AttNum) -> Result<Vec<Value>>;
            }
        }
    };
}

impl_catalog_read!(MemCatalog);
impl_catalog_read!(MemTxn<'_>);

impl CatalogTxn for MemTxn<'_> {
    #[inline]
    fn create_schema(&mut self, schema: SchemaSpec) -> Result<SchemaID> {
        self.work.create_schema(schema)
    }

    #[inline]
    fn drop_schema(&mut self, schema_name: &str) -> Result<()> {
        self.work.drop_schema(schema_name)
    }

    #[inline]
    fn create_table(&mut self, schema_id: SchemaID, table_spec: TableSpec) -> Result<TableID> {
        self.work.create_table(schema_id, table_spec)
    }

    #[inline]
    fn drop_table(&mut self, schema_id: SchemaID, table_name: &str) -> Result<()> {
        self.work.drop_table(schema_id, table_name)
    }

    #[inline]
    fn add_column(&mut self, table_id: TableID, column: ColumnSpec) -> Result<AttNum> {
        self.work.add_column(table_id, column)
    }

    #[inline]
    fn drop_column(&mut self, table_id: TableID, attnum: AttNum) -> Result<()> {
        self.work.details_mut(table_id)?.drop_column(attnum)
    }

    #[inline]
    fn set_column_default(
        &mut self,
        table_id: TableID,
        attnum: AttNum,
        default: Option<Value>,
    ) -> Result<()> {
        self.work
            .details_mut(table_id)?
            .set_column_default(attnum, default)
    }

    #[inline]
    fn set_column_nullable(
        &mut self,
        table_id: TableID,
        attnum: AttNum,
        nullable: bool,
    ) -> Result<()> {
        self.work
            .details_mut(table_id)?
            .set_column_nullable(attnum, nullable)
    }

    #[inline]
    fn add_constraint(
        &mut self,
        table_id: TableID,
        constraint: ConstraintSpec,
    ) -> Result<ConstraintID> {
        self.work.add_constraint(table_id, constraint)
    }

    #[inline]
    fn drop_constraint(&mut self, table_id: TableID, constraint_name: &str) -> Result<()> {
        self.work
            .details_mut(table_id)?
            .drop_constraint(constraint_name)
    }

    #[inline]
    fn copy_column_data(&mut self, table_id: TableID, from: AttNum, to: AttNum) -> Result<()> {
        self.work.details_mut(table_id)?.copy_column_data(from, to)
    }

    #[inline]
    fn insert_rows(&mut self, table_id: TableID, rows: Vec<Vec<Value>>) -> Result<usize> {
        self.work.details_mut(table_id)?.insert_rows(rows)
    }

    #[inline]
    fn commit(mut self) -> Result<()> {
        *self.guard = std::mem::take(&mut self.work);
        self.committed = true;
        debug!("commit catalog transaction");
        Ok(())
    }
}

impl Catalog for MemCatalog {
    type Txn<'a>
        = MemTxn<'a>
    where
        Self: 'a;

    #[inline]
    fn begin(&self) -> MemTxn<'_> {
        let guard = self.inner.write();
        let work = Inner::clone(&guard);
        debug!("begin catalog transaction");
        MemTxn {
            guard,
            work,
            config: &self.config,
            committed: false,
        }
    }
}
