use crate::error::{Error, Result, bad_filter};
use semistr::SemiStr;
use serde_json::{Map, Number, Value as JsonValue, json};
use sheetbase_catalog::error::Error as CatalogError;
use sheetbase_catalog::{CatalogRead, TableID};
use sheetbase_datatype::Value;
use smallvec::SmallVec;

/// Leaf predicates test a column, branch predicates combine other predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Leaf,
    Branch,
}

/// Number of parameters a predicate takes besides the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    None,
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateType {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,
    StartsWith,
    EndsWith,
    Contains,
    UriSchemeIs,
    EmailDomainContains,
    Empty,
    NotEmpty,
    In,
    NotIn,
    Not,
    And,
    Or,
}

impl PredicateType {
    pub const ALL: [PredicateType; 18] = [
        PredicateType::Equal,
        PredicateType::NotEqual,
        PredicateType::Greater,
        PredicateType::GreaterOrEqual,
        PredicateType::Lesser,
        PredicateType::LesserOrEqual,
        PredicateType::StartsWith,
        PredicateType::EndsWith,
        PredicateType::Contains,
        PredicateType::UriSchemeIs,
        PredicateType::EmailDomainContains,
        PredicateType::Empty,
        PredicateType::NotEmpty,
        PredicateType::In,
        PredicateType::NotIn,
        PredicateType::Not,
        PredicateType::And,
        PredicateType::Or,
    ];

    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            PredicateType::Equal => "equal",
            PredicateType::NotEqual => "not_equal",
            PredicateType::Greater => "greater",
            PredicateType::GreaterOrEqual => "greater_or_equal",
            PredicateType::Lesser => "lesser",
            PredicateType::LesserOrEqual => "lesser_or_equal",
            PredicateType::StartsWith => "starts_with",
            PredicateType::EndsWith => "ends_with",
            PredicateType::Contains => "contains",
            PredicateType::UriSchemeIs => "uri_scheme_is",
            PredicateType::EmailDomainContains => "email_domain_contains",
            PredicateType::Empty => "empty",
            PredicateType::NotEmpty => "not_empty",
            PredicateType::In => "in",
            PredicateType::NotIn => "not_in",
            PredicateType::Not => "not",
            PredicateType::And => "and",
            PredicateType::Or => "or",
        }
    }

    #[inline]
    pub fn from_id(id: &str) -> Option<PredicateType> {
        PredicateType::ALL.into_iter().find(|ty| ty.id() == id)
    }

    #[inline]
    pub fn position(self) -> Position {
        match self {
            PredicateType::Not | PredicateType::And | PredicateType::Or => Position::Branch,
            _ => Position::Leaf,
        }
    }

    #[inline]
    pub fn arity(self) -> Arity {
        match self {
            PredicateType::Empty | PredicateType::NotEmpty => Arity::None,
            PredicateType::In | PredicateType::NotIn | PredicateType::And | PredicateType::Or => {
                Arity::Multi
            }
            _ => Arity::Single,
        }
    }
}

/// Unchecked parameter handed to a predicate constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Null,
    Value(Value),
    List(Vec<FilterArg>),
    Predicate(Predicate),
}

impl From<Value> for FilterArg {
    #[inline]
    fn from(value: Value) -> Self {
        FilterArg::Value(value)
    }
}

impl From<Predicate> for FilterArg {
    #[inline]
    fn from(pred: Predicate) -> Self {
        FilterArg::Predicate(pred)
    }
}

impl<T: Into<FilterArg>> From<Vec<T>> for FilterArg {
    #[inline]
    fn from(items: Vec<T>) -> Self {
        FilterArg::List(items.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafParams {
    None,
    Single(Value),
    Multi(SmallVec<[Value; 4]>),
}

/// Predicate tree whose every node passed structural validation.
///
/// Construction is the only way to get a predicate, so an invalid tree
/// never exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Leaf {
        ty: PredicateType,
        column: SemiStr,
        params: LeafParams,
    },
    Branch {
        ty: PredicateType,
        children: Vec<Predicate>,
    },
}

type Builder = fn(PredicateType, Option<&str>, FilterArg) -> Result<Predicate>;

const BUILDERS: [((Position, Arity), Builder); 5] = [
    ((Position::Leaf, Arity::None), build_leaf_none),
    ((Position::Leaf, Arity::Single), build_leaf_single),
    ((Position::Leaf, Arity::Multi), build_leaf_multi),
    ((Position::Branch, Arity::Single), build_branch_single),
    ((Position::Branch, Arity::Multi), build_branch_multi),
];

impl Predicate {
    /// Validate column and parameter against the shape of the predicate type.
    ///
    /// Leaf predicates take a non-empty column, branch predicates take
    /// none. A predicate without parameters takes `FilterArg::Null`.
    pub fn new(ty: PredicateType, column: Option<&str>, arg: FilterArg) -> Result<Self> {
        let key = (ty.position(), ty.arity());
        let builder = BUILDERS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, b)| *b)
            .ok_or_else(|| bad_filter(format!("no predicate shape {:?}", key)))?;
        builder(ty, column, arg)
    }

    #[inline]
    pub fn ty(&self) -> PredicateType {
        match self {
            Predicate::Leaf { ty, .. } | Predicate::Branch { ty, .. } => *ty,
        }
    }

    #[inline]
    pub fn column(&self) -> Option<&str> {
        match self {
            Predicate::Leaf { column, .. } => Some(column.as_str()),
            Predicate::Branch { .. } => None,
        }
    }

    #[inline]
    pub fn children(&self) -> &[Predicate] {
        match self {
            Predicate::Leaf { .. } => &[],
            Predicate::Branch { children, .. } => children,
        }
    }

    /// Returns columns of all leaves in depth-first order.
    pub fn columns(&self) -> Vec<&str> {
        let mut res = vec![];
        self.collect_columns(&mut res);
        res
    }

    fn collect_columns<'a>(&'a self, res: &mut Vec<&'a str>) {
        match self {
            Predicate::Leaf { column, .. } => res.push(column.as_str()),
            Predicate::Branch { children, .. } => {
                for child in children {
                    child.collect_columns(res);
                }
            }
        }
    }

    /// Parse a filter spec such as
    /// `{"and": [{"equal": {"column": "c1", "parameter": 1}}, {"empty": {"column": "c2"}}]}`.
    pub fn from_spec(spec: &JsonValue) -> Result<Self> {
        let (id, body) = match spec.as_object() {
            Some(obj) if obj.len() == 1 => obj
                .iter()
                .next()
                .ok_or_else(|| bad_filter("empty filter spec"))?,
            _ => {
                return Err(bad_filter(
                    "filter spec must be an object with exactly one predicate",
                ));
            }
        };
        let ty = PredicateType::from_id(id)
            .ok_or_else(|| bad_filter(format!("unknown predicate type {}", id)))?;
        match ty.position() {
            Position::Leaf => {
                let body = body
                    .as_object()
                    .ok_or_else(|| bad_filter(format!("{} expects an object", id)))?;
                let column = match body.get("column") {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::String(s)) => Some(s.as_str()),
                    Some(_) => return Err(bad_filter("column must be a string")),
                };
                let param_key = match ty.arity() {
                    Arity::None => None,
                    Arity::Single => Some("parameter"),
                    Arity::Multi => Some("parameters"),
                };
                if let Some(key) = body
                    .keys()
                    .find(|k| k.as_str() != "column" && Some(k.as_str()) != param_key)
                {
                    return Err(bad_filter(format!("{} does not take key {}", id, key)));
                }
                let arg = match param_key.and_then(|k| body.get(k)) {
                    Some(v) => json_to_arg(v)?,
                    None => FilterArg::Null,
                };
                Predicate::new(ty, column, arg)
            }
            Position::Branch => {
                let arg = match (ty.arity(), body) {
                    (Arity::Multi, JsonValue::Array(items)) => FilterArg::List(
                        items
                            .iter()
                            .map(|item| Predicate::from_spec(item).map(FilterArg::Predicate))
                            .collect::<Result<_>>()?,
                    ),
                    (Arity::Multi, _) => {
                        return Err(bad_filter(format!("{} expects a list of predicates", id)));
                    }
                    _ => FilterArg::Predicate(Predicate::from_spec(body)?),
                };
                Predicate::new(ty, None, arg)
            }
        }
    }

    pub fn to_spec(&self) -> JsonValue {
        let ty = self.ty();
        let body = match self {
            Predicate::Leaf {
                column, params, ..
            } => {
                let mut body = Map::new();
                body.insert("column".to_string(), json!(column.as_str()));
                match params {
                    LeafParams::None => (),
                    LeafParams::Single(v) => {
                        body.insert("parameter".to_string(), value_to_json(v));
                    }
                    LeafParams::Multi(vs) => {
                        body.insert(
                            "parameters".to_string(),
                            JsonValue::Array(vs.iter().map(value_to_json).collect()),
                        );
                    }
                }
                JsonValue::Object(body)
            }
            Predicate::Branch { children, .. } => match ty.arity() {
                Arity::Multi => JsonValue::Array(children.iter().map(Predicate::to_spec).collect()),
                _ => children
                    .first()
                    .map(Predicate::to_spec)
                    .unwrap_or(JsonValue::Null),
            },
        };
        let mut spec = Map::new();
        spec.insert(ty.id().to_string(), body);
        JsonValue::Object(spec)
    }
}

#[inline]
fn leaf_column(ty: PredicateType, column: Option<&str>) -> Result<SemiStr> {
    match column {
        Some(c) if !c.is_empty() => Ok(SemiStr::new(c)),
        _ => Err(bad_filter(format!("{} requires a column", ty.id()))),
    }
}

#[inline]
fn scalar(ty: PredicateType, arg: FilterArg) -> Result<Value> {
    match arg {
        FilterArg::Value(v) if !v.is_null() => Ok(v),
        other => Err(bad_filter(format!(
            "{} expects a scalar parameter, got {}",
            ty.id(),
            arg_kind(&other)
        ))),
    }
}

#[inline]
fn non_empty_list(ty: PredicateType, arg: FilterArg) -> Result<Vec<FilterArg>> {
    match arg {
        FilterArg::List(items) if !items.is_empty() => Ok(items),
        other => Err(bad_filter(format!(
            "{} expects a non-empty list, got {}",
            ty.id(),
            arg_kind(&other)
        ))),
    }
}

#[inline]
fn child(ty: PredicateType, arg: FilterArg) -> Result<Predicate> {
    match arg {
        FilterArg::Predicate(p) => Ok(p),
        other => Err(bad_filter(format!(
            "{} expects a predicate, got {}",
            ty.id(),
            arg_kind(&other)
        ))),
    }
}

#[inline]
fn no_column(ty: PredicateType, column: Option<&str>) -> Result<()> {
    match column {
        None => Ok(()),
        Some(_) => Err(bad_filter(format!("{} does not take a column", ty.id()))),
    }
}

fn build_leaf_none(ty: PredicateType, column: Option<&str>, arg: FilterArg) -> Result<Predicate> {
    let column = leaf_column(ty, column)?;
    if arg != FilterArg::Null {
        return Err(bad_filter(format!("{} takes no parameter", ty.id())));
    }
    Ok(Predicate::Leaf {
        ty,
        column,
        params: LeafParams::None,
    })
}

fn build_leaf_single(ty: PredicateType, column: Option<&str>, arg: FilterArg) -> Result<Predicate> {
    let column = leaf_column(ty, column)?;
    let value = scalar(ty, arg)?;
    Ok(Predicate::Leaf {
        ty,
        column,
        params: LeafParams::Single(value),
    })
}

fn build_leaf_multi(ty: PredicateType, column: Option<&str>, arg: FilterArg) -> Result<Predicate> {
    let column = leaf_column(ty, column)?;
    let values = non_empty_list(ty, arg)?
        .into_iter()
        .map(|item| scalar(ty, item))
        .collect::<Result<SmallVec<_>>>()?;
    Ok(Predicate::Leaf {
        ty,
        column,
        params: LeafParams::Multi(values),
    })
}

fn build_branch_single(
    ty: PredicateType,
    column: Option<&str>,
    arg: FilterArg,
) -> Result<Predicate> {
    no_column(ty, column)?;
    let child = child(ty, arg)?;
    Ok(Predicate::Branch {
        ty,
        children: vec![child],
    })
}

fn build_branch_multi(
    ty: PredicateType,
    column: Option<&str>,
    arg: FilterArg,
) -> Result<Predicate> {
    no_column(ty, column)?;
    let children = non_empty_list(ty, arg)?
        .into_iter()
        .map(|item| child(ty, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(Predicate::Branch { ty, children })
}

#[inline]
fn arg_kind(arg: &FilterArg) -> &'static str {
    match arg {
        FilterArg::Null => "null",
        FilterArg::Value(Value::Null) => "null",
        FilterArg::Value(_) => "scalar",
        FilterArg::List(items) if items.is_empty() => "empty list",
        FilterArg::List(_) => "list",
        FilterArg::Predicate(_) => "predicate",
    }
}

fn json_to_arg(v: &JsonValue) -> Result<FilterArg> {
    let arg = match v {
        JsonValue::Null => FilterArg::Null,
        JsonValue::Bool(b) => FilterArg::Value(Value::Bool(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => FilterArg::Value(Value::Int(i)),
            None => n
                .as_f64()
                .map(|f| FilterArg::Value(Value::Float(f)))
                .ok_or_else(|| bad_filter(format!("unsupported number {}", n)))?,
        },
        JsonValue::String(s) => FilterArg::Value(Value::Text(s.clone())),
        JsonValue::Array(items) => {
            FilterArg::List(items.iter().map(json_to_arg).collect::<Result<_>>()?)
        }
        JsonValue::Object(_) => FilterArg::Predicate(Predicate::from_spec(v)?),
    };
    Ok(arg)
}

fn value_to_json(v: &Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
    }
}

/// Check every column referenced by the predicate exists in the table.
pub fn check_predicate_columns<R: CatalogRead + ?Sized>(
    catalog: &R,
    table_id: TableID,
    pred: &Predicate,
) -> Result<()> {
    let table = catalog
        .find_table(table_id)
        .ok_or_else(|| CatalogError::TableNotExists(format!("id={}", table_id)))?;
    for column in pred.columns() {
        if catalog.find_column_by_name(table_id, column).is_none() {
            return Err(Error::BadFilterFormat(format!(
                "column {} not found in table {}",
                column,
                table.name.as_str()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetbase_catalog::mem_impl::MemCatalog;
    use sheetbase_catalog::{ColumnAttributes, ColumnSpec, SchemaSpec, TableSpec};
    use sheetbase_datatype::DbType;

    fn some_leaf() -> Predicate {
        Predicate::new(PredicateType::Empty, Some("x"), FilterArg::Null).unwrap()
    }

    fn values(vs: &[i64]) -> FilterArg {
        FilterArg::List(vs.iter().map(|v| FilterArg::Value(Value::from(*v))).collect())
    }

    fn param_cases(ty: PredicateType) -> (Vec<FilterArg>, Vec<FilterArg>) {
        let leaf = FilterArg::Predicate(some_leaf());
        let leaves = |n: usize| FilterArg::List(vec![FilterArg::Predicate(some_leaf()); n]);
        match (ty.position(), ty.arity()) {
            (Position::Leaf, Arity::Multi) => (
                vec![values(&[1]), values(&[1, 2, 3])],
                vec![
                    FilterArg::Value(Value::from(1)),
                    FilterArg::List(vec![]),
                    leaf,
                    leaves(2),
                    FilterArg::Null,
                    FilterArg::List(vec![FilterArg::Value(Value::from(1)), FilterArg::Null]),
                ],
            ),
            (Position::Leaf, Arity::Single) => (
                vec![FilterArg::Value(Value::from(1)), FilterArg::Value(Value::from(""))],
                vec![
                    FilterArg::Null,
                    FilterArg::Value(Value::Null),
                    FilterArg::List(vec![]),
                    values(&[1]),
                    leaf,
                ],
            ),
            (Position::Branch, Arity::Multi) => (
                vec![leaves(2), leaves(1)],
                vec![
                    values(&[1]),
                    values(&[1, 2, 3]),
                    FilterArg::List(vec![]),
                    leaf,
                    FilterArg::Null,
                ],
            ),
            (Position::Branch, Arity::Single) => (
                vec![leaf],
                vec![
                    FilterArg::Null,
                    FilterArg::List(vec![]),
                    FilterArg::Value(Value::from(1)),
                    leaves(1),
                ],
            ),
            (_, Arity::None) => (vec![FilterArg::Null], vec![FilterArg::Value(Value::from(1))]),
        }
    }

    fn column_for(ty: PredicateType) -> Option<&'static str> {
        match ty.position() {
            Position::Leaf => Some("col1"),
            Position::Branch => None,
        }
    }

    #[test]
    fn test_predicate_params() {
        for ty in PredicateType::ALL {
            let (valid, invalid) = param_cases(ty);
            for arg in valid {
                let res = Predicate::new(ty, column_for(ty), arg.clone());
                assert!(res.is_ok(), "{:?} {:?} {:?}", ty, arg, res);
                assert_eq!(res.unwrap().ty(), ty);
            }
            for arg in invalid {
                let res = Predicate::new(ty, column_for(ty), arg.clone());
                assert!(
                    matches!(res, Err(Error::BadFilterFormat(_))),
                    "{:?} {:?} {:?}",
                    ty,
                    arg,
                    res
                );
            }
        }
    }

    #[test]
    fn test_predicate_column_name() {
        for ty in PredicateType::ALL {
            let arg = param_cases(ty).0.remove(0);
            for column in [Some(""), None] {
                if ty.position() == Position::Branch && column.is_none() {
                    continue;
                }
                let res = Predicate::new(ty, column, arg.clone());
                assert!(matches!(res, Err(Error::BadFilterFormat(_))), "{:?}", ty);
            }
        }
        let pred = Predicate::new(PredicateType::Not, None, some_leaf().into()).unwrap();
        assert!(matches!(
            Predicate::new(PredicateType::Not, Some("col1"), pred.into()),
            Err(Error::BadFilterFormat(_))
        ));
        assert_eq!(some_leaf().column(), Some("x"));
    }

    #[test]
    fn test_predicate_spec() {
        let spec = json!({"and": [
            {"equal": {"column": "c1", "parameter": 1}},
            {"not": {"in": {"column": "c2", "parameters": ["a", "b"]}}},
            {"or": [{"empty": {"column": "c3"}}, {"greater": {"column": "c1", "parameter": 2.5}}]}
        ]});
        let pred = Predicate::from_spec(&spec).unwrap();
        assert_eq!(pred.ty(), PredicateType::And);
        assert_eq!(pred.children().len(), 3);
        assert_eq!(pred.columns(), vec!["c1", "c2", "c3", "c1"]);
        assert_eq!(pred.to_spec(), spec);

        let bad_specs = [
            json!({}),
            json!({"equal": {"column": "c1", "parameter": 1}, "empty": {"column": "c1"}}),
            json!({"unknown": {"column": "c1"}}),
            json!({"equal": {"column": "c1"}}),
            json!({"equal": {"column": "c1", "parameter": [1]}}),
            json!({"equal": {"column": 1, "parameter": 1}}),
            json!({"in": {"column": "c1", "parameters": []}}),
            json!({"empty": {}}),
            json!({"empty": {"column": "c1", "parameter": 5}}),
            json!({"empty": {"column": "c1", "parameters": [5]}}),
            json!({"equal": {"column": "c1", "parameter": 1, "parameters": [1, 2]}}),
            json!({"equal": {"column": "c1", "parameters": [1]}}),
            json!({"in": {"column": "c1", "parameter": 1, "parameters": [1]}}),
            json!({"contains": {"column": "c1", "parameter": "x", "extra": true}}),
            json!({"and": []}),
            json!({"and": {"empty": {"column": "c1"}}}),
            json!({"not": [{"empty": {"column": "c1"}}]}),
            json!({"and": [1, 2]}),
        ];
        for spec in bad_specs {
            assert!(
                matches!(Predicate::from_spec(&spec), Err(Error::BadFilterFormat(_))),
                "{}",
                spec
            );
        }
    }

    #[test]
    fn test_check_predicate_columns() {
        let catalog = MemCatalog::default();
        let schema_id = catalog.create_schema(SchemaSpec::new("public")).unwrap();
        let table_id = catalog
            .create_table(
                schema_id,
                TableSpec::new(
                    "t1",
                    vec![
                        ColumnSpec::new("c1", DbType::Integer, ColumnAttributes::NULLABLE),
                        ColumnSpec::new("c2", DbType::Text, ColumnAttributes::NULLABLE),
                    ],
                ),
            )
            .unwrap();
        let pred = Predicate::from_spec(&json!({"or": [
            {"lesser": {"column": "c1", "parameter": 3}},
            {"contains": {"column": "c2", "parameter": "x"}}
        ]}))
        .unwrap();
        check_predicate_columns(&catalog, table_id, &pred).unwrap();

        let pred = Predicate::from_spec(&json!({"empty": {"column": "c3"}})).unwrap();
        assert!(matches!(
            check_predicate_columns(&catalog, table_id, &pred),
            Err(Error::BadFilterFormat(_))
        ));
        assert!(matches!(
            check_predicate_columns(&catalog, table_id + 100, &pred),
            Err(Error::Catalog(CatalogError::TableNotExists(_)))
        ));
    }
}
