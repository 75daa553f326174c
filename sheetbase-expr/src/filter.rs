use crate::error::{Error, Result};
use crate::func::{Capability, DbFunction, get_supported_functions};
use log::debug;
use serde::Serialize;
use sheetbase_catalog::CatalogRead;
use sheetbase_datatype::{UiType, UiTypeHints, Value, types_satisfying_hintset, ui_types_mapped_to_hintsets};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterAlias {
    pub alias: String,
    pub ui_types: Vec<UiType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterParameter {
    pub ui_types: Vec<UiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_values: Option<Vec<Value>>,
}

/// Filter offered to clients, derived from a function with the filter
/// capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDescriptor {
    pub id: String,
    pub name: String,
    pub aliases: Vec<FilterAlias>,
    pub parameters: Vec<FilterParameter>,
}

/// Returns filters available in the catalog.
///
/// Functions depending on types that are not installed are left out,
/// and UI types of parameters follow the installed types.
pub fn get_available_filters<R: CatalogRead + ?Sized>(catalog: &R) -> Result<Vec<FilterDescriptor>> {
    let installed = catalog.installed_types();
    let functions = get_supported_functions(&installed);
    let type_hints = ui_types_mapped_to_hintsets(&installed);
    let filters = build_filters(&functions, &type_hints)?;
    debug!(
        "{} filters available from {} functions",
        filters.len(),
        functions.len()
    );
    Ok(filters)
}

/// Build filters from functions with the filter capability.
///
/// Fails if a filter function does not declare its parameter count, or
/// if a parameter accepts no UI type. Both are registry bugs.
pub fn build_filters(
    functions: &[DbFunction],
    type_hints: &UiTypeHints,
) -> Result<Vec<FilterDescriptor>> {
    functions
        .iter()
        .filter(|f| f.has_capability(Capability::Filter))
        .map(|f| filter_from_function(type_hints, f))
        .collect()
}

fn filter_from_function(type_hints: &UiTypeHints, f: &DbFunction) -> Result<FilterDescriptor> {
    let aliases = f
        .aliases
        .iter()
        .map(|a| FilterAlias {
            alias: a.alias.clone(),
            ui_types: types_satisfying_hintset(type_hints, &a.when),
        })
        .collect();
    Ok(FilterDescriptor {
        id: f.id.clone(),
        name: f.name.clone(),
        aliases,
        parameters: filter_parameters(type_hints, f)?,
    })
}

fn filter_parameters(type_hints: &UiTypeHints, f: &DbFunction) -> Result<Vec<FilterParameter>> {
    let parameter_count = match f.parameter_count {
        Some(n) if n > 0 => n,
        _ => {
            return Err(Error::Configuration(format!(
                "parameter count must be declared on filter function {}",
                f.id
            )));
        }
    };
    (0..parameter_count)
        .map(|index| {
            let ui_types = types_satisfying_hintset(type_hints, &f.parameter_hints(index));
            if ui_types.is_empty() {
                return Err(Error::Configuration(format!(
                    "hints of function {} parameter at index {} match no UI type",
                    f.id, index
                )));
            }
            let suggested_values = f.suggested_values_of(index);
            Ok(FilterParameter {
                ui_types,
                suggested_values: (!suggested_values.is_empty()).then(|| suggested_values.to_vec()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::builtin_functions;
    use crate::predicate::{Arity, Position, Predicate, PredicateType};
    use serde_json::json;
    use sheetbase_catalog::CatalogConfig;
    use sheetbase_catalog::mem_impl::MemCatalog;
    use sheetbase_datatype::{DbType, hintset};

    fn find<'a>(filters: &'a [FilterDescriptor], id: &str) -> &'a FilterDescriptor {
        filters.iter().find(|f| f.id == id).unwrap()
    }

    #[test]
    fn test_available_filters() {
        let _ = env_logger::builder().is_test(true).try_init();
        let catalog = MemCatalog::default();
        let filters = get_available_filters(&catalog).unwrap();
        let ids: Vec<_> = filters.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "empty",
                "equal",
                "lesser",
                "lesser_or_equal",
                "greater",
                "greater_or_equal",
                "starts_with",
                "contains",
                "uri_scheme_is",
                "email_domain_contains",
            ]
        );

        let lesser = find(&filters, "lesser");
        assert_eq!(lesser.aliases.len(), 1);
        assert_eq!(lesser.aliases[0].alias, "is before");
        assert_eq!(
            lesser.aliases[0].ui_types,
            vec![UiType::Date, UiType::DateTime, UiType::Time]
        );
        assert_eq!(lesser.parameters.len(), 2);
        assert!(!lesser.parameters[0].ui_types.contains(&UiType::Text));
        assert!(lesser.parameters[0].ui_types.contains(&UiType::Number));

        let empty = find(&filters, "empty");
        assert_eq!(empty.parameters.len(), 1);
        assert!(empty.aliases.is_empty());

        let uri = find(&filters, "uri_scheme_is");
        assert_eq!(uri.parameters[0].ui_types, vec![UiType::Uri]);
        assert_eq!(
            uri.parameters[1].suggested_values,
            Some(vec![
                Value::from("http"),
                Value::from("https"),
                Value::from("ftp")
            ])
        );
        assert_eq!(
            serde_json::to_value(uri).unwrap(),
            json!({
                "id": "uri_scheme_is",
                "name": "URI scheme is",
                "aliases": [],
                "parameters": [
                    {"ui_types": ["uri"]},
                    {"ui_types": ["email", "text", "uri"], "suggested_values": ["http", "https", "ftp"]}
                ]
            })
        );
    }

    #[test]
    fn test_available_filters_are_predicates() {
        let catalog = MemCatalog::default();
        for f in get_available_filters(&catalog).unwrap() {
            let ty = PredicateType::from_id(&f.id).unwrap();
            assert_eq!(ty.position(), Position::Leaf, "{}", f.id);
            let arity = match ty.arity() {
                Arity::None => 0,
                Arity::Single => 1,
                Arity::Multi => 2,
            };
            // the column counts as the first parameter.
            assert_eq!(f.parameters.len(), arity + 1, "{}", f.id);
        }
        let spec = json!({"uri_scheme_is": {"column": "c1", "parameter": "https"}});
        let pred = Predicate::from_spec(&spec).unwrap();
        assert_eq!(pred.ty(), PredicateType::UriSchemeIs);
    }

    #[test]
    fn test_available_filters_without_custom_types() {
        let catalog = CatalogConfig::default().install_custom_types(false).build();
        let filters = get_available_filters(&catalog).unwrap();
        assert!(filters.iter().all(|f| f.id != "uri_scheme_is"));
        assert!(filters.iter().all(|f| f.id != "email_domain_contains"));
        let contains = find(&filters, "contains");
        assert_eq!(contains.parameters[0].ui_types, vec![UiType::Text]);
    }

    #[test]
    fn test_build_filters_skips_non_filter_functions() {
        let type_hints = ui_types_mapped_to_hintsets(&DbType::ALL);
        let filters = build_filters(&builtin_functions(), &type_hints).unwrap();
        for id in ["not", "and", "or", "literal", "column_name", "to_lowercase"] {
            assert!(filters.iter().all(|f| f.id != id));
        }
    }

    #[test]
    fn test_build_filters_configuration_error() {
        let type_hints = ui_types_mapped_to_hintsets(&DbType::ALL);
        let no_count = DbFunction::new("f", "f").capability(Capability::Filter);
        assert!(matches!(
            build_filters(&[no_count], &type_hints),
            Err(Error::Configuration(_))
        ));
        let zero_count = DbFunction::new("f", "f")
            .capability(Capability::Filter)
            .parameter_count(0);
        assert!(matches!(
            build_filters(&[zero_count], &type_hints),
            Err(Error::Configuration(_))
        ));
        let unsatisfiable = DbFunction::new("f", "f")
            .capability(Capability::Filter)
            .parameter_count(2)
            .parameter(1, hintset![Uri, Email]);
        assert!(matches!(
            build_filters(&[unsatisfiable.clone()], &type_hints),
            Err(Error::Configuration(_))
        ));
        // not a filter, so not checked.
        let not_filter = DbFunction {
            capabilities: Default::default(),
            ..unsatisfiable
        };
        assert!(build_filters(&[not_filter], &type_hints).unwrap().is_empty());
    }
}
