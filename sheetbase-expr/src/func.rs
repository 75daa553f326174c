use serde::Serialize;
use sheetbase_datatype::{DbType, HintSet, Value, hintset};
use std::collections::BTreeSet;

/// Capability of a database function, telling where clients may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Filter,
}

/// Hints required by one parameter, parameters counted from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterHint {
    pub index: usize,
    pub hints: HintSet,
    pub suggested_values: Vec<Value>,
}

/// Alternative name of a function, applicable when the hint set is satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasHint {
    pub alias: String,
    pub when: HintSet,
}

/// Descriptor of a function the catalog can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFunction {
    pub id: String,
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
    pub parameter_count: Option<usize>,
    pub parameters: Vec<ParameterHint>,
    /// Hints required by every parameter.
    pub all_parameters: HintSet,
    pub aliases: Vec<AliasHint>,
    /// Types that must be installed to use the function.
    pub depends_on: Vec<DbType>,
}

impl DbFunction {
    #[inline]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        DbFunction {
            id: id.into(),
            name: name.into(),
            capabilities: BTreeSet::new(),
            parameter_count: None,
            parameters: vec![],
            all_parameters: HintSet::new(),
            aliases: vec![],
            depends_on: vec![],
        }
    }

    #[inline]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    #[inline]
    pub fn parameter_count(mut self, parameter_count: usize) -> Self {
        self.parameter_count = Some(parameter_count);
        self
    }

    #[inline]
    pub fn parameter(mut self, index: usize, hints: HintSet) -> Self {
        self.parameter_mut(index).hints.extend(hints);
        self
    }

    #[inline]
    pub fn suggested_values(mut self, index: usize, values: Vec<Value>) -> Self {
        self.parameter_mut(index).suggested_values = values;
        self
    }

    #[inline]
    pub fn all_parameters(mut self, hints: HintSet) -> Self {
        self.all_parameters.extend(hints);
        self
    }

    #[inline]
    pub fn alias(mut self, alias: impl Into<String>, when: HintSet) -> Self {
        self.aliases.push(AliasHint {
            alias: alias.into(),
            when,
        });
        self
    }

    #[inline]
    pub fn depends_on(mut self, ty: DbType) -> Self {
        self.depends_on.push(ty);
        self
    }

    #[inline]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns hints of parameter at given index, including hints shared
    /// by all parameters.
    pub fn parameter_hints(&self, index: usize) -> HintSet {
        let mut hints = self.all_parameters.clone();
        for p in self.parameters.iter().filter(|p| p.index == index) {
            hints.extend(p.hints.iter().copied());
        }
        hints
    }

    #[inline]
    pub fn suggested_values_of(&self, index: usize) -> &[Value] {
        self.parameters
            .iter()
            .find(|p| p.index == index)
            .map(|p| p.suggested_values.as_slice())
            .unwrap_or(&[])
    }

    /// Returns whether every type the function depends on is installed.
    #[inline]
    pub fn is_supported(&self, installed: &[DbType]) -> bool {
        self.depends_on.iter().all(|ty| installed.contains(ty))
    }

    fn parameter_mut(&mut self, index: usize) -> &mut ParameterHint {
        match self.parameters.iter().position(|p| p.index == index) {
            Some(pos) => &mut self.parameters[pos],
            None => {
                self.parameters.push(ParameterHint {
                    index,
                    hints: HintSet::new(),
                    suggested_values: vec![],
                });
                let last = self.parameters.len() - 1;
                &mut self.parameters[last]
            }
        }
    }
}

fn comparison(id: &str, name: &str, time_alias: &str) -> DbFunction {
    DbFunction::new(id, name)
        .capability(Capability::Filter)
        .parameter_count(2)
        .all_parameters(hintset![Comparable])
        .alias(time_alias, hintset![PointInTime])
}

/// Returns all functions known to the library, in a stable order.
pub fn builtin_functions() -> Vec<DbFunction> {
    vec![
        DbFunction::new("empty", "is empty")
            .capability(Capability::Filter)
            .parameter_count(1),
        DbFunction::new("equal", "is equal to")
            .capability(Capability::Filter)
            .parameter_count(2)
            .all_parameters(hintset![Any])
            .alias("is same as", hintset![PointInTime]),
        comparison("lesser", "is less than", "is before"),
        comparison("lesser_or_equal", "is less than or equal to", "is before or same as"),
        comparison("greater", "is greater than", "is after"),
        comparison("greater_or_equal", "is greater than or equal to", "is after or same as"),
        DbFunction::new("starts_with", "starts with")
            .capability(Capability::Filter)
            .parameter_count(2)
            .all_parameters(hintset![StringLike]),
        DbFunction::new("contains", "contains")
            .capability(Capability::Filter)
            .parameter_count(2)
            .all_parameters(hintset![StringLike]),
        DbFunction::new("uri_scheme_is", "URI scheme is")
            .capability(Capability::Filter)
            .parameter_count(2)
            .parameter(0, hintset![Uri])
            .parameter(1, hintset![StringLike])
            .suggested_values(
                1,
                vec![Value::from("http"), Value::from("https"), Value::from("ftp")],
            )
            .depends_on(DbType::Uri),
        DbFunction::new("email_domain_contains", "email domain contains")
            .capability(Capability::Filter)
            .parameter_count(2)
            .parameter(0, hintset![Email])
            .parameter(1, hintset![StringLike])
            .depends_on(DbType::Email),
        DbFunction::new("not", "negate")
            .parameter_count(1)
            .all_parameters(hintset![Boolean]),
        DbFunction::new("and", "and").all_parameters(hintset![Boolean]),
        DbFunction::new("or", "or").all_parameters(hintset![Boolean]),
        DbFunction::new("literal", "literal").parameter_count(1),
        DbFunction::new("column_name", "column name").parameter_count(1),
        DbFunction::new("to_lowercase", "to lowercase")
            .parameter_count(1)
            .all_parameters(hintset![StringLike]),
    ]
}

/// Returns builtin functions usable with the installed types.
#[inline]
pub fn get_supported_functions(installed: &[DbType]) -> Vec<DbFunction> {
    builtin_functions()
        .into_iter()
        .filter(|f| f.is_supported(installed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_functions_unique_ids() {
        let functions = builtin_functions();
        let ids: BTreeSet<_> = functions.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), functions.len());
    }

    #[test]
    fn test_parameter_hints() {
        let f = DbFunction::new("f", "f")
            .all_parameters(hintset![Any])
            .parameter(1, hintset![StringLike])
            .parameter(1, hintset![Uri])
            .suggested_values(1, vec![Value::from("x")]);
        assert_eq!(f.parameter_hints(0), hintset![Any]);
        assert_eq!(f.parameter_hints(1), hintset![Any, StringLike, Uri]);
        assert!(f.suggested_values_of(0).is_empty());
        assert_eq!(f.suggested_values_of(1), &[Value::from("x")]);
        assert_eq!(f.parameters.len(), 1);
    }

    #[test]
    fn test_supported_functions() {
        let all = get_supported_functions(&DbType::ALL);
        assert_eq!(all.len(), builtin_functions().len());
        let builtin: Vec<_> = DbType::ALL.into_iter().filter(|ty| !ty.is_custom()).collect();
        let ids: Vec<_> = get_supported_functions(&builtin)
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert!(!ids.iter().any(|id| id == "uri_scheme_is"));
        assert!(!ids.iter().any(|id| id == "email_domain_contains"));
        assert!(ids.iter().any(|id| id == "equal"));
    }
}
