use crate::db_type::DbType;
use crate::hint::{HintSet, satisfies};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// UiType is the semantic type a spreadsheet user works with.
/// Several catalog types map to one UI type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiType {
    Boolean,
    Date,
    DateTime,
    Duration,
    Email,
    Money,
    Number,
    Text,
    Time,
    Uri,
    Other,
}

impl UiType {
    pub const ALL: [UiType; 11] = [
        UiType::Boolean,
        UiType::Date,
        UiType::DateTime,
        UiType::Duration,
        UiType::Email,
        UiType::Money,
        UiType::Number,
        UiType::Text,
        UiType::Time,
        UiType::Uri,
        UiType::Other,
    ];

    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            UiType::Boolean => "boolean",
            UiType::Date => "date",
            UiType::DateTime => "datetime",
            UiType::Duration => "duration",
            UiType::Email => "email",
            UiType::Money => "money",
            UiType::Number => "number",
            UiType::Text => "text",
            UiType::Time => "time",
            UiType::Uri => "uri",
            UiType::Other => "other",
        }
    }

    /// Returns all catalog types presented as this UI type.
    #[inline]
    pub fn db_types(self) -> Vec<DbType> {
        DbType::ALL
            .into_iter()
            .filter(|ty| ty.ui_type() == self)
            .collect()
    }
}

/// Hint set of each UI type available in a catalog.
pub type UiTypeHints = BTreeMap<UiType, HintSet>;

/// Map UI types to hint sets, given the catalog types installed.
///
/// The hint set of a UI type is the intersection of hint sets of its
/// installed catalog types. UI types without any installed catalog type
/// are left out.
pub fn ui_types_mapped_to_hintsets(installed: &[DbType]) -> UiTypeHints {
    let mut res = UiTypeHints::new();
    for ty in installed {
        let hints = ty.hints();
        res.entry(ty.ui_type())
            .and_modify(|acc: &mut HintSet| acc.retain(|h| hints.contains(h)))
            .or_insert(hints);
    }
    res
}

/// Returns UI types whose hint set satisfies the condition, in UI type order.
#[inline]
pub fn types_satisfying_hintset(mapping: &UiTypeHints, condition: &HintSet) -> Vec<UiType> {
    mapping
        .iter()
        .filter(|(_, hints)| satisfies(hints, condition))
        .map(|(ui_type, _)| *ui_type)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hintset;

    #[test]
    fn test_every_db_type_has_ui_type() {
        let total: usize = UiType::ALL.iter().map(|t| t.db_types().len()).sum();
        assert_eq!(total, DbType::ALL.len());
        assert!(UiType::Other.db_types().is_empty());
    }

    #[test]
    fn test_hintset_mapping() {
        let mapping = ui_types_mapped_to_hintsets(&DbType::ALL);
        assert!(!mapping.contains_key(&UiType::Other));
        // MONEY types are comparable, but multi-currency money is not.
        assert!(!mapping[&UiType::Money].contains(&crate::hint::Hint::Comparable));
        assert_eq!(mapping[&UiType::Number], hintset![Any, Comparable, Numeric]);

        let builtin: Vec<_> = DbType::ALL.into_iter().filter(|ty| !ty.is_custom()).collect();
        let mapping = ui_types_mapped_to_hintsets(&builtin);
        assert!(!mapping.contains_key(&UiType::Email));
        assert!(!mapping.contains_key(&UiType::Uri));
        assert!(mapping[&UiType::Money].contains(&crate::hint::Hint::Comparable));
    }

    #[test]
    fn test_types_satisfying_hintset() {
        let mapping = ui_types_mapped_to_hintsets(&DbType::ALL);
        assert_eq!(
            types_satisfying_hintset(&mapping, &hintset![StringLike]),
            vec![UiType::Email, UiType::Text, UiType::Uri]
        );
        assert_eq!(
            types_satisfying_hintset(&mapping, &hintset![PointInTime]),
            vec![UiType::Date, UiType::DateTime, UiType::Time]
        );
        assert_eq!(
            types_satisfying_hintset(&mapping, &hintset![Any]).len(),
            mapping.len()
        );
        assert!(types_satisfying_hintset(&mapping, &hintset![Uri, Email]).is_empty());
    }

    #[test]
    fn test_ui_type_serde() {
        assert_eq!(serde_json::to_string(&UiType::DateTime).unwrap(), r#""datetime""#);
        for ty in UiType::ALL {
            assert_eq!(serde_json::to_value(ty).unwrap(), ty.id());
        }
    }
}
