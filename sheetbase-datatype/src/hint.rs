use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hint describes a capability of a type, e.g. values of the type can be
/// ordered or matched as strings.
///
/// Operations declare the hints their parameters require, and a UI type
/// is applicable to a parameter if its hint set contains all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    Any,
    Boolean,
    Comparable,
    Numeric,
    StringLike,
    Email,
    Uri,
    Money,
    Date,
    Time,
    PointInTime,
    Duration,
}

pub type HintSet = BTreeSet<Hint>;

/// Returns whether `hints` satisfies every hint of `condition`.
#[inline]
pub fn satisfies(hints: &HintSet, condition: &HintSet) -> bool {
    condition.is_subset(hints)
}

/// Build a `HintSet` from hint variant names.
#[macro_export]
macro_rules! hintset {
    ($($hint:ident),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut set = $crate::hint::HintSet::new();
        $(set.insert($crate::hint::Hint::$hint);)*
        set
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies() {
        let hints = hintset![Any, Comparable, Numeric];
        assert!(satisfies(&hints, &hintset![]));
        assert!(satisfies(&hints, &hintset![Comparable]));
        assert!(!satisfies(&hints, &hintset![Comparable, StringLike]));
    }
}
