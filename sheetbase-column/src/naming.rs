use std::collections::BTreeSet;

/// Generate a column name `{template}{n}` that collides with none of
/// the existing names.
///
/// `n` is one above the largest index among names made of the template
/// followed by digits, but never below `min_index`. When that largest
/// index is `u64::MAX`, the smallest unused index from `min_index` is
/// taken instead.
pub fn gen_col_name<'a>(
    template: &str,
    existing: impl IntoIterator<Item = &'a str>,
    min_index: u64,
) -> String {
    let used: BTreeSet<u64> = existing
        .into_iter()
        .filter_map(|name| name_index(template, name))
        .collect();
    let n = match used.iter().next_back() {
        None => min_index,
        Some(&max) => match max.checked_add(1) {
            Some(next) => next.max(min_index),
            None => (min_index..=u64::MAX)
                .find(|idx| !used.contains(idx))
                .unwrap_or(min_index),
        },
    };
    format!("{}{}", template, n)
}

#[inline]
fn name_index(template: &str, name: &str) -> Option<u64> {
    let digits = name.strip_prefix(template)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_col_name() {
        assert_eq!(gen_col_name("Column ", std::iter::empty(), 0), "Column 0");
        assert_eq!(gen_col_name("Column ", ["id"], 1), "Column 1");
        assert_eq!(
            gen_col_name("Column ", ["id", "Column 1", "Column 2"], 3),
            "Column 3"
        );
        // gaps never get filled.
        assert_eq!(
            gen_col_name("Column ", ["id", "Column 1", "Column 5"], 3),
            "Column 6"
        );
        // leading zeros still count.
        assert_eq!(gen_col_name("Column ", ["Column 07"], 1), "Column 8");
    }

    #[test]
    fn test_gen_col_name_unmatched() {
        let existing = ["Column", "Column x", "Column 1a", "column 9", "Column -3", "Column "];
        assert_eq!(gen_col_name("Column ", existing, 6), "Column 6");
        assert_eq!(gen_col_name("email ", ["email", "email 1"], 1), "email 2");
        assert_eq!(gen_col_name("email ", ["email"], 1), "email 1");
    }

    #[test]
    fn test_gen_col_name_index_overflow() {
        let max = format!("Column {}", u64::MAX);
        let name = gen_col_name("Column ", [max.as_str(), "Column 3", "Column 4"], 3);
        assert_eq!(name, "Column 5");
        let near_max = format!("Column {}", u64::MAX - 1);
        let name = gen_col_name("Column ", [max.as_str(), near_max.as_str()], 0);
        assert_eq!(name, "Column 0");
    }
}
