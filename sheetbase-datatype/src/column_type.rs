use crate::db_type::{DbType, TypeFamily};
use crate::error::Result;
use crate::options::{OptionMap, TypeOptions, validate_type_options};
use std::fmt;

/// ColumnType is a catalog type together with its validated options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnType {
    pub db_type: DbType,
    pub options: TypeOptions,
}

impl ColumnType {
    #[inline]
    pub fn new(db_type: DbType, options: TypeOptions) -> Self {
        ColumnType { db_type, options }
    }

    #[inline]
    pub fn plain(db_type: DbType) -> Self {
        ColumnType {
            db_type,
            options: TypeOptions::default(),
        }
    }

    /// Build from raw options, validating them against the type family.
    #[inline]
    pub fn with_raw_options(db_type: DbType, options: &OptionMap) -> Result<Self> {
        let options = validate_type_options(db_type, options)?;
        Ok(ColumnType { db_type, options })
    }

    /// Returns the type as the catalog stores it: aliases resolve to
    /// their canonical type and CHAR gets an explicit length of 1.
    #[inline]
    pub fn normalize(self) -> Self {
        let db_type = self.db_type.canonical();
        let mut options = self.options;
        if db_type == DbType::Char && options.length.is_none() {
            options.length = Some(1);
        }
        ColumnType { db_type, options }
    }
}

impl From<DbType> for ColumnType {
    #[inline]
    fn from(db_type: DbType) -> Self {
        ColumnType::plain(db_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.db_type.id();
        let opts = &self.options;
        match self.db_type.family() {
            TypeFamily::Numeric => match (opts.precision, opts.scale) {
                (Some(p), Some(s)) => write!(f, "{id}({p}, {s})"),
                (Some(p), None) => write!(f, "{id}({p})"),
                _ => f.write_str(id),
            },
            TypeFamily::Character => match opts.length {
                Some(len) => write!(f, "{id}({len})"),
                None => f.write_str(id),
            },
            TypeFamily::Interval => {
                f.write_str(id)?;
                if let Some(fields) = opts.fields {
                    write!(f, " {}", fields.as_str().to_ascii_uppercase())?;
                }
                if let Some(p) = opts.precision {
                    write!(f, "({p})")?;
                }
                Ok(())
            }
            TypeFamily::Time => match (opts.precision, id.split_once(' ')) {
                (Some(p), Some((head, tail))) => write!(f, "{head}({p}) {tail}"),
                _ => f.write_str(id),
            },
            TypeFamily::Plain => f.write_str(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IntervalFields;

    #[test]
    fn test_normalized_type_names() {
        for ty in DbType::ALL {
            let expected = match ty {
                DbType::Float => "DOUBLE PRECISION",
                DbType::Decimal => "NUMERIC",
                DbType::Char => "CHAR(1)",
                other => other.id(),
            };
            assert_eq!(ColumnType::plain(ty).normalize().to_string(), expected);
        }
    }

    #[test]
    fn test_type_display_with_options() {
        let ty = ColumnType::new(DbType::Decimal, TypeOptions::numeric(5, Some(3))).normalize();
        assert_eq!(ty.to_string(), "NUMERIC(5, 3)");
        let ty = ColumnType::new(DbType::VarChar, TypeOptions::length(5));
        assert_eq!(ty.to_string(), "VARCHAR(5)");
        let ty = ColumnType::new(
            DbType::Interval,
            TypeOptions::interval(Some(IntervalFields::Second), Some(3)),
        );
        assert_eq!(ty.to_string(), "INTERVAL SECOND(3)");
        let ty = ColumnType::new(DbType::Interval, TypeOptions::interval(None, Some(2)));
        assert_eq!(ty.to_string(), "INTERVAL(2)");
        let ty = ColumnType::new(
            DbType::TimestampWithTimeZone,
            TypeOptions {
                precision: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(ty.to_string(), "TIMESTAMP(3) WITH TIME ZONE");
    }
}
