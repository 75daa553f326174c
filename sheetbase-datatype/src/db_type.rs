use crate::hint::HintSet;
use crate::hintset;
use crate::ui_type::UiType;
use crate::value::Value;
use std::fmt;

/// Schema name of types installed on top of the builtin catalog types.
pub const CUSTOM_TYPE_PREFIX: &str = "SHEET_TYPES.";

/// DbType is the catalog-level type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbType {
    BigInt,
    Boolean,
    Char,
    Date,
    Decimal,
    DoublePrecision,
    Float,
    Integer,
    Interval,
    Money,
    Numeric,
    Real,
    SmallInt,
    Text,
    TimeWithTimeZone,
    TimeWithoutTimeZone,
    TimestampWithTimeZone,
    TimestampWithoutTimeZone,
    VarChar,
    // custom types
    Email,
    SheetMoney,
    MulticurrencyMoney,
    Uri,
}

/// TypeFamily groups types sharing the same option schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// NUMERIC and DECIMAL: precision and scale.
    Numeric,
    /// CHAR and VARCHAR: length.
    Character,
    /// INTERVAL: fields and precision.
    Interval,
    /// TIME and TIMESTAMP: precision.
    Time,
    /// Types without options.
    Plain,
}

impl TypeFamily {
    /// Returns names of options legal for this family.
    #[inline]
    pub fn option_names(self) -> &'static [&'static str] {
        use crate::options::{FIELDS, LENGTH, PRECISION, SCALE};
        match self {
            TypeFamily::Numeric => &[PRECISION, SCALE],
            TypeFamily::Character => &[LENGTH],
            TypeFamily::Interval => &[FIELDS, PRECISION],
            TypeFamily::Time => &[PRECISION],
            TypeFamily::Plain => &[],
        }
    }
}

impl DbType {
    pub const ALL: [DbType; 23] = [
        DbType::BigInt,
        DbType::Boolean,
        DbType::Char,
        DbType::Date,
        DbType::Decimal,
        DbType::DoublePrecision,
        DbType::Float,
        DbType::Integer,
        DbType::Interval,
        DbType::Money,
        DbType::Numeric,
        DbType::Real,
        DbType::SmallInt,
        DbType::Text,
        DbType::TimeWithTimeZone,
        DbType::TimeWithoutTimeZone,
        DbType::TimestampWithTimeZone,
        DbType::TimestampWithoutTimeZone,
        DbType::VarChar,
        DbType::Email,
        DbType::SheetMoney,
        DbType::MulticurrencyMoney,
        DbType::Uri,
    ];

    /// Returns the canonical identifier of the type.
    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            DbType::BigInt => "BIGINT",
            DbType::Boolean => "BOOLEAN",
            DbType::Char => "CHAR",
            DbType::Date => "DATE",
            DbType::Decimal => "DECIMAL",
            DbType::DoublePrecision => "DOUBLE PRECISION",
            DbType::Float => "FLOAT",
            DbType::Integer => "INTEGER",
            DbType::Interval => "INTERVAL",
            DbType::Money => "MONEY",
            DbType::Numeric => "NUMERIC",
            DbType::Real => "REAL",
            DbType::SmallInt => "SMALLINT",
            DbType::Text => "TEXT",
            DbType::TimeWithTimeZone => "TIME WITH TIME ZONE",
            DbType::TimeWithoutTimeZone => "TIME WITHOUT TIME ZONE",
            DbType::TimestampWithTimeZone => "TIMESTAMP WITH TIME ZONE",
            DbType::TimestampWithoutTimeZone => "TIMESTAMP WITHOUT TIME ZONE",
            DbType::VarChar => "VARCHAR",
            DbType::Email => "SHEET_TYPES.EMAIL",
            DbType::SheetMoney => "SHEET_TYPES.MONEY",
            DbType::MulticurrencyMoney => "SHEET_TYPES.MULTICURRENCY_MONEY",
            DbType::Uri => "SHEET_TYPES.URI",
        }
    }

    /// Resolve a type identifier, ignoring case and redundant whitespace.
    pub fn from_id(type_id: &str) -> Option<DbType> {
        let norm = type_id
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        if let Some(ty) = DbType::ALL.iter().find(|ty| ty.id() == norm) {
            return Some(*ty);
        }
        let ty = match norm.as_str() {
            "INT" | "INT4" => DbType::Integer,
            "INT8" => DbType::BigInt,
            "INT2" => DbType::SmallInt,
            "FLOAT8" => DbType::DoublePrecision,
            "FLOAT4" => DbType::Real,
            "BOOL" => DbType::Boolean,
            "CHARACTER" => DbType::Char,
            "CHARACTER VARYING" => DbType::VarChar,
            "TIME" => DbType::TimeWithoutTimeZone,
            "TIMESTAMP" => DbType::TimestampWithoutTimeZone,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns whether the type must be installed into the catalog
    /// before use.
    #[inline]
    pub fn is_custom(self) -> bool {
        matches!(
            self,
            DbType::Email | DbType::SheetMoney | DbType::MulticurrencyMoney | DbType::Uri
        )
    }

    /// Returns the type the catalog actually stores for this type.
    #[inline]
    pub fn canonical(self) -> DbType {
        match self {
            DbType::Float => DbType::DoublePrecision,
            DbType::Decimal => DbType::Numeric,
            other => other,
        }
    }

    #[inline]
    pub fn family(self) -> TypeFamily {
        match self {
            DbType::Numeric | DbType::Decimal => TypeFamily::Numeric,
            DbType::Char | DbType::VarChar => TypeFamily::Character,
            DbType::Interval => TypeFamily::Interval,
            DbType::TimeWithTimeZone
            | DbType::TimeWithoutTimeZone
            | DbType::TimestampWithTimeZone
            | DbType::TimestampWithoutTimeZone => TypeFamily::Time,
            _ => TypeFamily::Plain,
        }
    }

    /// Returns the semantic type presented to users for this type.
    #[inline]
    pub fn ui_type(self) -> UiType {
        match self {
            DbType::BigInt
            | DbType::Integer
            | DbType::SmallInt
            | DbType::Real
            | DbType::DoublePrecision
            | DbType::Float
            | DbType::Numeric
            | DbType::Decimal => UiType::Number,
            DbType::Boolean => UiType::Boolean,
            DbType::Char | DbType::VarChar | DbType::Text => UiType::Text,
            DbType::Date => UiType::Date,
            DbType::TimeWithTimeZone | DbType::TimeWithoutTimeZone => UiType::Time,
            DbType::TimestampWithTimeZone | DbType::TimestampWithoutTimeZone => UiType::DateTime,
            DbType::Interval => UiType::Duration,
            DbType::Money | DbType::SheetMoney | DbType::MulticurrencyMoney => UiType::Money,
            DbType::Email => UiType::Email,
            DbType::Uri => UiType::Uri,
        }
    }

    /// Returns hints describing what values of this type support.
    pub fn hints(self) -> HintSet {
        match self {
            DbType::Boolean => hintset![Any, Boolean],
            DbType::BigInt
            | DbType::Integer
            | DbType::SmallInt
            | DbType::Real
            | DbType::DoublePrecision
            | DbType::Float
            | DbType::Numeric
            | DbType::Decimal => hintset![Any, Comparable, Numeric],
            DbType::Money | DbType::SheetMoney => hintset![Any, Comparable, Money],
            // amounts in different currencies are not ordered.
            DbType::MulticurrencyMoney => hintset![Any, Money],
            DbType::Char | DbType::VarChar | DbType::Text => hintset![Any, StringLike],
            DbType::Email => hintset![Any, StringLike, Email],
            DbType::Uri => hintset![Any, StringLike, Uri],
            DbType::Date => hintset![Any, Comparable, PointInTime, Date],
            DbType::TimeWithTimeZone | DbType::TimeWithoutTimeZone => {
                hintset![Any, Comparable, PointInTime, Time]
            }
            DbType::TimestampWithTimeZone | DbType::TimestampWithoutTimeZone => {
                hintset![Any, Comparable, PointInTime, Date, Time]
            }
            DbType::Interval => hintset![Any, Comparable, Duration],
        }
    }

    /// Returns whether a value can be stored in a column of this type.
    /// Temporal values are kept in their textual form.
    #[inline]
    pub fn accepts(self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(_) => self == DbType::Boolean,
            Value::Int(_) => matches!(
                self,
                DbType::BigInt
                    | DbType::Integer
                    | DbType::SmallInt
                    | DbType::Real
                    | DbType::DoublePrecision
                    | DbType::Float
                    | DbType::Numeric
                    | DbType::Decimal
                    | DbType::Money
                    | DbType::SheetMoney
            ),
            Value::Float(_) => matches!(
                self,
                DbType::Real
                    | DbType::DoublePrecision
                    | DbType::Float
                    | DbType::Numeric
                    | DbType::Decimal
                    | DbType::Money
                    | DbType::SheetMoney
            ),
            Value::Text(_) => !matches!(
                self.ui_type(),
                UiType::Number | UiType::Boolean
            ),
        }
    }
}

impl fmt::Display for DbType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
