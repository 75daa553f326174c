use crate::db_type::{DbType, TypeFamily};
use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const PRECISION: &str = "precision";
pub const SCALE: &str = "scale";
pub const LENGTH: &str = "length";
pub const FIELDS: &str = "fields";

pub const MAX_NUMERIC_PRECISION: i64 = 1000;
pub const MAX_CHAR_LENGTH: i64 = 10_485_760;
pub const MAX_TIME_PRECISION: i64 = 6;

/// Raw type options as supplied by callers, e.g. `{"precision": 5, "scale": 3}`.
pub type OptionMap = BTreeMap<String, Value>;

/// Field restriction of an INTERVAL column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalFields {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    YearToMonth,
    DayToHour,
    DayToMinute,
    DayToSecond,
    HourToMinute,
    HourToSecond,
    MinuteToSecond,
}

impl IntervalFields {
    pub const ALL: [IntervalFields; 13] = [
        IntervalFields::Year,
        IntervalFields::Month,
        IntervalFields::Day,
        IntervalFields::Hour,
        IntervalFields::Minute,
        IntervalFields::Second,
        IntervalFields::YearToMonth,
        IntervalFields::DayToHour,
        IntervalFields::DayToMinute,
        IntervalFields::DayToSecond,
        IntervalFields::HourToMinute,
        IntervalFields::HourToSecond,
        IntervalFields::MinuteToSecond,
    ];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalFields::Year => "year",
            IntervalFields::Month => "month",
            IntervalFields::Day => "day",
            IntervalFields::Hour => "hour",
            IntervalFields::Minute => "minute",
            IntervalFields::Second => "second",
            IntervalFields::YearToMonth => "year to month",
            IntervalFields::DayToHour => "day to hour",
            IntervalFields::DayToMinute => "day to minute",
            IntervalFields::DayToSecond => "day to second",
            IntervalFields::HourToMinute => "hour to minute",
            IntervalFields::HourToSecond => "hour to second",
            IntervalFields::MinuteToSecond => "minute to second",
        }
    }

    #[inline]
    pub fn parse(s: &str) -> Option<IntervalFields> {
        let norm = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        IntervalFields::ALL.into_iter().find(|f| f.as_str() == norm)
    }

    /// Fractional precision is only allowed when the last field is SECOND.
    #[inline]
    pub fn ends_in_second(self) -> bool {
        self.as_str().ends_with("second")
    }
}

/// Validated type options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeOptions {
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub length: Option<u32>,
    pub fields: Option<IntervalFields>,
}

impl TypeOptions {
    #[inline]
    pub fn numeric(precision: u32, scale: Option<u32>) -> Self {
        TypeOptions {
            precision: Some(precision),
            scale,
            ..Default::default()
        }
    }

    #[inline]
    pub fn length(length: u32) -> Self {
        TypeOptions {
            length: Some(length),
            ..Default::default()
        }
    }

    #[inline]
    pub fn interval(fields: Option<IntervalFields>, precision: Option<u32>) -> Self {
        TypeOptions {
            fields,
            precision,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self == &TypeOptions::default()
    }

    /// Converts back to the raw representation presented to callers.
    pub fn to_map(&self) -> OptionMap {
        let mut map = OptionMap::new();
        if let Some(precision) = self.precision {
            map.insert(PRECISION.to_string(), Value::Int(precision as i64));
        }
        if let Some(scale) = self.scale {
            map.insert(SCALE.to_string(), Value::Int(scale as i64));
        }
        if let Some(length) = self.length {
            map.insert(LENGTH.to_string(), Value::Int(length as i64));
        }
        if let Some(fields) = self.fields {
            map.insert(FIELDS.to_string(), Value::from(fields.as_str()));
        }
        map
    }
}

/// Validate raw options against the option schema of given type identifier.
///
/// Unknown types, option keys outside the schema of the type family and
/// out-of-range values all fail with `TypeMismatch`.
#[inline]
pub fn validate_options(type_id: &str, options: &OptionMap) -> Result<TypeOptions> {
    let db_type = DbType::from_id(type_id)
        .ok_or_else(|| Error::type_mismatch(format!("unknown type {type_id}")))?;
    validate_type_options(db_type, options)
}

pub fn validate_type_options(db_type: DbType, options: &OptionMap) -> Result<TypeOptions> {
    let family = db_type.family();
    let legal = family.option_names();
    if let Some(key) = options.keys().find(|k| !legal.contains(&k.as_str())) {
        return Err(Error::type_mismatch(format!(
            "option {key} is not valid for type {db_type}"
        )));
    }
    let mut res = TypeOptions::default();
    match family {
        TypeFamily::Numeric => {
            res.precision = int_option(db_type, options, PRECISION, 1..=MAX_NUMERIC_PRECISION)?;
            res.scale = int_option(db_type, options, SCALE, 0..=MAX_NUMERIC_PRECISION)?;
            match (res.precision, res.scale) {
                (None, Some(_)) => {
                    return Err(Error::type_mismatch(format!(
                        "scale of {db_type} requires precision"
                    )));
                }
                (Some(precision), Some(scale)) if scale > precision => {
                    return Err(Error::type_mismatch(format!(
                        "scale {scale} of {db_type} exceeds precision {precision}"
                    )));
                }
                _ => (),
            }
        }
        TypeFamily::Character => {
            res.length = int_option(db_type, options, LENGTH, 1..=MAX_CHAR_LENGTH)?;
        }
        TypeFamily::Interval => {
            res.fields = match options.get(FIELDS) {
                None | Some(Value::Null) => None,
                Some(Value::Text(s)) => Some(IntervalFields::parse(s).ok_or_else(|| {
                    Error::type_mismatch(format!("invalid interval fields '{s}'"))
                })?),
                Some(other) => {
                    return Err(Error::type_mismatch(format!(
                        "interval fields must be text, got {}",
                        other.kind_name()
                    )));
                }
            };
            res.precision = int_option(db_type, options, PRECISION, 0..=MAX_TIME_PRECISION)?;
            if let (Some(fields), Some(_)) = (res.fields, res.precision) {
                if !fields.ends_in_second() {
                    return Err(Error::type_mismatch(format!(
                        "interval fields '{}' do not allow precision",
                        fields.as_str()
                    )));
                }
            }
        }
        TypeFamily::Time => {
            res.precision = int_option(db_type, options, PRECISION, 0..=MAX_TIME_PRECISION)?;
        }
        TypeFamily::Plain => (),
    }
    Ok(res)
}

#[inline]
fn int_option(
    db_type: DbType,
    options: &OptionMap,
    key: &str,
    range: RangeInclusive<i64>,
) -> Result<Option<u32>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Int(v)) if range.contains(v) => Ok(Some(*v as u32)),
        Some(Value::Int(v)) => Err(Error::type_mismatch(format!(
            "{key} {v} of {db_type} out of range [{}, {}]",
            range.start(),
            range.end()
        ))),
        Some(other) => Err(Error::type_mismatch(format!(
            "{key} of {db_type} must be integer, got {}",
            other.kind_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, Value)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numeric_options() {
        for ty in ["NUMERIC", "DECIMAL"] {
            let res = validate_options(ty, &opts(&[("precision", 5.into()), ("scale", 3.into())]))
                .unwrap();
            assert_eq!(res, TypeOptions::numeric(5, Some(3)));
            assert_eq!(
                res.to_map(),
                opts(&[("precision", 5.into()), ("scale", 3.into())])
            );
        }
        let res = validate_options("NUMERIC", &opts(&[("precision", 5.into())])).unwrap();
        assert_eq!(res, TypeOptions::numeric(5, None));
        assert!(validate_options("NUMERIC", &opts(&[("precision", 3.into()), ("scale", 3.into())])).is_ok());
    }

    #[test]
    fn test_numeric_options_invalid() {
        let cases = [
            opts(&[("precision", 3.into()), ("scale", 5.into())]),
            opts(&[("scale", 2.into())]),
            opts(&[("precision", 0.into())]),
            opts(&[("precision", (-1).into())]),
            opts(&[("precision", 1001.into())]),
            opts(&[("precision", "5".into())]),
            opts(&[("precision", 5.into()), ("length", 5.into())]),
        ];
        for case in cases {
            let res = validate_options("NUMERIC", &case);
            assert!(matches!(res, Err(Error::TypeMismatch(_))), "{case:?}");
        }
    }

    #[test]
    fn test_options_on_plain_type() {
        let res = validate_options(
            "BOOLEAN",
            &opts(&[("precision", 5.into()), ("scale", 3.into())]),
        );
        assert!(matches!(res, Err(Error::TypeMismatch(_))));
        for ty in DbType::ALL {
            assert!(validate_type_options(ty, &OptionMap::new()).unwrap().is_empty());
        }
    }

    #[test]
    fn test_foreign_keys_per_family() {
        for ty in DbType::ALL {
            let legal = ty.family().option_names();
            for key in [PRECISION, SCALE, LENGTH, FIELDS] {
                if legal.contains(&key) {
                    continue;
                }
                let res = validate_type_options(ty, &opts(&[(key, 1.into())]));
                assert!(matches!(res, Err(Error::TypeMismatch(_))), "{ty} {key}");
            }
        }
    }

    #[test]
    fn test_length_options() {
        for ty in ["CHAR", "VARCHAR"] {
            let res = validate_options(ty, &opts(&[("length", 5.into())])).unwrap();
            assert_eq!(res, TypeOptions::length(5));
            assert!(validate_options(ty, &opts(&[("length", 0.into())])).is_err());
            assert!(validate_options(ty, &opts(&[("length", true.into())])).is_err());
        }
    }

    #[test]
    fn test_interval_options() {
        let res = validate_options("INTERVAL", &opts(&[("fields", "year".into())])).unwrap();
        assert_eq!(res.to_map(), opts(&[("fields", "year".into())]));
        let res = validate_options("INTERVAL", &opts(&[("precision", 3.into())])).unwrap();
        assert_eq!(res, TypeOptions::interval(None, Some(3)));
        let res = validate_options(
            "INTERVAL",
            &opts(&[("precision", 3.into()), ("fields", "SECOND".into())]),
        )
        .unwrap();
        assert_eq!(res.to_map(), opts(&[("precision", 3.into()), ("fields", "second".into())]));
        let res = validate_options("INTERVAL", &opts(&[("fields", "Day  To Second".into())]))
            .unwrap();
        assert_eq!(res.fields, Some(IntervalFields::DayToSecond));
    }

    #[test]
    fn test_interval_options_invalid() {
        let cases = [
            opts(&[("fields", "fortnight".into())]),
            opts(&[("fields", 1.into())]),
            opts(&[("fields", "year".into()), ("precision", 3.into())]),
            opts(&[("precision", 7.into())]),
            opts(&[("scale", 1.into())]),
        ];
        for case in cases {
            assert!(validate_options("INTERVAL", &case).is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_unknown_type() {
        let res = validate_options("GEOMETRY", &OptionMap::new());
        assert!(matches!(res, Err(Error::TypeMismatch(_))));
    }
}
