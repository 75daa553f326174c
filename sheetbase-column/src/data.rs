use serde::Deserialize;
use sheetbase_datatype::{OptionMap, Value};

/// Column to create, as sent by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnData {
    /// Generated if absent or empty.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub type_options: OptionMap,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

#[inline]
fn default_nullable() -> bool {
    true
}

impl ColumnData {
    #[inline]
    pub fn new(type_id: impl Into<String>) -> Self {
        ColumnData {
            name: None,
            type_id: type_id.into(),
            type_options: OptionMap::new(),
            nullable: default_nullable(),
            default: None,
        }
    }

    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.type_options.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[inline]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// What a duplicated column takes over from its source besides
/// type and type options.
///
/// Constraints and nullability are only copied together with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    pub copy_data: bool,
    pub copy_constraints: bool,
}

impl Default for CopyOptions {
    #[inline]
    fn default() -> Self {
        CopyOptions {
            copy_data: true,
            copy_constraints: true,
        }
    }
}

impl CopyOptions {
    #[inline]
    pub fn new(copy_data: bool, copy_constraints: bool) -> Self {
        CopyOptions {
            copy_data,
            copy_constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_data_from_json() {
        let data: ColumnData = serde_json::from_str(
            r#"{"type": "NUMERIC", "type_options": {"precision": 5, "scale": 3}}"#,
        )
        .unwrap();
        assert_eq!(
            data,
            ColumnData::new("NUMERIC")
                .option("precision", 5)
                .option("scale", 3)
        );
        assert!(data.nullable);

        let data: ColumnData = serde_json::from_str(
            r#"{"name": "c1", "type": "TEXT", "nullable": false, "default": null}"#,
        )
        .unwrap();
        assert_eq!(data.name.as_deref(), Some("c1"));
        assert!(!data.nullable);
        assert_eq!(data.default, None);
        assert!(serde_json::from_str::<ColumnData>(r#"{"name": "c1"}"#).is_err());
    }
}
