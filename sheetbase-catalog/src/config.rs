use crate::error::{Error, Result};
use crate::mem_impl::MemCatalog;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMN_NAME_TEMPLATE: &str = "Column ";
pub const DEFAULT_INSTALL_CUSTOM_TYPES: bool = true;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Prefix of generated column names.
    pub column_name_template: String,
    /// Whether SHEET_TYPES custom types exist in the catalog.
    pub install_custom_types: bool,
}

impl Default for CatalogConfig {
    #[inline]
    fn default() -> Self {
        CatalogConfig {
            column_name_template: String::from(DEFAULT_COLUMN_NAME_TEMPLATE),
            install_custom_types: DEFAULT_INSTALL_CUSTOM_TYPES,
        }
    }
}

impl CatalogConfig {
    #[inline]
    pub fn column_name_template(mut self, column_name_template: impl Into<String>) -> Self {
        self.column_name_template = column_name_template.into();
        self
    }

    #[inline]
    pub fn install_custom_types(mut self, install_custom_types: bool) -> Self {
        self.install_custom_types = install_custom_types;
        self
    }

    #[inline]
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    #[inline]
    pub fn build(self) -> MemCatalog {
        MemCatalog::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogRead;

    #[test]
    fn test_catalog_config_toml() {
        let config = CatalogConfig::default()
            .column_name_template("Field ")
            .install_custom_types(false);
        let s = toml::to_string(&config).unwrap();
        println!("{}", s);
        assert_eq!(CatalogConfig::from_toml(&s).unwrap(), config);
    }

    #[test]
    fn test_catalog_config_partial_toml() {
        let config = CatalogConfig::from_toml("install_custom_types = false").unwrap();
        assert_eq!(config.column_name_template, DEFAULT_COLUMN_NAME_TEMPLATE);
        assert!(!config.install_custom_types);
        assert!(CatalogConfig::from_toml("install_custom_types = 1").is_err());
    }

    #[test]
    fn test_catalog_config_build() {
        let catalog = CatalogConfig::default().install_custom_types(false).build();
        assert!(catalog.installed_types().iter().all(|ty| !ty.is_custom()));
        let catalog = CatalogConfig::default().build();
        assert!(catalog.installed_types().iter().any(|ty| ty.is_custom()));
    }
}
