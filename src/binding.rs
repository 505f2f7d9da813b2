//! Binding configuration: naming convention, ignored fields, explicit bindings.
//!
//! A [`BindingConfiguration`] is an immutable value. Together with the target
//! type it forms the identity under which compiled materializers are cached, so
//! it hashes structurally and keeps its collections sorted.
//!
//! Configurations can be written in code through the builder methods or loaded
//! from YAML:
//!
//! ```yaml
//! strip_separators: true
//! ignore: [password_hash]
//! bindings:
//!   display_name: FULL_NAME
//! ```

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfiguration {
    #[serde(
        rename = "strip_separators",
        alias = "use_underscore_stripping_convention"
    )]
    use_underscore_stripping_convention: bool,
    #[serde(
        rename = "ignore",
        alias = "ignored_fields",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    ignored_fields: BTreeSet<String>,
    #[serde(
        rename = "bindings",
        alias = "explicit_bindings",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    explicit_bindings: BTreeMap<String, String>,
}

impl BindingConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables matching `UserId` against `USER_ID`.
    pub fn with_stripping_convention(mut self, enabled: bool) -> Self {
        self.use_underscore_stripping_convention = enabled;
        self
    }

    pub fn ignore(mut self, field: impl Into<String>) -> Self {
        self.ignored_fields.insert(field.into());
        self
    }

    /// Reads `field` from `column` regardless of naming convention.
    pub fn bind(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.explicit_bindings.insert(field.into(), column.into());
        self
    }

    pub fn uses_stripping_convention(&self) -> bool {
        self.use_underscore_stripping_convention
    }

    pub fn ignored_fields(&self) -> &BTreeSet<String> {
        &self.ignored_fields
    }

    pub fn is_ignored(&self, field: &str) -> bool {
        self.ignored_fields.contains(field)
    }

    pub fn explicit_bindings(&self) -> &BTreeMap<String, String> {
        &self.explicit_bindings
    }

    /// Overlays `other` on top of `self`; `other` wins on conflicting bindings.
    pub fn merge(mut self, other: BindingConfiguration) -> Self {
        self.use_underscore_stripping_convention |= other.use_underscore_stripping_convention;
        self.ignored_fields.extend(other.ignored_fields);
        self.explicit_bindings.extend(other.explicit_bindings);
        self
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(input).context("Parsing binding configuration YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading binding configuration {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Loading binding configuration {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing binding configuration")?;
        std::fs::write(path, serialized)
            .with_context(|| format!("Writing binding configuration {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(config: &BindingConfiguration) -> u64 {
        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn structurally_equal_configs_hash_alike() {
        let a = BindingConfiguration::new()
            .ignore("b")
            .ignore("a")
            .bind("x", "COL_X");
        let b = BindingConfiguration::new()
            .bind("x", "COL_X")
            .ignore("a")
            .ignore("b");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, b.clone().with_stripping_convention(true));
    }

    #[test]
    fn yaml_accepts_long_and_short_keys() {
        let short = BindingConfiguration::from_yaml_str(
            "strip_separators: true\nignore: [age]\nbindings:\n  name: FULL_NAME\n",
        )
        .unwrap();
        let long = BindingConfiguration::from_yaml_str(
            "use_underscore_stripping_convention: true\nignored_fields: [age]\nexplicit_bindings:\n  name: FULL_NAME\n",
        )
        .unwrap();
        assert_eq!(short, long);
        assert!(short.uses_stripping_convention());
        assert!(short.is_ignored("age"));
        assert_eq!(
            short.explicit_bindings().get("name").map(String::as_str),
            Some("FULL_NAME")
        );
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(BindingConfiguration::from_yaml_str("strip: true\n").is_err());
        assert_eq!(
            BindingConfiguration::from_yaml_str("").unwrap(),
            BindingConfiguration::default()
        );
    }
}
