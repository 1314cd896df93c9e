use crate::error::{ReplaceError, ReplaceResult};
use crate::traits::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Key-value file used when the descriptor does not name one
pub const DEFAULT_KV_FILE: &str = "cluster.ini";

/// Environment variable holding the secret store address
pub const VAULT_HOST_VAR: &str = "VAULT_HOST";

/// Environment variable holding the secret store token
pub const VAULT_TOKEN_VAR: &str = "VAULT_TOKEN";

/// Descriptor passed as the single command-line argument.
///
/// Only `kvFile` is read; the rest of the document (`apiVersion`, `kind`,
/// `metadata`, ...) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default, alias = "gitFileConf", skip_serializing_if = "Option::is_none")]
    pub kv_file: Option<String>,
}

impl PluginConfig {
    /// Load the descriptor from a YAML file
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> ReplaceResult<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| ReplaceError::DescriptorInvalid(format!("{:#}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ReplaceResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }

    /// Path of the local key-value file, falling back to [`DEFAULT_KV_FILE`]
    pub fn kv_file_path(&self) -> PathBuf {
        match self.kv_file.as_deref() {
            Some(name) if !name.trim().is_empty() => PathBuf::from(name.trim()),
            _ => PathBuf::from(DEFAULT_KV_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockFileSystem;

    #[test]
    fn test_kustomize_descriptor() {
        let yaml = r#"
apiVersion: transformers.example.com/v1
kind: DataReplaceInline
metadata:
  name: replace
kvFile: envs/prod.ini
"#;
        let config = PluginConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.kv_file_path(), PathBuf::from("envs/prod.ini"));
    }

    #[test]
    fn test_legacy_field_name() {
        let config = PluginConfig::from_yaml("gitFileConf: legacy.ini\n").unwrap();
        assert_eq!(config.kv_file.as_deref(), Some("legacy.ini"));
    }

    #[test]
    fn test_default_kv_file() {
        let config = PluginConfig::from_yaml("kind: DataReplaceInline\n").unwrap();
        assert_eq!(config.kv_file_path(), PathBuf::from(DEFAULT_KV_FILE));

        let config = PluginConfig::from_yaml("").unwrap();
        assert_eq!(config.kv_file_path(), PathBuf::from(DEFAULT_KV_FILE));

        let config = PluginConfig::from_yaml("kvFile: \"  \"\n").unwrap();
        assert_eq!(config.kv_file_path(), PathBuf::from(DEFAULT_KV_FILE));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PluginConfig::from_yaml("kvFile: [unterminated").unwrap_err();
        assert!(matches!(err, ReplaceError::DescriptorInvalid(_)));
    }

    #[test]
    fn test_missing_descriptor_file() {
        let fs = MockFileSystem::new();
        let err = PluginConfig::from_file(&fs, Path::new("/work/missing.yaml")).unwrap_err();
        assert!(matches!(err, ReplaceError::DescriptorInvalid(_)));
    }
}
