//! Flat key-value file backing `${ ref:... }` placeholders.
//!
//! The format is a single-section INI file:
//!
//! ```text
//! # comment
//! ; comment
//! CLUSTER_NAME = prod-1
//! SUBNETS: subneta=10.0.1.0/24,subnetb=10.0.2.0/24
//! DB_PASSWORD=${ secret:kv/data/db@password }
//! ```
//!
//! Only keys before the first `[section]` header are visible. In an unquoted
//! value everything from the first `#` or `;` on is an inline comment; a
//! quoted value is taken verbatim up to its closing quote.

use crate::error::{ReplaceError, ReplaceResult};
use crate::traits::FileSystem;
use std::collections::HashMap;
use std::path::Path;

/// Parsed key-value file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvStore {
    entries: HashMap<String, String>,
}

impl KvStore {
    /// Load and parse the file, which must be a non-empty regular file
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ReplaceResult<Self> {
        let unreadable = |reason: String| ReplaceError::SourceUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        if !fs.exists(path) {
            return Err(unreadable("file does not exist".to_string()));
        }

        if fs.is_dir(path) {
            return Err(unreadable("path is a directory".to_string()));
        }

        if !fs.is_file(path) {
            return Err(unreadable("not a regular file".to_string()));
        }

        let size = fs.file_size(path).map_err(|e| unreadable(format!("{:#}", e)))?;
        if size == 0 {
            return Err(unreadable("file is empty".to_string()));
        }

        let content = fs
            .read_to_string(path)
            .map_err(|e| unreadable(format!("{:#}", e)))?;

        let store = Self::parse(&content).map_err(unreadable)?;
        tracing::debug!(path = %path.display(), keys = store.entries.len(), "loaded key-value file");

        Ok(store)
    }

    /// Parse file contents; duplicate keys keep the last value
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut entries = HashMap::new();
        let mut in_default_section = true;

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_default_section = false;
                continue;
            }

            let Some(delimiter) = line.find(['=', ':']) else {
                return Err(format!("line {}: key-value delimiter not found", index + 1));
            };

            let key = line[..delimiter].trim();
            if key.is_empty() {
                return Err(format!("line {}: empty key", index + 1));
            }

            if !in_default_section {
                continue;
            }

            let value = parse_value(line[delimiter + 1..].trim());
            entries.insert(key.to_string(), value.to_string());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

}

/// Quoted values up to the closing quote, otherwise the text before any inline comment
fn parse_value(raw: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(rest) = raw.strip_prefix(quote)
            && let Some(end) = rest.find(quote)
        {
            return &rest[..end];
        }
    }

    match raw.find(['#', ';']) {
        Some(comment) => raw[..comment].trim_end(),
        None => raw,
    }
}
