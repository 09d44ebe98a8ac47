//! Short-name to fully-qualified-name table used by the resolver

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::error::RegistryError;

const SYSTEM_PACKAGE: &str = "com.freedom_man.system";

/// Built-in short names, all living in `SYSTEM_PACKAGE`
const BUILTIN_NAMES: &[&str] = &["System", "Database", "List", "Account", "SObject"];

/// An immutable import catalog.
///
/// Keys are stored lowercase so lookups ignore case, matching how Apex
/// treats identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRegistry {
    database: String,
    entries: BTreeMap<String, String>,
}

/// On-disk form: `{"database": "...", "entries": {"Short": "pkg.Short"}}`
#[derive(Debug, Deserialize)]
struct RegistryFile {
    database: String,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl ImportRegistry {
    pub fn new<I, K, V>(database: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            database: database.into(),
            entries: entries
                .into_iter()
                .map(|(short, fqn)| (short.as_ref().to_ascii_lowercase(), fqn.into()))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        if file.database.trim().is_empty() {
            return Err(RegistryError::MissingDatabase);
        }
        if let Some((short, _)) = file.entries.iter().find(|(_, fqn)| fqn.trim().is_empty()) {
            return Err(RegistryError::EmptyEntry(short.clone()));
        }
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for short in file.entries.keys() {
            if let Some(first) = seen.insert(short.to_ascii_lowercase(), short) {
                return Err(RegistryError::CaseCollision {
                    first: first.to_string(),
                    second: short.clone(),
                });
            }
        }
        Ok(Self::new(file.database, file.entries))
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Fully-qualified name for a short name, ignoring case
    pub fn lookup(&self, short: &str) -> Option<&str> {
        self.entries
            .get(&short.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The import every SOQL query pulls in
    pub fn database_import(&self) -> &str {
        &self.database
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ImportRegistry {
    fn default() -> Self {
        Self::new(
            format!("{SYSTEM_PACKAGE}.Database"),
            BUILTIN_NAMES
                .iter()
                .map(|name| (*name, format!("{SYSTEM_PACKAGE}.{name}"))),
        )
    }
}
