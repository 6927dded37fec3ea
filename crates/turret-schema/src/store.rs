//! Schema store: resolves document names to parsed schemas

use crate::cache::{Fingerprint, SchemaCache};
use crate::error::SchemaError;
use crate::model::Schema;
use crate::parsers::{default_parsers, ParserRegistry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of schema documents
///
/// The session only needs this one operation, so tests and alternative
/// backends can supply schemas without touching the filesystem.
pub trait SchemaLoader: Send + Sync {
    /// Load and parse a document by name
    fn load_schema(&self, document: &str) -> Result<Arc<Schema>, SchemaError>;
}

/// Loads schema documents from a directory and from registered inline text
///
/// Inline documents take precedence over files of the same name.
#[derive(Debug)]
pub struct SchemaStore {
    root: Option<PathBuf>,
    inline: BTreeMap<String, String>,
    parsers: ParserRegistry,
    cache: SchemaCache,
}

impl SchemaStore {
    /// Store reading documents from `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            inline: BTreeMap::new(),
            parsers: default_parsers(),
            cache: SchemaCache::default(),
        }
    }

    /// Store holding only inline documents
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            root: None,
            inline: BTreeMap::new(),
            parsers: default_parsers(),
            cache: SchemaCache::default(),
        }
    }

    /// Replace the cache with one of the given capacity
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache = SchemaCache::new(capacity);
        self
    }

    /// Replace the parser registry
    #[must_use]
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    /// Register document text under a name
    pub fn register_document(&mut self, document: impl Into<String>, content: impl Into<String>) {
        let document = document.into();
        self.cache.invalidate(&document);
        self.inline.insert(document, content.into());
    }

    /// Directory documents are read from
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Parsed-document cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Names of every document the store can load
    pub fn document_names(&self) -> Result<Vec<String>, SchemaError> {
        let mut names: Vec<String> = self.inline.keys().cloned().collect();
        if let Some(root) = &self.root {
            let entries = std::fs::read_dir(root).map_err(|e| SchemaError::io_error(root, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| SchemaError::io_error(root, e))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if self.parsers.find_for(&name).is_some() && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, document: &str) -> Result<String, SchemaError> {
        if let Some(content) = self.inline.get(document) {
            return Ok(content.clone());
        }
        let not_found = || SchemaError::NotFound {
            document: document.to_string(),
        };
        // Only bare file names map to documents
        if document.is_empty() || document.contains(['/', '\\']) || document == ".." {
            return Err(not_found());
        }
        let root = self.root.as_ref().ok_or_else(not_found)?;
        let path = root.join(document);
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                not_found()
            } else {
                SchemaError::io_error(path, e)
            }
        })
    }
}

impl SchemaLoader for SchemaStore {
    fn load_schema(&self, document: &str) -> Result<Arc<Schema>, SchemaError> {
        let content = self.read(document)?;
        let fingerprint = Fingerprint::of(&content);

        if let Some(schema) = self.cache.get(document, fingerprint) {
            tracing::debug!("Schema cache hit: {} ({})", document, fingerprint.short());
            return Ok(schema);
        }

        let schema = Arc::new(self.parsers.parse(document, &content)?);
        tracing::info!(
            "Loaded schema {}: {} categories, {} settings",
            document,
            schema.categories.len(),
            schema.setting_count()
        );
        self.cache.insert(document, fingerprint, Arc::clone(&schema));
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<categories><category name="boot"><groups><group name="Network">
        <settings><setting id="1" name="dhcp" type="bl" default_value="true" basic_level="Y"/></settings>
    </group></groups></category></categories>"#;

    #[test]
    fn unknown_document_is_not_found() {
        let store = SchemaStore::in_memory();
        let err = store.load_schema("SettingsTerminal.xml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn path_like_names_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SchemaStore::new(dir.path());
        assert!(store.load_schema("../etc/passwd.xml").unwrap_err().is_not_found());
        assert!(store.load_schema("").unwrap_err().is_not_found());
    }

    #[test]
    fn inline_documents_load_and_cache() {
        let mut store = SchemaStore::in_memory();
        store.register_document("SettingsTerminal.xml", DOC);

        let first = store.load_schema("SettingsTerminal.xml").unwrap();
        let second = store.load_schema("SettingsTerminal.xml").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.find_setting("dhcp").is_some());
    }

    #[test]
    fn files_are_reparsed_when_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SettingsTerminal.xml");
        std::fs::write(&path, DOC).unwrap();
        let store = SchemaStore::new(dir.path());

        let first = store.load_schema("SettingsTerminal.xml").unwrap();
        std::fs::write(&path, DOC.replace("dhcp", "vlan")).unwrap();
        let second = store.load_schema("SettingsTerminal.xml").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.find_setting("vlan").is_some());
    }

    #[test]
    fn document_names_list_parseable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SettingsTPO.xml"), DOC).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let mut store = SchemaStore::new(dir.path());
        store.register_document("Extra.json", r#"{"categories": []}"#);

        assert_eq!(
            store.document_names().unwrap(),
            vec!["Extra.json".to_string(), "SettingsTPO.xml".to_string()]
        );
    }
}
