//! Parsed-document cache using moka
//!
//! Entries are keyed by document name and carry a blake3 fingerprint of the
//! text they were parsed from, so an edited file is re-parsed on next load.

use crate::model::Schema;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;

/// blake3 hash of a document's text
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint document text
    #[inline]
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self(*blake3::hash(content.as_bytes()).as_bytes())
    }

    /// Short hex prefix for logs
    #[must_use]
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

#[derive(Clone)]
struct Entry {
    fingerprint: Fingerprint,
    schema: Arc<Schema>,
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Cache of parsed schema documents
#[derive(Clone)]
pub struct SchemaCache {
    inner: Cache<String, Entry>,
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl SchemaCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Cached schema for a document, if parsed from identical text
    #[must_use]
    pub fn get(&self, document: &str, fingerprint: Fingerprint) -> Option<Arc<Schema>> {
        self.inner
            .get(document)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| entry.schema)
    }

    /// Store a parsed schema
    pub fn insert(&self, document: &str, fingerprint: Fingerprint, schema: Arc<Schema>) {
        self.inner.insert(
            document.to_string(),
            Entry {
                fingerprint,
                schema,
            },
        );
    }

    /// Drop one document
    pub fn invalidate(&self, document: &str) {
        self.inner.invalidate(document);
    }

    /// Drop every document
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_requires_matching_fingerprint() {
        let cache = SchemaCache::new(4);
        let schema = Arc::new(Schema::new("a.xml"));
        let fp = Fingerprint::of("<categories/>");
        cache.insert("a.xml", fp, Arc::clone(&schema));

        assert!(cache.get("a.xml", fp).is_some());
        assert!(cache.get("a.xml", Fingerprint::of("<categories></categories>")).is_none());
        assert!(cache.get("b.xml", fp).is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = SchemaCache::new(4);
        let fp = Fingerprint::of("x");
        cache.insert("a.xml", fp, Arc::new(Schema::new("a.xml")));
        cache.invalidate("a.xml");
        assert!(cache.get("a.xml", fp).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn fingerprint_short_form() {
        assert_eq!(Fingerprint::of("x").short().len(), 8);
    }
}
