//! Cache key construction for layout artifacts
//!
//! The cache treats keys as opaque; this builder is the caller-side helper
//! that turns graph content plus layout parameters into one.

use crate::cache::types::CacheKey;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache key builder for graph layouts
pub struct LayoutKeyBuilder {
    namespace: String,
    content_hash: u64,
    params: Vec<(String, String)>,
}

impl LayoutKeyBuilder {
    /// Start a key in the given namespace (e.g. the page URL the graph came from)
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            content_hash: 0,
            params: Vec::new(),
        }
    }

    /// Fold graph content into the key
    pub fn content<T: Hash + ?Sized>(mut self, content: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        self.content_hash.hash(&mut hasher);
        content.hash(&mut hasher);
        self.content_hash = hasher.finish();
        self
    }

    /// Add a layout parameter to the key
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Build the cache key
    ///
    /// Parameters are sorted so insertion order does not change the key.
    pub fn build(mut self) -> CacheKey {
        let mut key = format!("layout:{}:{:016x}", self.namespace, self.content_hash);

        if !self.params.is_empty() {
            self.params.sort();
            let params_str: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            key.push_str(&format!("?{}", params_str.join("&")));
        }

        key
    }
}
