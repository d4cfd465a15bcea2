/*
 * index.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Topic-key index.
//!
//! This module provides the trait the compiler uses to check that a
//! referenced topic/key exists in the liturgical library, plus in-memory,
//! null, and caching implementations.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use std::sync::Mutex;

use crate::error::IndexError;

/// Trait for checking whether a topic/key exists.
///
/// Implementations answer existence queries only; a missing entry is
/// `Ok(false)`. An `Err` means the index itself could not be consulted and
/// aborts the compilation.
pub trait TopicKeyIndex {
    fn exists(&self, topic: &str, key: &str) -> Result<bool, IndexError>;
}

impl<T: TopicKeyIndex + ?Sized> TopicKeyIndex for &T {
    fn exists(&self, topic: &str, key: &str) -> Result<bool, IndexError> {
        (**self).exists(topic, key)
    }
}

impl<T: TopicKeyIndex + ?Sized> TopicKeyIndex for Box<T> {
    fn exists(&self, topic: &str, key: &str) -> Result<bool, IndexError> {
        (**self).exists(topic, key)
    }
}

/// Index that reports every topic/key as present.
///
/// Use this index to check templates for syntax and value errors without
/// access to a library.
#[derive(Debug, Clone, Default)]
pub struct NullIndex;

impl TopicKeyIndex for NullIndex {
    fn exists(&self, _topic: &str, _key: &str) -> Result<bool, IndexError> {
        Ok(true)
    }
}

/// Index held in memory as a set of `topic/key` strings.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: HashSet<String>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: HashSet::new(),
        }
    }

    /// Add a topic/key to the index.
    pub fn add(&mut self, topic: &str, key: &str) -> &mut Self {
        self.entries.insert(format!("{topic}/{key}"));
        self
    }

    /// Create an index from `topic/key` strings.
    pub fn with_entries(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Read an index with one `topic/key` per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, IndexError> {
        let mut index = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| IndexError::Unavailable(e.to_string()))?;
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            match text.split_once('/') {
                Some((topic, key)) if !topic.is_empty() && !key.is_empty() => {
                    index.add(topic, key);
                }
                _ => {
                    return Err(IndexError::Malformed {
                        line: i + 1,
                        text: text.to_string(),
                    });
                }
            }
        }
        Ok(index)
    }

    pub fn from_file(path: &Path) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TopicKeyIndex for MemoryIndex {
    fn exists(&self, topic: &str, key: &str) -> Result<bool, IndexError> {
        Ok(self.entries.contains(&format!("{topic}/{key}")))
    }
}

/// Index that remembers the answers of another index.
///
/// Errors are not cached, so a transient failure is retried on the next
/// query.
#[derive(Debug, Default)]
pub struct CachedIndex<I> {
    inner: I,
    cache: Mutex<HashMap<String, bool>>,
}

impl<I: TopicKeyIndex> CachedIndex<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: TopicKeyIndex> TopicKeyIndex for CachedIndex<I> {
    fn exists(&self, topic: &str, key: &str) -> Result<bool, IndexError> {
        let path = format!("{topic}/{key}");
        let poisoned = |_| IndexError::Unavailable("index cache lock poisoned".to_string());
        if let Some(found) = self.cache.lock().map_err(poisoned)?.get(&path) {
            return Ok(*found);
        }
        let found = self.inner.exists(topic, key)?;
        self.cache.lock().map_err(poisoned)?.insert(path, found);
        Ok(found)
    }
}
