use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Grammar;
use crate::parser;

/// Capability to turn an import path into a parsed grammar.
pub trait ImportResolver {
    fn resolve(&self, path: &str) -> Result<Grammar>;
}

/// In-memory resolver keyed by import path.
impl ImportResolver for HashMap<String, Grammar> {
    fn resolve(&self, path: &str) -> Result<Grammar> {
        self.get(path).cloned().ok_or_else(|| Error::ImportNotFound {
            path: path.to_string(),
            reason: "no grammar registered under this path".to_string(),
        })
    }
}

/// Reads grammar files relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Reads and parses `filename` without resolving its imports.
    pub fn load(&self, filename: &str) -> Result<Grammar> {
        let path = self.base_dir.join(filename);
        log::debug!("reading grammar {}", path.display());
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        parser::parse_grammar(&content)
    }
}

impl ImportResolver for FileResolver {
    fn resolve(&self, path: &str) -> Result<Grammar> {
        self.load(path)
    }
}

impl<R: ImportResolver + ?Sized> ImportResolver for &R {
    fn resolve(&self, path: &str) -> Result<Grammar> {
        (**self).resolve(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_resolver() {
        let mut map = HashMap::new();
        map.insert(
            "lib.peg".to_string(),
            parser::parse_grammar("A <- 'a'").unwrap(),
        );
        assert!(map.resolve("lib.peg").unwrap().definition("A").is_some());
        assert!(matches!(
            map.resolve("other.peg"),
            Err(Error::ImportNotFound { ref path, .. }) if path == "other.peg"
        ));
    }

    #[test]
    fn test_file_resolver_reports_missing_file() {
        let resolver = FileResolver::new("/nonexistent-grammar-dir");
        match resolver.resolve("missing.peg") {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("missing.peg")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
