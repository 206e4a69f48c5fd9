//! Import resolution against the search path.
//!
//! A dotted name `a.b.c` looks for a file with stem `c` in the subdirectory
//! `a/b` of each search directory, in order. Within a directory, entries are
//! visited in file-name order and files with unrecognized extensions are
//! skipped.

use std::path::{Path, PathBuf};
use subscript_core::{SubscriptError, SubscriptResult};
use tracing::trace;

/// What an importable file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Raw bytes placed as a data section on first use.
    RawFile,
    /// A host-language module; only native modules are importable.
    HostModule,
    /// A recognized format that cannot be imported.
    Unsupported(&'static str),
}

impl ImportKind {
    /// Classify a file by extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext {
            "bin" | "raw" => Self::RawFile,
            "py" | "pyc" => Self::HostModule,
            "sub" => Self::Unsupported("script"),
            "asm" | "s" => Self::Unsupported("assembly"),
            "c" => Self::Unsupported("C source"),
            "json" | "rbt" => Self::Unsupported("definition"),
            _ => return None,
        };
        Some(kind)
    }
}

/// Find the first importable file named `name` on the search path.
pub fn resolve(search_path: &[PathBuf], name: &str) -> SubscriptResult<Option<(PathBuf, ImportKind)>> {
    let mut parts: Vec<&str> = name.split('.').collect();
    let stem = parts.pop().unwrap_or(name);

    for root in search_path {
        let dir = parts.iter().fold(root.clone(), |dir, part| dir.join(part));
        if !dir.is_dir() {
            continue;
        }
        if let Some(found) = scan(&dir, stem)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn scan(dir: &Path, stem: &str) -> SubscriptResult<Option<(PathBuf, ImportKind)>> {
    let read_error =
        |e: std::io::Error| SubscriptError::io(format!("cannot list \"{}\": {e}", dir.display()));

    let mut paths = std::fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    paths.sort();

    for path in paths {
        if !path.is_file() || path.file_stem().and_then(|s| s.to_str()) != Some(stem) {
            continue;
        }
        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImportKind::from_extension);
        trace!(path = %path.display(), ?kind, "import candidate");
        if let Some(kind) = kind {
            return Ok(Some((path, kind)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classification() {
        assert_eq!(ImportKind::from_extension("bin"), Some(ImportKind::RawFile));
        assert_eq!(ImportKind::from_extension("pyc"), Some(ImportKind::HostModule));
        assert_eq!(
            ImportKind::from_extension("s"),
            Some(ImportKind::Unsupported("assembly"))
        );
        assert_eq!(ImportKind::from_extension("txt"), None);
    }

    #[test]
    fn test_resolve_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("sprite.bin"), [1, 2, 3]).unwrap();
        fs::write(first.path().join("sprite.txt"), "notes").unwrap();

        let path = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let (found, kind) = resolve(&path, "sprite").unwrap().unwrap();
        assert_eq!(found, second.path().join("sprite.bin"));
        assert_eq!(kind, ImportKind::RawFile);
    }

    #[test]
    fn test_dotted_name_uses_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("maps")).unwrap();
        fs::write(root.path().join("maps").join("route1.raw"), [0]).unwrap();

        let path = vec![root.path().to_path_buf()];
        let (found, _) = resolve(&path, "maps.route1").unwrap().unwrap();
        assert!(found.ends_with("maps/route1.raw"));
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let path = vec![PathBuf::from("/nonexistent/search/dir")];
        assert_eq!(resolve(&path, "anything").unwrap(), None);
    }
}
