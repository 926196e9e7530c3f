//! Catalog of recognized files under the managed root.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use utoipa::ToSchema;

use crate::Result;

/// One recognized file under the managed root.
///
/// Entries are computed on demand by scanning the root; nothing is cached
/// between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogEntry {
    /// Path relative to the managed root, with `/` separators.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

/// Check whether a filename carries one of the recognized extensions.
pub fn is_recognized(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Recursively enumerate recognized files under `root`.
///
/// An absent root yields an empty list, not an error. Order follows
/// directory traversal and is stable within a single call only.
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();

    if !root.exists() {
        return Ok(entries);
    }

    visit(root, root, extensions, &mut entries)?;
    Ok(entries)
}

fn visit(
    dir: &Path,
    root: &Path,
    extensions: &[String],
    out: &mut Vec<CatalogEntry>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            visit(&path, root, extensions, out)?;
        } else if is_recognized(&path, extensions) {
            let size = entry.metadata()?.len();
            out.push(CatalogEntry {
                name: relative_name(&path, root),
                size,
            });
        }
    }
    Ok(())
}

/// Render a path relative to `root` with `/` separators.
fn relative_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec![
            "safetensors".to_string(),
            "ckpt".to_string(),
            "pt".to_string(),
        ]
    }

    fn write_file(dir: &Path, name: &str, content: &[u8]) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = File::create(path).unwrap();
        f.write_all(content).unwrap();
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let entries = scan(&missing, &exts()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_scan_filters_extensions() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "model.safetensors", b"weights");
        write_file(temp.path(), "model.txt", b"notes");
        write_file(temp.path(), "readme", b"no extension");

        let entries = scan(temp.path(), &exts()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "model.safetensors");
        assert_eq!(entries[0].size, 7);
    }

    #[test]
    fn test_scan_recurses_with_relative_names() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "char/style/a.ckpt", b"aa");
        write_file(temp.path(), "b.pt", b"b");

        let mut entries = scan(temp.path(), &exts()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "b.pt");
        assert_eq!(entries[1].name, "char/style/a.ckpt");
        assert_eq!(entries[1].size, 2);
    }

    #[test]
    fn test_is_recognized_case_insensitive() {
        assert!(is_recognized(Path::new("a.SafeTensors"), &exts()));
        assert!(is_recognized(Path::new("a.pt"), &exts()));
        assert!(!is_recognized(Path::new("a.txt"), &exts()));
        assert!(!is_recognized(Path::new("safetensors"), &exts()));
    }

    #[test]
    fn test_relative_name_separators() {
        let root = Path::new("/data/loras");
        let path = Path::new("/data/loras/char/a.pt");
        assert_eq!(relative_name(path, root), "char/a.pt");
    }
}
