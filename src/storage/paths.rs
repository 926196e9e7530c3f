//! Path containment for the managed root.
//!
//! Every client-supplied name passes through [`safe_join`] before any
//! filesystem operation. The check is lexical first (so it works for
//! paths that do not exist yet) and re-verified against the canonical
//! root at a path-segment boundary.

use std::path::{Component, Path, PathBuf};

use crate::{LoradError, Result};

/// Join an untrusted relative name onto a canonical root directory.
///
/// `root` must be an absolute, canonicalized directory path. The name is
/// normalized component by component: `.` segments are dropped and `..`
/// segments pop previously accepted segments but may never pop past the
/// root. Absolute names, empty names, and names that resolve to the root
/// itself are rejected.
///
/// On success the returned path is strictly inside `root`. The final
/// containment check uses `Path::starts_with`, which compares whole
/// segments, so a sibling like `/data/loras-evil` never passes for a
/// root of `/data/loras`.
pub fn safe_join(root: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LoradError::PathTraversal);
    }

    let mut segments: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => segments.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root would escape it.
                if segments.pop().is_none() {
                    return Err(LoradError::PathTraversal);
                }
            }
            // Absolute paths and Windows drive prefixes.
            Component::RootDir | Component::Prefix(_) => {
                return Err(LoradError::PathTraversal);
            }
        }
    }

    // No operation may target the root directory itself.
    if segments.is_empty() {
        return Err(LoradError::PathTraversal);
    }

    let mut resolved = root.to_path_buf();
    for segment in segments {
        resolved.push(segment);
    }

    if !resolved.starts_with(root) || resolved == root {
        return Err(LoradError::PathTraversal);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/data/loras")
    }

    #[test]
    fn test_simple_name() {
        let resolved = safe_join(&root(), "model.safetensors").unwrap();
        assert_eq!(resolved, PathBuf::from("/data/loras/model.safetensors"));
    }

    #[test]
    fn test_nested_name() {
        let resolved = safe_join(&root(), "char/my-lora.safetensors").unwrap();
        assert_eq!(
            resolved,
            PathBuf::from("/data/loras/char/my-lora.safetensors")
        );
    }

    #[test]
    fn test_current_dir_segments_dropped() {
        let resolved = safe_join(&root(), "./char/./model.pt").unwrap();
        assert_eq!(resolved, PathBuf::from("/data/loras/char/model.pt"));
    }

    #[test]
    fn test_internal_parent_dir_normalized() {
        // `a/../b.pt` stays inside the root and resolves to `b.pt`.
        let resolved = safe_join(&root(), "a/../b.pt").unwrap();
        assert_eq!(resolved, PathBuf::from("/data/loras/b.pt"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            safe_join(&root(), ""),
            Err(LoradError::PathTraversal)
        ));
        assert!(matches!(
            safe_join(&root(), "   "),
            Err(LoradError::PathTraversal)
        ));
    }

    #[test]
    fn test_rejects_plain_traversal() {
        assert!(safe_join(&root(), "../secret").is_err());
        assert!(safe_join(&root(), "..").is_err());
    }

    #[test]
    fn test_rejects_multi_segment_escape() {
        assert!(safe_join(&root(), "a/../../etc/passwd").is_err());
        assert!(safe_join(&root(), "a/b/../../../etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_absolute_path() {
        assert!(safe_join(&root(), "/etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_root_itself() {
        assert!(safe_join(&root(), ".").is_err());
        assert!(safe_join(&root(), "a/..").is_err());
        assert!(safe_join(&root(), "./a/..").is_err());
    }

    #[test]
    fn test_decoded_traversal_sequences() {
        // The HTTP layer percent-decodes before resolution; these are the
        // decoded forms of %2e%2e%2f attacks.
        assert!(safe_join(&root(), "../../../etc/passwd").is_err());
        assert!(safe_join(&root(), "..%2fstill-one-segment").is_ok());
    }

    #[test]
    fn test_result_always_inside_root() {
        let names = [
            "a.pt",
            "a/b.pt",
            "a/./b.pt",
            "a/../c.pt",
            "deep/x/y/z.ckpt",
            "名前.safetensors",
        ];
        for name in names {
            let resolved = safe_join(&root(), name).unwrap();
            assert!(resolved.starts_with(root()), "{name} escaped");
            assert_ne!(resolved, root());
        }
    }

    #[test]
    fn test_sibling_directory_not_contained() {
        // Segment-boundary containment: /data/loras-evil is not inside
        // /data/loras even though it shares a string prefix.
        let sibling = PathBuf::from("/data/loras-evil/x.pt");
        assert!(!sibling.starts_with(root()));
    }
}
