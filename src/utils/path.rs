//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Display `path` relative to `root` when it lies inside it.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_absolute_missing() {
        let path = Path::new("/definitely/not/here/site");
        assert_eq!(normalize_path(path), PathBuf::from("/definitely/not/here/site"));
    }

    #[test]
    fn test_normalize_relative_is_absolute() {
        assert!(normalize_path(Path::new("Content")).is_absolute());
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/site");
        assert_eq!(
            display_relative(Path::new("/site/Content/posts/a.md"), root),
            "Content/posts/a.md"
        );
        assert_eq!(display_relative(Path::new("/elsewhere/b.md"), root), "/elsewhere/b.md");
    }
}
