//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/Content/posts/  ← start
/// /home/user/site/devloop.toml    ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let site = TempDir::new().unwrap();
        let nested = site.path().join("Content/posts");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(site.path().join("devloop.toml"), "").unwrap();

        let found = find_config_file(Path::new("devloop.toml"), &nested).unwrap();
        assert_eq!(found, site.path().join("devloop.toml"));
    }

    #[test]
    fn test_find_config_nearest_wins() {
        let site = TempDir::new().unwrap();
        let nested = site.path().join("inner");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(site.path().join("devloop.toml"), "").unwrap();
        std::fs::write(nested.join("devloop.toml"), "").unwrap();

        let found = find_config_file(Path::new("devloop.toml"), &nested).unwrap();
        assert_eq!(found, nested.join("devloop.toml"));
    }

    #[test]
    fn test_find_config_absolute() {
        let site = TempDir::new().unwrap();
        let path = site.path().join("custom.toml");
        assert!(find_config_file(&path, Path::new("/")).is_none());

        std::fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
