//! Generated file collections and writing them to disk.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{ManifestError, ManifestResult};

/// A single generated file, addressed relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Outcome of writing a manifest set
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Ordered collection of generated files
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    files: Vec<GeneratedFile>,
}

impl ManifestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing an earlier file with the same path
    pub fn push(&mut self, file: GeneratedFile) {
        if let Some(existing) = self.files.iter_mut().find(|f| f.path == file.path) {
            *existing = file;
        } else {
            self.files.push(file);
        }
    }

    pub fn extend(&mut self, other: ManifestSet) {
        for file in other.files {
            self.push(file);
        }
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `dir`.
    ///
    /// Existing files are left untouched unless `overwrite` is set. Every
    /// path is checked before anything is written.
    pub async fn write_to(&self, dir: &Path, overwrite: bool) -> ManifestResult<WriteReport> {
        if let Some(file) = self.files.iter().find(|f| {
            f.path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        }) {
            return Err(ManifestError::Write {
                path: file.path.display().to_string(),
                reason: "path must be relative and stay inside the output directory".to_string(),
            });
        }

        let mut report = WriteReport::default();

        for file in &self.files {
            let target = dir.join(&file.path);
            let exists = fs::try_exists(&target)
                .await
                .map_err(|e| ManifestError::Write {
                    path: target.display().to_string(),
                    reason: e.to_string(),
                })?;
            if exists && !overwrite {
                tracing::info!(path = %target.display(), "Skipping existing file");
                report.skipped.push(target);
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ManifestError::Write {
                        path: parent.display().to_string(),
                        reason: e.to_string(),
                    })?;
            }

            fs::write(&target, &file.content)
                .await
                .map_err(|e| ManifestError::Write {
                    path: target.display().to_string(),
                    reason: e.to_string(),
                })?;

            tracing::debug!(path = %target.display(), bytes = file.content.len(), "Wrote manifest");
            report.written.push(target);
        }

        Ok(report)
    }
}

impl IntoIterator for ManifestSet {
    type Item = GeneratedFile;
    type IntoIter = std::vec::IntoIter<GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_push_replaces_same_path() {
        let mut set = ManifestSet::new();
        set.push(GeneratedFile::new("a.yaml", "one"));
        set.push(GeneratedFile::new("a.yaml", "two"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a.yaml").unwrap().content, "two");
    }

    #[tokio::test]
    async fn test_write_skips_existing_without_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.yaml"), "original").unwrap();

        let mut set = ManifestSet::new();
        set.push(GeneratedFile::new("a.yaml", "generated"));
        set.push(GeneratedFile::new("nested/b.yaml", "b"));

        let report = set.write_to(temp.path(), false).await.unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.written.len(), 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("a.yaml")).unwrap(),
            "original"
        );
        assert!(temp.path().join("nested/b.yaml").exists());

        let report = set.write_to(temp.path(), true).await.unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("a.yaml")).unwrap(),
            "generated"
        );
    }

    #[tokio::test]
    async fn test_write_rejects_escaping_paths() {
        let temp = TempDir::new().unwrap();
        let mut set = ManifestSet::new();
        set.push(GeneratedFile::new("../evil.yaml", "x"));
        assert!(set.write_to(temp.path(), true).await.is_err());
    }

    #[tokio::test]
    async fn test_bad_path_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut set = ManifestSet::new();
        set.push(GeneratedFile::new("good.yaml", "ok"));
        set.push(GeneratedFile::new("/etc/evil.yaml", "x"));

        let err = set.write_to(temp.path(), false).await.unwrap_err();
        assert!(matches!(err, ManifestError::Write { .. }));
        assert!(!temp.path().join("good.yaml").exists());
    }

    #[tokio::test]
    async fn test_existence_check_error_is_reported() {
        let temp = TempDir::new().unwrap();
        // A regular file where a directory is expected
        std::fs::write(temp.path().join("k8s"), "not a directory").unwrap();

        let mut set = ManifestSet::new();
        set.push(GeneratedFile::new("k8s/deployment.yaml", "x"));

        let err = set.write_to(temp.path(), false).await.unwrap_err();
        assert!(matches!(err, ManifestError::Write { .. }));
        assert_eq!(
            std::fs::read_to_string(temp.path().join("k8s")).unwrap(),
            "not a directory"
        );
    }
}
