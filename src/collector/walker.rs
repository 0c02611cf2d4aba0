use crate::config::FilterConfig;
use crate::collector::file_filter::FileFilter;
use crate::error::{CollectError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One selected file, read in full. Immutable once collected.
#[derive(Debug, Clone)]
pub struct CollectedFile {
    pub relative_path: PathBuf,
    pub content: String,
}

impl CollectedFile {
    pub fn new(relative_path: PathBuf, content: String) -> Self {
        Self {
            relative_path,
            content,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Result of one traversal: files in traversal order plus the diagnostics
/// for files that matched but could not be read.
#[derive(Debug, Default)]
pub struct Collection {
    pub files: Vec<CollectedFile>,
    pub read_errors: Vec<String>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size()).sum()
    }
}

/// Resolve the source directory to an absolute path. This resolved path is
/// the basis for all relative-path computation in output. Failure here is
/// the only fatal error of a run.
pub fn resolve_source_dir<P: AsRef<Path>>(source_dir: P) -> Result<PathBuf> {
    let source_dir = source_dir.as_ref();

    let resolved = fs::canonicalize(source_dir).map_err(|e| CollectError::InvalidSourceDir {
        path: format!("{}: {}", source_dir.display(), e),
    })?;

    if !resolved.is_dir() {
        return Err(CollectError::InvalidSourceDir {
            path: format!("{} is not a directory", resolved.display()),
        });
    }

    // Probe readability up front so an unreadable root fails the run instead
    // of silently producing an empty collection.
    fs::read_dir(&resolved).map_err(|_| CollectError::Permission {
        path: resolved.display().to_string(),
    })?;

    Ok(resolved)
}

pub struct Collector {
    filter: FileFilter,
    max_depth: usize,
}

impl Collector {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    /// Walk the tree rooted at `root` (already resolved) and read every
    /// selected file as UTF-8. Read failures are recorded and skipped.
    pub fn collect(&self, root: &Path) -> Result<Collection> {
        self.collect_with_progress(root, None)
    }

    pub fn collect_with_progress(
        &self,
        root: &Path,
        progress_callback: Option<&dyn Fn(&CollectedFile)>,
    ) -> Result<Collection> {
        let mut collection = Collection::default();

        // Sorted traversal keeps the output deterministic per run.
        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    collection.read_errors.push(format!("Scan error: {}", err));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.filter.matches_extension(entry.path()) {
                continue;
            }

            match self.read_file(&entry, root) {
                Ok(file) => {
                    if let Some(callback) = progress_callback {
                        callback(&file);
                    }
                    collection.files.push(file);
                }
                Err(err) => {
                    // Log-and-skip: a single unreadable file never aborts the run.
                    collection.read_errors.push(err.to_string());
                }
            }
        }

        Ok(collection)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_file() {
            return true;
        }

        // The root itself is always entered.
        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn read_file(&self, entry: &DirEntry, root: &Path) -> Result<CollectedFile> {
        let path = entry.path();

        let content = fs::read_to_string(path).map_err(|e| CollectError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let relative_path = path
            .strip_prefix(root)
            .map_err(|_| CollectError::InvalidSourceDir {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    path.display(),
                    root.display()
                ),
            })?
            .to_path_buf();

        Ok(CollectedFile::new(relative_path, content))
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config() -> FilterConfig {
        FilterConfig {
            extensions: vec![".py".to_string()],
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_resolve_rejects_missing_directory() {
        let result = resolve_source_dir("/definitely/not/a/real/path");
        assert!(matches!(
            result,
            Err(CollectError::InvalidSourceDir { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_plain_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plain.txt");
        fs::write(&file_path, "content").unwrap();

        let result = resolve_source_dir(&file_path);
        assert!(matches!(
            result,
            Err(CollectError::InvalidSourceDir { .. })
        ));
    }

    #[test]
    fn test_collects_matching_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("a.py"), "x=1").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.py"), "y=2").unwrap();
        fs::write(root.join("notes.txt"), "not collected").unwrap();

        let collector = Collector::new(&create_test_config());
        let resolved = resolve_source_dir(root).unwrap();
        let collection = collector.collect(&resolved).unwrap();

        let paths: Vec<String> = collection.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, vec!["a.py", "sub/b.py"]);
        assert_eq!(collection.files[0].content, "x=1");
        assert_eq!(collection.files[1].content, "y=2");
        assert!(collection.read_errors.is_empty());
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("a.py"), "x=1").unwrap();
        let excluded = root.join("sub").join("node_modules");
        fs::create_dir_all(&excluded).unwrap();
        fs::write(excluded.join("c.py"), "z=3").unwrap();
        // A nested match under the excluded subtree must never be visited.
        let nested = excluded.join("deeper");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("d.py"), "w=4").unwrap();

        let collector = Collector::new(&create_test_config());
        let resolved = resolve_source_dir(root).unwrap();
        let collection = collector.collect(&resolved).unwrap();

        let paths: Vec<String> = collection.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, vec!["a.py"]);
    }

    #[test]
    fn test_unreadable_encoding_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("good.py"), "ok = True").unwrap();
        fs::write(root.join("bad.py"), [0xff, 0xfe, 0x80, 0x01]).unwrap();

        let collector = Collector::new(&create_test_config());
        let resolved = resolve_source_dir(root).unwrap();
        let collection = collector.collect(&resolved).unwrap();

        let paths: Vec<String> = collection.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, vec!["good.py"]);
        assert_eq!(collection.read_errors.len(), 1);
        assert!(collection.read_errors[0].contains("bad.py"));
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.md"), "# hi").unwrap();

        let collector = Collector::new(&create_test_config());
        let resolved = resolve_source_dir(temp_dir.path()).unwrap();
        let collection = collector.collect(&resolved).unwrap();

        assert!(collection.is_empty());
        assert_eq!(collection.total_bytes(), 0);
    }

    #[test]
    fn test_overridden_exclusions_replace_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let modules = root.join("node_modules");
        fs::create_dir(&modules).unwrap();
        fs::write(modules.join("vendored.py"), "v=0").unwrap();
        let custom = root.join("generated");
        fs::create_dir(&custom).unwrap();
        fs::write(custom.join("gen.py"), "g=0").unwrap();

        let config = FilterConfig {
            extensions: vec![".py".to_string()],
            exclude_dirs: vec!["generated".to_string()],
            ..FilterConfig::default()
        };
        let collector = Collector::new(&config);
        let resolved = resolve_source_dir(root).unwrap();
        let collection = collector.collect(&resolved).unwrap();

        let paths: Vec<String> = collection.files.iter().map(|f| f.display_path()).collect();
        // node_modules is collectable again once the caller overrides the set.
        assert_eq!(paths, vec!["node_modules/vendored.py"]);
    }
}
