use crate::config::FilterConfig;
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extensions: config.extensions.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    /// Raw string-suffix test against the requested extensions. `.py` matches
    /// `foo.py`, but so does an extension value like `test.py` matching
    /// `unittest.py`; no glob or regex semantics.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };

        self.extensions.iter().any(|ext| filename.ends_with(ext))
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            // Exact name match, regardless of depth.
            if self.exclude_dirs.iter().any(|exclude| exclude == dir_name) {
                return false;
            }

            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }
        }

        true
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }

    pub fn get_exclude_dirs(&self) -> &Vec<String> {
        &self.exclude_dirs
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
