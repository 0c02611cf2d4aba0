use crate::error::{CollectError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory names pruned from traversal unless the caller overrides the set.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "lib",
    "libs",
    "venv",
    ".venv",
    "env",
    ".env",
    "__pycache__",
    "egg-info",
    ".pytest_cache",
    ".mypy_cache",
    ".coverage",
    "htmlcov",
    ".tox",
    ".eggs",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Suffix strings a file name must end with to be collected.
    pub extensions: Vec<String>,
    /// Directory names excluded from descent, matched exactly.
    pub exclude_dirs: Vec<String>,
    /// Optional regex patterns applied to full paths; invalid patterns are dropped.
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Explicit output path; generated from the project name when absent.
    pub output_file: Option<PathBuf>,
    /// Chunk budget in kilobytes; enables chunked mode when set.
    pub chunk_size_kb: Option<u64>,
    /// Write to the standard output stream instead of a file.
    pub stream_stdout: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: Vec::new(),
            max_depth: 64,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CollectError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CollectError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CollectError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["codecollect.toml", ".codecollect.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extensions) = cli_args.extensions {
            self.filters.extensions = extensions.clone();
        }

        // CLI exclusions replace the default set entirely, they are not additive.
        if let Some(ref exclude) = cli_args.exclude_dirs {
            self.filters.exclude_dirs = exclude.clone();
        }

        if let Some(chunk_size_kb) = cli_args.chunk_size_kb {
            self.output.chunk_size_kb = Some(chunk_size_kb);
        }

        if let Some(ref output_file) = cli_args.output_file {
            self.output.output_file = Some(output_file.clone());
        }

        if cli_args.stream_stdout {
            self.output.stream_stdout = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CollectError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CollectError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.extensions.is_empty() {
            return Err(CollectError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.filters.max_depth == 0 {
            return Err(CollectError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if let Some(chunk_size_kb) = self.output.chunk_size_kb {
            if chunk_size_kb == 0 {
                return Err(CollectError::Config {
                    message: "Chunk size must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn chunk_size_bytes(&self) -> Option<u64> {
        self.output.chunk_size_kb.map(|kb| kb * 1024)
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.filters.extensions = vec![".py".to_string(), ".rs".to_string()];
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub chunk_size_kb: Option<u64>,
    pub output_file: Option<PathBuf>,
    pub stream_stdout: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<Vec<String>>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_exclude_dirs(mut self, exclude_dirs: Option<Vec<String>>) -> Self {
        self.exclude_dirs = exclude_dirs;
        self
    }

    pub fn with_chunk_size_kb(mut self, chunk_size_kb: Option<u64>) -> Self {
        self.chunk_size_kb = chunk_size_kb;
        self
    }

    pub fn with_output_file(mut self, output_file: Option<PathBuf>) -> Self {
        self.output_file = output_file;
        self
    }

    pub fn with_stream_stdout(mut self, stream_stdout: bool) -> Self {
        self.stream_stdout = stream_stdout;
        self
    }
}
