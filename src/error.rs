use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory cannot be used: {path}")]
    InvalidSourceDir { path: String },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Cannot write output to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CollectError {
    fn user_message(&self) -> String {
        match self {
            CollectError::InvalidSourceDir { path } => {
                format!("Source directory cannot be used: {}", path)
            }
            CollectError::FileRead { path, source } => {
                format!("Failed to read {}: {}", path.display(), source)
            }
            CollectError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CollectError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            CollectError::OutputWrite { path, source } => {
                format!("Cannot write output to {}: {}", path.display(), source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CollectError::InvalidSourceDir { .. } => Some(
                "Check that the path exists and is a directory you can read.".to_string(),
            ),
            CollectError::FileRead { .. } => Some(
                "The file is skipped; collection continues with the remaining files.".to_string(),
            ),
            CollectError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present."
                    .to_string(),
            ),
            CollectError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory."
                    .to_string(),
            ),
            CollectError::OutputWrite { .. } => Some(
                "Choose a different output path with --output or check directory permissions."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CollectError {
    fn from(error: toml::de::Error) -> Self {
        CollectError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = CollectError::InvalidSourceDir {
            path: "/does/not/exist".to_string(),
        };
        assert!(error.user_message().contains("Source directory"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_file_read_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8");
        let error = CollectError::FileRead {
            path: PathBuf::from("src/bad.py"),
            source: io_err,
        };
        let message = error.user_message();
        assert!(message.contains("src/bad.py"));
        assert!(message.contains("bad utf-8"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = CollectError::from(toml_err);
        assert!(matches!(error, CollectError::Config { .. }));
    }
}
