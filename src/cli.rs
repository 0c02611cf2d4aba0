use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codecollect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect source files into a single delimited text artifact")]
#[command(
    long_about = "codecollect walks a directory tree, selects files by name suffix, and \
                  concatenates their contents into delimited text output suitable for \
                  feeding to a language model as context."
)]
#[command(after_help = "EXAMPLES:\n  \
    codecollect . -e .py\n  \
    codecollect src --extensions .rs,.toml --output context.txt\n  \
    codecollect app -e .vue .astro --chunk-size 512\n  \
    codecollect . -e .py --stdout | head\n  \
    codecollect . -e .py --exclude-dirs vendor,generated")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Source directory to scan
    #[arg(required_unless_present = "generate_config")]
    pub source_dir: Option<PathBuf>,

    /// File name suffixes to collect (e.g. .py .rs)
    #[arg(
        short,
        long,
        num_args = 1..,
        value_delimiter = ',',
        required_unless_present = "generate_config"
    )]
    pub extensions: Vec<String>,

    /// Custom output file path (defaults to a generated name)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Directories to skip; replaces the default exclusion set entirely
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub exclude_dirs: Option<Vec<String>>,

    /// Split output into chunks of at most this many kilobytes
    #[arg(long, value_name = "KB", conflicts_with = "stdout")]
    pub chunk_size: Option<u64>,

    /// Write the collected document to standard output
    #[arg(long)]
    pub stdout: bool,

    /// Path to TOML configuration file
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for messages and the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be collected without reading or writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let extensions = if self.extensions.is_empty() {
            None
        } else {
            Some(self.extensions.clone())
        };

        CliOverrides::new()
            .with_extensions(extensions)
            .with_exclude_dirs(self.exclude_dirs.clone())
            .with_chunk_size_kb(self.chunk_size)
            .with_output_file(self.output.clone())
            .with_stream_stdout(self.stdout)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
