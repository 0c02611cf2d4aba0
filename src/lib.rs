pub mod cli;
pub mod collector;
pub mod config;
pub mod emitter;
pub mod error;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, OutputConfig, DEFAULT_EXCLUDE_DIRS};
pub use error::{CollectError, Result, UserFriendlyError};

// Core functionality re-exports
pub use collector::{resolve_source_dir, CollectedFile, Collection, Collector, FileFilter};
pub use emitter::{EmitMode, EmitOutcome, Emitter};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything one run produced, for the summary output.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub source_root: PathBuf,
    pub files_collected: usize,
    pub bytes_collected: u64,
    pub outcome: EmitOutcome,
    pub read_errors: Vec<String>,
    pub completed_at: DateTime<Local>,
}

/// Main library interface: one collector pass followed by one emitter pass.
pub struct CodeCollect {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl CodeCollect {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && !config.output.stream_stdout);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a CodeCollect instance from CLI arguments. Streaming to stdout
    /// forces quiet so decorative output never mixes into the document.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };
        let quiet = cli_args.quiet || config.output.stream_stdout;

        Ok(Self::new(config, output_mode, cli_args.verbosity_level(), quiet))
    }

    /// Collect matching files under `source_dir` and emit them according to
    /// the configured output mode.
    pub fn run<P: AsRef<Path>>(&self, source_dir: P) -> Result<RunReport> {
        let source_root = resolve_source_dir(source_dir)?;

        self.output_formatter.start_operation("Collecting files");

        let collection = self.collect_files(&source_root)?;

        for error in &collection.read_errors {
            self.output_formatter.diagnostic(error);
        }

        self.output_formatter.info(&format!(
            "Found {} matching files ({} bytes)",
            collection.files.len(),
            collection.total_bytes()
        ));

        let mode = self.emit_mode(&source_root);
        self.output_formatter.debug(&format!("Emit mode: {:?}", mode));

        let emitter = Emitter::new(
            source_root.display().to_string(),
            self.config.filters.extensions.clone(),
        );
        let outcome = emitter.emit(&collection.files, &mode)?;

        for output in &outcome.outputs {
            self.output_formatter
                .success(&format!("Wrote {}", output.display()));
        }

        Ok(RunReport {
            source_root,
            files_collected: collection.files.len(),
            bytes_collected: collection.total_bytes(),
            outcome,
            read_errors: collection.read_errors,
            completed_at: Local::now(),
        })
    }

    fn collect_files(&self, source_root: &Path) -> Result<Collection> {
        let collector = Collector::new(&self.config.filters);

        let progress = self.progress_manager.create_collect_progress();
        let progress_callback = {
            let pb = progress.clone();
            move |file: &CollectedFile| {
                pb.inc(1);
                pb.set_message(file.display_path());
            }
        };

        let collection = collector.collect_with_progress(source_root, Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &progress,
            &format!("collected {} files", collection.files.len()),
        );

        Ok(collection)
    }

    /// Decide where the output goes. Streaming wins over everything; a chunk
    /// budget selects chunked mode; otherwise one file, named explicitly or
    /// generated from the project name and a timestamp.
    fn emit_mode(&self, source_root: &Path) -> EmitMode {
        if self.config.output.stream_stdout {
            return EmitMode::Stream;
        }

        if let Some(max_bytes) = self.config.chunk_size_bytes() {
            let stem = match &self.config.output.output_file {
                Some(path) => emitter::output_path_to_stem(path),
                None => PathBuf::from(emitter::generate_output_stem(source_root, &Local::now())),
            };
            return EmitMode::Chunked { stem, max_bytes };
        }

        let path = match &self.config.output.output_file {
            Some(path) => path.clone(),
            None => emitter::single_file_path(&PathBuf::from(emitter::generate_output_stem(
                source_root,
                &Local::now(),
            ))),
        };
        EmitMode::SingleFile(path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &CollectError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Generate sample configuration file
pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let sample_config = Config::create_sample_config();
    std::fs::write(output_path.as_ref(), sample_config).map_err(CollectError::Io)?;
    Ok(())
}
