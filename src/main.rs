use clap::Parser;
use codecollect::{
    Cli, CodeCollect, CollectError, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let collect = match CodeCollect::from_cli(&cli) {
        Ok(collect) => collect,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &collect);
    }

    // clap enforces the positional outside of --generate-config.
    let Some(source_dir) = cli.source_dir.as_deref() else {
        print_startup_error(&CollectError::Config {
            message: "source directory is required".to_string(),
        });
        return 5;
    };

    match collect.run(source_dir) {
        Ok(report) => {
            collect.output_formatter().print_run_summary(&report);
            // Per-file read errors were reported on the diagnostic stream and
            // never fail the run; zero matches is a normal completion too.
            0
        }
        Err(e) => {
            collect.handle_error(&e);

            match e {
                CollectError::InvalidSourceDir { .. } => 2,
                CollectError::Permission { .. } => 3,
                CollectError::OutputWrite { .. } => 4,
                CollectError::Config { .. } => 5,
                _ => 1, // General error
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "codecollect.toml".to_string());

    match codecollect::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  codecollect <source-dir> -e <ext> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, collect: &CodeCollect) -> i32 {
    let formatter = collect.output_formatter();
    let config = collect.config();

    formatter.info("DRY RUN MODE - Nothing will be read or written");
    formatter.print_separator();

    let Some(source_dir) = cli.source_dir.as_deref() else {
        formatter.error("source directory is required");
        return 5;
    };

    let source_root = match codecollect::resolve_source_dir(source_dir) {
        Ok(root) => root,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return 2;
        }
    };

    println!("  Source directory: {}", source_root.display());
    println!("  Extensions: {}", config.filters.extensions.join(", "));
    println!(
        "  Exclude directories: {}",
        config.filters.exclude_dirs.join(", ")
    );
    if let Some(chunk_size_kb) = config.output.chunk_size_kb {
        println!("  Chunk size: {} KB", chunk_size_kb);
    }
    if config.output.stream_stdout {
        println!("  Destination: standard output");
    } else if let Some(ref output) = config.output.output_file {
        println!("  Destination: {}", output.display());
    } else {
        println!("  Destination: generated file name");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the collection");

    0
}

fn print_startup_error(error: &CollectError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
