use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::process;

use jupyfmt_lib::cell_tools::DEFAULT_LINE_LENGTH;
use jupyfmt_lib::discovery::{DEFAULT_ACCEPTED_LANGUAGES, DEFAULT_EXCLUDE};
use jupyfmt_lib::{
    BatchDriver, Config, DiffMode, DiscoveryOptions, FormatterOptions, FormatterRegistry, NotebookProcessor,
    ProcessOptions, exit_codes, find_notebooks,
};

mod cli_types;

use cli_types::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}: {e}", "Error".red().bold());
            process::exit(exit_codes::FORMATTING_ERROR);
        }
    }
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(cli)?;

    if cli.paths.is_empty() {
        log::warn!("No paths given, nothing to do");
        return Ok(exit_codes::SUCCESS);
    }

    let exclude = cli
        .exclude
        .as_deref()
        .or(config.exclude.as_deref())
        .unwrap_or(DEFAULT_EXCLUDE);
    let accepted_languages = cli
        .accepted_languages
        .clone()
        .or_else(|| config.accepted_languages.clone())
        .unwrap_or_else(|| DEFAULT_ACCEPTED_LANGUAGES.iter().map(|s| s.to_string()).collect());
    let discovery = DiscoveryOptions::new(
        exclude,
        accepted_languages,
        cli.respect_gitignore || config.respect_gitignore.unwrap_or(false),
    )?;

    let options = ProcessOptions {
        check: cli.check,
        diff: diff_mode(cli),
        assert_consistent_execution: cli.assert_consistent_execution
            || config.assert_consistent_execution.unwrap_or(false),
        exclude_nonkernel_languages: cli.exclude_nonkernel_languages
            || config.exclude_nonkernel_languages.unwrap_or(false),
        formatter: FormatterOptions {
            line_length: cli.line_length.or(config.line_length).unwrap_or(DEFAULT_LINE_LENGTH),
            string_normalization: !(cli.skip_string_normalization
                || config.skip_string_normalization.unwrap_or(false)),
        },
    };
    log::debug!("Options: {options:?}");

    let registry = FormatterRegistry::from_config(&config.cell_tools());
    log::debug!("Formatters: {registry:?}");

    let files = find_notebooks(&cli.paths, &discovery)?;
    log::debug!("Found {} notebook(s)", files.len());

    let processor = NotebookProcessor::new(&registry, &options);
    let outcome = BatchDriver::new(processor).run(&files)?;
    Ok(outcome.exit_code())
}

/// `--compact-diff` wins when both diff flags are given.
fn diff_mode(cli: &Cli) -> Option<DiffMode> {
    if cli.compact_diff {
        Some(DiffMode::Compact)
    } else if cli.diff {
        Some(DiffMode::Full)
    } else {
        None
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(path) = &cli.config {
        log::debug!("Using config file: {}", path.display());
        return Ok(Config::load(path)?);
    }

    let cwd = std::env::current_dir().context("could not determine the current directory")?;
    match Config::discover(&cwd)? {
        Some((path, config)) => {
            log::debug!("Using config file: {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
