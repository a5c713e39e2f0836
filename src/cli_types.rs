use clap::Parser;
use std::path::PathBuf;

/// The uncompromising Jupyter notebook formatter.
///
/// PATHS are notebooks and directories to search for notebooks in. By
/// default every notebook is formatted in place. Use `--check`, `--diff` or
/// `--compact-diff` to print reports instead.
#[derive(Parser, Debug)]
#[command(name = "jupyfmt", author, version, about)]
pub struct Cli {
    /// Notebooks and directories to format
    #[arg(required = false)]
    pub paths: Vec<PathBuf>,

    /// How many characters per line to allow [default: 88]
    ///
    /// Configured formatter commands receive it through `{line-length}`.
    #[arg(short = 'l', long, value_name = "INT")]
    pub line_length: Option<usize>,

    /// Don't normalize string quotes or prefixes
    ///
    /// Configured formatter commands receive it through `{skip-string-normalization}`.
    #[arg(short = 'S', long)]
    pub skip_string_normalization: bool,

    /// Don't write the files back, just report which files would change
    #[arg(long)]
    pub check: bool,

    /// Don't write the files back, just print a diff for each changed cell
    #[arg(short, long)]
    pub diff: bool,

    /// Same as --diff but only show lines that would change plus a few lines of context
    #[arg(long)]
    pub compact_diff: bool,

    /// Require code cells to have been executed in order
    #[arg(long)]
    pub assert_consistent_execution: bool,

    /// Regex of paths to skip when searching directories [default: .git, .ipynb_checkpoints, build and dist directories]
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Option<String>,

    /// Only format notebooks whose kernel uses one of these languages (comma-separated) [default: python]
    #[arg(long, value_name = "LANGUAGES", value_delimiter = ',')]
    pub accepted_languages: Option<Vec<String>>,

    /// Only format code cells in the language of the notebook kernel
    #[arg(long)]
    pub exclude_nonkernel_languages: bool,

    /// Skip files ignored by .gitignore when searching directories
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Configuration file (.jupyfmt.toml or pyproject.toml)
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Ignore configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show detailed logging
    #[arg(short, long)]
    pub verbose: bool,
}
