use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Classify every path of two directory trees as common, A-only or B-only.
///
/// The classification is written to the files `common`, `a_only` and `b_only`.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// First directory tree (A)
    pub dir_a: PathBuf,
    /// Second directory tree (B)
    pub dir_b: PathBuf,

    /// Directory receiving the `common`, `a_only` and `b_only` files
    #[clap(long, short, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of threads comparing file contents [default: available cores]
    #[clap(long, short)]
    pub jobs: Option<NonZeroUsize>,

    /// Also print the labeled report to stdout
    #[clap(long, short)]
    pub print: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
