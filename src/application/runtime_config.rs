use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root_a: PathBuf,
    pub root_b: PathBuf,
    pub output_dir: PathBuf,
    pub jobs: Option<NonZeroUsize>,
    pub print_report: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root_a: cli.dir_a,
            root_b: cli.dir_b,
            output_dir: cli.output_dir,
            jobs: cli.jobs,
            print_report: cli.print,
        }
    }
}
