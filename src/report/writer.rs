use std::fs as std_fs;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::PathDisplayExt;
use crate::report::{Category, Report};

/// Persists each report block into a file named after its category inside `output_dir`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `common`, `a_only` and `b_only`, replacing existing files. A non-empty block is
    /// terminated by a newline; an empty block gives an empty file.
    ///
    /// All three blocks are staged in hidden sibling files first and only renamed into place once
    /// every block was written, so a failed write leaves the previous report untouched.
    pub async fn write(&self, report: &Report<'_>) -> Result<(), ReportWriteError> {
        for category in Category::ALL {
            let target = self.target_path(category);
            let is_dir = std_fs::symlink_metadata(&target)
                .map(|metadata| metadata.is_dir())
                .unwrap_or(false);
            ensure!(
                !is_dir,
                TargetIsDirectorySnafu {
                    file_path: target.display_absolute(),
                }
            );
        }

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (category, mut block) in report.blocks() {
            let staging = self.output_dir.join(format!(".{category}.tmp"));
            if !block.is_empty() {
                block.push('\n');
            }

            let result = fs::write(&staging, block.into_bytes()).await;
            if let Err(source) = result.0 {
                discard(staged.iter().map(|(staging, _)| staging.as_path()));
                discard([staging.as_path()]);
                return Err(source).context(WriteSnafu {
                    file_path: staging.display_absolute(),
                });
            }
            staged.push((staging, self.target_path(category)));
        }

        for (index, (staging, target)) in staged.iter().enumerate() {
            if let Err(source) = std_fs::rename(staging, target) {
                discard(staged[index..].iter().map(|(staging, _)| staging.as_path()));
                return Err(source).context(RenameSnafu {
                    file_path: target.display_absolute(),
                });
            }
            debug!("Wrote {}", target.display_absolute());
        }

        Ok(())
    }

    fn target_path(&self, category: Category) -> PathBuf {
        self.output_dir.join(category.to_string())
    }
}

fn discard<'p>(paths: impl IntoIterator<Item = &'p Path>) {
    for path in paths {
        let _ = std_fs::remove_file(path);
    }
}

#[derive(Debug, Snafu)]
pub enum ReportWriteError {
    #[snafu(display("Cannot replace the directory {} with a report file", file_path))]
    TargetIsDirectoryError { file_path: String },
    #[snafu(display("Failed to write the report file {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to move the report file {} into place", file_path))]
    RenameError {
        file_path: String,
        source: std::io::Error,
    },
}
