use std::path::PathBuf;

use snafu::Snafu;

use crate::ext::PathDisplayExt;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum FilesystemError {
    #[snafu(display("Failed to read directory {}", path.display_absolute()))]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read an entry of directory {}", path.display_absolute()))]
    ReadEntryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to query metadata of {}", path.display_absolute()))]
    MetadataError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not a directory", path.display_absolute()))]
    NotADirectoryError { path: PathBuf },
    #[snafu(display("Failed to open file {}", path.display_absolute()))]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read file {}", path.display_absolute()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}
