use std::ffi::OsString;
use std::fs::{self, FileType};
use std::path::Path;

use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::ext::PathDisplayExt;
use crate::filesystem::error::{
    FilesystemError, MetadataSnafu, NotADirectorySnafu, ReadDirSnafu, ReadEntrySnafu,
};

/// Kind of a directory child, after symlinks have been followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    fn from_file_type(file_type: FileType) -> Option<Self> {
        if file_type.is_dir() {
            Some(EntryKind::Directory)
        } else if file_type.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// Lists the immediate children of `dir`, sorted by name.
///
/// Children that are neither regular files nor directories once symlinks are resolved (dangling
/// links, FIFOs, sockets, devices) are left out of the listing.
pub fn list_entries(dir: &Path) -> Result<Vec<Entry>, FilesystemError> {
    let read_dir = fs::read_dir(dir).context(ReadDirSnafu { path: dir })?;

    let mut entries = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.context(ReadEntrySnafu { path: dir })?;
        let path = dir_entry.path();

        match resolve_kind(&path)? {
            Some(kind) => entries.push(Entry {
                name: dir_entry.file_name(),
                kind,
            }),
            None => warn!(
                "Skipping {}: not a regular file or directory",
                path.display_absolute()
            ),
        }
    }

    entries.sort_by(|left, right| left.name.cmp(&right.name));
    debug!("Listed {} entries in {}", entries.len(), dir.display());
    Ok(entries)
}

/// Checks that `path` is a directory whose children can be listed.
pub fn ensure_readable_dir(path: &Path) -> Result<(), FilesystemError> {
    let metadata = fs::metadata(path).context(MetadataSnafu { path })?;
    ensure!(metadata.is_dir(), NotADirectorySnafu { path });
    fs::read_dir(path).context(ReadDirSnafu { path })?;
    Ok(())
}

fn resolve_kind(path: &Path) -> Result<Option<EntryKind>, FilesystemError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(EntryKind::from_file_type(metadata.file_type())),
        // Dangling or looping link
        Err(_) if path.is_symlink() => Ok(None),
        Err(source) => Err(source).context(MetadataSnafu { path }),
    }
}
