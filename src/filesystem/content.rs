use std::fs;
use std::path::Path;

use compio::buf::{IntoInner, IoBuf};
use compio::fs::File;
use compio::io::AsyncReadAtExt;
use snafu::ResultExt;
use tracing::debug;

use crate::filesystem::error::{FilesystemError, MetadataSnafu, OpenSnafu, ReadSnafu};

const CHUNK_SIZE: u64 = 64 * 1024;

/// Returns whether two regular files hold exactly the same bytes.
///
/// Files of different length are reported unequal without being opened. Otherwise both files are
/// read chunk by chunk and the comparison stops at the first chunk that differs.
pub async fn contents_equal(file_a: &Path, file_b: &Path) -> Result<bool, FilesystemError> {
    let size_a = fs::metadata(file_a)
        .context(MetadataSnafu { path: file_a })?
        .len();
    let size_b = fs::metadata(file_b)
        .context(MetadataSnafu { path: file_b })?
        .len();
    if size_a != size_b {
        debug!(
            "Sizes differ ({size_a} vs {size_b}) for {} and {}",
            file_a.display(),
            file_b.display()
        );
        return Ok(false);
    }

    let handle_a = File::open(file_a).await.context(OpenSnafu { path: file_a })?;
    let handle_b = File::open(file_b).await.context(OpenSnafu { path: file_b })?;

    let mut position = 0;
    while position < size_a {
        let chunk_len = CHUNK_SIZE.min(size_a - position) as usize;
        let chunk_a = read_chunk(&handle_a, file_a, position, chunk_len).await?;
        let chunk_b = read_chunk(&handle_b, file_b, position, chunk_len).await?;
        if chunk_a != chunk_b {
            debug!(
                "Contents differ near offset {position} for {} and {}",
                file_a.display(),
                file_b.display()
            );
            return Ok(false);
        }
        position += chunk_len as u64;
    }

    Ok(true)
}

async fn read_chunk(
    handle: &File,
    path: &Path,
    position: u64,
    len: usize,
) -> Result<Vec<u8>, FilesystemError> {
    let buffer = Vec::with_capacity(len).slice(..len);
    let result = handle.read_exact_at(buffer, position).await;
    result.0.context(ReadSnafu { path })?;
    Ok(result.1.into_inner())
}
