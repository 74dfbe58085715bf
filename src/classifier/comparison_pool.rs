use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::classifier::tree_classifier::{
    ClassificationError, ComparisonCanceledSnafu, ComparisonDispatchSnafu, ComparisonSnafu,
};
use crate::classifier::{Outcome, RelativePath};
use crate::filesystem::contents_equal;

/// Worker threads that run file content comparisons off the walking task.
pub struct ComparisonPool {
    dispatcher: Dispatcher,
}

impl ComparisonPool {
    /// Creates a pool with `workers` threads, or one per available core when unspecified.
    pub fn new(workers: Option<NonZeroUsize>) -> Result<Self, ComparisonPoolCreationError> {
        let workers_num = workers.unwrap_or_else(Self::determine_worker_count);
        debug!("Using {} worker threads for content comparison", workers_num);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers_num)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self { dispatcher })
    }

    fn determine_worker_count() -> NonZeroUsize {
        available_parallelism().unwrap_or(NonZeroUsize::MIN)
    }

    /// Dispatches the comparison of the two files found at `path` and returns a future resolving
    /// to the path's outcome.
    pub fn compare(
        &self,
        path: RelativePath,
        file_a: PathBuf,
        file_b: PathBuf,
    ) -> Result<
        impl Future<Output = Result<(RelativePath, Outcome), ClassificationError>> + use<>,
        ClassificationError,
    > {
        let receiver = self
            .dispatcher
            .dispatch(move || async move { contents_equal(&file_a, &file_b).await })
            .map_err(|e| {
                ComparisonDispatchSnafu {
                    path: path.clone(),
                    error: e.to_string(),
                }
                .build()
            })?;

        debug!("Dispatched comparison of '{}'", path);

        Ok(async move {
            let equal = receiver
                .await
                .context(ComparisonCanceledSnafu { path: path.clone() })?
                .context(ComparisonSnafu { path: path.clone() })?;

            let outcome = if equal {
                Outcome::Same
            } else {
                Outcome::DiffersBothSides
            };
            Ok((path, outcome))
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ComparisonPoolCreationError {
    #[snafu(display("Failed to create comparison dispatcher"))]
    DispatcherError { source: std::io::Error },
}
