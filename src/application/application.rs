use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::classifier::{
    ClassificationError, ClassificationResult, ComparisonPool, ComparisonPoolCreationError,
    TreeClassifier,
};
use crate::ext::PathDisplayExt;
use crate::filesystem::{FilesystemError, ensure_readable_dir};
use crate::report::{Report, ReportWriteError, ReportWriter};

pub struct Application;

impl Application {
    /// Classifies the two roots and writes the report.
    ///
    /// Nothing is written unless the roots and the output directory are usable and the whole
    /// classification succeeded.
    pub async fn run(
        config: impl Into<RuntimeConfig>,
    ) -> Result<ClassificationResult, ApplicationError> {
        let config: RuntimeConfig = config.into();
        debug!("Runtime config: {:?}", config);

        for root in [&config.root_a, &config.root_b] {
            ensure_readable_dir(root).context(RootSnafu { root })?;
        }
        ensure_readable_dir(&config.output_dir).context(OutputDirSnafu)?;

        let pool = ComparisonPool::new(config.jobs).context(ComparisonPoolSnafu)?;
        info!(
            "Comparing {} with {}",
            config.root_a.display_absolute(),
            config.root_b.display_absolute()
        );
        let result = TreeClassifier::new(pool)
            .classify(&config.root_a, &config.root_b)
            .await
            .context(ClassificationSnafu)?;

        let report = Report::new(&result);
        ReportWriter::new(&config.output_dir)
            .write(&report)
            .await
            .context(ReportSnafu)?;
        if config.print_report {
            println!("{report}");
        }

        if result.has_differences() {
            info!("The trees differ");
        } else {
            info!("The trees are identical");
        }
        Ok(result)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Cannot compare {}", root.display_absolute()))]
    RootError {
        root: PathBuf,
        source: FilesystemError,
    },
    #[snafu(display("Cannot write the report into the output directory"))]
    OutputDirError { source: FilesystemError },
    #[snafu(display("Critical failure encountered while starting comparison workers"))]
    ComparisonPoolError { source: ComparisonPoolCreationError },
    #[snafu(display("Critical failure encountered while classifying the trees"))]
    ClassificationError { source: ClassificationError },
    #[snafu(display("Critical failure encountered while writing the report"))]
    ReportError { source: ReportWriteError },
}
