//! Lockstep walk of two directory trees.
//!
//! The walk assigns every relative path an [`Outcome`] and folds the outcomes into a
//! [`ClassificationResult`]. File contents are compared on a [`ComparisonPool`] while the walk goes
//! on.

mod comparison_pool;
mod outcome;
mod relative_path;
mod tree_classifier;

pub use comparison_pool::{ComparisonPool, ComparisonPoolCreationError};
pub use outcome::{ClassificationResult, Outcome};
pub use relative_path::RelativePath;
pub use tree_classifier::{ClassificationError, TreeClassifier};
