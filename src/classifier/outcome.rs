use std::collections::BTreeSet;

use crate::classifier::RelativePath;

/// What the walk concluded about a single relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Directory on both sides, or a file with identical bytes on both sides.
    Same,
    /// Present on both sides with different content or different kinds. Reported in both
    /// "only" sets.
    DiffersBothSides,
    OnlyA,
    OnlyB,
}

/// The three path sets of a finished walk. Iteration order of each set is plain byte ordering of
/// the paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    common: BTreeSet<RelativePath>,
    a_only: BTreeSet<RelativePath>,
    b_only: BTreeSet<RelativePath>,
}

impl ClassificationResult {
    pub fn common(&self) -> &BTreeSet<RelativePath> {
        &self.common
    }

    pub fn a_only(&self) -> &BTreeSet<RelativePath> {
        &self.a_only
    }

    pub fn b_only(&self) -> &BTreeSet<RelativePath> {
        &self.b_only
    }

    pub fn has_differences(&self) -> bool {
        !self.a_only.is_empty() || !self.b_only.is_empty()
    }

    fn record(&mut self, path: RelativePath, outcome: Outcome) {
        match outcome {
            Outcome::Same => {
                self.common.insert(path);
            }
            Outcome::OnlyA => {
                self.a_only.insert(path);
            }
            Outcome::OnlyB => {
                self.b_only.insert(path);
            }
            Outcome::DiffersBothSides => {
                self.a_only.insert(path.clone());
                self.b_only.insert(path);
            }
        }
    }
}

impl FromIterator<(RelativePath, Outcome)> for ClassificationResult {
    fn from_iter<I: IntoIterator<Item = (RelativePath, Outcome)>>(outcomes: I) -> Self {
        let mut result = Self::default();
        for (path, outcome) in outcomes {
            result.record(path, outcome);
        }
        result
    }
}
