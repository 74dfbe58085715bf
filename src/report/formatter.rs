use std::collections::BTreeSet;
use std::fmt;

use derive_more::Display;

use crate::classifier::{ClassificationResult, RelativePath};

/// One of the three report sections. The display form is both the section label and the output
/// file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Category {
    #[display("common")]
    Common,
    #[display("a_only")]
    AOnly,
    #[display("b_only")]
    BOnly,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Common, Category::AOnly, Category::BOnly];
}

/// Text rendering of a classification.
///
/// Each block lists the paths of one category, one per line, in byte-wise lexicographic order and
/// without a trailing newline. The [`Display`](fmt::Display) form is the labeled report:
///
/// ```text
/// common:
/// <common block>
/// a_only:
/// <a_only block>
/// b_only:
/// <b_only block>
/// ```
pub struct Report<'r> {
    result: &'r ClassificationResult,
}

impl<'r> Report<'r> {
    pub fn new(result: &'r ClassificationResult) -> Self {
        Self { result }
    }

    pub fn block(&self, category: Category) -> String {
        self.paths(category)
            .iter()
            .map(RelativePath::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn blocks(&self) -> impl Iterator<Item = (Category, String)> + '_ {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.block(category)))
    }

    fn paths(&self, category: Category) -> &'r BTreeSet<RelativePath> {
        match category {
            Category::Common => self.result.common(),
            Category::AOnly => self.result.a_only(),
            Category::BOnly => self.result.b_only(),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .blocks()
            .flat_map(|(category, block)| [format!("{category}:"), block])
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}
