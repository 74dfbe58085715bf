use std::cmp::Ordering;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::TryStreamExt;
use futures::stream::FuturesUnordered;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::classifier::{ClassificationResult, ComparisonPool, Outcome, RelativePath};
use crate::filesystem::{Entry, EntryKind, FilesystemError, list_entries};

/// Walks two roots side by side and classifies every relative path under either of them.
///
/// Directories present on both sides are descended into through an explicit queue, so the depth
/// of the trees is not bounded by the call stack. A name present on one side only is reported
/// once and its subtree is never listed.
pub struct TreeClassifier {
    pool: ComparisonPool,
}

/// A pair of directories sharing the same relative path under both roots.
struct WorkItem {
    prefix: RelativePath,
    dir_a: PathBuf,
    dir_b: PathBuf,
}

impl WorkItem {
    fn child(&self, name: &OsString, prefix: RelativePath) -> Self {
        Self {
            prefix,
            dir_a: self.dir_a.join(name),
            dir_b: self.dir_b.join(name),
        }
    }
}

/// Where a child name was found, with its kind on each side.
#[derive(Debug, PartialEq, Eq)]
enum Presence {
    OnlyA(EntryKind),
    OnlyB(EntryKind),
    Both(EntryKind, EntryKind),
}

impl TreeClassifier {
    pub fn new(pool: ComparisonPool) -> Self {
        Self { pool }
    }

    pub async fn classify(
        &self,
        root_a: &Path,
        root_b: &Path,
    ) -> Result<ClassificationResult, ClassificationError> {
        let mut queue = VecDeque::from([WorkItem {
            prefix: RelativePath::root(),
            dir_a: root_a.to_path_buf(),
            dir_b: root_b.to_path_buf(),
        }]);
        let mut outcomes: Vec<(RelativePath, Outcome)> = Vec::new();
        let pending = FuturesUnordered::new();

        while let Some(item) = queue.pop_front() {
            debug!("Walking '{}'", item.prefix);
            let entries_a = list_entries(&item.dir_a).context(WalkSnafu)?;
            let entries_b = list_entries(&item.dir_b).context(WalkSnafu)?;

            for (name, presence) in pair_by_name(entries_a, entries_b) {
                let path = item.prefix.join(&name);
                match presence {
                    Presence::OnlyA(kind) => {
                        debug!("'{path}' ({kind:?}) only exists under A");
                        outcomes.push((path, Outcome::OnlyA));
                    }
                    Presence::OnlyB(kind) => {
                        debug!("'{path}' ({kind:?}) only exists under B");
                        outcomes.push((path, Outcome::OnlyB));
                    }
                    Presence::Both(EntryKind::Directory, EntryKind::Directory) => {
                        queue.push_back(item.child(&name, path.clone()));
                        outcomes.push((path, Outcome::Same));
                    }
                    Presence::Both(EntryKind::File, EntryKind::File) => {
                        let comparison = self.pool.compare(
                            path,
                            item.dir_a.join(&name),
                            item.dir_b.join(&name),
                        )?;
                        pending.push(comparison);
                    }
                    Presence::Both(kind_a, kind_b) => {
                        debug!("'{path}' is a {kind_a:?} under A but a {kind_b:?} under B");
                        outcomes.push((path, Outcome::DiffersBothSides));
                    }
                }
            }
        }

        debug!("Walk finished, awaiting {} comparisons", pending.len());
        let compared: Vec<(RelativePath, Outcome)> = pending.try_collect().await?;
        outcomes.extend(compared);

        let result: ClassificationResult = outcomes.into_iter().collect();
        info!(
            "Classified {} common, {} A-only and {} B-only paths",
            result.common().len(),
            result.a_only().len(),
            result.b_only().len()
        );
        Ok(result)
    }
}

/// Merges two name-sorted listings into one name-sorted sequence of presences.
fn pair_by_name(entries_a: Vec<Entry>, entries_b: Vec<Entry>) -> Vec<(OsString, Presence)> {
    let mut side_a = entries_a.into_iter().peekable();
    let mut side_b = entries_b.into_iter().peekable();
    let mut paired = Vec::new();

    loop {
        let order = match (side_a.peek(), side_b.peek()) {
            (Some(a), Some(b)) => a.name.cmp(&b.name),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        match order {
            Ordering::Less => {
                if let Some(a) = side_a.next() {
                    paired.push((a.name, Presence::OnlyA(a.kind)));
                }
            }
            Ordering::Greater => {
                if let Some(b) = side_b.next() {
                    paired.push((b.name, Presence::OnlyB(b.kind)));
                }
            }
            Ordering::Equal => {
                if let (Some(a), Some(b)) = (side_a.next(), side_b.next()) {
                    paired.push((a.name, Presence::Both(a.kind, b.kind)));
                }
            }
        }
    }

    paired
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum ClassificationError {
    #[snafu(display("Failed to list a directory while walking the trees"))]
    WalkError { source: FilesystemError },
    #[snafu(display("Failed to compare the contents of '{}'", path))]
    ComparisonError {
        path: RelativePath,
        source: FilesystemError,
    },
    #[snafu(display("Failed to dispatch the comparison of '{}': {}", path, error))]
    ComparisonDispatchError { path: RelativePath, error: String },
    #[snafu(display("The comparison of '{}' got cancelled", path))]
    ComparisonCanceledError {
        path: RelativePath,
        source: futures_channel::oneshot::Canceled,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    struct Roots {
        _temp_dir: TempDir,
        a: PathBuf,
        b: PathBuf,
    }

    impl Roots {
        fn file(&self, side: &Path, relative: &str, content: &str) {
            let path = side.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directories");
            }
            fs::write(path, content).expect("Failed to write file");
        }

        fn dir(&self, side: &Path, relative: &str) {
            fs::create_dir_all(side.join(relative)).expect("Failed to create directory");
        }
    }

    #[fixture]
    fn roots() -> Roots {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::create_dir(&a).expect("Failed to create root a");
        fs::create_dir(&b).expect("Failed to create root b");
        Roots {
            _temp_dir: temp_dir,
            a,
            b,
        }
    }

    #[fixture]
    fn classifier() -> TreeClassifier {
        let pool = ComparisonPool::new(NonZeroUsize::new(2)).expect("Failed to create pool");
        TreeClassifier::new(pool)
    }

    fn render(set: &BTreeSet<RelativePath>) -> Vec<&str> {
        set.iter()
            .map(|p| p.to_str().expect("Expected a UTF-8 path"))
            .collect()
    }

    fn rendered(result: &ClassificationResult) -> (Vec<&str>, Vec<&str>, Vec<&str>) {
        (
            render(result.common()),
            render(result.a_only()),
            render(result.b_only()),
        )
    }

    fn entry(name: &str, kind: EntryKind) -> Entry {
        Entry {
            name: OsString::from(name),
            kind,
        }
    }

    #[test]
    fn pairs_sorted_listings_by_name() {
        let side_a = vec![
            entry("both_dirs", EntryKind::Directory),
            entry("mixed", EntryKind::File),
            entry("only_a", EntryKind::File),
        ];
        let side_b = vec![
            entry("both_dirs", EntryKind::Directory),
            entry("mixed", EntryKind::Directory),
            entry("only_b", EntryKind::Directory),
        ];

        let paired = pair_by_name(side_a, side_b);

        assert_eq!(
            paired,
            vec![
                (
                    OsString::from("both_dirs"),
                    Presence::Both(EntryKind::Directory, EntryKind::Directory)
                ),
                (
                    OsString::from("mixed"),
                    Presence::Both(EntryKind::File, EntryKind::Directory)
                ),
                (OsString::from("only_a"), Presence::OnlyA(EntryKind::File)),
                (OsString::from("only_b"), Presence::OnlyB(EntryKind::Directory)),
            ]
        );
    }

    #[test]
    fn pairs_against_an_empty_side() {
        let paired = pair_by_name(Vec::new(), vec![entry("file1", EntryKind::File)]);

        assert_eq!(
            paired,
            vec![(OsString::from("file1"), Presence::OnlyB(EntryKind::File))]
        );
    }

    #[rstest]
    #[compio::test]
    async fn same_and_different(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "same", "hithere");
        roots.file(&roots.b, "same", "hithere");
        roots.file(&roots.a, "dir1/different", "a side");
        roots.file(&roots.b, "dir1/different", "and b side");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(
            rendered(&result),
            (
                vec!["dir1", "same"],
                vec!["dir1/different"],
                vec!["dir1/different"]
            )
        );
    }

    #[rstest]
    #[compio::test]
    async fn same_size_but_different(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "almost_same", "a side");
        roots.file(&roots.b, "almost_same", "b side");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(
            rendered(&result),
            (vec![], vec!["almost_same"], vec!["almost_same"])
        );
    }

    #[rstest]
    #[compio::test]
    async fn no_files_on_a(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.b, "file1", "file1");
        roots.file(&roots.b, "file2", "file2");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(rendered(&result), (vec![], vec![], vec!["file1", "file2"]));
    }

    #[rstest]
    #[compio::test]
    async fn no_files_on_b(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "file1", "file1");
        roots.file(&roots.a, "file2", "file2");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(rendered(&result), (vec![], vec!["file1", "file2"], vec![]));
    }

    #[rstest]
    #[compio::test]
    async fn deep_hierarchy(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "1/2/3/4/5/6/7/8/file1", "file1");
        roots.file(&roots.b, "1/2/3/4/file1", "file1");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(
            rendered(&result),
            (
                vec!["1", "1/2", "1/2/3", "1/2/3/4"],
                vec!["1/2/3/4/5"],
                vec!["1/2/3/4/file1"]
            )
        );
    }

    #[rstest]
    #[compio::test]
    async fn unmatched_subtree_collapses_into_one_entry(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "only/nested/deeper/file", "x");
        roots.file(&roots.a, "only/sibling", "y");
        roots.dir(&roots.a, "only/empty");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(rendered(&result), (vec![], vec!["only"], vec![]));
    }

    #[rstest]
    #[compio::test]
    async fn identical_copy_is_entirely_common(roots: Roots, classifier: TreeClassifier) {
        for side in [&roots.a, &roots.b] {
            roots.file(side, "top", "top");
            roots.file(side, "x/y/z", "deep");
            roots.file(side, "x/w", "");
            roots.dir(side, "x/empty");
        }

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(
            rendered(&result),
            (
                vec!["top", "x", "x/empty", "x/w", "x/y", "x/y/z"],
                vec![],
                vec![]
            )
        );
        assert!(!result.has_differences());
    }

    #[rstest]
    #[compio::test]
    async fn kind_mismatch_lands_in_both_only_sets(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "thing", "a file");
        roots.file(&roots.b, "thing/inside", "not walked");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(rendered(&result), (vec![], vec!["thing"], vec!["thing"]));
    }

    #[rstest]
    #[compio::test]
    async fn empty_roots_classify_to_nothing(roots: Roots, classifier: TreeClassifier) {
        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(result, ClassificationResult::default());
    }

    #[rstest]
    #[compio::test]
    async fn classification_is_idempotent(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "shared/same", "same");
        roots.file(&roots.b, "shared/same", "same");
        roots.file(&roots.a, "shared/changed", "one");
        roots.file(&roots.b, "shared/changed", "two");
        roots.file(&roots.a, "left", "left");
        roots.file(&roots.b, "right/file", "right");

        let first = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("First classification failed");
        let second = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Second classification failed");

        assert_eq!(first, second);
    }

    #[rstest]
    #[compio::test]
    async fn swapping_roots_swaps_only_sets(roots: Roots, classifier: TreeClassifier) {
        roots.file(&roots.a, "shared/changed", "one");
        roots.file(&roots.b, "shared/changed", "three");
        roots.file(&roots.a, "left", "left");
        roots.file(&roots.b, "right/file", "right");

        let forward = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");
        let backward = classifier
            .classify(&roots.b, &roots.a)
            .await
            .expect("Classification failed");

        assert_eq!(forward.common(), backward.common());
        assert_eq!(forward.a_only(), backward.b_only());
        assert_eq!(forward.b_only(), backward.a_only());
    }

    #[cfg(unix)]
    #[rstest]
    #[compio::test]
    async fn symlinked_directories_are_followed(roots: Roots, classifier: TreeClassifier) {
        use std::os::unix::fs::symlink;

        roots.file(&roots.a, "linked/file", "content");
        roots.file(&roots.b, "real/file", "content");
        symlink(roots.b.join("real"), roots.b.join("linked")).expect("Failed to create symlink");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Classification failed");

        assert_eq!(
            rendered(&result),
            (vec!["linked", "linked/file"], vec![], vec!["real"])
        );
    }

    #[rstest]
    #[compio::test]
    async fn missing_root_is_a_walk_error(roots: Roots, classifier: TreeClassifier) {
        let missing = roots.b.join("missing");

        let result = classifier.classify(&roots.a, &missing).await;

        match result {
            Err(ClassificationError::WalkError {
                source: FilesystemError::ReadDirError { path, .. },
            }) => assert_eq!(path, missing),
            other => panic!("Expected WalkError, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[rstest]
    #[compio::test]
    async fn non_utf8_names_are_kept_apart(roots: Roots, classifier: TreeClassifier) {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let shared = OsStr::from_bytes(b"dir\xff");
        let left = OsStr::from_bytes(b"file\xfe");
        let right = OsStr::from_bytes(b"file\xfd");
        for side in [&roots.a, &roots.b] {
            fs::create_dir(side.join(shared)).expect("Failed to create directory");
        }
        fs::write(roots.a.join(shared).join(left), "a").expect("Failed to write file");
        fs::write(roots.b.join(shared).join(right), "b").expect("Failed to write file");

        let result = classifier
            .classify(&roots.a, &roots.b)
            .await
            .expect("Failed to classify");

        let bytes = |set: &BTreeSet<RelativePath>| -> Vec<Vec<u8>> {
            set.iter()
                .map(|p| p.as_os_str().as_bytes().to_vec())
                .collect()
        };
        assert_eq!(bytes(result.common()), vec![b"dir\xff".to_vec()]);
        assert_eq!(bytes(result.a_only()), vec![b"dir\xff/file\xfe".to_vec()]);
        assert_eq!(bytes(result.b_only()), vec![b"dir\xff/file\xfd".to_vec()]);
    }

    #[cfg(unix)]
    #[rstest]
    #[compio::test]
    async fn unreadable_file_is_a_comparison_error(roots: Roots, classifier: TreeClassifier) {
        use std::os::unix::fs::PermissionsExt;

        roots.file(&roots.a, "locked", "same");
        roots.file(&roots.b, "locked", "same");
        let locked = roots.b.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("Failed to restrict permissions");
        if fs::File::open(&locked).is_ok() {
            // Running with privileges that bypass permission bits.
            return;
        }

        let result = classifier.classify(&roots.a, &roots.b).await;

        match result {
            Err(ClassificationError::ComparisonError {
                path,
                source: FilesystemError::OpenError { .. },
            }) => assert_eq!(path.to_string(), "locked"),
            other => panic!("Expected ComparisonError, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[rstest]
    #[compio::test]
    async fn unreadable_subdirectory_is_a_walk_error(roots: Roots, classifier: TreeClassifier) {
        use std::os::unix::fs::PermissionsExt;

        roots.file(&roots.a, "shared/inner", "a");
        roots.file(&roots.b, "shared/inner", "a");
        let locked = roots.b.join("shared");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("Failed to restrict permissions");
        let bypassed = fs::read_dir(&locked).is_ok();

        let result = if bypassed {
            None
        } else {
            Some(classifier.classify(&roots.a, &roots.b).await)
        };
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to restore permissions");

        match result {
            None => {}
            Some(Err(ClassificationError::WalkError {
                source: FilesystemError::ReadDirError { path, .. },
            })) => assert_eq!(path, locked),
            Some(other) => panic!("Expected WalkError, got {other:?}"),
        }
    }
}
