//! Leaf filesystem operations used by the classifier.
//!
//! Two operations live here: listing the immediate children of a directory with their resolved
//! kind, and deciding whether two regular files hold byte-identical content.

mod content;
mod error;
mod listing;

pub use content::contents_equal;
pub use error::FilesystemError;
pub use listing::{Entry, EntryKind, ensure_readable_dir, list_entries};
