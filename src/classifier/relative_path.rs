use std::ffi::{OsStr, OsString};
use std::fmt;

use tracing::warn;

/// A `/`-separated path relative to a compared root. The root itself is the empty path.
///
/// Segments keep their raw bytes, so names that are not valid UTF-8 stay distinct and order by
/// those bytes. Only the rendered form is lossy.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(OsString);

impl RelativePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends one path segment.
    pub fn join(&self, name: &OsStr) -> Self {
        if name.to_str().is_none() {
            warn!(
                "Name {} is not valid UTF-8 and will be reported lossily",
                name.to_string_lossy()
            );
        }
        let mut joined = self.0.clone();
        if !self.is_root() {
            joined.push("/");
        }
        joined.push(name);
        Self(joined)
    }

    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }

    pub fn to_str(&self) -> Option<&str> {
        self.0.to_str()
    }
}

impl From<String> for RelativePath {
    fn from(path: String) -> Self {
        Self(path.into())
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}
