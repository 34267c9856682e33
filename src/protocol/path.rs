//! Remote directory paths
// (c) 2026 the xfer-engine developers

use std::fmt::{self, Display};

/// An absolute directory path on the remote server.
///
/// Paths are held as a list of segments. An _empty_ path (no segments, not even the root)
/// means "unspecified" and is what you get from parsing anything that isn't absolute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerPath {
    /// `None` for the empty path; otherwise the segments below the root
    segments: Option<Vec<String>>,
}

impl ServerPath {
    /// Parses an absolute path.
    ///
    /// `.` segments and repeated separators are ignored; `..` removes the previous segment.
    /// A string which does not start with `/` yields the empty path.
    #[must_use]
    pub fn new(path: &str) -> Self {
        if !path.starts_with('/') {
            return Self::default();
        }
        let mut segments: Vec<String> = Vec::new();
        for seg in path.split('/') {
            match seg {
                "" | "." => (),
                ".." => {
                    let _ = segments.pop();
                }
                s => segments.push(s.to_string()),
            }
        }
        Self {
            segments: Some(segments),
        }
    }

    /// The root directory
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Some(Vec::new()),
        }
    }

    /// Is this the empty (unspecified) path?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_none()
    }

    /// Does this path have a parent directory? (The root and the empty path do not.)
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.segments.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// The parent directory, if there is one
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let segs = self.segments.as_ref()?;
        let (_, rest) = segs.split_last()?;
        Some(Self {
            segments: Some(rest.to_vec()),
        })
    }

    /// The final segment of this path, if there is one
    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.as_ref()?.last().map(String::as_str)
    }

    /// Appends a relative path (one or more segments) to this path.
    ///
    /// If `sub` is itself absolute, it replaces this path.
    /// Joining anything to the empty path yields the empty path.
    #[must_use]
    pub fn join(&self, sub: &str) -> Self {
        if sub.starts_with('/') {
            return Self::new(sub);
        }
        if self.is_empty() {
            return Self::default();
        }
        Self::new(&format!("{self}/{sub}"))
    }

    /// Is `other` this path or somewhere below it?
    #[must_use]
    pub fn is_parent_of_or_same(&self, other: &Self) -> bool {
        match (&self.segments, &other.segments) {
            (Some(mine), Some(theirs)) => theirs.starts_with(mine),
            _ => false,
        }
    }

    /// Formats a filename within this directory.
    ///
    /// If `omit_path` is set (and this path is not empty) the bare filename is returned,
    /// as is appropriate once the remote side has changed into this directory.
    /// Otherwise the absolute form is returned.
    #[must_use]
    pub fn format_filename(&self, file: &str, omit_path: bool) -> String {
        if omit_path || self.is_empty() {
            return file.to_string();
        }
        if self.has_parent() {
            format!("{self}/{file}")
        } else {
            format!("/{file}")
        }
    }
}

impl Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segments {
            None => Ok(()),
            Some(segs) if segs.is_empty() => write!(f, "/"),
            Some(segs) => {
                for s in segs {
                    write!(f, "/{s}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ServerPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
