//! File access control seam.
//!
//! Which files a tool may read is decided by the host application
//! (typically an ignore-pattern engine); this crate consumes the
//! decision through a predicate trait and treats it as authoritative.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Oracle deciding whether a tool may read a given path.
pub trait AccessPolicy: Send + Sync {
    /// Whether `path` (as supplied by the model, before resolution)
    /// may be read.
    fn is_allowed(&self, path: &Path) -> bool;
}

/// Policy that allows everything. The default when no host oracle is
/// wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn is_allowed(&self, _path: &Path) -> bool {
        true
    }
}

/// Policy backed by an explicit deny list, matched against the path
/// as given and each of its ancestors. Suitable for tests and simple
/// hosts; real hosts plug in their ignore engine instead.
#[derive(Debug, Clone, Default)]
pub struct DenyList {
    denied: HashSet<PathBuf>,
}

impl DenyList {
    /// Build a deny list from paths.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            denied: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccessPolicy for DenyList {
    fn is_allowed(&self, path: &Path) -> bool {
        !path.ancestors().any(|p| self.denied.contains(p))
    }
}
