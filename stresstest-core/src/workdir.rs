//! Working Directory
//!
//! Shared directory holding every case's artifacts. Each case index owns a
//! disjoint set of three files, so concurrent cases never touch the same path.

use std::path::{Path, PathBuf};

/// Default directory name, created under the current directory
pub const DEFAULT_WORK_DIR: &str = "generated-tests";

/// Artifact paths for one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePaths {
    /// Generated input, `test-{i}.in`
    pub input: PathBuf,
    /// Reference output, `bruteforce-{i}.out`
    pub reference: PathBuf,
    /// Candidate output, `program-{i}.out`
    pub candidate: PathBuf,
}

/// Writable directory shared by all cases of a run
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Create `root` (and parents) if missing.
    pub fn create(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files owned by case `index`.
    pub fn case_paths(&self, index: usize) -> CasePaths {
        CasePaths {
            input: self.root.join(format!("test-{}.in", index)),
            reference: self.root.join(format!("bruteforce-{}.out", index)),
            candidate: self.root.join(format!("program-{}.out", index)),
        }
    }

    /// Delete the directory and everything in it.
    pub fn remove(self) -> std::io::Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
