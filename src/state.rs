use std::path::PathBuf;

use crate::jobs::JobTable;

/// Process-wide mutable shell state, owned by the prompt loop and passed
/// down by `&mut` — nothing in here is a global.
///
/// Only the control thread touches these fields; the Ctrl-C handler thread
/// reads and writes neither, so no locking is needed.
pub struct ShellState {
    /// Background jobs awaiting reclamation.
    pub jobs: JobTable,
    /// Where `cd -` goes. `None` until the first successful `cd`.
    pub prev_dir: Option<PathBuf>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            jobs: JobTable::new(),
            prev_dir: None,
        }
    }
}
