//! Shared graph handle
//!
//! Pure queries take the read lock and may run concurrently. Anything that
//! memoizes or edits edges takes the write lock, so one writer at a time.

use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, thread-safe handle to one PDG
#[derive(Debug, Clone, Default)]
pub struct SharedPdg {
    inner: Arc<RwLock<ProgramDependenceGraph>>,
}

impl SharedPdg {
    pub fn new(pdg: ProgramDependenceGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pdg)),
        }
    }

    /// Run a non-memoizing query under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&ProgramDependenceGraph) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a memoizing query or an edge rewrite under the write lock
    pub fn write<R>(&self, f: impl FnOnce(&mut ProgramDependenceGraph) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Take the graph back if this is the last handle
    pub fn try_unwrap(self) -> Result<ProgramDependenceGraph, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<ProgramDependenceGraph> for SharedPdg {
    fn from(pdg: ProgramDependenceGraph) -> Self {
        Self::new(pdg)
    }
}
