//! Task id interning for dense graph traversal.
//!
//! Maps `TaskId`s to consecutive integers so the cycle detector can keep its
//! visited/path state in plain vectors.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Interned task id (u32 for compact storage).
pub type TaskIdInt = u32;

/// Bidirectional `TaskId` <-> integer mapping, borrowing ids from the batch.
#[derive(Debug, Clone)]
pub struct TaskIdInterner<'a> {
    to_int: FxHashMap<&'a TaskId, TaskIdInt>,
    from_int: Vec<&'a TaskId>,
}

impl<'a> TaskIdInterner<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_int: Vec::with_capacity(capacity),
        }
    }

    /// Intern an id, returning its integer. Re-interning returns the existing integer.
    pub fn intern(&mut self, id: &'a TaskId) -> TaskIdInt {
        if let Some(&int) = self.to_int.get(id) {
            return int;
        }
        let int = self.from_int.len() as TaskIdInt;
        self.from_int.push(id);
        self.to_int.insert(id, int);
        int
    }

    #[inline]
    pub fn resolve(&self, int: TaskIdInt) -> Option<&'a TaskId> {
        self.from_int.get(int as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.from_int.len()
    }
}
