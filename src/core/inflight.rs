//! # Tracker of jobs currently executing.
//!
//! Workers register a job right after dequeue and remove it once its
//! completion is settled. The engine reads a snapshot when the shutdown
//! deadline hits, to report which jobs were stuck.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::jobs::JobId;

/// Set of executing jobs keyed by id.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    jobs: Mutex<HashMap<JobId, Arc<str>>>,
}

impl InFlight {
    pub(crate) fn insert(&self, id: JobId, kind: Arc<str>) {
        self.lock().insert(id, kind);
    }

    pub(crate) fn remove(&self, id: JobId) {
        self.lock().remove(&id);
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Sorted `kind#id` labels of executing jobs.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        let jobs = self.lock();
        let mut ids: Vec<(&JobId, &Arc<str>)> = jobs.iter().collect();
        ids.sort_unstable_by_key(|(id, _)| **id);
        ids.into_iter()
            .map(|(id, kind)| format!("{kind}{id}"))
            .collect()
    }

    /// Empties the set, returning the removed entries sorted by id.
    pub(crate) fn take_all(&self) -> Vec<(JobId, Arc<str>)> {
        let mut taken: Vec<_> = self.lock().drain().collect();
        taken.sort_unstable_by_key(|(id, _)| *id);
        taken
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, Arc<str>>> {
        // Entries are plain data; a panic elsewhere cannot leave them half-written.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_sorted_by_id() {
        let t = InFlight::default();
        t.insert(JobId::new(9), "b".into());
        t.insert(JobId::new(2), "a".into());
        assert_eq!(t.snapshot(), vec!["a#2".to_string(), "b#9".to_string()]);

        t.remove(JobId::new(2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_take_all_empties_set() {
        let t = InFlight::default();
        t.insert(JobId::new(4), "x".into());
        t.insert(JobId::new(1), "y".into());
        let ids: Vec<u64> = t.take_all().iter().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(t.len(), 0);
    }
}
