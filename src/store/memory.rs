//! # Store en Memoria
//! src/store/memory.rs

use super::{GradeRecord, GradeStore, GradeTable, StoreError};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Store que no persiste nada; se pierde al reiniciar
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<GradeTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, GradeTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GradeStore for MemoryStore {
    fn list(&self) -> Result<Vec<GradeRecord>, StoreError> {
        Ok(self.table().grades().to_vec())
    }

    fn insert(&self, student: &str, grade: &str) -> Result<GradeRecord, StoreError> {
        Ok(self.table().insert(student, grade))
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table().delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_and_list_in_order() {
        let store = MemoryStore::new();
        store.insert("Ann", "90").unwrap();
        store.insert("Bob", "B+").unwrap();

        let grades = store.list().unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].student, "Ann");
        assert_eq!(grades[1].student, "Bob");
    }

    #[test]
    fn test_delete_only_target() {
        let store = MemoryStore::new();
        let ann = store.insert("Ann", "90").unwrap();
        store.insert("Bob", "80").unwrap();

        assert!(store.delete(ann.id).unwrap());
        let grades = store.list().unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].student, "Bob");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        store.insert("Ann", "90").unwrap();

        assert!(!store.delete(999).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_mean_grade() {
        let store = MemoryStore::new();
        assert_eq!(store.mean_grade().unwrap(), None);

        store.insert("Ann", "90").unwrap();
        store.insert("Bob", "70").unwrap();
        assert_eq!(store.mean_grade().unwrap(), Some(80.0));
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..25 {
                        store.insert(&format!("s{}-{}", i, j), "50").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let grades = store.list().unwrap();
        assert_eq!(grades.len(), 200);

        let mut ids: Vec<i64> = grades.iter().map(|g| g.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }
}
