//! # Persistencia en JSON
//! src/store/json_file.rs
//!
//! Guarda la tabla completa de calificaciones en un archivo JSON:
//!
//! ```json
//! {
//!   "next_id": 3,
//!   "grades": [
//!     { "id": 1, "student": "Ann", "grade": "90" },
//!     { "id": 2, "student": "Bob", "grade": "B+" }
//!   ]
//! }
//! ```
//!
//! Cada mutación escribe `<path>.tmp` y lo renombra sobre el archivo final
//! mientras se mantiene el lock, así dos inserciones concurrentes nunca se
//! pisan. Si la escritura falla, la tabla en memoria no cambia.

use super::{GradeRecord, GradeStore, GradeTable, StoreError};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Store respaldado por un archivo JSON
#[derive(Debug)]
pub struct JsonFileStore {
    /// Ruta al archivo de persistencia
    path: PathBuf,

    /// Copia en memoria de lo que hay en disco
    table: Mutex<GradeTable>,
}

impl JsonFileStore {
    /// Abre el store y carga datos existentes
    ///
    /// Crea los directorios padre si hace falta. Un archivo inexistente es
    /// una tabla vacía; un archivo corrupto es un error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let table = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            GradeTable::default()
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Ruta del archivo de persistencia
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<GradeTable, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Escritura atómica: archivo temporal + rename
    fn save_to_file(&self, table: &GradeTable) -> Result<(), StoreError> {
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, table)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn table(&self) -> MutexGuard<'_, GradeTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Aplica `change` a una copia, la persiste y solo entonces la publica
    fn mutate<T>(&self, change: impl FnOnce(&mut GradeTable) -> T) -> Result<T, StoreError> {
        let mut table = self.table();
        let mut updated = table.clone();
        let result = change(&mut updated);

        self.save_to_file(&updated)?;
        *table = updated;

        Ok(result)
    }
}

impl GradeStore for JsonFileStore {
    fn list(&self) -> Result<Vec<GradeRecord>, StoreError> {
        Ok(self.table().grades().to_vec())
    }

    fn insert(&self, student: &str, grade: &str) -> Result<GradeRecord, StoreError> {
        self.mutate(|table| table.insert(student, grade))
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let exists = self.table().grades().iter().any(|record| record.id == id);
        if !exists {
            return Ok(false);
        }
        self.mutate(|table| table.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    // ==================== Basic Operations ====================

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("grades.json")).unwrap();

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.mean_grade().unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/grades.json");
        let store = JsonFileStore::open(&path).unwrap();

        store.insert("Ann", "90").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_insert_and_delete() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("grades.json")).unwrap();

        let ann = store.insert("Ann", "90").unwrap();
        let bob = store.insert("Bob", "80").unwrap();
        assert_eq!(ann.id, 1);
        assert_eq!(bob.id, 2);

        assert!(store.delete(ann.id).unwrap());
        assert!(!store.delete(ann.id).unwrap());

        let grades = store.list().unwrap();
        assert_eq!(grades, vec![bob]);
    }

    // ==================== Persistence ====================

    #[test]
    fn test_persistence_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.insert("Ann", "90").unwrap();
            let bob = store.insert("Bob", "70").unwrap();
            store.delete(bob.id).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let grades = store.list().unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].student, "Ann");

        // El contador de ids también sobrevive
        let carl = store.insert("Carl", "60").unwrap();
        assert_eq!(carl.id, 3);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.insert("Ann", "90").unwrap();

        assert!(!dir.path().join("grades.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Format(_))
        ));
    }

    #[test]
    fn test_failed_write_leaves_table_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.insert("Ann", "90").unwrap();

        // Un directorio en la ruta del temporal hace fallar File::create
        fs::create_dir(dir.path().join("grades.json.tmp")).unwrap();

        assert!(store.insert("Bob", "80").is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    // ==================== Concurrency ====================

    #[test]
    fn test_concurrent_inserts_are_all_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        let store = Arc::new(JsonFileStore::open(&path).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..5 {
                        store.insert(&format!("s{}-{}", i, j), "75").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list().unwrap().len(), 20);
    }
}
