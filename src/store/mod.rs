//! # Almacenamiento de Calificaciones
//! src/store/mod.rs
//!
//! El handler de conexiones solo conoce el trait [`GradeStore`]. Se crea una
//! instancia al arrancar y se comparte entre todos los workers con
//! `Arc<dyn GradeStore>`, así que las implementaciones deben ser seguras
//! bajo llamadas concurrentes.
//!
//! Implementaciones:
//! - [`MemoryStore`]: solo en memoria (tests, `--memory`)
//! - [`JsonFileStore`]: persistida en un archivo JSON

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Una calificación almacenada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Identificador único, nunca se reutiliza
    pub id: i64,
    pub student: String,
    pub grade: String,
}

/// Fallos de persistencia
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Capacidad de almacenamiento que consume el servidor
pub trait GradeStore: Send + Sync {
    /// Todas las calificaciones en orden de inserción
    fn list(&self) -> Result<Vec<GradeRecord>, StoreError>;

    /// Inserta una calificación y retorna el registro con su id
    fn insert(&self, student: &str, grade: &str) -> Result<GradeRecord, StoreError>;

    /// Borra por id. `Ok(false)` si no existía.
    fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Promedio de las calificaciones numéricas, `None` si no hay ninguna
    fn mean_grade(&self) -> Result<Option<f64>, StoreError> {
        Ok(mean_of(&self.list()?))
    }
}

/// Tabla compartida por ambas implementaciones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GradeTable {
    next_id: i64,
    grades: Vec<GradeRecord>,
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            grades: Vec::new(),
        }
    }
}

impl GradeTable {
    pub(crate) fn grades(&self) -> &[GradeRecord] {
        &self.grades
    }

    pub(crate) fn insert(&mut self, student: &str, grade: &str) -> GradeRecord {
        let record = GradeRecord {
            id: self.next_id,
            student: student.to_string(),
            grade: grade.to_string(),
        };
        self.next_id += 1;
        self.grades.push(record.clone());
        record
    }

    pub(crate) fn delete(&mut self, id: i64) -> bool {
        match self.grades.iter().position(|record| record.id == id) {
            Some(index) => {
                self.grades.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Interpreta una calificación como número
///
/// Se ignoran espacios y `%`, así "90", " 87.5 " y "95%" cuentan; "B+" no.
pub fn parse_grade(grade: &str) -> Option<f64> {
    grade
        .trim()
        .to_uppercase()
        .replace('%', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Promedio de las calificaciones numéricas
pub fn mean_of(records: &[GradeRecord]) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| parse_grade(&record.grade))
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}
