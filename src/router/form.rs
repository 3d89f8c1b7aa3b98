//! # Decodificación de Formularios
//! src/router/form.rs
//!
//! Bodies `application/x-www-form-urlencoded` de los dos formularios:
//!
//! - `POST /grades`: `student=Ann&grade=90`
//! - `POST /grades/delete`: `id=5`
//!
//! Cada par `key=value` se decodifica (`%20` y `+` son espacio). Un par sin
//! exactamente un `=` se ignora. Si una clave se repite, gana la última.

use std::collections::HashMap;
use thiserror::Error;
use url::form_urlencoded;

/// Campos decodificados de un formulario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    /// Decodifica un body urlencoded
    ///
    /// # Ejemplo
    /// ```
    /// use grades_server::router::FormData;
    ///
    /// let form = FormData::parse(b"student=Jo%20Lee&grade=B%2B");
    /// assert_eq!(form.get("student"), Some("Jo Lee"));
    /// assert_eq!(form.get("grade"), Some("B+"));
    /// ```
    pub fn parse(body: &[u8]) -> Self {
        let mut fields = HashMap::new();

        for pair in body.split(|byte| *byte == b'&') {
            if pair.iter().filter(|byte| **byte == b'=').count() != 1 {
                continue;
            }
            if let Some((key, value)) = form_urlencoded::parse(pair).next() {
                fields.insert(key.into_owned(), value.into_owned());
            }
        }

        Self { fields }
    }

    /// Obtiene un campo decodificado
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }
}

/// Motivo por el cual un formulario no produce una mutación
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Campo ausente o en blanco
    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    /// `id` que no es un entero
    #[error("invalid grade id {0:?}")]
    InvalidId(String),
}

/// Datos para insertar una calificación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSubmission {
    pub student: String,
    pub grade: String,
}

impl GradeSubmission {
    /// Requiere `student` y `grade` no vacíos
    pub fn from_form(form: &FormData) -> Result<Self, FormError> {
        Ok(Self {
            student: required(form, "student")?.to_string(),
            grade: required(form, "grade")?.to_string(),
        })
    }
}

/// Datos para borrar una calificación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: i64,
}

impl DeleteRequest {
    /// Requiere un `id` entero
    pub fn from_form(form: &FormData) -> Result<Self, FormError> {
        let raw = required(form, "id")?;
        let id = raw
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidId(raw.to_string()))?;
        Ok(Self { id })
    }
}

fn required<'a>(form: &'a FormData, key: &'static str) -> Result<&'a str, FormError> {
    form.get(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(FormError::MissingField(key))
}
