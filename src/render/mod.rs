//! # Renderizado de Páginas
//! src/render/mod.rs
//!
//! Sustituye placeholders en la plantilla HTML de calificaciones:
//!
//! | Placeholder          | Valor                                         |
//! |----------------------|-----------------------------------------------|
//! | `GRADES_TABLE_ROWS`  | Una fila `<tr>` por calificación              |
//! | `##MEAN##`           | Promedio con un decimal, o `No data yet`      |
//! | `GRADES_MEAN_CLASS`  | Vacío, o `no-data` cuando no hay promedio     |
//!
//! La plantilla por defecto viene compilada en el binario
//! (`templates/grades.html`); `--template` permite cargar otra al arrancar.

use crate::store::GradeRecord;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/grades.html");

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html><html><body><h1>404 Not Found</h1></body></html>";

/// Texto que se muestra cuando no hay calificaciones numéricas
pub const NO_DATA: &str = "No data yet";

/// Renderiza las páginas HTML del servidor
#[derive(Debug, Clone)]
pub struct PageRenderer {
    template: String,
}

impl PageRenderer {
    /// Usa una plantilla arbitraria
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Carga la plantilla desde disco (una sola vez, al arrancar)
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Página de calificaciones
    pub fn render_grades(&self, grades: &[GradeRecord], mean: Option<f64>) -> Vec<u8> {
        let (mean_text, mean_class) = match mean {
            Some(value) => (format!("{:.1}", value), ""),
            None => (NO_DATA.to_string(), "no-data"),
        };

        // Las filas van al final: el texto de los alumnos no debe pasar
        // por las demás sustituciones
        self.template
            .replace("GRADES_MEAN_CLASS", mean_class)
            .replace("##MEAN##", &mean_text)
            .replace("GRADES_TABLE_ROWS", &table_rows(grades))
            .into_bytes()
    }

    /// Página 404 estática
    pub fn not_found(&self) -> Vec<u8> {
        NOT_FOUND_PAGE.as_bytes().to_vec()
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

fn table_rows(grades: &[GradeRecord]) -> String {
    let mut rows = String::new();

    for (index, record) in grades.iter().enumerate() {
        // write! sobre String no puede fallar
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td>\
             <td><span class='grade-badge'>{}</span></td>\
             <td><form method='POST' action='/grades/delete'>\
             <input type='hidden' name='id' value='{}'/>\
             <button type='submit' class='btn btn-delete'>Delete</button>\
             </form></td></tr>",
            index + 1,
            escape_html(&record.student),
            escape_html(&record.grade),
            record.id,
        );
    }

    rows
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, student: &str, grade: &str) -> GradeRecord {
        GradeRecord {
            id,
            student: student.to_string(),
            grade: grade.to_string(),
        }
    }

    fn render(renderer: &PageRenderer, grades: &[GradeRecord], mean: Option<f64>) -> String {
        String::from_utf8(renderer.render_grades(grades, mean)).unwrap()
    }

    #[test]
    fn test_empty_page_shows_no_data() {
        let page = render(&PageRenderer::default(), &[], None);

        assert!(page.contains(NO_DATA));
        assert!(page.contains("mean no-data"));
        assert!(!page.contains("<tr><td>"));
        assert!(!page.contains("GRADES_TABLE_ROWS"));
        assert!(!page.contains("##MEAN##"));
    }

    #[test]
    fn test_rows_and_mean() {
        let grades = vec![record(7, "Ann", "90"), record(9, "Bob", "80")];
        let page = render(&PageRenderer::default(), &grades, Some(85.0));

        assert!(page.contains("<tr><td>1</td><td>Ann</td>"));
        assert!(page.contains("<tr><td>2</td><td>Bob</td>"));
        assert!(page.contains("name='id' value='7'"));
        assert!(page.contains("name='id' value='9'"));
        assert!(page.contains(">85.0<"));
        assert!(!page.contains(NO_DATA));
    }

    #[test]
    fn test_mean_one_decimal() {
        let renderer = PageRenderer::new("##MEAN##|GRADES_MEAN_CLASS");
        assert_eq!(render(&renderer, &[], Some(83.333)), "83.3|");
        assert_eq!(render(&renderer, &[], None), "No data yet|no-data");
    }

    #[test]
    fn test_html_is_escaped() {
        let renderer = PageRenderer::new("GRADES_TABLE_ROWS");
        let page = render(&renderer, &[record(1, "<script>", "A&B")], None);

        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("A&amp;B"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<p>##MEAN##</p>").unwrap();

        let renderer = PageRenderer::from_file(&path).unwrap();
        assert_eq!(render(&renderer, &[], Some(90.0)), "<p>90.0</p>");
    }

    #[test]
    fn test_not_found_page() {
        let page = PageRenderer::default().not_found();
        assert!(String::from_utf8(page).unwrap().contains("404 Not Found"));
    }
}
