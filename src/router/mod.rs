//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a una [`Action`]. No hace I/O.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Action → ConnectionHandler
//! ```
//!
//! | Método | Path             | Acción        |
//! |--------|------------------|---------------|
//! | GET    | /grades          | ShowGrades    |
//! | POST   | /grades          | CreateGrade   |
//! | POST   | /grades/delete   | DeleteGrade   |
//! | *      | *                | NotFound      |

pub mod form;

pub use form::{DeleteRequest, FormData, FormError, GradeSubmission};

use crate::http::Method;

/// Qué debe hacer el handler con el request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Renderizar la tabla de calificaciones
    ShowGrades,

    /// Insertar una calificación desde el formulario y redirigir
    CreateGrade,

    /// Borrar una calificación por id y redirigir
    DeleteGrade,

    /// Página 404
    NotFound,
}

/// Entrada inmutable de la tabla de rutas
#[derive(Debug, Clone)]
struct Route {
    method: Method,
    path: String,
    action: Action,
}

/// Router que mapea (método, path exacto) a acciones
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Tabla de rutas del libro de calificaciones
    pub fn grades() -> Self {
        let mut router = Self::new();
        router.register(Method::GET, "/grades", Action::ShowGrades);
        router.register(Method::POST, "/grades", Action::CreateGrade);
        router.register(Method::POST, "/grades/delete", Action::DeleteGrade);
        router
    }

    /// Registra una ruta
    ///
    /// # Ejemplo
    /// ```
    /// use grades_server::http::Method;
    /// use grades_server::router::{Action, Router};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/grades", Action::ShowGrades);
    /// assert_eq!(router.route("GET", "/grades"), Action::ShowGrades);
    /// ```
    pub fn register(&mut self, method: Method, path: &str, action: Action) {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            action,
        });
    }

    /// Encuentra la acción para un método y path
    ///
    /// La comparación es exacta: `/grades?x=1` o `/grades/` no coinciden.
    pub fn route(&self, method: &str, path: &str) -> Action {
        self.routes
            .iter()
            .find(|route| route.method.as_str() == method && route.path == path)
            .map(|route| route.action)
            .unwrap_or(Action::NotFound)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
