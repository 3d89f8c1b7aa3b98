//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Un [`ConnectionHandler`] atiende exactamente un intercambio
//! request/response por conexión:
//!
//! ```text
//! ReadingRequest → Routing → Acting → Responding → Closed
//! ```
//!
//! El stream se recibe por valor y se cierra al salir de `handle`, pase lo
//! que pase. Un request malformado cierra la conexión sin escribir nada.
//! Los errores de I/O se registran y nunca llegan al accept loop.

use crate::http::{ParseError, Request, Response, StatusCode};
use crate::render::PageRenderer;
use crate::router::{Action, DeleteRequest, FormData, GradeSubmission, Router};
use crate::store::GradeStore;
use std::io::{self, BufReader, Read, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Destino de todas las redirecciones
const GRADES_PATH: &str = "/grades";

/// Por qué terminó una conexión sin completar el intercambio
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Request line o headers inválidos: se cierra sin respuesta
    #[error("malformed request: {0}")]
    Malformed(ParseError),

    /// Error del socket en lectura o escritura
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
}

impl From<ParseError> for ConnectionError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Io(e) => ConnectionError::Io(e),
            other => ConnectionError::Malformed(other),
        }
    }
}

/// Atiende conexiones usando el store y el renderer compartidos
pub struct ConnectionHandler {
    store: Arc<dyn GradeStore>,
    renderer: PageRenderer,
    router: Router,
}

impl ConnectionHandler {
    pub fn new(store: Arc<dyn GradeStore>, renderer: PageRenderer) -> Self {
        Self {
            store,
            renderer,
            router: Router::grades(),
        }
    }

    /// Atiende una conexión completa y la cierra
    ///
    /// Retorna el status escrito, o `None` si se cerró sin respuesta.
    pub fn handle<S: Read + Write>(&self, mut stream: S) -> Option<StatusCode> {
        match self.exchange(&mut stream) {
            Ok(status) => Some(status),
            Err(ConnectionError::Malformed(e)) => {
                warn!(error = %e, "closing connection without response");
                None
            }
            Err(ConnectionError::Io(e)) => {
                warn!(error = %e, "connection I/O failure");
                None
            }
        }
        // `stream` se libera aquí en todos los caminos
    }

    fn exchange<S: Read + Write>(&self, stream: &mut S) -> Result<StatusCode, ConnectionError> {
        // ReadingRequest
        let request = {
            let mut reader = BufReader::new(&mut *stream);
            Request::read_from(&mut reader)?
        };
        info!(method = request.method(), path = request.path(), "request");

        // Routing
        let action = self.router.route(request.method(), request.path());

        // Acting
        let response = self.act(action, &request);

        // Responding
        response.write_to(stream)?;
        info!(status = %response.status(), "response sent");

        Ok(response.status())
    }

    fn act(&self, action: Action, request: &Request) -> Response {
        match action {
            Action::ShowGrades => self.show_grades(),
            Action::CreateGrade => {
                self.create_grade(request.body());
                Response::redirect(GRADES_PATH)
            }
            Action::DeleteGrade => {
                self.delete_grade(request.body());
                Response::redirect(GRADES_PATH)
            }
            Action::NotFound => Response::html(StatusCode::NotFound, self.renderer.not_found()),
        }
    }

    /// Si el store falla se renderiza con lo que se tenga
    fn show_grades(&self) -> Response {
        let grades = self.store.list().unwrap_or_else(|e| {
            error!(error = %e, "failed to list grades");
            Vec::new()
        });
        let mean = self.store.mean_grade().unwrap_or_else(|e| {
            error!(error = %e, "failed to compute mean grade");
            None
        });

        Response::html(StatusCode::Ok, self.renderer.render_grades(&grades, mean))
    }

    fn create_grade(&self, body: &[u8]) {
        let submission = match GradeSubmission::from_form(&FormData::parse(body)) {
            Ok(submission) => submission,
            Err(e) => {
                debug!(reason = %e, "grade not created");
                return;
            }
        };

        match self.store.insert(&submission.student, &submission.grade) {
            Ok(record) => info!(id = record.id, student = %record.student, "grade created"),
            Err(e) => error!(error = %e, "failed to insert grade"),
        }
    }

    fn delete_grade(&self, body: &[u8]) {
        let DeleteRequest { id } = match DeleteRequest::from_form(&FormData::parse(body)) {
            Ok(request) => request,
            Err(e) => {
                debug!(reason = %e, "grade not deleted");
                return;
            }
        };

        match self.store.delete(id) {
            Ok(true) => info!(id, "grade deleted"),
            Ok(false) => debug!(id, "no grade with that id"),
            Err(e) => error!(error = %e, id, "failed to delete grade"),
        }
    }
}
