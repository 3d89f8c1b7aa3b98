//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor de calificaciones:
//!
//! - **2xx**: Éxito (200 OK) para la página de calificaciones
//! - **3xx**: Redirección (303 See Other) después de cada POST
//! - **4xx**: Error del cliente (404) para rutas desconocidas
//! - **5xx**: Error del servidor (503) cuando el pool rechaza una conexión

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Página renderizada
    Ok = 200,

    /// 303 See Other - El cliente debe volver a pedir la página con GET
    SeeOther = 303,

    /// 404 Not Found - Ruta o método no registrado
    NotFound = 404,

    /// 503 Service Unavailable - Cola de workers llena
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use grades_server::http::StatusCode;
    /// assert_eq!(StatusCode::SeeOther.as_u16(), 303);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::SeeOther => "See Other",
            StatusCode::NotFound => "Not Found",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
