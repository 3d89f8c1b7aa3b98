//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser HTTP/1.1 escrito a mano que lee directamente del stream.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /grades HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 20\r\n
//! \r\n
//! student=Ann&grade=90
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path VERSION`, separados por un solo espacio
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: separa headers del body
//! 4. **Body**: exactamente `Content-Length` bytes
//!
//! Un `Content-Length` inválido o un body truncado son errores, no se
//! tratan como body vacío.

use std::collections::HashMap;
use std::io::{self, BufRead, Read};
use thiserror::Error;

/// Longitud máxima de una línea (request line o header)
pub const MAX_LINE_BYTES: usize = 8192;

/// Número máximo de headers por request
pub const MAX_HEADERS: usize = 100;

/// Tamaño máximo aceptado para el body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Único header que el servidor inspecciona (se compara respetando mayúsculas)
const CONTENT_LENGTH: &str = "Content-Length";

/// Métodos HTTP que aparecen en la tabla de rutas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// POST - Enviar datos a un recurso
    POST,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método tal como llegó (ej: "GET"); métodos desconocidos no son error
    method: String,

    /// Path de la petición (ej: "/grades")
    path: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Headers HTTP con el nombre tal como llegó; el último repetido gana
    headers: HashMap<String, String>,

    /// Body con longitud exactamente igual a `Content-Length`
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// El peer cerró antes de enviar la request line
    #[error("Empty request")]
    EmptyRequest,

    /// La request line no tiene exactamente METHOD SP PATH SP VERSION
    #[error("Invalid request line: {0:?}")]
    InvalidRequestLine(String),

    /// Header sin ':'
    #[error("Invalid header: {0:?}")]
    InvalidHeader(String),

    /// El stream terminó antes de la línea vacía
    #[error("Connection closed before end of headers")]
    IncompleteHeaders,

    /// Línea que excede `MAX_LINE_BYTES`
    #[error("Line exceeds {} bytes", MAX_LINE_BYTES)]
    LineTooLong,

    /// Más de `MAX_HEADERS` headers
    #[error("More than {} headers", MAX_HEADERS)]
    TooManyHeaders,

    /// Línea que no es UTF-8
    #[error("Request line or header is not valid UTF-8")]
    InvalidEncoding,

    /// `Content-Length` no es un entero no negativo
    #[error("Invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    /// `Content-Length` mayor que `MAX_BODY_BYTES`
    #[error("Body of {length} bytes exceeds limit of {limit}")]
    BodyTooLarge { length: usize, limit: usize },

    /// El peer cerró antes de enviar todo el body
    #[error("Body truncated: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    /// Error del socket mientras se leía
    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

impl Request {
    /// Lee y parsea un request desde un stream con buffer
    ///
    /// Nunca lee más allá del body declarado.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use grades_server::http::Request;
    ///
    /// let raw: &[u8] = b"POST /grades HTTP/1.1\r\nContent-Length: 5\r\n\r\nid=42";
    /// let request = Request::read_from(&mut &raw[..]).unwrap();
    ///
    /// assert_eq!(request.method(), "POST");
    /// assert_eq!(request.path(), "/grades");
    /// assert_eq!(request.body(), b"id=42");
    /// ```
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        // 1. Request line
        let line = read_line(reader)?.ok_or(ParseError::EmptyRequest)?;
        let (method, path, version) = Self::parse_request_line(&line)?;

        // 2. Headers hasta la línea vacía
        let headers = Self::read_headers(reader)?;

        // 3. Body según Content-Length
        let length = Self::content_length(&headers)?;
        let body = Self::read_body(reader, length)?;

        Ok(Request {
            method,
            path,
            version,
            headers,
            body,
        })
    }

    /// Formato: `GET /path HTTP/1.1`, con exactamente un espacio entre tokens
    fn parse_request_line(line: &str) -> Result<(String, String, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        }

        Ok((
            parts[0].to_string(),
            parts[1].to_string(),
            parts[2].to_string(),
        ))
    }

    fn read_headers<R: BufRead>(reader: &mut R) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();
        let mut count = 0;

        loop {
            let line = read_line(reader)?.ok_or(ParseError::IncompleteHeaders)?;
            if line.is_empty() {
                return Ok(headers);
            }

            count += 1;
            if count > MAX_HEADERS {
                return Err(ParseError::TooManyHeaders);
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.clone()))?;
            headers.insert(name.to_string(), value.trim().to_string());
        }
    }

    fn content_length(headers: &HashMap<String, String>) -> Result<usize, ParseError> {
        let Some(raw) = headers.get(CONTENT_LENGTH) else {
            return Ok(0);
        };

        let length: usize = raw
            .parse()
            .map_err(|_| ParseError::InvalidContentLength(raw.clone()))?;

        if length > MAX_BODY_BYTES {
            return Err(ParseError::BodyTooLarge {
                length,
                limit: MAX_BODY_BYTES,
            });
        }

        Ok(length)
    }

    fn read_body<R: BufRead>(reader: &mut R, length: usize) -> Result<Vec<u8>, ParseError> {
        let mut body = Vec::with_capacity(length);
        reader.take(length as u64).read_to_end(&mut body)?;

        if body.len() < length {
            return Err(ParseError::TruncatedBody {
                expected: length,
                received: body.len(),
            });
        }

        Ok(body)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene un header específico (nombre sensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Lee una línea terminada en `\n` y le quita `\r\n`
///
/// Retorna `None` si el stream ya terminó. Una última línea sin `\n`
/// se acepta tal cual.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    // Espacio para el límite más el terminador CRLF
    let read = reader
        .take(MAX_LINE_BYTES as u64 + 2)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > MAX_LINE_BYTES {
        return Err(ParseError::LineTooLong);
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ParseError::InvalidEncoding)
}
