//! # Módulo HTTP
//!
//! Este módulo implementa el subconjunto de HTTP/1.1 que necesita el
//! servidor, sin librerías de alto nivel:
//!
//! - Parsing de requests directamente desde el socket
//! - Construcción de responses y redirecciones
//! - Códigos de estado
//!
//! ## Lo que NO soporta
//!
//! - Keep-alive: una conexión, un request
//! - Chunked transfer encoding
//! - Header folding ni pipelining
//!
//! ### Formato de Request
//!
//! ```text
//! POST /grades HTTP/1.1\r\n
//! Content-Length: 20\r\n
//! \r\n
//! student=Ann&grade=90
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 303 See Other\r\n
//! Location: /grades\r\n
//! \r\n
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
