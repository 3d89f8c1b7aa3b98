//! # Grades Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 concurrente escrito sobre `std::net` para un libro de
//! calificaciones: listar, agregar y borrar notas, y mostrar el promedio.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses
//! - `router`: Tabla de rutas y decodificación de formularios
//! - `server`: Accept loop, pool de workers y manejo de conexiones
//! - `store`: Almacenamiento de calificaciones (memoria o JSON)
//! - `render`: Plantilla HTML de la página
//! - `config`: Argumentos CLI y variables de entorno
//! - `logging`: Inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use grades_server::config::Config;
//! use grades_server::render::PageRenderer;
//! use grades_server::server::{ConnectionHandler, Server};
//! use grades_server::store::MemoryStore;
//!
//! let handler = ConnectionHandler::new(Arc::new(MemoryStore::new()), PageRenderer::default());
//! let server = Server::bind(&Config::default(), handler).expect("Error al iniciar servidor");
//! server.run();
//! ```

pub mod config;
pub mod http;
pub mod logging;
pub mod render;
pub mod router;
pub mod server;
pub mod store;
