//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./grades_server --port 8080 \
//!   --workers 50 \
//!   --queue-capacity 1000 \
//!   --backpressure reject
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 GRADES_STORAGE=/var/lib/grades.json ./grades_server
//! ```

use crate::server::{BackpressurePolicy, PoolConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Puerto por defecto
pub const DEFAULT_PORT: u16 = 8080;

/// Tamaño por defecto del pool de workers
pub const DEFAULT_POOL_SIZE: usize = 50;

/// Capacidad por defecto de la cola de conexiones pendientes
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Configuración del servidor de calificaciones
#[derive(Debug, Clone, Parser)]
#[command(name = "grades_server")]
#[command(about = "Servidor HTTP/1.1 concurrente para un libro de calificaciones")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Workers ===

    /// Número de threads que atienden conexiones
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE, env = "WORKERS")]
    pub workers: usize,

    /// Máximo de conexiones aceptadas esperando un worker
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY, env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Qué hacer cuando la cola está llena: esperar (block) o responder 503 (reject)
    #[arg(long, value_enum, default_value_t = BackpressurePolicy::Block, env = "BACKPRESSURE")]
    pub backpressure: BackpressurePolicy,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value_t = 0, env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Storage ===

    /// Archivo JSON donde se guardan las calificaciones
    #[arg(long = "storage", default_value = "./data/grades.json", env = "GRADES_STORAGE")]
    pub storage_path: PathBuf,

    /// Guardar solo en memoria (se pierde al reiniciar)
    #[arg(long, env = "GRADES_MEMORY")]
    pub memory: bool,

    /// Plantilla HTML alternativa para la página de calificaciones
    #[arg(long, env = "GRADES_TEMPLATE")]
    pub template: Option<PathBuf>,

    // === Logging ===

    /// Nivel de log cuando RUST_LOG no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use grades_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parámetros del pool de workers
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            policy: self.backpressure,
        }
    }

    /// Timeout de lectura, `None` si está deshabilitado
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(address = %self.address(), "network");
        info!(
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            backpressure = ?self.backpressure,
            read_timeout_ms = self.read_timeout_ms,
            "worker pool"
        );
        if self.memory {
            info!("storage: in memory");
        } else {
            info!(path = %self.storage_path.display(), "storage: json file");
        }
        match &self.template {
            Some(path) => info!(path = %path.display(), "template: custom"),
            None => info!("template: built-in"),
        }
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            workers: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backpressure: BackpressurePolicy::Block,
            read_timeout_ms: 0,
            storage_path: PathBuf::from("./data/grades.json"),
            memory: false,
            template: None,
            log_level: "info".to_string(),
        }
    }
}
