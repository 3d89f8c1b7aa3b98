//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber` una sola vez al arrancar. `RUST_LOG`
//! tiene prioridad sobre `--log-level`.

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global con el nivel dado como default
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();
}
