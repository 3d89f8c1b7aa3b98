//! # Grades Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración, abre el store, carga la plantilla y corre el
//! accept loop en el thread principal.

use anyhow::{Context, Result};
use grades_server::config::Config;
use grades_server::logging;
use grades_server::render::PageRenderer;
use grades_server::server::{ConnectionHandler, Server};
use grades_server::store::{GradeStore, JsonFileStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let config = Config::new();
    logging::init(&config.log_level);

    config.validate().map_err(anyhow::Error::msg)?;
    config.log_summary();

    let store: Arc<dyn GradeStore> = if config.memory {
        Arc::new(MemoryStore::new())
    } else {
        let store = JsonFileStore::open(&config.storage_path).with_context(|| {
            format!("failed to open grade storage {}", config.storage_path.display())
        })?;
        info!(grades = store.list()?.len(), "grade storage loaded");
        Arc::new(store)
    };

    let renderer = match &config.template {
        Some(path) => PageRenderer::from_file(path)
            .with_context(|| format!("failed to read template {}", path.display()))?,
        None => PageRenderer::default(),
    };

    let handler = ConnectionHandler::new(store, renderer);
    let server = Server::bind(&config, handler).context("failed to start server")?;

    // Bloquea el thread principal
    server.run();

    Ok(())
}
