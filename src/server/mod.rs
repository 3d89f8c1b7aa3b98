//! # Módulo Server
//! src/server/mod.rs
//!
//! - `tcp`: accept loop y despacho al pool
//! - `pool`: pool de workers con cola acotada
//! - `connection`: ciclo de vida de una conexión

pub mod connection;
pub mod pool;
pub mod tcp;

pub use connection::{ConnectionError, ConnectionHandler};
pub use pool::{BackpressurePolicy, PoolConfig, PoolError, Rejected, WorkerPool};
pub use tcp::{Server, ServerError};
