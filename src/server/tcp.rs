//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! El accept loop corre en el thread que llama a [`Server::run`] y nunca
//! lee requests: cada conexión aceptada se envía al [`WorkerPool`], donde un
//! worker la atiende de principio a fin con el [`ConnectionHandler`].

use super::connection::ConnectionHandler;
use super::pool::{PoolError, Rejected, WorkerPool};
use crate::config::Config;
use crate::http::{Response, StatusCode};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, info_span, warn};

const OVERLOADED_PAGE: &str =
    "<!DOCTYPE html><html><body><h1>503 Service Unavailable</h1></body></html>";

/// Errores al arrancar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Servidor HTTP/1.1 con pool de workers acotado
pub struct Server {
    listener: TcpListener,
    pool: WorkerPool<TcpStream>,
}

impl Server {
    /// Hace bind de `host:port` y arranca los workers
    pub fn bind(config: &Config, handler: ConnectionHandler) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind(&address)
            .map_err(|source| ServerError::Bind { address, source })?;

        let read_timeout = config.read_timeout();
        let pool = WorkerPool::new(config.pool_config(), move |stream: TcpStream| {
            serve_connection(&handler, stream, read_timeout)
        })?;

        Ok(Self { listener, pool })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones indefinidamente
    pub fn run(&self) {
        if let Ok(address) = self.local_addr() {
            info!(%address, workers = self.pool.workers(), "server listening");
        }
        self.serve(self.listener.incoming());
    }

    /// Accept loop sobre cualquier fuente de conexiones
    ///
    /// Un error de accept se registra y el loop sigue.
    fn serve<I>(&self, incoming: I)
    where
        I: IntoIterator<Item = io::Result<TcpStream>>,
    {
        for stream in incoming {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
    }

    fn dispatch(&self, stream: TcpStream) {
        if let Err(Rejected { item, reason }) = self.pool.submit(stream) {
            warn!(
                peer = %peer_label(&item),
                %reason,
                queued = self.pool.queued(),
                "rejecting connection"
            );
            reject(item);
        }
    }
}

/// Corre dentro de un worker
fn serve_connection(handler: &ConnectionHandler, stream: TcpStream, read_timeout: Option<Duration>) {
    let span = info_span!("connection", peer = %peer_label(&stream));
    let _guard = span.enter();

    if let Err(e) = stream.set_read_timeout(read_timeout) {
        warn!(error = %e, "failed to set read timeout");
    }

    handler.handle(stream);
}

/// 503 sin bloquear el accept loop; si el socket no acepta los bytes, se cierra sin más
fn reject(mut stream: TcpStream) {
    let response = Response::html(
        StatusCode::ServiceUnavailable,
        OVERLOADED_PAGE.as_bytes().to_vec(),
    );

    let result = stream
        .set_nonblocking(true)
        .and_then(|_| response.write_to(&mut stream));
    if let Err(e) = result {
        warn!(error = %e, "failed to send 503");
    }
}

fn peer_label(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
