//! # Pool de Workers
//! src/server/pool.rs
//!
//! Número fijo de threads que consumen una cola FIFO acotada.
//!
//! ## Backpressure
//!
//! Cuando la cola está llena, `submit` aplica la política configurada:
//!
//! - [`BackpressurePolicy::Block`]: el thread que envía espera un hueco
//! - [`BackpressurePolicy::Reject`]: se devuelve el item dentro de [`Rejected`]
//!
//! Ninguna de las dos deja crecer la memoria sin límite.

use clap::ValueEnum;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::error;

/// Qué hace `submit` cuando la cola está llena
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackpressurePolicy {
    /// Esperar a que un worker libere un hueco
    Block,

    /// Devolver el item inmediatamente
    Reject,
}

/// Configuración del pool
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Número de threads
    pub workers: usize,

    /// Máximo de items esperando en la cola (no cuenta los que se ejecutan)
    pub queue_capacity: usize,

    pub policy: BackpressurePolicy,
}

/// Errores del pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("worker queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("worker queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("worker pool is shutting down")]
    ShutDown,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Item que el pool no aceptó, junto con el motivo
#[derive(Debug)]
pub struct Rejected<T> {
    pub item: T,
    pub reason: PoolError,
}

struct QueueState<T> {
    items: VecDeque<T>,
    shutting_down: bool,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    policy: BackpressurePolicy,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que haya un item; `None` cuando el pool cierra y la
    /// cola ya está vacía
    fn next_item(&self) -> Option<T> {
        let mut state = self.lock();

        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.shutting_down {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Pool de threads con cola acotada
pub struct WorkerPool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Arranca `config.workers` threads que ejecutan `handler` por cada item
    pub fn new<F>(config: PoolConfig, handler: F) -> Result<Self, PoolError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        if config.workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        if config.queue_capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let mut pool = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    items: VecDeque::with_capacity(config.queue_capacity),
                    shutting_down: false,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity: config.queue_capacity,
                policy: config.policy,
            }),
            workers: Vec::with_capacity(config.workers),
        };

        let handler = Arc::new(handler);
        for i in 0..config.workers {
            let shared = Arc::clone(&pool.shared);
            let handler = Arc::clone(&handler);

            // Si falla aquí, el Drop de `pool` cierra los workers ya creados
            let handle = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(&shared, &*handler))
                .map_err(PoolError::Spawn)?;
            pool.workers.push(handle);
        }

        Ok(pool)
    }

    fn worker_loop<F: Fn(T)>(shared: &Shared<T>, handler: &F) {
        while let Some(item) = shared.next_item() {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(item))).is_err() {
                error!("handler panicked; worker keeps serving");
            }
        }
    }

    /// Encola un item según la política de backpressure
    pub fn submit(&self, item: T) -> Result<(), Rejected<T>> {
        let shared = &self.shared;
        let mut state = shared.lock();

        loop {
            if state.shutting_down {
                return Err(Rejected {
                    item,
                    reason: PoolError::ShutDown,
                });
            }
            if state.items.len() < shared.capacity {
                break;
            }
            match shared.policy {
                BackpressurePolicy::Reject => {
                    return Err(Rejected {
                        item,
                        reason: PoolError::QueueFull {
                            capacity: shared.capacity,
                        },
                    });
                }
                BackpressurePolicy::Block => {
                    state = shared
                        .not_full
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }

        state.items.push_back(item);
        drop(state);
        shared.not_empty.notify_one();

        Ok(())
    }

    /// Items esperando en la cola
    pub fn queued(&self) -> usize {
        self.shared.lock().items.len()
    }

    /// Número de threads del pool
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Capacidad de la cola
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    /// Los workers terminan lo que quede en la cola y luego se les hace join
    fn drop(&mut self) {
        self.shared.lock().shutting_down = true;
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    fn config(workers: usize, queue_capacity: usize, policy: BackpressurePolicy) -> PoolConfig {
        PoolConfig {
            workers,
            queue_capacity,
            policy,
        }
    }

    /// Handler que avisa cuando empieza y espera una señal para terminar
    fn gated_handler() -> (
        impl Fn(u32) + Send + Sync + 'static,
        mpsc::Receiver<u32>,
        mpsc::Sender<()>,
    ) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let release_rx = Mutex::new(release_rx);

        let handler = move |item: u32| {
            started_tx.lock().unwrap().send(item).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        };
        (handler, started_rx, release_tx)
    }

    // ==================== Construction ====================

    #[test]
    fn test_zero_workers_rejected() {
        let result = WorkerPool::new(config(0, 1, BackpressurePolicy::Block), |_: u32| {});
        assert!(matches!(result, Err(PoolError::NoWorkers)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = WorkerPool::new(config(1, 0, BackpressurePolicy::Block), |_: u32| {});
        assert!(matches!(result, Err(PoolError::ZeroCapacity)));
    }

    // ==================== Execution ====================

    #[test]
    fn test_all_items_processed() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&counter);
            let pool = WorkerPool::new(config(4, 100, BackpressurePolicy::Block), move |n: usize| {
                counter.fetch_add(n, Ordering::SeqCst);
            })
            .unwrap();

            assert_eq!(pool.workers(), 4);
            for _ in 0..50 {
                pool.submit(1).unwrap();
            }
            // Drop drena la cola
        }
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_panicking_handler_does_not_kill_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&counter);
            let pool = WorkerPool::new(config(1, 10, BackpressurePolicy::Block), move |n: u32| {
                if n == 0 {
                    panic!("boom");
                }
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

            pool.submit(0).unwrap();
            pool.submit(1).unwrap();
            pool.submit(2).unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    // ==================== Backpressure ====================

    #[test]
    fn test_reject_when_queue_full() {
        let (handler, started, release) = gated_handler();
        let pool = WorkerPool::new(config(1, 1, BackpressurePolicy::Reject), handler).unwrap();

        // El único worker queda ocupado con el item 1
        pool.submit(1).unwrap();
        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 1);

        // El item 2 ocupa el único hueco de la cola
        pool.submit(2).unwrap();
        assert_eq!(pool.queued(), 1);

        // El item 3 vuelve al llamador
        let rejected = pool.submit(3).unwrap_err();
        assert_eq!(rejected.item, 3);
        assert!(matches!(rejected.reason, PoolError::QueueFull { capacity: 1 }));
        assert_eq!(pool.queued(), 1);

        release.send(()).unwrap();
        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        release.send(()).unwrap();
    }

    #[test]
    fn test_block_waits_for_free_slot() {
        let (handler, started, release) = gated_handler();
        let pool = Arc::new(
            WorkerPool::new(config(1, 1, BackpressurePolicy::Block), handler).unwrap(),
        );

        pool.submit(1).unwrap();
        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        pool.submit(2).unwrap();

        let submitted = Arc::new(AtomicBool::new(false));
        let submitter = {
            let pool = Arc::clone(&pool);
            let submitted = Arc::clone(&submitted);
            thread::spawn(move || {
                pool.submit(3).unwrap();
                submitted.store(true, Ordering::SeqCst);
            })
        };

        // La cola está llena: el tercer submit sigue bloqueado
        thread::sleep(Duration::from_millis(200));
        assert!(!submitted.load(Ordering::SeqCst));

        // Al liberar el item 1, el worker toma el 2 y deja hueco para el 3
        release.send(()).unwrap();
        submitter.join().unwrap();
        assert!(submitted.load(Ordering::SeqCst));

        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        release.send(()).unwrap();
        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), 3);
        release.send(()).unwrap();
    }
}
