//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::config::Config;
use crate::error::Result;
use crate::service::PathStore;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for a parameter service
pub struct Server {
    config: Config,
    store: Arc<PathStore>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address in `config`
    ///
    /// Binding to port 0 picks a free port; see `local_addr`.
    pub fn bind(config: Config, store: Arc<PathStore>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The served store
    pub fn store(&self) -> &Arc<PathStore> {
        &self.store
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Serve until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        let addr = self.local_addr()?;
        let worker_count = self.config.worker_threads.max(1);
        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_pending_connections.max(1));

        let workers: Vec<_> = (0..worker_count)
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<std::io::Result<_>>()?;
        drop(receiver);

        tracing::info!("Listening on {} with {} workers", addr, worker_count);

        let result = self.accept_loop(&sender);

        // Closing the channel lets workers drain and exit
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Worker thread panicked");
            }
        }

        tracing::info!("Server on {} stopped", addr);
        result
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn accept_loop(&self, sender: &Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // Accepted sockets inherit non-blocking mode on some platforms
                    stream.set_nonblocking(false)?;
                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("Connection queue full, dropping {}", peer);
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(
        &self,
        id: usize,
        receiver: Receiver<TcpStream>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let store = Arc::clone(&self.store);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("paramstore-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let mut connection = match Connection::new(stream, Arc::clone(&store)) {
                        Ok(c) => c,
                        Err(e) => {
                            tracing::warn!("Failed to set up connection: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
                        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
                        continue;
                    }
                    if let Err(e) = connection.handle() {
                        tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                    }
                }
            })
    }
}
