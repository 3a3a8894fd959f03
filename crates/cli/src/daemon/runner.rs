// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon runner: main loop and drain scheduling.
//!
//! The daemon:
//! 1. Acquires flock for single instance
//! 2. Creates Unix socket for IPC
//! 3. Accepts background sync registrations and drain requests
//! 4. Drains the queue on request and, while registrations are pending,
//!    on every poll tick until the queue is empty

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use courier_core::{DrainReport, Drainer, HttpTransport, QueueStore, ReqwestTransport};
use courier_ipc::{framing_async, DaemonRequest, DaemonResponse, DaemonStatus};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Mutex};

use crate::config::{queue_path, Config};
use crate::error::{Error, Result};

use super::lifecycle::{get_lock_path, get_pid_path, get_socket_path, CLI_VERSION};

/// How long a client gets to send its request.
const IPC_TIMEOUT: Duration = Duration::from_secs(5);

/// What the main loop must do after answering a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Followup {
    None,
    Drain,
    Shutdown,
}

/// State for the daemon that gets passed to IPC handlers.
struct DaemonState {
    store: Arc<QueueStore>,
    background_sync: bool,
    registrations: BTreeSet<String>,
    last_drain: Option<DateTime<Utc>>,
    pid: u32,
    start_time: Instant,
}

impl DaemonState {
    fn new(store: Arc<QueueStore>, background_sync: bool) -> Self {
        DaemonState {
            store,
            background_sync,
            registrations: BTreeSet::new(),
            last_drain: None,
            pid: std::process::id(),
            start_time: Instant::now(),
        }
    }

    fn handle_request(&mut self, request: DaemonRequest) -> (DaemonResponse, Followup) {
        match request {
            DaemonRequest::Ping => (DaemonResponse::Pong, Followup::None),
            DaemonRequest::Hello { version } => {
                if version != CLI_VERSION {
                    tracing::warn!(client = %version, daemon = CLI_VERSION, "client version differs");
                }
                let response = DaemonResponse::Hello {
                    version: CLI_VERSION.to_string(),
                    background_sync: self.background_sync,
                };
                (response, Followup::None)
            }
            DaemonRequest::Status => (DaemonResponse::Status(self.status()), Followup::None),
            DaemonRequest::Shutdown => (DaemonResponse::ShuttingDown, Followup::Shutdown),
            DaemonRequest::RegisterSync { tag } => {
                if !self.background_sync {
                    let message = "background sync is disabled".to_string();
                    return (DaemonResponse::Error { message }, Followup::None);
                }
                tracing::info!(tag = %tag, "background sync registered");
                self.registrations.insert(tag.clone());
                (DaemonResponse::Registered { tag }, Followup::Drain)
            }
            DaemonRequest::Drain => (DaemonResponse::DrainScheduled, Followup::Drain),
        }
    }

    fn status(&self) -> DaemonStatus {
        let mut status = DaemonStatus::new(self.pid, self.start_time.elapsed().as_secs());
        status.background_sync = self.background_sync;
        status.registrations = self.registrations.iter().cloned().collect();
        status.queue_depth = self.store.len().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read queue depth");
            0
        });
        status.last_drain = self.last_drain;
        status
    }

    /// Record a finished pass; registrations are satisfied once the queue is empty.
    fn drain_finished(&mut self, result: std::result::Result<DrainReport, String>) {
        self.last_drain = Some(Utc::now());
        if let Err(e) = result {
            tracing::warn!(error = %e, "drain pass failed");
            return;
        }
        self.settle_registrations();
    }

    fn settle_registrations(&mut self) {
        if self.registrations.is_empty() {
            return;
        }
        match self.store.is_empty() {
            Ok(true) => {
                tracing::info!(tags = ?self.registrations, "background sync complete");
                self.registrations.clear();
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read queue depth"),
        }
    }

    /// Whether a poll tick should start a pass.
    fn wants_poll_drain(&mut self) -> bool {
        self.settle_registrations();
        !self.registrations.is_empty()
    }
}

/// Runs drain passes on background tasks, at most one at a time.
///
/// A request that arrives while a pass is running is remembered and served
/// by one more pass once the current one reports back.
struct DrainScheduler<T: HttpTransport + 'static> {
    drainer: Arc<Drainer<T>>,
    running: Arc<Mutex<()>>,
    rerun: AtomicBool,
    done: mpsc::UnboundedSender<std::result::Result<DrainReport, String>>,
}

impl<T: HttpTransport + 'static> DrainScheduler<T> {
    fn new(
        drainer: Drainer<T>,
        done: mpsc::UnboundedSender<std::result::Result<DrainReport, String>>,
    ) -> Self {
        DrainScheduler {
            drainer: Arc::new(drainer),
            running: Arc::new(Mutex::new(())),
            rerun: AtomicBool::new(false),
            done,
        }
    }

    /// Start a pass, or queue one behind the pass already running.
    fn schedule(&self) -> bool {
        let Ok(guard) = Arc::clone(&self.running).try_lock_owned() else {
            tracing::debug!("drain already running, rerun queued");
            self.rerun.store(true, Ordering::SeqCst);
            return false;
        };
        let drainer = Arc::clone(&self.drainer);
        let done = self.done.clone();
        tokio::spawn(async move {
            let result = drainer.drain().await.map_err(|e| e.to_string());
            drop(guard);
            let _ = done.send(result);
        });
        true
    }

    /// Called once a pass has reported back; starts the queued rerun, if any.
    ///
    /// The finished pass has released its guard before reporting, so the
    /// rerun cannot be coalesced away again.
    fn pass_finished(&self) -> bool {
        if self.rerun.swap(false, Ordering::SeqCst) {
            return self.schedule();
        }
        false
    }

    /// Wait for any running pass to finish.
    async fn wait_idle(&self) {
        let _ = self.running.lock().await;
    }
}

/// Run the daemon for the given state directory.
///
/// This function blocks until shutdown is requested.
pub fn run_daemon(state_dir: &Path, config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(run_daemon_async(state_dir, config))
}

/// Async implementation of the daemon main loop.
async fn run_daemon_async(state_dir: &Path, config: &Config) -> Result<()> {
    fs::create_dir_all(state_dir)?;

    let lock_path = get_lock_path(state_dir);
    let socket_path = get_socket_path(state_dir);
    let pid_path = get_pid_path(state_dir);

    let lock_file = acquire_lock(&lock_path)?;

    let pid = std::process::id();
    fs::write(&pid_path, pid.to_string())?;

    // Clean up any stale socket
    let _ = fs::remove_file(&socket_path);

    let listener = UnixListener::bind(&socket_path)?;

    let store = Arc::new(QueueStore::open(&queue_path(state_dir))?);
    let transport = ReqwestTransport::new(config.delivery.request_timeout())
        .map_err(courier_core::Error::from)?;
    let drainer = Drainer::new(
        Arc::clone(&store),
        transport,
        config.delivery.backoff_policy(),
    )
    .batch_size(config.delivery.batch_size);

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let scheduler = DrainScheduler::new(drainer, done_tx);
    let mut state = DaemonState::new(Arc::clone(&store), config.worker.background_sync);

    // Signal ready only once IPC is answerable
    println!("READY");
    let _ = std::io::stdout().flush();
    tracing::info!(
        socket = %socket_path.display(),
        background_sync = config.worker.background_sync,
        "listening"
    );

    let mut poll = tokio::time::interval(config.worker.poll_interval());
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let stream = match result {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                match handle_ipc_request_async(stream, &mut state).await {
                    Ok(Followup::Drain) => {
                        scheduler.schedule();
                    }
                    Ok(Followup::Shutdown) => {
                        tracing::info!("shutting down");
                        break;
                    }
                    Ok(Followup::None) => {}
                    Err(e) => tracing::warn!(error = %e, "ipc request failed"),
                }
            }

            Some(result) = done_rx.recv() => {
                state.drain_finished(result);
                scheduler.pass_finished();
            }

            _ = poll.tick() => {
                if state.wants_poll_drain() {
                    scheduler.schedule();
                }
            }
        }
    }

    scheduler.wait_idle().await;

    drop(lock_file);
    let _ = fs::remove_file(&socket_path);
    let _ = fs::remove_file(&pid_path);

    Ok(())
}

/// Handle an IPC request from a CLI process (async version).
async fn handle_ipc_request_async(
    mut stream: tokio::net::UnixStream,
    state: &mut DaemonState,
) -> Result<Followup> {
    let request = tokio::time::timeout(IPC_TIMEOUT, framing_async::read_request(&mut stream))
        .await
        .map_err(|_| Error::Daemon("timed out reading request".to_string()))??;

    tracing::debug!(?request, "ipc request");
    let (response, followup) = state.handle_request(request);

    framing_async::write_response(&mut stream, &response).await?;
    Ok(followup)
}

/// Acquire an exclusive lock on the lock file.
fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    // Try to acquire exclusive lock (non-blocking)
    file.try_lock_exclusive()
        .map_err(|e| Error::Daemon(format!("another daemon instance is already running: {}", e)))?;

    Ok(file)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
