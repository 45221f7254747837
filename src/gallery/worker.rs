//! Background load workers
//!
//! Requests travel over a shared flume queue; each worker pulls the next
//! request, runs the loader and hands the result to the completion handler
//! on its own thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use flume::{Receiver, Sender};
use log::{debug, error, warn};

use super::loader::Loader;
use super::request::{LoadCompletion, LoadError, LoadRequest, LoadResult};

/// Called once per finished request, on the worker thread that ran it
pub type CompletionHandler = Arc<dyn Fn(LoadCompletion) + Send + Sync>;

/// Asynchronous submission interface used by the session.
///
/// `submit` must return immediately. Every `LoadRequest::Load` eventually
/// produces exactly one completion, in no particular order, unless the
/// dispatcher is shut down while the request is still queued.
pub trait Dispatcher {
    fn submit(&self, request: LoadRequest);
}

/// Fixed pool of load threads pulling from one request queue
pub struct WorkerPool {
    request_tx: Sender<LoadRequest>,
    request_rx: Receiver<LoadRequest>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `num_workers` threads (at least one) running `loader`
    pub fn new(num_workers: usize, loader: Arc<dyn Loader>, on_loaded: CompletionHandler) -> Self {
        // flume gives us MPMC: every worker clones the same receiver and the
        // queue fans out to whichever thread is idle.
        let (request_tx, request_rx) = flume::unbounded();

        let handles = (0..num_workers.max(1))
            .filter_map(|n| {
                let rx = request_rx.clone();
                let loader = loader.clone();
                let on_loaded = on_loaded.clone();
                std::thread::Builder::new()
                    .name(format!("gallerat-load-{n}"))
                    .spawn(move || load_worker(loader.as_ref(), &rx, on_loaded.as_ref()))
                    .map_err(|e| error!("Failed to spawn load worker {n}: {e}"))
                    .ok()
            })
            .collect();

        Self {
            request_tx,
            request_rx,
            handles,
        }
    }

    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Discard queued loads, let in-flight loads finish, and stop the workers
    pub fn shutdown(&mut self) {
        let discarded = self
            .request_rx
            .drain()
            .filter(|request| matches!(request, LoadRequest::Load { .. }))
            .count();
        if discarded > 0 {
            debug!("Discarded {discarded} queued loads on shutdown");
        }
        for _ in 0..self.handles.len() {
            let _ = self.request_tx.send(LoadRequest::Shutdown);
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("Load worker exited with a panic");
            }
        }
    }
}

impl Dispatcher for WorkerPool {
    fn submit(&self, request: LoadRequest) {
        if self.request_tx.send(request).is_err() {
            warn!("Load queue closed, request dropped");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker loop: runs until `Shutdown` or until every sender is gone
pub fn load_worker(
    loader: &dyn Loader,
    rx: &Receiver<LoadRequest>,
    on_loaded: &(dyn Fn(LoadCompletion) + Send + Sync),
) {
    while let Ok(request) = rx.recv() {
        match request {
            LoadRequest::Load { pos, path } => {
                debug!("loading {pos} {}", path.display());
                let started = Instant::now();
                let result = run_loader(loader, &path);
                match &result {
                    Ok(picture) => debug!(
                        "loaded {pos} ({}x{}) in {:?}",
                        picture.width,
                        picture.height,
                        started.elapsed()
                    ),
                    Err(e) => warn!("load failed for {pos}: {e}"),
                }
                on_loaded(LoadCompletion { pos, path, result });
            }
            LoadRequest::Shutdown => break,
        }
    }
}

/// Run the loader, turning a panic into a `LoadError`
fn run_loader(loader: &dyn Loader, path: &Path) -> LoadResult {
    panic::catch_unwind(AssertUnwindSafe(|| loader.load(path))).unwrap_or_else(|payload| {
        Err(LoadError::Panicked {
            path: path.to_path_buf(),
            detail: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
