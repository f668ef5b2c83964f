/// Availability worker
///
/// Runs availability checks off the caller's thread. Requests go in over one
/// crossbeam channel and outcomes come back over another; a small pool of
/// threads shares the request receiver so checks for different fields do not
/// queue behind each other.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::RegistrationApi;
use crate::error::ApiError;
use crate::wizard::availability::{CheckRequest, WatchedField};

/// A finished check
#[derive(Debug)]
pub struct CheckOutcome {
    pub request: CheckRequest,
    pub result: Result<bool, ApiError>,
}

pub struct AvailabilityWorker {
    request_tx: Option<Sender<CheckRequest>>,
    outcome_rx: Receiver<CheckOutcome>,
    handles: Vec<JoinHandle<()>>,
}

impl AvailabilityWorker {
    /// One thread per watched field
    pub const THREADS: usize = WatchedField::ALL.len();

    pub fn spawn(api: Arc<dyn RegistrationApi>) -> std::io::Result<Self> {
        let (request_tx, request_rx) = unbounded::<CheckRequest>();
        let (outcome_tx, outcome_rx) = unbounded::<CheckOutcome>();

        let mut handles = Vec::with_capacity(Self::THREADS);
        for index in 0..Self::THREADS {
            let rx = request_rx.clone();
            let tx = outcome_tx.clone();
            let api = Arc::clone(&api);

            let handle = thread::Builder::new()
                .name(format!("availability-{}", index))
                .spawn(move || {
                    tracing::debug!("Availability worker {} started", index);

                    while let Ok(request) = rx.recv() {
                        let result = api.check_availability(request.field, &request.value);
                        if tx.send(CheckOutcome { request, result }).is_err() {
                            break;
                        }
                    }

                    tracing::debug!("Availability worker {} stopped", index);
                })?;
            handles.push(handle);
        }

        Ok(Self {
            request_tx: Some(request_tx),
            outcome_rx,
            handles,
        })
    }

    /// Queue a check; ignored once the worker is shut down
    pub fn dispatch(&self, request: CheckRequest) {
        if let Some(tx) = &self.request_tx {
            let _ = tx.send(request);
        }
    }

    /// Outcomes that are ready now
    pub fn drain(&self) -> Vec<CheckOutcome> {
        self.outcome_rx.try_iter().collect()
    }

    /// Block for the next outcome, up to `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<CheckOutcome> {
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stop accepting work. Threads are detached rather than joined: one
    /// may still be inside a request, and its late result is stale anyway.
    /// Each thread exits after its current check.
    pub fn shutdown(&mut self) {
        if self.request_tx.take().is_none() {
            return;
        }
        self.handles.clear();
    }

    pub fn is_running(&self) -> bool {
        self.request_tx.is_some()
    }
}

impl Drop for AvailabilityWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
