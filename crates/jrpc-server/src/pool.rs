//! Per-batch worker pool with a single deadline.
//!
//! Each call spawns its own bounded set of named threads. Work that is still
//! running when the deadline passes is abandoned rather than cancelled: the
//! threads are detached and whatever they eventually produce is dropped.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;

use jrpc_protocol::{Outcome, Request, RequestId, RpcError};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::engine::Engine;

type Job = (usize, Request);
type Done = (usize, Option<Outcome>);

/// Execute `requests` on a fresh pool and collect the replies.
///
/// Outcomes come back in completion order. Notifications contribute nothing;
/// requests that miss the deadline become timeout errors.
pub(crate) fn run_concurrent(engine: &Engine, requests: Vec<Request>) -> Vec<Outcome> {
    let config = engine.config();
    let deadline = Instant::now() + config.batch_timeout;
    let ids: Vec<Option<RequestId>> = requests.iter().map(|r| r.id.clone()).collect();

    let (job_tx, job_rx) = mpsc::channel::<Job>();
    let (done_tx, done_rx) = mpsc::channel::<Done>();
    let job_rx = Arc::new(Mutex::new(job_rx));

    let size = config.batch_threads_max.min(requests.len());
    let mut spawned = 0;
    for n in 0..size {
        let worker = Worker {
            engine: engine.clone(),
            jobs: job_rx.clone(),
            done: done_tx.clone(),
        };
        match thread::Builder::new()
            .name(format!("json-rpc-batch-{n}"))
            .spawn(move || worker.run())
        {
            Ok(_) => spawned += 1,
            Err(e) => warn!("Failed to spawn batch worker {n}: {e}"),
        }
    }
    drop(done_tx);

    if spawned == 0 {
        warn!("No batch workers available, executing {} requests inline", requests.len());
        return requests
            .into_iter()
            .filter_map(|req| engine.exec_single(Ok(req)))
            .collect();
    }

    for job in requests.into_iter().enumerate() {
        // Workers only exit once this sender is dropped, so sending cannot fail.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let mut completed = vec![false; ids.len()];
    let mut pending = ids.len();
    let mut res = Vec::with_capacity(ids.len());
    let mut workers_lost = false;

    while pending > 0 {
        let Some(left) = deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
        else {
            break;
        };
        match done_rx.recv_timeout(left) {
            Ok((index, outcome)) => {
                completed[index] = true;
                pending -= 1;
                if let (Some(id), Some(outcome)) = (&ids[index], outcome) {
                    res.push(restamp(outcome, id));
                }
            }
            Err(RecvTimeoutError::Timeout) => break,
            Err(RecvTimeoutError::Disconnected) => {
                workers_lost = true;
                break;
            }
        }
    }

    if pending > 0 {
        if workers_lost {
            warn!("Batch workers exited with {pending} requests unfinished");
        } else {
            warn!("Timeout while batch-executing: {pending} requests still running");
        }
        for (index, id) in ids.into_iter().enumerate() {
            match id {
                Some(id) if !completed[index] => res.push(Outcome::Failure(if workers_lost {
                    RpcError::internal("worker exited before completing the request")
                        .with_id(Some(id))
                } else {
                    RpcError::timeout(Some(id))
                })),
                _ => {}
            }
        }
    }

    res
}

fn restamp(outcome: Outcome, id: &RequestId) -> Outcome {
    match outcome {
        Outcome::Failure(err) => Outcome::Failure(err.with_id(Some(id.clone()))),
        success => success,
    }
}

struct Worker {
    engine: Engine,
    jobs: Arc<Mutex<Receiver<Job>>>,
    done: Sender<Done>,
}

impl Worker {
    fn run(self) {
        loop {
            let job = self.jobs.lock().recv();
            let Ok((index, request)) = job else {
                break;
            };

            let outcome = {
                let _slot = WorkerSlot::acquire(&self.engine);
                self.engine.exec_single(Ok(request))
            };

            if self.done.send((index, outcome)).is_err() {
                debug!("Discarding result of request #{index}: batch already returned");
            }
        }
    }
}

/// Brackets one job with the host's acquire/release hooks.
struct WorkerSlot<'a> {
    engine: &'a Engine,
}

impl<'a> WorkerSlot<'a> {
    fn acquire(engine: &'a Engine) -> Self {
        engine.hooks().acquire_worker();
        engine.busy_counter().fetch_add(1, Ordering::Relaxed);
        Self { engine }
    }
}

impl Drop for WorkerSlot<'_> {
    fn drop(&mut self) {
        self.engine.busy_counter().fetch_sub(1, Ordering::Relaxed);
        self.engine.hooks().release_worker();
    }
}
