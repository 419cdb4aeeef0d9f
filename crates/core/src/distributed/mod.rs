//! Multi-worker engine.
//!
//! Each worker is an OS thread with a private matrix replica and its own
//! rayon pool. Workers talk only through [`comm::Communicator`]:
//!
//! 1. every worker computes full rows for its partition slice;
//! 2. blocks are gathered on the coordinator, counted and checked;
//! 3. barrier;
//! 4. the coordinator broadcasts the assembled matrix to every peer;
//! 5. every worker scans its own rows and the coordinator merges the
//!    discoveries into the retention record.

pub mod broadcast;
pub mod builder;
pub mod comm;
pub mod decide;

use std::thread;

use crate::dataset::Dataset;
use crate::error::{ConfigError, CorrError, Result};
use crate::mask::NameMask;
use crate::matrix::CorrelationMatrix;
use crate::partition::{effective_workers, partition};
use crate::reduce::{check_mask, scan_range};
use crate::retention::{RetentionRecord, SharedRetention};
use crate::threshold::Threshold;

use comm::{Communicator, mesh};

/// Worker count and threads per worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    workers: usize,
    threads: usize,
}

impl Topology {
    pub fn new(workers: usize, threads: usize) -> std::result::Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidTopology(
                "worker count must be at least 1".into(),
            ));
        }
        if threads == 0 {
            return Err(ConfigError::InvalidTopology(
                "thread count must be at least 1".into(),
            ));
        }
        Ok(Self { workers, threads })
    }

    pub fn single() -> Self {
        Self {
            workers: 1,
            threads: 1,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

struct Job<'a> {
    dataset: &'a Dataset,
    threshold: &'a Threshold,
    mask: Option<&'a NameMask>,
    threads: usize,
}

struct WorkerOutput {
    matrix: CorrelationMatrix,
    retention: Option<RetentionRecord>,
}

fn run_worker(job: &Job<'_>, comm: Communicator) -> Result<WorkerOutput> {
    let rank = comm.rank();
    let _span = tracing::debug_span!("worker", rank).entered();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(job.threads)
        .thread_name(move |i| format!("corrsum-w{}-t{}", rank, i))
        .build()
        .map_err(|e| CorrError::ThreadPool(e.to_string()))?;

    let n = job.dataset.variable_count();
    let range = partition(n, comm.size(), rank);
    tracing::debug!(start = range.start, finish = range.finish, "building rows");

    let block = pool.install(|| builder::compute_block(job.dataset, range));
    let mut local = CorrelationMatrix::new(n);
    builder::gather(&comm, &mut local, block)?;

    comm.barrier()?;
    broadcast::broadcast_matrix(&comm, &mut local)?;

    let record = SharedRetention::new(n);
    let found = pool.install(|| scan_range(&local, job.threshold, job.mask, range, &record));
    let retention = decide::merge_discoveries(&comm, record.into_inner(), found)?;

    Ok(WorkerOutput {
        matrix: local,
        retention,
    })
}

/// Picks the error that explains a failed run: a worker's own failure is
/// more useful than the disconnects it caused in its peers.
fn root_cause(errors: Vec<CorrError>) -> Option<CorrError> {
    let mut disconnects = Vec::new();
    for err in errors {
        match err {
            CorrError::PeerDisconnected { .. } => disconnects.push(err),
            other => return Some(other),
        }
    }
    disconnects.into_iter().next()
}

/// Builds the matrix and decides retention across `topology.workers()`
/// workers. Returns the coordinator's matrix and record after checking that
/// every replica matches it.
pub fn run(
    dataset: &Dataset,
    threshold: &Threshold,
    mask: Option<&NameMask>,
    topology: Topology,
) -> Result<(CorrelationMatrix, RetentionRecord)> {
    let n = dataset.variable_count();
    check_mask(mask, n)?;

    let workers = effective_workers(n, topology.workers());
    if workers < topology.workers() {
        tracing::warn!(
            requested = topology.workers(),
            used = workers,
            "more workers than variables, extra workers stay idle"
        );
    }

    let job = Job {
        dataset,
        threshold,
        mask,
        threads: topology.threads(),
    };

    let results: Vec<Result<WorkerOutput>> = thread::scope(|s| {
        let handles: Vec<_> = mesh(workers)
            .into_iter()
            .map(|comm| {
                let job = &job;
                s.spawn(move || run_worker(job, comm))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(worker, h)| {
                h.join()
                    .unwrap_or(Err(CorrError::WorkerPanicked { worker }))
            })
            .collect()
    });

    let mut outputs = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(err) => errors.push(err),
        }
    }
    if let Some(err) = root_cause(errors) {
        return Err(err);
    }

    let mut outputs = outputs.into_iter();
    let coordinator = outputs
        .next()
        .ok_or(CorrError::WorkerPanicked { worker: 0 })?;
    for (i, replica) in outputs.enumerate() {
        if !replica.matrix.same_values(&coordinator.matrix) {
            return Err(CorrError::ReplicaMismatch { worker: i + 1 });
        }
    }
    let retention = coordinator
        .retention
        .ok_or(CorrError::WorkerPanicked { worker: 0 })?;

    tracing::info!(
        workers,
        threads = topology.threads(),
        kept = retention.kept_count(),
        variables = n,
        "distributed reduction finished"
    );
    Ok((coordinator.matrix, retention))
}
