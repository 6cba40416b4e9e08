/*
 * Schedules the files of one drop event through the `ConversionOrchestrator` and
 * feeds their outcomes to a `BatchAggregator`.
 *
 * Two scheduling models are supported. `Serial` processes files one after another
 * on the calling thread. `Concurrent` spawns one worker thread per file; workers send
 * their outcome over an mpsc channel and the calling thread, as the single consumer,
 * folds them in arrival order. In both models only one batch may be in flight at a
 * time: a drop arriving while another batch is running is rejected with
 * `BatchError::BatchInFlight`.
 *
 * Files of one batch that write the same destination share a `DestinationLocks` entry.
 * They run one after another, and every file after the first is asked whether to
 * overwrite the output the previous one produced.
 */
use super::aggregator::{BatchAggregator, BatchSummary};
use super::models::{ConversionOutcome, OptionFlags};
use super::orchestrator::ConversionOrchestrator;
use super::path_policy::DestinationLocks;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingModel {
    Serial,
    Concurrent,
}

impl FromStr for SchedulingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(SchedulingModel::Serial),
            "concurrent" => Ok(SchedulingModel::Concurrent),
            other => Err(format!("unknown scheduling model '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    BatchInFlight,
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::BatchInFlight => write!(
                f,
                "A previous drop is still being processed; wait for it to finish"
            ),
        }
    }
}

impl std::error::Error for BatchError {}

/*
 * Incremental progress emitted after every file. `outcome` is the file that just
 * finished; `fraction` is the share of the batch accounted for so far.
 */
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub outcome: ConversionOutcome,
    pub fraction: f64,
    pub completed: usize,
    pub total: usize,
}

// Releases the in-flight flag when the batch ends, including on unwind.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct BatchRunner {
    orchestrator: Arc<ConversionOrchestrator>,
    model: SchedulingModel,
    in_flight: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(orchestrator: Arc<ConversionOrchestrator>, model: SchedulingModel) -> Self {
        BatchRunner {
            orchestrator,
            model,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /*
     * Processes one drop event to completion and returns its finalized summary.
     * `on_progress` is called once per file on the calling thread, in the order the
     * outcomes arrive.
     */
    pub fn run(
        &self,
        paths: &[PathBuf],
        flags: OptionFlags,
        on_progress: &mut dyn FnMut(&BatchProgress),
    ) -> Result<BatchSummary, BatchError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            log::warn!(
                "BatchRunner: Rejecting drop of {} file(s), a batch is in flight.",
                paths.len()
            );
            return Err(BatchError::BatchInFlight);
        };
        log::info!(
            "BatchRunner: Starting {:?} batch of {} file(s) with {flags:?}",
            self.model,
            paths.len()
        );

        let mut aggregator = BatchAggregator::new(paths.len());
        let mut record = |outcome: ConversionOutcome| {
            if outcome.skipped() {
                log::debug!("BatchRunner: {:?} skipped by the user.", outcome.source_path);
            }
            let fraction = aggregator.fold(&outcome);
            let summary = aggregator.summary();
            on_progress(&BatchProgress {
                outcome,
                fraction,
                completed: summary.completed_files,
                total: summary.total_files,
            });
        };

        match self.model {
            SchedulingModel::Serial => {
                let locks = DestinationLocks::new();
                for path in paths {
                    record(self.orchestrator.process_file(path, flags, &locks));
                }
            }
            SchedulingModel::Concurrent => {
                let locks = Arc::new(DestinationLocks::new());
                let (tx, rx) = mpsc::channel::<ConversionOutcome>();
                let mut workers = Vec::with_capacity(paths.len());
                for path in paths {
                    let tx = tx.clone();
                    let orchestrator = Arc::clone(&self.orchestrator);
                    let locks = Arc::clone(&locks);
                    let path = path.clone();
                    workers.push(thread::spawn(move || {
                        let outcome = orchestrator.process_file(&path, flags, &locks);
                        if tx.send(outcome).is_err() {
                            log::error!("BatchRunner: Aggregator gone before {path:?} reported.");
                        }
                    }));
                }
                drop(tx);

                // Ends once every worker has sent and dropped its sender.
                for outcome in rx {
                    record(outcome);
                }
                for worker in workers {
                    if worker.join().is_err() {
                        log::error!("BatchRunner: A worker thread panicked.");
                    }
                }
            }
        }

        let summary = aggregator.finalize();
        log::info!(
            "BatchRunner: Batch done, {} processed, {} declined, {} error(s).",
            summary.processed_paths.len(),
            summary.declined_paths.len(),
            summary.error_messages.len()
        );
        Ok(summary)
    }
}
