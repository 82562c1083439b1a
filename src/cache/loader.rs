//! Chunk load planning, fetching, and background execution.
//!
//! A load happens in three steps so the tick never blocks on I/O:
//! 1. [`ChunkCache::plan_load`](super::ChunkCache::plan_load) decides which
//!    chunks are missing (synchronous, mutates only LRU order and eviction).
//! 2. [`fetch_chunks`] reads them from the byte source (may block; runs on a
//!    [`LoadExecutor`]).
//! 3. [`ChunkCache::insert_chunks`](super::ChunkCache::insert_chunks) stores
//!    the result, unless the load was cancelled in the meantime.

use crate::model::{ByteRange, LoadError};
use crate::source::{read_cancellable, ByteSource, CancellationSource, CancellationToken};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A fixed-size block of bytes read from the source.
///
/// `index = offset / chunk_size`. The last chunk of a source may be short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk index.
    pub index: u64,
    /// Chunk contents.
    pub bytes: Vec<u8>,
}

/// One chunk to fetch: its index and byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Chunk index.
    pub index: u64,
    /// Bytes covered by the chunk, clamped to the source size.
    pub range: ByteRange,
}

/// Chunks that must be read to make a range resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// The (clamped) range the plan makes resident.
    pub range: ByteRange,
    /// Missing chunks, in ascending index order.
    pub missing: Vec<ChunkSpan>,
}

impl LoadPlan {
    /// Check if nothing needs to be read.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Most readers one load uses at once.
pub const MAX_FETCH_WORKERS: usize = 4;

/// Read every chunk in `plan`, concurrently when there is more than one.
///
/// At most [`MAX_FETCH_WORKERS`] readers (fewer on small machines) claim
/// chunks in order. They stop claiming as soon as `token` fires, so a
/// superseded load only waits for the reads already under way.
///
/// # Errors
///
/// Returns `LoadError::Cancelled` if `token` fires at any point, and
/// `LoadError::SourceRead` for the first failing chunk otherwise.
pub fn fetch_chunks(
    source: &dyn ByteSource,
    plan: &LoadPlan,
    token: &CancellationToken,
) -> Result<Vec<Chunk>, LoadError> {
    if token.is_cancelled() {
        return Err(LoadError::Cancelled);
    }

    let read_one = |span: &ChunkSpan| -> Result<Chunk, LoadError> {
        read_cancellable(source, span.range.start, span.range.end, token)
            .map(|bytes| Chunk {
                index: span.index,
                bytes,
            })
            .map_err(|err| LoadError::from_read(span.range, err))
    };

    let spans = plan.missing.as_slice();
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_FETCH_WORKERS)
        .min(spans.len());

    let results: Vec<Result<Chunk, LoadError>> = if workers <= 1 {
        spans
            .iter()
            .take_while(|_| !token.is_cancelled())
            .map(read_one)
            .collect()
    } else {
        let next = AtomicUsize::new(0);
        let mut claimed: Vec<(usize, Result<Chunk, LoadError>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        while !token.is_cancelled() {
                            let position = next.fetch_add(1, Ordering::Relaxed);
                            let Some(span) = spans.get(position) else {
                                break;
                            };
                            done.push((position, read_one(span)));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        vec![(
                            usize::MAX,
                            Err(LoadError::SourceRead {
                                range: plan.range,
                                source: Arc::new(std::io::Error::other("chunk reader panicked")),
                            }),
                        )]
                    })
                })
                .collect()
        });
        claimed.sort_by_key(|(position, _)| *position);
        claimed.into_iter().map(|(_, result)| result).collect()
    };

    if token.is_cancelled() {
        return Err(LoadError::Cancelled);
    }
    let chunks: Vec<Chunk> = results.into_iter().collect::<Result<_, _>>()?;
    if chunks.len() != spans.len() {
        return Err(LoadError::SourceRead {
            range: plan.range,
            source: Arc::new(std::io::Error::other("chunk reader stopped early")),
        });
    }
    Ok(chunks)
}

/// Outcome of one background load.
#[derive(Debug)]
pub struct LoadResult {
    /// Generation of the request that produced this result.
    pub generation: u64,
    /// Range the load was making resident.
    pub range: ByteRange,
    /// Fetched chunks, or why there are none.
    pub outcome: Result<Vec<Chunk>, LoadError>,
}

/// Work item handed to a [`LoadExecutor`].
pub type LoadJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs load jobs somewhere other than the tick.
///
/// The engine only requires that a job eventually runs; results travel back
/// over a channel that the tick polls.
pub trait LoadExecutor {
    /// Schedule `job`.
    fn execute(&self, job: LoadJob);
}

/// Default number of loader threads in a [`ThreadExecutor`].
pub const DEFAULT_LOADER_THREADS: usize = 2;

/// Runs jobs on a fixed pool of loader threads.
///
/// Jobs queue in submission order. A superseded load still queued when a
/// thread frees up returns at once, because its token has already fired.
/// The threads exit once the executor is dropped and the queue drains.
pub struct ThreadExecutor {
    queue: Sender<LoadJob>,
    threads: usize,
}

impl ThreadExecutor {
    /// Start a pool of `threads` loader threads (at least one).
    pub fn new(threads: usize) -> Self {
        let (queue, receiver) = mpsc::channel::<LoadJob>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut started = 0;
        for n in 0..threads.max(1) {
            let receiver = Arc::clone(&receiver);
            let spawned = std::thread::Builder::new()
                .name(format!("hexview-loader-{n}"))
                .spawn(move || run_jobs(&receiver));
            match spawned {
                Ok(_) => started += 1,
                Err(err) => warn!(error = %err, "Failed to spawn loader thread"),
            }
        }
        debug!(threads = started, "Started loader pool");

        Self {
            queue,
            threads: started,
        }
    }

    /// Number of loader threads running.
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_LOADER_THREADS)
    }
}

impl std::fmt::Debug for ThreadExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadExecutor")
            .field("threads", &self.threads)
            .finish()
    }
}

impl LoadExecutor for ThreadExecutor {
    fn execute(&self, job: LoadJob) {
        if self.threads == 0 || self.queue.send(job).is_err() {
            // The job is dropped with its sender; the poller sees a disconnect.
            warn!("No loader thread available");
        }
    }
}

fn run_jobs(receiver: &Mutex<Receiver<LoadJob>>) {
    loop {
        let next = {
            let Ok(queue) = receiver.lock() else {
                return;
            };
            queue.recv()
        };
        match next {
            Ok(job) => job(),
            Err(_) => return,
        }
    }
}

/// Runs each job immediately on the calling thread.
///
/// Results are still only observed on the next poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl LoadExecutor for InlineExecutor {
    fn execute(&self, job: LoadJob) {
        job();
    }
}

/// Queues jobs until the owner runs them explicitly.
///
/// Clones share one queue, so a test can keep a handle while the viewer owns
/// another and decide exactly when, and in which order, loads complete.
#[derive(Clone, Default)]
pub struct DeferredExecutor {
    jobs: Rc<RefCell<VecDeque<LoadJob>>>,
}

impl DeferredExecutor {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// Run the oldest queued job. Returns `false` if none was queued.
    pub fn run_next(&self) -> bool {
        let job = self.jobs.borrow_mut().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run the newest queued job. Returns `false` if none was queued.
    pub fn run_last(&self) -> bool {
        let job = self.jobs.borrow_mut().pop_back();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run queued jobs until the queue is empty.
    pub fn run_all(&self) {
        while self.run_next() {}
    }
}

impl std::fmt::Debug for DeferredExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredExecutor")
            .field("pending", &self.pending())
            .finish()
    }
}

impl LoadExecutor for DeferredExecutor {
    fn execute(&self, job: LoadJob) {
        self.jobs.borrow_mut().push_back(job);
    }
}

/// Handle to a load that has been scheduled but not yet applied.
#[derive(Debug)]
pub struct PendingLoad {
    generation: u64,
    range: ByteRange,
    cancel: CancellationSource,
    receiver: Receiver<LoadResult>,
}

impl PendingLoad {
    /// Schedule `plan` on `executor`.
    pub fn spawn(
        executor: &dyn LoadExecutor,
        source: Arc<dyn ByteSource>,
        plan: LoadPlan,
        generation: u64,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationSource::new();
        let token = cancel.token();
        let range = plan.range;

        debug!(
            generation,
            start = range.start,
            end = range.end,
            chunks = plan.missing.len(),
            "Scheduling chunk load"
        );

        executor.execute(Box::new(move || {
            let outcome = fetch_chunks(source.as_ref(), &plan, &token);
            // The receiver is gone once the load was superseded.
            let _ = sender.send(LoadResult {
                generation,
                range,
                outcome,
            });
        }));

        Self {
            generation,
            range,
            cancel,
            receiver,
        }
    }

    /// Generation this load was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Range this load makes resident.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Request cancellation. The result, if it still arrives, must be dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Non-blocking check for the result.
    ///
    /// A worker that exits without reporting is surfaced as a source failure
    /// so the viewport does not wait forever on a dead channel.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(LoadResult {
                generation: self.generation,
                range: self.range,
                outcome: Err(LoadError::SourceRead {
                    range: self.range,
                    source: Arc::new(std::io::Error::other(
                        "load worker exited without a result",
                    )),
                }),
            }),
        }
    }
}
