//! Bounded fan-out over many commands with per-item failure capture.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::descriptor::OperationId;
use crate::executor::{CommandHandle, ExecError, WorkerPool};

/// Completed items keyed by item identity.
#[derive(Debug)]
pub struct BatchResult<K, V> {
    pub values: BTreeMap<K, V>,
}

impl<K: Ord, V> BatchResult<K, V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }
}

/// An item identity was pushed twice into one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateItem<K>(pub K);

impl<K: fmt::Debug> fmt::Display for DuplicateItem<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {:?} submitted more than once", self.0)
    }
}

impl<K: fmt::Debug> std::error::Error for DuplicateItem<K> {}

#[derive(Debug)]
pub enum AggregateError<K, V> {
    /// Item identities must be unique; nothing was started.
    DuplicateItem(K),
    /// Every item finished and at least one failed.
    Failures {
        successes: BTreeMap<K, V>,
        failures: BTreeMap<K, ExecError>,
    },
    /// The deadline passed first. Items still running were aborted and are listed in `timed_out`.
    DeadlineExceeded {
        deadline: Duration,
        successes: BTreeMap<K, V>,
        failures: BTreeMap<K, ExecError>,
        timed_out: Vec<K>,
    },
}

impl<K, V> AggregateError<K, V> {
    /// `None` when the batch never started.
    pub fn successes(&self) -> Option<&BTreeMap<K, V>> {
        match self {
            AggregateError::DuplicateItem(_) => None,
            AggregateError::Failures { successes, .. }
            | AggregateError::DeadlineExceeded { successes, .. } => Some(successes),
        }
    }

    pub fn failures(&self) -> Option<&BTreeMap<K, ExecError>> {
        match self {
            AggregateError::DuplicateItem(_) => None,
            AggregateError::Failures { failures, .. }
            | AggregateError::DeadlineExceeded { failures, .. } => Some(failures),
        }
    }
}

impl<K, V> From<DuplicateItem<K>> for AggregateError<K, V> {
    fn from(dup: DuplicateItem<K>) -> Self {
        AggregateError::DuplicateItem(dup.0)
    }
}

impl<K: fmt::Debug, V> fmt::Display for AggregateError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::DuplicateItem(k) => write!(f, "item {k:?} submitted more than once"),
            AggregateError::Failures { successes, failures } => {
                write!(
                    f,
                    "{} of {} items failed:",
                    failures.len(),
                    failures.len() + successes.len()
                )?;
                for (k, e) in failures {
                    write!(f, " [{k:?}: {e}]")?;
                }
                Ok(())
            }
            AggregateError::DeadlineExceeded {
                deadline,
                successes,
                failures,
                timed_out,
            } => write!(
                f,
                "deadline of {deadline:?} exceeded: {} succeeded, {} failed, {} timed out",
                successes.len(),
                failures.len(),
                timed_out.len()
            ),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> std::error::Error for AggregateError<K, V> {}

/// One fan-out invocation: pending commands keyed by item, and the deadline for all of them.
pub struct BatchJob<K, V> {
    deadline: Duration,
    keys: BTreeSet<K>,
    pending: Vec<(K, CommandHandle<V>)>,
}

impl<K, V> BatchJob<K, V>
where
    K: Ord + Clone + fmt::Debug,
{
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            keys: BTreeSet::new(),
            pending: Vec::new(),
        }
    }

    /// A rejected duplicate's handle is dropped, which cancels its command.
    pub fn push(&mut self, key: K, handle: CommandHandle<V>) -> Result<(), DuplicateItem<K>> {
        if !self.keys.insert(key.clone()) {
            return Err(DuplicateItem(key));
        }
        self.pending.push((key, handle));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Collects results in completion order. Never waits longer than the deadline.
    pub async fn wait(self) -> Result<BatchResult<K, V>, AggregateError<K, V>> {
        let deadline = self.deadline;
        let mut aborts: BTreeMap<K, AbortHandle> = BTreeMap::new();
        let mut running = FuturesUnordered::new();
        for (key, handle) in self.pending {
            aborts.insert(key.clone(), handle.abort_handle());
            running.push(async move { (key, handle.await) });
        }

        let mut successes = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let expired = tokio::time::sleep(deadline);
        tokio::pin!(expired);

        loop {
            tokio::select! {
                next = running.next() => match next {
                    Some((key, Ok(v))) => {
                        debug!(item = ?key, "batch item succeeded");
                        aborts.remove(&key);
                        successes.insert(key, v);
                    }
                    Some((key, Err(e))) => {
                        debug!(item = ?key, error = %e, "batch item failed");
                        aborts.remove(&key);
                        failures.insert(key, e);
                    }
                    None => break,
                },
                _ = &mut expired => {
                    let timed_out: Vec<K> = aborts.keys().cloned().collect();
                    for handle in aborts.values() {
                        handle.abort();
                    }
                    warn!(
                        ?deadline,
                        succeeded = successes.len(),
                        failed = failures.len(),
                        timed_out = timed_out.len(),
                        "batch deadline exceeded"
                    );
                    return Err(AggregateError::DeadlineExceeded {
                        deadline,
                        successes,
                        failures,
                        timed_out,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(BatchResult { values: successes })
        } else {
            warn!(
                succeeded = successes.len(),
                failed = failures.len(),
                "batch completed with failures"
            );
            Err(AggregateError::Failures {
                successes,
                failures,
            })
        }
    }
}

/// Runs `op(item)` for every item on `pool`'s runtime and waits for all of them, up to
/// `deadline`.
///
/// The per-item futures do not take pool permits: the commands they submit do, so an `op`
/// that submits on the same pool cannot starve itself. Item identities must be unique.
/// A failing item never affects its siblings; all failures are reported together.
pub async fn run_all<I, K, V, F, Fut>(
    items: I,
    op: F,
    pool: &WorkerPool,
    deadline: Duration,
) -> Result<BatchResult<K, V>, AggregateError<K, V>>
where
    I: IntoIterator<Item = K>,
    K: Ord + Clone + fmt::Debug,
    V: Send + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<V, ExecError>> + Send + 'static,
{
    let items: Vec<K> = items.into_iter().collect();
    {
        let mut seen = BTreeSet::new();
        if let Some(dup) = items.iter().find(|k| !seen.insert(*k)) {
            warn!(item = ?dup, "duplicate batch item rejected");
            return Err(AggregateError::DuplicateItem(dup.clone()));
        }
    }

    let batch_id = OperationId::from("fan-out");
    let mut job = BatchJob::new(deadline);
    for item in items {
        let task = pool.spawn_unmetered(op(item.clone()));
        let handle = CommandHandle::new(batch_id.clone(), task);
        job.push(item, handle)?;
    }
    debug!(items = job.len(), ?deadline, "batch submitted");
    job.wait().await
}
