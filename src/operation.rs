//! Long-running operation handle.
//!
//! An [`Operation`] starts from the snapshot returned by the mutating RPC and
//! moves from pending to exactly one terminal state: done with a result, or
//! done with an error. Once terminal the outcome is cached and no further
//! `GetOperation` calls are made.
//!
//! Handles are cheap to clone and may be awaited from several tasks at once;
//! polls are serialized so only one `GetOperation` round-trip is in flight per
//! handle, and observers that queued behind it reuse its answer.

use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::convert::unpack_any;
use crate::error::{ClientError, OperationError, Result};
use crate::proto::longrunning::{self, operation};

/// Fetches the latest snapshot of an operation by name.
pub type OperationFetcher = Arc<
    dyn Fn(longrunning::GetOperationRequest) -> BoxFuture<'static, Result<longrunning::Operation>>
        + Send
        + Sync,
>;

/// Delays between polls and the default wait budget.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingPolicy {
    pub initial_delay: Duration,
    pub multiplier: f32,
    pub max_delay: Duration,
    /// Used by [`Operation::wait_default`].
    pub timeout: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 1.5,
            max_delay: Duration::from_secs(20),
            timeout: Duration::from_secs(900),
        }
    }
}

impl PollingPolicy {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.multiplier)
            .with_max_times(usize::MAX)
    }
}

/// Where an operation stands, as of the last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    DoneResult,
    DoneError,
}

struct Snapshot {
    operation: longrunning::Operation,
    generation: u64,
}

struct Shared {
    name: String,
    fetch: OperationFetcher,
    polling: PollingPolicy,
    snapshot: RwLock<Snapshot>,
    poll_gate: Mutex<()>,
}

/// Handle on a server-side operation yielding `R` and reporting progress as `M`.
pub struct Operation<R, M> {
    shared: Arc<Shared>,
    _types: PhantomData<fn() -> (R, M)>,
}

impl<R, M> Clone for Operation<R, M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _types: PhantomData,
        }
    }
}

impl<R, M> std::fmt::Debug for Operation<R, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .finish()
    }
}

impl<R, M> Operation<R, M> {
    /// Server-assigned operation name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn polling_policy(&self) -> &PollingPolicy {
        &self.shared.polling
    }

    pub fn state(&self) -> OperationState {
        self.read(|op| state_of(op))
    }

    pub fn is_done(&self) -> bool {
        self.state() != OperationState::Pending
    }

    /// The raw snapshot from the last poll.
    pub fn snapshot(&self) -> longrunning::Operation {
        self.read(|op| op.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&longrunning::Operation) -> T) -> T {
        let snapshot = self
            .shared
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&snapshot.operation)
    }

    fn read_generation(&self) -> u64 {
        self.shared
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

impl<R, M> Operation<R, M>
where
    R: prost::Name + Default,
    M: prost::Name + Default,
{
    /// Wrap the snapshot returned by the RPC that started the operation.
    pub fn new(initial: longrunning::Operation, fetch: OperationFetcher) -> Self {
        Self::with_polling(initial, fetch, PollingPolicy::default())
    }

    pub fn with_polling(
        initial: longrunning::Operation,
        fetch: OperationFetcher,
        polling: PollingPolicy,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: initial.name.clone(),
                fetch,
                polling,
                snapshot: RwLock::new(Snapshot {
                    operation: initial,
                    generation: 0,
                }),
                poll_gate: Mutex::new(()),
            }),
            _types: PhantomData,
        }
    }

    /// Progress metadata from the last snapshot, if the server sent any.
    pub fn metadata(&self) -> Option<Result<M>> {
        self.read(|op| op.metadata.as_ref().map(unpack_any::<M>))
    }

    /// Cached terminal outcome. `None` while pending. Never performs I/O.
    pub fn result(&self) -> Option<Result<R>> {
        self.read(|op| outcome_of::<R>(op))
    }

    /// Fetch the current status once, unless already terminal.
    ///
    /// Returns whether the operation is now done. A caller that queued behind
    /// another caller's in-flight poll reuses that poll's snapshot.
    pub async fn poll(&self) -> Result<bool> {
        let seen = self.read_generation();
        if self.is_done() {
            return Ok(true);
        }

        let _gate = self.shared.poll_gate.lock().await;
        if self.read_generation() != seen || self.is_done() {
            return Ok(self.is_done());
        }

        let request = longrunning::GetOperationRequest {
            name: self.shared.name.clone(),
        };
        let fresh = (self.shared.fetch)(request).await?;
        if fresh.name != self.shared.name && !fresh.name.is_empty() {
            return Err(ClientError::InvalidResponse(format!(
                "polled {} but received {}",
                self.shared.name, fresh.name
            )));
        }

        let done = fresh.done;
        {
            let mut snapshot = self
                .shared
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            snapshot.operation = fresh;
            snapshot.generation += 1;
        }
        debug!(operation = %self.shared.name, done, "Polled operation");
        Ok(done)
    }

    /// Poll until terminal or until `timeout` elapses, then return the outcome.
    ///
    /// Timing out yields [`ClientError::WaitTimeout`] and leaves the
    /// server-side operation running.
    pub async fn wait(&self, timeout: Duration) -> Result<R> {
        if let Some(outcome) = self.result() {
            return outcome;
        }

        let deadline = Instant::now() + timeout;
        let mut delays = self.shared.polling.backoff().build();
        loop {
            match tokio::time::timeout_at(deadline, self.poll()).await {
                Ok(Ok(true)) => break,
                Ok(Ok(false)) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(ClientError::WaitTimeout(timeout)),
            }

            let delay = delays.next().unwrap_or(self.shared.polling.max_delay);
            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::WaitTimeout(timeout));
            }
            tokio::time::sleep(delay.min(deadline - now)).await;
        }

        info!(operation = %self.shared.name, state = ?self.state(), "Operation finished");
        self.result().unwrap_or_else(|| {
            Err(ClientError::InvalidResponse(format!(
                "{} reported done without an outcome",
                self.shared.name
            )))
        })
    }

    /// [`wait`](Self::wait) with the polling policy's timeout.
    pub async fn wait_default(&self) -> Result<R> {
        self.wait(self.shared.polling.timeout).await
    }
}

fn state_of(op: &longrunning::Operation) -> OperationState {
    match (op.done, &op.result) {
        (false, _) => OperationState::Pending,
        (true, Some(operation::Result::Error(_))) => OperationState::DoneError,
        (true, _) => OperationState::DoneResult,
    }
}

fn outcome_of<R: prost::Name + Default>(op: &longrunning::Operation) -> Option<Result<R>> {
    if !op.done {
        return None;
    }
    Some(match &op.result {
        Some(operation::Result::Response(any)) => unpack_any::<R>(any),
        Some(operation::Result::Error(status)) => {
            Err(ClientError::Operation(OperationError::from(status.clone())))
        }
        None => Err(ClientError::InvalidResponse(format!(
            "{} reported done without an outcome",
            op.name
        ))),
    })
}
