//! Debounced height/elevation to volume lookups.
//!
//! Typing a water height or elevation fires a lookup only after input has
//! been quiet for [`DEBOUNCE_DELAY`]; each new input restarts the wait.
//! Requests that are already in flight are not cancelled, so every request
//! takes a ticket from a [`SequenceGuard`] and its response is published only
//! if no newer request was issued in the meantime.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::resources::Id;
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// What a lookup converts into a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeTarget {
    /// Channel id; the input is a water height in metres.
    Channel(Id),
    /// Storage facility id; the input is a water surface elevation.
    Storage(Id),
}

/// Anything that can answer a volume lookup.
pub trait VolumeSource: Send + Sync + 'static {
    fn volume(
        &self,
        target: VolumeTarget,
        value: f64,
    ) -> impl Future<Output = Result<f64, ApiError>> + Send;
}

impl VolumeSource for ApiClient {
    async fn volume(&self, target: VolumeTarget, value: f64) -> Result<f64, ApiError> {
        match target {
            VolumeTarget::Channel(id) => self.channel_volume(id, value).await,
            VolumeTarget::Storage(id) => self.storage_volume(id, value).await,
        }
    }
}

/// Monotonic request tickets. Only the most recently issued ticket is current.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    latest: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        SequenceGuard::default()
    }

    /// Take a new ticket, making every earlier one stale.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// The latest applied lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub sequence: u64,
    pub value: f64,
    pub volume: Result<f64, String>,
}

pub struct DebouncedLookup<S: VolumeSource> {
    source: Arc<S>,
    target: VolumeTarget,
    delay: Duration,
    guard: Arc<SequenceGuard>,
    timer: Mutex<Option<JoinHandle<()>>>,
    outcome: Arc<watch::Sender<Option<LookupOutcome>>>,
}

impl<S: VolumeSource> DebouncedLookup<S> {
    pub fn new(source: Arc<S>, target: VolumeTarget) -> Self {
        let (outcome, _) = watch::channel(None);
        DebouncedLookup {
            source,
            target,
            delay: DEBOUNCE_DELAY,
            guard: Arc::new(SequenceGuard::new()),
            timer: Mutex::new(None),
            outcome: Arc::new(outcome),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn target(&self) -> VolumeTarget {
        self.target
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LookupOutcome>> {
        self.outcome.subscribe()
    }

    pub fn latest(&self) -> Option<LookupOutcome> {
        self.outcome.borrow().clone()
    }

    /// Feed a new input value, restarting the debounce wait.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&self, value: f64) {
        let source = self.source.clone();
        let guard = self.guard.clone();
        let outcome = self.outcome.clone();
        let target = self.target;
        let delay = self.delay;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let ticket = guard.issue();
            debug!("Volume lookup #{} for {:?} = {}", ticket, target, value);
            // The request outlives any later restart of the timer.
            tokio::spawn(async move {
                let result = source.volume(target, value).await;
                if !guard.is_current(ticket) {
                    warn!("Discarding stale volume lookup #{} for {}", ticket, value);
                    return;
                }
                outcome.send_replace(Some(LookupOutcome {
                    sequence: ticket,
                    value,
                    volume: result.map_err(|e| e.to_string()),
                }));
            });
        });
        self.replace_timer(Some(timer));
    }

    /// Input was emptied: cancel the pending wait, invalidate in-flight
    /// requests and forget the last volume.
    pub fn clear(&self) {
        self.replace_timer(None);
        self.guard.issue();
        self.outcome.send_replace(None);
    }

    fn replace_timer(&self, timer: Option<JoinHandle<()>>) {
        let mut slot = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = timer;
    }
}

impl<S: VolumeSource> Drop for DebouncedLookup<S> {
    fn drop(&mut self) {
        self.replace_timer(None);
    }
}
