use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

struct TimerState {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Flags one row at a time and clears it after a fixed TTL.
///
/// Setting a new id cancels the previous timer. Only the timer belonging to
/// the latest `set` may clear, so each settle produces exactly one clear.
/// `set` spawns onto the current tokio runtime.
pub struct Highlighter<Id> {
    ttl: Duration,
    state: Arc<Mutex<TimerState>>,
    current: Arc<watch::Sender<Option<Id>>>,
    clears: Arc<AtomicU64>,
}

impl<Id> Highlighter<Id>
where
    Id: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            ttl,
            state: Arc::new(Mutex::new(TimerState {
                generation: 0,
                timer: None,
            })),
            current: Arc::new(current),
            clears: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> Option<Id> {
        self.current.borrow().clone()
    }

    /// Receives every change, including the clear at expiry.
    pub fn subscribe(&self) -> watch::Receiver<Option<Id>> {
        self.current.subscribe()
    }

    /// Number of highlights that expired or were cleared explicitly.
    pub fn clear_count(&self) -> u64 {
        self.clears.load(Ordering::Acquire)
    }

    pub fn set(&self, id: Id) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        let generation = state.generation;
        if let Some(previous) = state.timer.take() {
            previous.abort();
        }
        self.current.send_replace(Some(id));

        let ttl = self.ttl;
        let timer_state = Arc::clone(&self.state);
        let current = Arc::clone(&self.current);
        let clears = Arc::clone(&self.clears);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = timer_state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation != generation {
                return;
            }
            state.timer = None;
            current.send_replace(None);
            clears.fetch_add(1, Ordering::AcqRel);
            trace!(generation, "highlight expired");
        }));
    }

    /// Clears immediately and cancels the pending timer.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if self.current.send_replace(None).is_some() {
            self.clears.fetch_add(1, Ordering::AcqRel);
        }
    }
}

impl<Id> Drop for Highlighter<Id> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}
