use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// Lifecycle of one asynchronous operation as seen by a view.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AsyncResult<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> AsyncResult<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncResult::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncResult::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncResult::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AsyncResult::Idle => "idle",
            AsyncResult::Loading => "loading",
            AsyncResult::Success(_) => "success",
            AsyncResult::Error(_) => "error",
        }
    }
}

/// Identifies the `start()` that a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Observable holder of one [`AsyncResult`].
///
/// Every transition replaces the whole value and wakes all subscribers. The
/// generation counter is only touched while the channel's value lock is held,
/// so a fenced completion can never interleave with a newer `start()`.
pub struct AsyncState<T> {
    tx: watch::Sender<AsyncResult<T>>,
    generation: AtomicU64,
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncState<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AsyncResult::Idle);
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Moves to Loading from any state and opens a new generation.
    pub fn start(&self) -> RequestTicket {
        let mut ticket = RequestTicket(0);
        self.tx.send_modify(|state| {
            ticket = RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = AsyncResult::Loading;
        });
        ticket
    }

    pub fn resolve(&self, value: T) {
        self.tx.send_replace(AsyncResult::Success(value));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.tx.send_replace(AsyncResult::Error(message.into()));
    }

    /// Returns to Idle. Completions of requests started before the reset are
    /// dropped by the fenced methods.
    pub fn reset(&self) {
        self.tx.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = AsyncResult::Idle;
        });
    }

    /// Applies `value` only if `ticket` is still the current generation.
    pub fn resolve_for(&self, ticket: RequestTicket, value: T) -> bool {
        self.complete_for(ticket, AsyncResult::Success(value))
    }

    pub fn fail_for(&self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        self.complete_for(ticket, AsyncResult::Error(message.into()))
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<AsyncResult<T>> {
        self.tx.subscribe()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn inspect<R>(&self, f: impl FnOnce(&AsyncResult<T>) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Rewrites a Success value in place; other states are left untouched.
    pub fn update_success(&self, f: impl FnOnce(&mut T)) -> bool {
        self.tx.send_if_modified(|state| match state {
            AsyncResult::Success(value) => {
                f(value);
                true
            }
            _ => false,
        })
    }

    fn complete_for(&self, ticket: RequestTicket, outcome: AsyncResult<T>) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            *state = outcome;
            true
        });
        if !applied {
            debug!(
                generation = ticket.0,
                "dropping completion of superseded request"
            );
        }
        applied
    }
}

impl<T: Clone> AsyncState<T> {
    pub fn snapshot(&self) -> AsyncResult<T> {
        self.tx.borrow().clone()
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncState<T> {
    pub fn stream(&self) -> WatchStream<AsyncResult<T>> {
        WatchStream::new(self.tx.subscribe())
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
