use std::fmt::Debug;

use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavigationIntent<D> {
    #[default]
    Idle,
    Navigate(D),
}

impl<D> NavigationIntent<D> {
    pub fn destination(&self) -> Option<&D> {
        match self {
            NavigationIntent::Navigate(destination) => Some(destination),
            NavigationIntent::Idle => None,
        }
    }
}

/// Single-slot, consume-once navigation channel.
///
/// A pending intent stays in the slot until a view takes it; taking resets the
/// slot to Idle, so late or repeated subscribers never see it again.
pub struct NavigationSlot<D> {
    tx: watch::Sender<NavigationIntent<D>>,
}

impl<D> Default for NavigationSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> NavigationSlot<D> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(NavigationIntent::Idle);
        Self { tx }
    }

    pub fn take(&self) -> Option<D> {
        let mut taken = None;
        self.tx.send_if_modified(|intent| {
            match std::mem::replace(intent, NavigationIntent::Idle) {
                NavigationIntent::Navigate(destination) => {
                    taken = Some(destination);
                    true
                }
                NavigationIntent::Idle => false,
            }
        });
        taken
    }

    /// Drops any pending intent without acting on it.
    pub fn acknowledge(&self) {
        let _ = self.take();
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.tx.borrow(), NavigationIntent::Navigate(_))
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationIntent<D>> {
        self.tx.subscribe()
    }

    /// Waits until an intent is pending and takes it.
    pub async fn next(&self) -> Option<D> {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(destination) = self.take() {
                return Some(destination);
            }
            rx.changed().await.ok()?;
        }
    }
}

impl<D: Debug> NavigationSlot<D> {
    pub fn emit(&self, destination: D) {
        info!(?destination, "navigation intent emitted");
        self.tx.send_replace(NavigationIntent::Navigate(destination));
    }
}

impl<D: Clone> NavigationSlot<D> {
    pub fn peek(&self) -> NavigationIntent<D> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
