//! FIFO lock serializing the preparation critical section.
//!
//! Ownership passes straight from the releasing holder to the oldest waiter,
//! so a new caller can never slip in between a release and the next grant.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct LockState {
    held: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Mutual exclusion with first-come, first-served hand-off.
#[derive(Debug, Default)]
pub struct PrepareLock {
    state: Mutex<LockState>,
}

impl PrepareLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the caller owns the lock.
    ///
    /// Waiters are granted the lock in the order they called `acquire`.
    /// Dropping the returned future before it completes gives up the place in
    /// the queue, and passes the lock on if it had already been granted.
    pub async fn acquire(&self) -> PrepareLockGuard<'_> {
        loop {
            let rx = {
                let mut state = self.state();
                if !state.held {
                    state.held = true;
                    return PrepareLockGuard::new(self);
                }
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                rx
            };

            let mut pending = PendingAcquire {
                lock: self,
                rx: Some(rx),
            };
            if pending.granted().await {
                return PrepareLockGuard::new(self);
            }
        }
    }

    /// Returns true while some caller owns the lock.
    pub fn is_locked(&self) -> bool {
        self.state().held
    }

    /// Number of queued waiters, including any that gave up but have not been
    /// skipped yet.
    pub fn queued(&self) -> usize {
        self.state().waiters.len()
    }

    /// Passes ownership to the oldest live waiter, or frees the lock.
    fn hand_off(&self) {
        let mut state = self.state();
        while let Some(waiter) = state.waiters.pop_front() {
            if waiter.send(()).is_ok() {
                return;
            }
        }
        state.held = false;
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A queued `acquire` call that has not been granted yet.
struct PendingAcquire<'a> {
    lock: &'a PrepareLock,
    rx: Option<oneshot::Receiver<()>>,
}

impl PendingAcquire<'_> {
    async fn granted(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        let granted = rx.await.is_ok();
        self.rx = None;
        granted
    }
}

impl Drop for PendingAcquire<'_> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            // Granted after the caller stopped waiting.
            if rx.try_recv().is_ok() {
                self.lock.hand_off();
            }
        }
    }
}

/// Proof of lock ownership. The lock is released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct PrepareLockGuard<'a> {
    lock: &'a PrepareLock,
    released: bool,
}

impl<'a> PrepareLockGuard<'a> {
    fn new(lock: &'a PrepareLock) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Releases the lock now. Calling it again has no effect.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.lock.hand_off();
        }
    }
}

impl Drop for PrepareLockGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
