//! Completion handles for asynchronous executor work
//!
//! The executor uses a submit-then-synchronize model: submitting work returns
//! immediately with an [`Event`], and results must not be trusted until the
//! event has been waited on. Operations that produce host data (copy-back,
//! reductions) return a [`Pending`], which pairs an event with a one-shot
//! value channel.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Condvar, Mutex};

use crate::error::{EscalarError, Result};

#[derive(Debug)]
struct EventState {
    done: bool,
    error: Option<EscalarError>,
}

/// Completion handle for a single submitted task
///
/// Cloneable; all clones observe the same completion. Waiting on an event
/// that already completed returns immediately.
#[derive(Debug, Clone)]
pub struct Event {
    inner: Arc<(Mutex<EventState>, Condvar)>,
}

impl Event {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new((
                Mutex::new(EventState {
                    done: false,
                    error: None,
                }),
                Condvar::new(),
            )),
        }
    }

    /// An event that is already complete (used for no-op submissions).
    pub(crate) fn completed() -> Self {
        let event = Self::new();
        event.complete(None);
        event
    }

    /// Mark the task as finished, recording a worker-side error if any.
    pub(crate) fn complete(&self, error: Option<EscalarError>) {
        let (lock, cond) = &*self.inner;
        let mut state = lock.lock().expect("event mutex poisoned");
        state.done = true;
        state.error = error;
        cond.notify_all();
    }

    /// Non-blocking probe for completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let (lock, _) = &*self.inner;
        lock.lock().expect("event mutex poisoned").done
    }

    /// Block until the task has run on the executor worker.
    ///
    /// # Errors
    ///
    /// Returns the task's own error if it failed, e.g. `UnknownBuffer` when
    /// it referenced an allocation that had already been freed.
    pub fn wait(&self) -> Result<()> {
        let (lock, cond) = &*self.inner;
        let mut state = lock.lock().expect("event mutex poisoned");
        while !state.done {
            state = cond.wait(state).expect("event mutex poisoned");
        }
        match &state.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// An asynchronous result: an [`Event`] plus the value the task produced
///
/// Returned by copy-back and reduction operations. The value is only
/// available after the task ran; [`Pending::wait`] synchronizes and yields it.
#[derive(Debug)]
pub struct Pending<T> {
    event: Event,
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    pub(crate) fn new(event: Event, rx: Receiver<T>) -> Self {
        Self { event, rx }
    }

    /// The completion event, for waiting without consuming the value.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Block until the producing task completed, then return its value.
    ///
    /// # Errors
    ///
    /// Returns the producing task's error if it failed, or `QueueClosed`
    /// if the executor shut down before producing the value.
    pub fn wait(self) -> Result<T> {
        self.event.wait()?;
        self.rx.recv().map_err(|_| EscalarError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn completed_event_waits_immediately() {
        let event = Event::completed();
        assert!(event.is_complete());
        assert!(event.wait().is_ok());
    }

    #[test]
    fn event_error_surfaces_on_wait() {
        let event = Event::new();
        event.complete(Some(EscalarError::UnknownBuffer { id: 7 }));
        assert!(matches!(
            event.wait(),
            Err(EscalarError::UnknownBuffer { id: 7 })
        ));
    }

    #[test]
    fn event_clones_share_completion() {
        let event = Event::new();
        let clone = event.clone();
        assert!(!clone.is_complete());
        event.complete(None);
        assert!(clone.is_complete());
    }

    #[test]
    fn wait_blocks_until_complete() {
        let event = Event::new();
        let waiter = event.clone();
        let handle = std::thread::spawn(move || waiter.wait());
        std::thread::sleep(std::time::Duration::from_millis(10));
        event.complete(None);
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn pending_yields_value_after_completion() {
        let (tx, rx) = mpsc::channel();
        let event = Event::new();
        let pending = Pending::new(event.clone(), rx);
        tx.send(42_usize).unwrap();
        event.complete(None);
        assert_eq!(pending.wait().unwrap(), 42);
    }
}
