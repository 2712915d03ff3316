//! Named background loops with explicit cancellation.
//!
//! The gate and the visualizer each run as a [`PeriodicTask`]: a thread that
//! calls its closure, sleeps for whatever is left of the interval, and
//! repeats. A tick always runs to completion before the next one starts, so a
//! loop never overlaps itself.

use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::error::{Result, SessionError};

/// Shared shutdown flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct PeriodicTask {
    name: &'static str,
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Start calling `tick` every `interval` on a thread called `name`.
    ///
    /// The loop ends when the task is cancelled or `tick` returns `Break`.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = CancelToken::new();
        let thread_token = token.clone();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(task = name, "started");
                while !thread_token.is_cancelled() {
                    let started = Instant::now();
                    if tick().is_break() {
                        break;
                    }
                    if let Some(rest) = interval.checked_sub(started.elapsed()) {
                        // Unparked early by cancel()
                        thread::park_timeout(rest);
                    }
                }
                debug!(task = name, "finished");
            })
            .map_err(|source| SessionError::TaskSpawn { name, source })?;

        Ok(Self {
            name,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the loop and wait for the current tick to finish. Idempotent.
    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!(task = self.name, "task panicked");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let mut task = PeriodicTask::spawn("ticker", Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            ControlFlow::Continue(())
        })
        .unwrap();

        while count.load(Ordering::Relaxed) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        task.cancel();
        let after_cancel = count.load(Ordering::Relaxed);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::Relaxed), after_cancel);
        assert!(task.is_finished());
    }

    #[test]
    fn test_break_ends_loop() {
        let mut task = PeriodicTask::spawn("once", Duration::from_millis(1), || {
            ControlFlow::Break(())
        })
        .unwrap();

        for _ in 0..1000 {
            if task.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(task.is_finished());
        task.cancel();
    }

    #[test]
    fn test_cancel_is_prompt_with_long_interval() {
        let mut task = PeriodicTask::spawn("slow", Duration::from_secs(60), || {
            ControlFlow::Continue(())
        })
        .unwrap();

        let started = Instant::now();
        task.cancel();
        task.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
