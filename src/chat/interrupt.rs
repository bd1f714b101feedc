//! Interrupt handle shared between the Ctrl+C handler and a streaming turn.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A resettable, cloneable interrupt flag that can also be awaited.
///
/// [`trigger`](Interrupt::trigger) is safe to call from a signal-handling thread.  While a turn is
/// streaming the interrupt is armed; a handler uses [`is_armed`](Interrupt::is_armed) to tell
/// "stop this response" apart from "stop the program".
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

/// Keeps an [`Interrupt`] armed until dropped.
#[derive(Debug)]
pub struct Armed<'a> {
    interrupt: &'a Interrupt,
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.interrupt.armed.store(false, Ordering::SeqCst);
    }
}

impl Interrupt {
    /// Creates an untriggered interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes any task waiting in [`triggered`](Interrupt::triggered).
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Clears the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Marks a turn as streaming until the returned guard is dropped.
    pub fn arm(&self) -> Armed<'_> {
        self.armed.store(true, Ordering::SeqCst);
        Armed { interrupt: self }
    }

    /// Returns true while a turn is streaming.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Returns true if triggered since the last reset.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Completes once the interrupt has been triggered.
    ///
    /// ```
    /// # tokio_test::block_on(async {
    /// let interrupt = termchat::chat::Interrupt::new();
    /// interrupt.clone().trigger();
    /// interrupt.triggered().await;
    /// assert!(interrupt.is_triggered());
    /// # });
    /// ```
    pub async fn triggered(&self) {
        loop {
            // Register before checking the flag so a trigger in between is not lost.
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn trigger_and_reset() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.is_triggered());
        interrupt.trigger();
        assert!(interrupt.clone().is_triggered());
        interrupt.reset();
        assert!(!interrupt.is_triggered());
    }

    #[test]
    fn armed_until_guard_dropped() {
        let interrupt = Interrupt::new();
        let handler = interrupt.clone();
        assert!(!handler.is_armed());
        {
            let _armed = interrupt.arm();
            assert!(handler.is_armed());
        }
        assert!(!handler.is_armed());
    }

    #[tokio::test]
    async fn triggered_returns_immediately_when_set() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        tokio::time::timeout(Duration::from_secs(1), interrupt.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn triggered_wakes_from_another_thread() {
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.trigger();
        });
        tokio::time::timeout(Duration::from_secs(5), interrupt.triggered())
            .await
            .unwrap();
    }
}
