use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const CAPACITY: usize = 16;

/// Signals forwarded from the host window while a quiz is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The page or app was hidden / backgrounded.
    Hidden,
    Visible,
    /// The window lost input focus.
    Blurred,
    Focused,
}

impl HostSignal {
    #[must_use]
    pub fn is_focus_loss(self) -> bool {
        matches!(self, HostSignal::Hidden | HostSignal::Blurred)
    }
}

/// Fan-out point for host signals.
///
/// Sessions subscribe when an attempt becomes active and drop their receiver
/// when it ends, so `observer_count` reflects live attempts only.
#[derive(Clone, Debug)]
pub struct HostEvents {
    tx: broadcast::Sender<HostSignal>,
    focus_losses: Arc<AtomicU64>,
}

impl Default for HostEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CAPACITY);
        Self {
            tx,
            focus_losses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Forward a signal to every active session. Returns how many observed it.
    pub fn emit(&self, signal: HostSignal) -> usize {
        if signal.is_focus_loss() {
            self.focus_losses.fetch_add(1, Ordering::SeqCst);
        }
        self.tx.send(signal).unwrap_or(0)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn subscribe(&self) -> HostSubscription {
        HostSubscription {
            rx: self.tx.subscribe(),
            focus_losses: Arc::clone(&self.focus_losses),
            seen: self.focus_losses.load(Ordering::SeqCst),
        }
    }
}

/// One session's view of the host signals.
///
/// A receiver that falls behind loses the oldest signals. If a focus loss was
/// emitted since subscribing, the lag itself is reported as `Hidden`.
pub(crate) struct HostSubscription {
    rx: broadcast::Receiver<HostSignal>,
    focus_losses: Arc<AtomicU64>,
    seen: u64,
}

impl HostSubscription {
    /// Next signal, or `None` once the host side is gone.
    pub(crate) async fn recv(&mut self) -> Option<HostSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("quiz session missed {skipped} host signals");
                    if self.focus_losses.load(Ordering::SeqCst) > self.seen {
                        return Some(HostSignal::Hidden);
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hidden_and_blurred_count_as_focus_loss() {
        assert!(HostSignal::Hidden.is_focus_loss());
        assert!(HostSignal::Blurred.is_focus_loss());
        assert!(!HostSignal::Visible.is_focus_loss());
        assert!(!HostSignal::Focused.is_focus_loss());
    }

    #[test]
    fn emit_without_observers_reaches_nobody() {
        let host = HostEvents::new();
        assert_eq!(host.emit(HostSignal::Blurred), 0);

        let rx = host.subscribe();
        assert_eq!(host.observer_count(), 1);
        assert_eq!(host.emit(HostSignal::Blurred), 1);
        drop(rx);
        assert_eq!(host.observer_count(), 0);
    }

    #[tokio::test]
    async fn lag_after_a_focus_loss_reports_hidden() {
        let host = HostEvents::new();
        let mut sub = host.subscribe();
        host.emit(HostSignal::Blurred);
        for _ in 0..CAPACITY {
            host.emit(HostSignal::Focused);
        }
        assert_eq!(sub.recv().await, Some(HostSignal::Hidden));
    }

    #[tokio::test]
    async fn lag_without_a_focus_loss_keeps_reading() {
        let host = HostEvents::new();
        host.emit(HostSignal::Hidden);
        let mut sub = host.subscribe();
        for _ in 0..=CAPACITY {
            host.emit(HostSignal::Focused);
        }
        assert_eq!(sub.recv().await, Some(HostSignal::Focused));

        drop(host);
        for _ in 0..CAPACITY - 1 {
            assert_eq!(sub.recv().await, Some(HostSignal::Focused));
        }
        assert_eq!(sub.recv().await, None);
    }
}
