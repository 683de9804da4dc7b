//! Coalescing redraw requests from the loader thread
//!
//! The loader's progress callback runs on the worker thread and must not
//! touch UI state. It only posts a token into a one-slot channel; the UI
//! thread drains it on its next frame tick. Any number of requests made
//! before the UI looks collapse into one pending redraw.

use crossbeam::channel::{bounded, Receiver, Sender};

/// Receiving side, owned by the UI thread
#[derive(Debug)]
pub struct RedrawSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

/// Sending side, cloned into worker callbacks
#[derive(Debug, Clone)]
pub struct RedrawHandle {
    tx: Sender<()>,
}

impl Default for RedrawSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    pub fn handle(&self) -> RedrawHandle {
        RedrawHandle {
            tx: self.tx.clone(),
        }
    }

    /// Request a redraw from the UI thread itself
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }

    /// Consume the pending request. True when a redraw was requested.
    pub fn take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

impl RedrawHandle {
    /// Never blocks; a full slot means a redraw is already pending.
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let signal = RedrawSignal::new();
        let handle = signal.handle();
        for _ in 0..50 {
            handle.request();
        }
        signal.request();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_request_from_worker_thread() {
        let signal = RedrawSignal::new();
        let handle = signal.handle();
        std::thread::spawn(move || handle.request()).join().unwrap();
        assert!(signal.take());
    }

    #[test]
    fn test_nothing_pending_initially() {
        assert!(!RedrawSignal::new().take());
    }
}
