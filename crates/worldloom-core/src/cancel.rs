// SPDX-License-Identifier: Apache-2.0
//! Cooperative cancellation handle.

use std::sync::Arc;

use tokio::sync::watch;

/// Clonable cancellation signal threaded through the conversion pipeline.
///
/// The handle is explicitly passed rather than registered process-wide, so
/// a test can inject a pre-triggered handle and observe the pipeline stop
/// at its next stage boundary. Triggering is sticky: once cancelled, a
/// handle stays cancelled.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    /// Create a fresh, untriggered handle.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation to every clone of this handle.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether cancellation has been signalled.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
