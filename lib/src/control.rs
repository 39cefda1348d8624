//! Cancellation and progress reporting for long runs

use crate::error::AcfError;
use crate::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress callback, receives `(done, total)`
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Shared abort request, checked between frames and bands
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancellation flag plus an optional progress sink
#[derive(Clone, Default)]
pub struct Control {
    cancel: CancelFlag,
    progress: Option<Arc<ProgressFn>>,
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Control {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            cancel,
            progress: None,
        }
    }

    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// `Err(Cancelled)` once an abort was requested
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            log::info!("Operation cancelled");
            return Err(AcfError::Cancelled);
        }
        Ok(())
    }

    pub fn report(&self, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
    }
}
