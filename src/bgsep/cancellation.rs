use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Stage};

/// Shared flag polled once per k-means and EM iteration
///
/// Clones share the same flag, so one clone can be handed to the fitting
/// code while another is kept to request cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Returns `Error::Cancelled` when a flag is present and set.
pub(crate) fn check(
    flag: Option<&CancellationFlag>,
    stage: Stage,
    iterations: usize,
) -> Result<(), Error> {
    match flag {
        Some(flag) if flag.is_cancelled() => Err(Error::Cancelled { stage, iterations }),
        _ => Ok(()),
    }
}
