//! Fan-out/fan-in of independent cluster lookups.
//!
//! Each lookup runs on its own task and reports exactly once over a dedicated one-shot channel.
//! Callers join the returned [`Pending`] handles in a fixed order, so when several lookups fail
//! the error that surfaces is the first in that order rather than the first to complete.
//!
//! A one-shot send never blocks, so a lookup whose handle was dropped (e.g. because an earlier
//! join already failed) still runs to completion and its task exits without leaking.

use crate::{Error, Result};
use std::future::Future;
use tokio::sync::oneshot;
use tracing::{debug_span, trace, Instrument};

/// The eventual result of a spawned lookup.
#[must_use = "a pending lookup should be joined"]
#[derive(Debug)]
pub struct Pending<T> {
    what: &'static str,
    rx: oneshot::Receiver<Result<T>>,
}

/// Spawns `lookup` on the runtime, returning a handle to its result.
pub fn spawn<T, F>(what: &'static str, lookup: F) -> Pending<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(
        async move {
            let res = lookup.await;
            trace!(ok = res.is_ok(), "Completed");
            // The receiver is gone only if the caller already gave up on this result.
            let _ = tx.send(res);
        }
        .instrument(debug_span!("lookup", %what)),
    );
    Pending { what, rx }
}

// === impl Pending ===

impl<T> Pending<T> {
    /// Waits for the lookup to report its result.
    pub async fn join(self) -> Result<T> {
        match self.rx.await {
            Ok(res) => res,
            Err(_) => Err(Error::Lost(self.what)),
        }
    }
}
