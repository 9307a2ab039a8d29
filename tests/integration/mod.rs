//! Integration tests for the safe-write subsystem

mod cache_paths;
mod fifo_property;
mod write_scenarios;

use safewrite::{CompletionFn, WriteError};
use tokio::sync::mpsc;

/// Callback that reports `(label, result)` on a channel.
pub fn report(
    tx: &mpsc::UnboundedSender<(usize, Result<(), WriteError>)>,
    label: usize,
) -> CompletionFn {
    let tx = tx.clone();
    Box::new(move |result| {
        let _ = tx.send((label, result));
    })
}
