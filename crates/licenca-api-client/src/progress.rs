//! Synthesized transfer progress
//!
//! The object store does not report how many bytes it has received, so the
//! percentage is an approximation for display: it climbs by
//! [`PROGRESS_STEP`] every tick, holds at [`PROGRESS_CAP`] until the transfer
//! resolves, then jumps to 100 on success or drops to 0 on failure. It says
//! nothing about throughput.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// Drive `transfer` to completion while publishing synthesized progress.
pub async fn with_synthesized_progress<F, T, E>(
    progress: &watch::Sender<u8>,
    tick: Duration,
    transfer: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    progress.send_replace(0);

    let mut interval = tokio::time::interval(tick);
    // first tick completes immediately
    interval.tick().await;

    tokio::pin!(transfer);
    let result = loop {
        tokio::select! {
            result = &mut transfer => break result,
            _ = interval.tick() => {
                progress.send_if_modified(|p| {
                    let next = p.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                    let changed = next != *p;
                    *p = next;
                    changed
                });
            }
        }
    };

    progress.send_replace(if result.is_ok() { 100 } else { 0 });
    result
}
