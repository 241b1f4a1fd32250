//! Per-event polling loop against the ledger.
//!
//! One poller runs per tracked event kind. Each owns a monotonically
//! advancing last-seen-block cursor, initialized to the chain height at
//! startup, and on a fixed interval queries the range above the cursor and
//! hands every returned log to the reconciler in order.
//!
//! The cursor only advances after a batch has been walked; a failed fetch
//! leaves it unchanged so the same range is retried next cycle, never
//! skipped. Decode and handle failures are per-log: they are logged with
//! identifying detail and the batch continues, so one malformed event can
//! neither block the cursor nor kill the worker.

use crate::events::{EventKind, decode};
use crate::processors::reconciler::Reconciler;
use std::sync::Arc;
use std::time::Duration;
use supplyline_ledger::{LedgerClient, LedgerError, LogFilter};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct EventPoller {
    kind: EventKind,
    contract: alloy_primitives::Address,
    interval: Duration,
    cursor: u64,
    client: Arc<dyn LedgerClient>,
    reconciler: Arc<Reconciler>,
}

impl EventPoller {
    /// Build a poller with its cursor set to the current chain height.
    ///
    /// An unreachable ledger here is fatal: the caller is still starting up
    /// and must not begin with an unknown cursor.
    pub async fn start(
        kind: EventKind,
        contract: alloy_primitives::Address,
        interval: Duration,
        client: Arc<dyn LedgerClient>,
        reconciler: Arc<Reconciler>,
    ) -> Result<Self, LedgerError> {
        let cursor = client.block_number().await?;
        Ok(Self {
            kind,
            contract,
            interval,
            cursor,
            client,
            reconciler,
        })
    }

    /// Run until the shutdown signal flips. The in-flight cycle always
    /// completes; the signal is only observed between cycles.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(event = %self.kind, cursor = self.cursor, "event poller started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // A closed channel means the process is going away too.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!(event = %self.kind, "event poller shutting down");
                        break;
                    }
                }

                _ = tokio::time::sleep(self.interval) => {
                    if let Err(e) = self.poll_cycle().await {
                        warn!(
                            event = %self.kind,
                            cursor = self.cursor,
                            error = %e,
                            "ledger unavailable, retrying same range next cycle"
                        );
                    }
                }
            }
        }

        info!(event = %self.kind, "event poller shutdown complete");
    }

    /// One poll cycle. Returns the number of events applied.
    ///
    /// Fails only when the ledger itself is unreachable; in that case the
    /// cursor is untouched.
    pub async fn poll_cycle(&mut self) -> Result<u32, LedgerError> {
        let tip = self.client.block_number().await?;
        if tip <= self.cursor {
            debug!(event = %self.kind, cursor = self.cursor, "no new blocks");
            return Ok(0);
        }
        // The range is bounded to the height snapshot: anything mined after
        // it belongs to the next cycle, so no block is ever queried twice.
        let filter = LogFilter {
            from_block: self.cursor + 1,
            to_block: Some(tip),
            address: self.contract,
            topic0: self.kind.topic(),
        };
        let logs = self.client.get_logs(&filter).await?;

        let mut applied = 0u32;
        for log in &logs {
            match decode(log, self.kind) {
                Ok(event) => match self.reconciler.apply(&event).await {
                    Ok(()) => {
                        applied += 1;
                    }
                    Err(e) => warn!(
                        event = %self.kind,
                        order_id = event.order_id(),
                        block = log.block_number,
                        error = %e,
                        "event skipped"
                    ),
                },
                Err(e) => warn!(
                    event = %self.kind,
                    block = log.block_number,
                    error = %e,
                    "malformed log skipped"
                ),
            }
        }

        // Advance past the queried range and past any block the node
        // returned beyond it; never move backwards.
        let batch_max = logs.iter().map(|log| log.block_number).max();
        self.cursor = self.cursor.max(tip).max(batch_max.unwrap_or(0));
        debug!(event = %self.kind, cursor = self.cursor, applied, "poll cycle complete");
        Ok(applied)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}
