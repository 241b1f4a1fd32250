//! Owns the fleet of per-event pollers.
//!
//! Startup is all-or-nothing: every poller captures its starting cursor
//! before any of them begins polling, so an unreachable ledger aborts the
//! whole listener instead of leaving a partial fleet running. Shutdown is
//! cooperative; the supervisor waits for every poller to finish its
//! in-flight cycle.

use crate::events::{ContractKind, EventKind};
use crate::processors::poller::EventPoller;
use crate::processors::reconciler::Reconciler;
use alloy_primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use supplyline_ledger::{LedgerClient, LedgerError};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Deployed addresses of the four supply-chain contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub retail_store: Address,
    pub distributor: Address,
    pub delivery: Address,
    pub manufacturer: Address,
}

impl ContractAddresses {
    pub fn for_contract(&self, contract: ContractKind) -> Address {
        match contract {
            ContractKind::RetailStore => self.retail_store,
            ContractKind::Distributor => self.distributor,
            ContractKind::Delivery => self.delivery,
            ContractKind::Manufacturer => self.manufacturer,
        }
    }
}

/// Polling configuration for the listener fleet.
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub contracts: ContractAddresses,
    pub default_poll_interval: Duration,
    /// Per-event overrides of the default interval.
    pub poll_intervals: Vec<(EventKind, Duration)>,
}

impl ListenerSettings {
    fn interval_for(&self, kind: EventKind) -> Duration {
        self.poll_intervals
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, interval)| *interval)
            .unwrap_or(self.default_poll_interval)
    }
}

pub struct Supervisor {
    client: Arc<dyn LedgerClient>,
    reconciler: Arc<Reconciler>,
    settings: ListenerSettings,
}

impl Supervisor {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        reconciler: Arc<Reconciler>,
        settings: ListenerSettings,
    ) -> Self {
        Self {
            client,
            reconciler,
            settings,
        }
    }

    /// Start one poller per tracked event and run them until shutdown.
    ///
    /// Returns an error without spawning anything when the ledger cannot be
    /// reached while capturing starting cursors.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<(), LedgerError> {
        let mut pollers = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            let poller = EventPoller::start(
                kind,
                self.settings.contracts.for_contract(kind.contract()),
                self.settings.interval_for(kind),
                self.client.clone(),
                self.reconciler.clone(),
            )
            .await?;
            info!(event = %kind, cursor = poller.cursor(), "poller ready");
            pollers.push(poller);
        }

        let mut workers = JoinSet::new();
        for poller in pollers {
            workers.spawn(poller.run(shutdown_rx.clone()));
        }
        info!(pollers = workers.len(), "event listener running");

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "poller task failed");
            }
        }
        info!("event listener stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryDirectory, MemoryStore, ScriptedLedger};

    const RETAIL: &str = "0x00000000000000000000000000000000000000Aa";

    fn settings() -> ListenerSettings {
        ListenerSettings {
            contracts: ContractAddresses {
                retail_store: Address::repeat_byte(0x11),
                distributor: Address::repeat_byte(0x22),
                delivery: Address::repeat_byte(0x33),
                manufacturer: Address::repeat_byte(0x44),
            },
            default_poll_interval: Duration::from_millis(10),
            poll_intervals: vec![(EventKind::OrderPlaced, Duration::from_millis(5))],
        }
    }

    #[test]
    fn interval_override_applies_per_event() {
        let settings = settings();
        assert_eq!(
            settings.interval_for(EventKind::OrderPlaced),
            Duration::from_millis(5)
        );
        assert_eq!(
            settings.interval_for(EventKind::DeliveryConfirmed),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn each_event_polls_its_own_contract() {
        let settings = settings();
        assert_eq!(
            settings.contracts.for_contract(EventKind::OrderPlaced.contract()),
            Address::repeat_byte(0x11)
        );
        assert_eq!(
            settings
                .contracts
                .for_contract(EventKind::ManufacturerNotified.contract()),
            Address::repeat_byte(0x22)
        );
        assert_eq!(
            settings
                .contracts
                .for_contract(EventKind::DeliveryConfirmed.contract()),
            Address::repeat_byte(0x33)
        );
        assert_eq!(
            settings.contracts.for_contract(EventKind::ProductCreated.contract()),
            Address::repeat_byte(0x44)
        );
    }

    #[tokio::test]
    async fn fleet_starts_and_drains_on_shutdown() {
        let ledger = Arc::new(ScriptedLedger::at_height(50));
        // One starting height per poller.
        for _ in 1..EventKind::ALL.len() {
            ledger.push_height(50);
        }
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryDirectory::standard(RETAIL)),
        ));
        let supervisor = Supervisor::new(ledger, reconciler, settings());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(supervisor.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }
}
