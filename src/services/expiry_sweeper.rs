use crate::services::reservation_ledger::ReservationLedger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Background task that periodically returns the seats of expired holds.
pub struct ExpirySweeper {
    ledger: Arc<ReservationLedger>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(ledger: Arc<ReservationLedger>, interval: Duration) -> Self {
        ExpirySweeper { ledger, interval }
    }

    /// Run one pass over every open showing, then drop the tables of started showings.
    pub fn sweep_once(&self) -> usize {
        let expired = self.ledger.expire_due();
        if expired > 0 {
            info!(expired, "Released seats of expired holds");
        } else {
            debug!("No expired holds");
        }

        let evicted = self.ledger.evict_started();
        if evicted > 0 {
            info!(evicted, "Evicted seat tables of started showings");
        }
        expired
    }

    pub async fn run(self) {
        info!("Starting hold expiry sweeper (every {:?})", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await; // Skip the first immediate tick

        loop {
            ticker.tick().await;
            self.sweep_once();
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
