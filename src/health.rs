//! Background API health polling for status indicators.

use crate::api::{DashboardApi, HealthStatus, ServiceStatus};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, Duration, MissedTickBehavior},
};
use tracing::{debug, warn};

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic API health check bound to the lifetime of its owner.
///
/// The first check runs immediately. Dropping the monitor stops polling.
#[derive(Debug)]
pub struct HealthMonitor {
    status: watch::Receiver<HealthStatus>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawns the polling task on the current tokio runtime.
    #[must_use]
    pub fn start(api: DashboardApi, period: Duration) -> Self {
        let (sender, status) = watch::channel(HealthStatus::default());

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let previous = sender.borrow().clone();
                let next = check(&api, &previous).await;
                debug!("API status {}", next.status);

                if sender.send(next).is_err() {
                    // every receiver is gone
                    return;
                }
            }
        });

        Self { status, task }
    }

    /// Last published status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every published status.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A failed check reports `DOWN` and keeps the previous timestamp.
async fn check(api: &DashboardApi, previous: &HealthStatus) -> HealthStatus {
    match api.health_check().await {
        Ok(status) => status,
        Err(err) => {
            warn!("Health check failed: {}", err);
            HealthStatus {
                status: ServiceStatus::Down,
                timestamp: previous.timestamp.clone(),
            }
        }
    }
}
