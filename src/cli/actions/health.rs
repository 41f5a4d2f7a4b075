use crate::{
    api::ServiceStatus,
    cli::{actions::print_json, globals::GlobalArgs},
    health::HealthMonitor,
};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct Args {
    pub watch: bool,
    pub interval: Duration,
}

/// Check the API once, or keep polling until interrupted with `--watch`.
///
/// # Errors
/// Returns an error if a single check finds the API down.
#[instrument(skip_all)]
pub async fn execute(args: Args, globals: &GlobalArgs) -> Result<()> {
    let api = globals.api()?;

    if !args.watch {
        let status = api.health_check().await?;
        print_json(&status)?;
        return match status.status {
            ServiceStatus::Up => Ok(()),
            ServiceStatus::Down => Err(anyhow!("API is down")),
        };
    }

    let monitor = HealthMonitor::start(api, args.interval);
    let mut updates = monitor.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                print_json(&status)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted, stopping health monitor");
                break;
            }
        }
    }

    monitor.stop();
    Ok(())
}
