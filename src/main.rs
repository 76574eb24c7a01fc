use anyhow::Result;
use log::{error, info, warn};
use crate::initialization::init;
use crate::worker::run;

mod config;
mod errors;
mod geo;
mod initialization;
mod logging;
mod manager_datapoint;
mod manager_emoncms;
mod manager_sun;
mod models;
mod reading;
mod worker;

fn main() -> Result<()> {
    // If initialization fails we can't even log, the error goes to stderr
    let (config, mgr) = init()?;

    // A failed run returns an error so that cron sees a non-zero exit status
    match run(&config, &mgr) {
        Ok(summary) => {
            let failed: usize = summary.reports.iter().map(|r| r.failed).sum();
            info!("run finished, {} metrics from {} sent to {} endpoints",
                summary.metrics, summary.reading.station_name, summary.reports.len());
            if failed > 0 {
                warn!("{} posts failed", failed);
            }
        },
        Err(e) => {
            error!("Run failed: {}", e);
            return Err(e)?;
        }
    }

    Ok(())
}
