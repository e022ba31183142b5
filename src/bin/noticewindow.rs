//! Runs a visibility watcher against a property file and logs every
//! transition of the notification between hidden and visible.
//!
//! Usage: `noticewindow <properties.json> [run-secs]`

use env_logger::Env;
use log::{error, info, warn};
use noticewindow_lib::{
    validation::validate_interval, SystemClock, ThreadTicker, VisibilityChange, VisibilityWatcher,
    WindowProperties,
};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        error!("Usage: noticewindow <properties.json> [run-secs]");
        process::exit(2);
    };
    let run_for = match args.next().map(|s| s.parse::<u64>()) {
        None => None,
        Some(Ok(secs)) => Some(Duration::from_secs(secs)),
        Some(Err(e)) => {
            error!("Invalid run-secs: {e}");
            process::exit(2);
        }
    };

    let props = match WindowProperties::load(&path) {
        Ok(props) => props,
        Err(e) => {
            error!("Failed to load {}: {e}", path.display());
            process::exit(1);
        }
    };
    let period = match props.tick_period() {
        Ok(period) => period,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let config = props.to_configuration();
    if let Err(e) = validate_interval(&config.interval) {
        warn!("{e}; the notification will stay hidden");
    }
    if !config.enabled {
        info!("Notification toggle is off");
    }

    let watcher = VisibilityWatcher::start(
        &ThreadTicker::new(),
        SystemClock,
        config,
        period,
        |change: &VisibilityChange| {
            info!(
                "{} at {} (in range: {}, valid interval: {})",
                change.visibility, change.at, change.result.in_range, change.result.interval_valid
            );
        },
    );
    info!("Watching {} every {period:?}", path.display());

    match run_for {
        Some(duration) => thread::sleep(duration),
        None => loop {
            thread::park();
        },
    }

    watcher.stop();
}
