/*
 *  main.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	infocolumnd: refreshes the column on a schedule until told to stop
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use anyhow::Context;
use clap::Parser;
use log::{info, warn, LevelFilter};
use tokio::signal::unix::{signal, SignalKind};

use infocolumn::activities::ActivityClient;
use infocolumn::config::{self, ConnectionArgs};
use infocolumn::layout::Layout;
use infocolumn::logging;
use infocolumn::manager::{RefreshManager, RefreshSettings};
use infocolumn::scheduler::{CronSchedule, Orchestrator, SchedulerHandle};
use infocolumn::BUILD_DATE;

/// Host reported in logs when frames are never sent.
const DRY_RUN_HOST: &str = "(dry run)";

#[derive(Debug, Parser)]
#[command(name = "infocolumnd", version, about = "Keeps the information column up to date")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Minutes between updates
    #[arg(long)]
    interval: Option<u32>,
    /// Maximum number of activities to show, negative drops from the end
    #[arg(long, short = 'l', allow_hyphen_values = true)]
    limit: Option<i64>,
    /// Update immediately and exit
    #[arg(long)]
    once: bool,
    /// Build and log frames without contacting the controller
    #[arg(long)]
    dry_run: bool,
    /// Enable debug log level
    #[arg(long, short = 'v')]
    verbose: bool,
    /// Dump fully merged config (after overrides) and exit
    #[arg(long)]
    dump_config: bool,
}

/// Turns process signals into scheduler commands. The task ends once the
/// worker stops accepting them.
fn watch_signals(handle: SchedulerHandle) -> std::io::Result<()> {
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigusr2 = signal(SignalKind::user_defined2())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        loop {
            let accepted = tokio::select! {
                _ = sigusr1.recv() => {
                    info!("SIGUSR1 received. Refreshing now.");
                    handle.refresh_now()
                }
                _ = sigusr2.recv() => handle.toggle_log_level(),
                _ = sigint.recv() => {
                    info!("SIGINT received. Initiating graceful shutdown.");
                    handle.shutdown()
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received. Initiating graceful shutdown.");
                    handle.shutdown()
                }
                _ = sigquit.recv() => {
                    info!("SIGQUIT received. Initiating graceful shutdown.");
                    handle.shutdown()
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received. Initiating graceful shutdown.");
                    handle.shutdown()
                }
            };
            if !accepted {
                break;
            }
        }
    });
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.connection)?;
    if let Some(interval) = cli.interval { cfg.daemon.interval_minutes = interval; }
    if cli.limit.is_some() { cfg.daemon.max_events = cli.limit; }
    config::validate(&cfg)?;

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        cfg.log_level.as_deref().and_then(logging::parse_level).unwrap_or(LevelFilter::Info)
    };
    logging::init(level);

    info!("{} keeps the column talking", env!("CARGO_BIN_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let host = if cli.dry_run {
        cfg.connection.host.clone().unwrap_or_else(|| DRY_RUN_HOST.to_string())
    } else {
        cfg.host()?.to_string()
    };

    let source = ActivityClient::new(&cfg.source.url, cfg.source_timeout())
        .context("could not set up the activity client")?;
    let layout = Layout::new(cfg.display.welcome.clone())?;
    let settings = RefreshSettings {
        host,
        controller_address: cfg.connection.address,
        max_events: cfg.daemon.max_events,
        dry_run: cli.dry_run,
    };
    let mut manager = RefreshManager::new(source, settings)
        .with_transport(cfg.transport())
        .with_layout(layout)
        .with_motd(cfg.motd())
        .with_default_status(cfg.display.default_status.clone());

    if cli.once {
        manager.update().await?;
        return Ok(());
    }

    let schedule = CronSchedule::new(cfg.daemon.interval_minutes, cfg.active_hours());
    let (orchestrator, handle) = Orchestrator::new(manager, schedule);
    watch_signals(handle.clone()).context("could not install signal handlers")?;

    // first update goes out right away, the schedule takes it from there
    handle.refresh_now();
    drop(handle);

    if !cli.verbose {
        warn!("Scheduler started, only warnings are logged from here on (SIGUSR2 toggles debug)");
        log::set_max_level(LevelFilter::Warn);
    }

    orchestrator.run().await;
    Ok(())
}
