/*
 *  column-get.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Fetches activities once and prints the rotation that would be sent
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
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;

use infocolumn::activities::{ActivityClient, ActivitySource};
use infocolumn::config::{self, ConnectionArgs};
use infocolumn::layout::{apply_limit, Layout};
use infocolumn::logging;
use infocolumn::manager::resolve_status;

#[derive(Debug, Parser)]
#[command(name = "column-get", version, about = "Print the rotation built from the current activities")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Maximum number of activities to show, negative drops from the end
    #[arg(long, short = 'l', allow_hyphen_values = true)]
    limit: Option<i64>,
    /// Write the rotation JSON to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.connection)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        cfg.log_level.as_deref().and_then(logging::parse_level).unwrap_or(LevelFilter::Info)
    };
    logging::init(level);

    let client = ActivityClient::new(&cfg.source.url, cfg.source_timeout())
        .context("could not set up the activity client")?;
    let (activities, error) = match client.fetch().await {
        Ok(activities) => (activities, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    let status = resolve_status(error, activities.is_empty(), None, &cfg.display.default_status);

    let limit = cli.limit.or(cfg.daemon.max_events);
    let layout = Layout::new(cfg.display.welcome.clone())?;
    let rotation = layout.build(
        cfg.connection.address,
        apply_limit(&activities, limit),
        &status,
        Local::now().naive_local(),
    )?;
    let json = rotation.to_json_pretty()?;

    match cli.output.as_ref() {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("could not write {}", path.display()))?;
            info!("Rotation written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
