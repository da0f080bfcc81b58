/*
 *  column-send.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	One-shot sender: a rotation file, a display mode or a clock update
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
use log::{debug, info, LevelFilter};
use std::io::Read;
use std::path::PathBuf;

use infocolumn::config::{self, Config, ConnectionArgs};
use infocolumn::logging;
use infocolumn::protocol::{escape_frame, set_clock, set_display_mode, DisplayMode, Rotation};

#[derive(Debug, Parser)]
#[command(name = "column-send", version, about = "Send a rotation or a controller command to the column")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Switch the display mode (takes precedence over a text update)
    #[arg(long, value_name = "MODE")]
    displaymode: Option<i64>,
    /// Set the controller clock to the current local time (takes precedence over a text update)
    #[arg(long)]
    update_rtc: bool,
    /// Rotation JSON to read, stdin when omitted
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,
    /// Also write the resulting control string to this file
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Build the control string but do not send it
    #[arg(long)]
    dry_run: bool,
    /// Enable debug log level
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn read_rotation(file: Option<&PathBuf>, cfg: &Config) -> Result<Rotation> {
    let json = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not open {}", path.display()))?,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json).context("could not read stdin")?;
            json
        }
    };

    let mut rotation = Rotation::from_json(&json)?;
    if rotation.address != cfg.connection.address {
        info!("Using configured address {} instead of {}", cfg.connection.address, rotation.address);
        rotation.address = cfg.connection.address;
    }
    Ok(rotation)
}

fn build_frame(cli: &Cli, cfg: &Config) -> Result<Vec<u8>> {
    let address = cfg.connection.address;
    if let Some(mode) = cli.displaymode {
        let mode = DisplayMode::try_from(mode)?;
        info!("Setting display mode {}", mode);
        return Ok(set_display_mode(address, mode)?);
    }
    if cli.update_rtc {
        let now = Local::now();
        info!("Setting controller clock to {}", now.format("%Y-%m-%d %H:%M:%S"));
        return Ok(set_clock(address, &now)?);
    }

    let rotation = read_rotation(cli.file.as_ref(), cfg)?;
    debug!("{}", rotation.to_json()?);
    Ok(rotation.to_wire()?)
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

    let frame = build_frame(&cli, &cfg)?;
    debug!("{}", escape_frame(&frame));

    if let Some(output) = cli.output.as_ref() {
        std::fs::write(output, &frame).with_context(|| format!("could not write {}", output.display()))?;
        info!("Control string written to {}", output.display());
    }

    if cli.dry_run {
        info!("Dry run, not sending: {}", escape_frame(&frame));
        return Ok(());
    }
    cfg.transport().send(cfg.host()?, &frame).await?;
    Ok(())
}
