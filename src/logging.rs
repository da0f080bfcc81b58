/*
 *  logging.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
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
use env_logger::Env;
use log::{info, LevelFilter};

/// Installs the process logger. The env_logger filter lets everything up to
/// debug through; `log::max_level` does the actual gating so it can be
/// flipped at runtime.
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .format_timestamp_secs()
        .try_init();
    log::set_max_level(level);
}

/// Maps a config/CLI level name onto a filter. Unknown names give `None`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Debug when not at debug, warn otherwise.
pub fn toggled(current: LevelFilter) -> LevelFilter {
    if current >= LevelFilter::Debug {
        LevelFilter::Warn
    } else {
        LevelFilter::Debug
    }
}

/// Flips the global level between DEBUG and WARN and returns the new one.
pub fn toggle() -> LevelFilter {
    let next = toggled(log::max_level());
    // bump first so the notice itself is not filtered
    log::set_max_level(LevelFilter::Info.max(next));
    info!("Log level set to {}", next);
    log::set_max_level(next);
    next
}
