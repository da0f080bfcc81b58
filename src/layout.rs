/*
 *  layout.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Arranges the status line and upcoming activities into pages
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
use chrono::NaiveDateTime;
use log::warn;

use crate::activities::Activity;
use crate::protocol::constants::{LINES_PER_PAGE, LINE_WIDTH};
use crate::protocol::{Page, ProtocolError, Rotation};

pub const ACTIVITIES_PER_PAGE: usize = 3;
pub const UPDATE_TIME_FORMAT: &str = "%d %B %X";
pub const ACTIVITIES_TITLE: &str = "--- Upcoming Activities ---";

/// Template lines that receive the status message.
const STATUS_LINES: [usize; 2] = [4, 5];
/// Template line that receives the generation time.
const TIMESTAMP_LINE: usize = 7;

pub const DEFAULT_WELCOME: [&str; LINES_PER_PAGE] = [
    "    Welcome! Come on in for",
    " cookies, coffee and some help",
    "        with your labs",
    "",
    "Open daily from 9 to 17.",
    "",
    "Last update:",
    "",
];

/// Cuts a line down to the column width.
pub fn clip(text: &str) -> String {
    text.chars().take(LINE_WIDTH).collect()
}

pub fn align_right(text: &str) -> String {
    format!("{:>width$}", clip(text), width = LINE_WIDTH)
}

pub fn align_center(text: &str) -> String {
    format!("{:^width$}", clip(text), width = LINE_WIDTH)
}

/// Applies the event limit: `n >= 0` keeps the first n, `n < 0` drops |n|
/// from the end, `None` keeps everything.
pub fn apply_limit(activities: &[Activity], limit: Option<i64>) -> &[Activity] {
    let keep = match limit {
        None => activities.len(),
        Some(n) if n >= 0 => activities.len().min(n as usize),
        Some(n) => activities.len().saturating_sub(n.unsigned_abs() as usize),
    };
    &activities[..keep]
}

/// Builds rotations from an immutable welcome template. Every build starts
/// from a fresh copy, so nothing carries over between refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    welcome: Vec<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self { welcome: DEFAULT_WELCOME.iter().map(|s| s.to_string()).collect() }
    }
}

impl Layout {
    /// The welcome template must have exactly one entry per line slot.
    pub fn new(welcome: Vec<String>) -> Result<Self, ProtocolError> {
        if welcome.len() != LINES_PER_PAGE {
            return Err(ProtocolError::OutOfRange {
                field: "Welcome template lines",
                value: welcome.len() as i64,
                min: LINES_PER_PAGE as i64,
                max: LINES_PER_PAGE as i64,
            });
        }
        Ok(Self { welcome })
    }

    pub fn welcome(&self) -> &[String] {
        &self.welcome
    }

    /// First page: the template with status message and generation time
    /// filled in. An empty status keeps the template text.
    pub fn welcome_page(&self, status: &str, now: NaiveDateTime) -> Page {
        let mut lines = self.welcome.clone();

        if !status.is_empty() {
            let mut status_lines = status.split('\n');
            for slot in STATUS_LINES {
                lines[slot] = status_lines.next().map(align_center).unwrap_or_default();
            }
        }
        lines[TIMESTAMP_LINE] = align_right(&now.format(UPDATE_TIME_FORMAT).to_string());

        Page::new(lines)
    }

    /// Activity pages: title, up to three name/when pairs, blank padding and
    /// a right-aligned `n/m` page indicator on the last line.
    pub fn activity_pages(&self, activities: &[Activity]) -> Vec<Page> {
        let total = activities.len().div_ceil(ACTIVITIES_PER_PAGE);

        activities
            .chunks(ACTIVITIES_PER_PAGE)
            .enumerate()
            .map(|(index, group)| {
                let mut lines = vec![align_center(ACTIVITIES_TITLE)];
                for activity in group {
                    lines.push(clip(&activity.name));
                    lines.push(align_right(&activity.when));
                }
                lines.resize(LINES_PER_PAGE - 1, String::new());
                lines.push(align_right(&format!("{}/{}", index + 1, total)));
                Page::new(lines)
            })
            .collect()
    }

    pub fn build(
        &self,
        address: u8,
        activities: &[Activity],
        status: &str,
        now: NaiveDateTime,
    ) -> Result<Rotation, ProtocolError> {
        if activities.is_empty() {
            warn!("No activities to show, only the welcome page goes out.");
        }
        let mut pages = vec![self.welcome_page(status, now)];
        pages.extend(self.activity_pages(activities));
        Rotation::new(address, pages)
    }
}
