/*
 *  manager.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Keeps track of what the column should show. Activities are cached so a
 *	failing API leaves the last known list on display with an error banner
 *	instead of an empty column.
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
use chrono::Local;
use log::{debug, error, info, warn};

use crate::activities::{Activity, ActivitySource};
use crate::layout::{apply_limit, Layout};
use crate::motd::MessageOfTheDay;
use crate::protocol::{escape_frame, ProtocolError, Rotation};
use crate::transport::TransportClient;

pub const NO_ACTIVITIES_STATUS: &str = "No activities found.";
pub const SHUTDOWN_STATUS: &str = "The column is now switched off.\nPower-cycle for new content.";
pub const DEFAULT_STATUS: &str = "Open daily from 9 to 17.";

/// Where and how refreshed content is delivered. Fixed for the lifetime of
/// the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    pub host: String,
    pub controller_address: u8,
    /// See [`apply_limit`].
    pub max_events: Option<i64>,
    /// Build and log frames without connecting to the controller.
    pub dry_run: bool,
}

/// Picks the status line. A fetch error wins over an empty list, which
/// wins over the message of the day or the default banner.
pub fn resolve_status(
    fetch_error: Option<String>,
    cache_empty: bool,
    motd: Option<&str>,
    default_status: &str,
) -> String {
    match (fetch_error, cache_empty) {
        (Some(err), _) => err,
        (None, true) => NO_ACTIVITIES_STATUS.to_string(),
        (None, false) => motd.unwrap_or(default_status).to_string(),
    }
}

pub struct RefreshManager<S> {
    source: S,
    transport: TransportClient,
    layout: Layout,
    motd: MessageOfTheDay,
    default_status: String,
    settings: RefreshSettings,
    cached_activities: Vec<Activity>,
    status: String,
}

impl<S: ActivitySource> RefreshManager<S> {
    pub fn new(source: S, settings: RefreshSettings) -> Self {
        Self {
            source,
            transport: TransportClient::default(),
            layout: Layout::default(),
            motd: MessageOfTheDay::disabled(),
            default_status: DEFAULT_STATUS.to_string(),
            settings,
            cached_activities: Vec::new(),
            status: String::new(),
        }
    }

    pub fn with_transport(mut self, transport: TransportClient) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_motd(mut self, motd: MessageOfTheDay) -> Self {
        self.motd = motd;
        self
    }

    pub fn with_default_status(mut self, status: impl Into<String>) -> Self {
        self.default_status = status.into();
        self
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    pub fn cached_activities(&self) -> &[Activity] {
        &self.cached_activities
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// One refresh cycle: fetch once, update cache and status, then build
    /// and deliver a new rotation. Only a validation error is returned;
    /// fetch and delivery problems are logged and absorbed.
    pub async fn update(&mut self) -> Result<Rotation, ProtocolError> {
        let fetch_error = match self.source.fetch().await {
            Ok(activities) => {
                self.cached_activities = activities;
                None
            }
            Err(e) => {
                warn!(
                    "Activity update failed, keeping {} cached activities: {}",
                    self.cached_activities.len(),
                    e
                );
                Some(e.to_string())
            }
        };

        let motd = {
            let mut rng = rand::rng();
            self.motd.pick(&mut rng).map(str::to_string)
        };
        self.status = resolve_status(
            fetch_error,
            self.cached_activities.is_empty(),
            motd.as_deref(),
            &self.default_status,
        );

        self.refresh().await
    }

    /// Tells the column that nobody will update it anymore.
    pub async fn shutdown(&mut self) -> Result<Rotation, ProtocolError> {
        info!("Sending power-off notice to the column");
        self.status = SHUTDOWN_STATUS.to_string();
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<Rotation, ProtocolError> {
        let activities = apply_limit(&self.cached_activities, self.settings.max_events);
        let rotation = self.layout.build(
            self.settings.controller_address,
            activities,
            &self.status,
            Local::now().naive_local(),
        )?;
        let frame = rotation.to_wire()?;

        debug!("{}", rotation.to_json()?);
        if self.settings.dry_run {
            info!("Dry run, frame for {}: {}", self.settings.host, escape_frame(&frame));
            return Ok(rotation);
        }
        debug!("{}", escape_frame(&frame));

        if let Err(e) = self.transport.send(&self.settings.host, &frame).await {
            error!("Could not update the column: {}", e);
        }
        Ok(rotation)
    }
}
