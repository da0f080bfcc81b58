/*
 *  scheduler.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Drives the refresh manager from a single worker: cron-like minute ticks
 *	plus commands queued by signal handlers. Only the worker ever touches
 *	the manager, so there is no locking around its state.
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
use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};
use log::{debug, error, info};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::activities::ActivitySource;
use crate::logging;
use crate::manager::RefreshManager;

/// Two days of minutes; any valid schedule fires well within that.
const SEARCH_LIMIT_MINUTES: u32 = 48 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RefreshNow,
    ToggleLogLevel,
    Shutdown,
}

/// Cloneable sender side of the worker queue. Handing one to a signal task
/// is all it needs to steer the daemon.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Returns false once the worker has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn refresh_now(&self) -> bool {
        self.send(Command::RefreshNow)
    }

    pub fn toggle_log_level(&self) -> bool {
        self.send(Command::ToggleLogLevel)
    }

    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }
}

/// Fires on minute boundaries where `minute % interval == 0`, optionally
/// only while the hour lies inside an inclusive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSchedule {
    interval_minutes: u32,
    active_hours: Option<(u32, u32)>,
}

impl CronSchedule {
    pub fn new(interval_minutes: u32, active_hours: Option<(u32, u32)>) -> Self {
        Self { interval_minutes: interval_minutes.max(1), active_hours }
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn matches(&self, at: NaiveDateTime) -> bool {
        let in_window = match self.active_hours {
            Some((start, end)) => (start..=end).contains(&at.hour()),
            None => true,
        };
        in_window && at.minute() % self.interval_minutes == 0
    }

    /// First firing strictly after `after`.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut at = after.with_second(0)?.with_nanosecond(0)? + TimeDelta::minutes(1);
        for _ in 0..SEARCH_LIMIT_MINUTES {
            if self.matches(at) {
                return Some(at);
            }
            at += TimeDelta::minutes(1);
        }
        None
    }
}

enum Event {
    Command(Command),
    Tick,
    Closed,
}

async fn sleep_for(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}

/// Local wall-clock time, naive.
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Owns the manager and runs every refresh, log toggle and the final
/// shutdown frame one after another.
pub struct Orchestrator<S> {
    manager: RefreshManager<S>,
    schedule: CronSchedule,
    rx: UnboundedReceiver<Command>,
    stashed: Option<Command>,
    clock: Clock,
    /// Firing served by the last tick. Never served twice, even when the
    /// wall clock lags the timer.
    last_fired: Option<NaiveDateTime>,
}

impl<S: ActivitySource> Orchestrator<S> {
    pub fn new(manager: RefreshManager<S>, schedule: CronSchedule) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            manager,
            schedule,
            rx,
            stashed: None,
            clock: Box::new(local_now),
            last_fired: None,
        };
        (orchestrator, SchedulerHandle { tx })
    }

    /// Replaces the wall clock firings are computed from.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn manager(&self) -> &RefreshManager<S> {
        &self.manager
    }

    /// Runs until a shutdown command arrives or every handle is dropped,
    /// then sends the power-off frame and hands the manager back.
    pub async fn run(mut self) -> RefreshManager<S> {
        info!(
            "Refreshing every {} minute(s){}",
            self.schedule.interval_minutes,
            match self.schedule.active_hours {
                Some((start, end)) => format!(" between {start}:00 and {end}:59"),
                None => String::new(),
            }
        );

        loop {
            match self.next_event().await {
                Event::Tick => self.cycle().await,
                Event::Command(Command::RefreshNow) => {
                    self.drain_refreshes();
                    info!("Refresh requested");
                    self.cycle().await;
                }
                Event::Command(Command::ToggleLogLevel) => {
                    logging::toggle();
                }
                Event::Command(Command::Shutdown) | Event::Closed => break,
            }
        }

        info!("Shutting down");
        if let Err(e) = self.manager.shutdown().await {
            error!("Could not build the power-off frame: {}", e);
        }
        self.manager
    }

    async fn next_event(&mut self) -> Event {
        if let Some(command) = self.stashed.take() {
            return Event::Command(command);
        }
        let now = (self.clock)();
        let next = self.next_firing(now);
        let delay = next.map(|at| {
            debug!("Next refresh at {}", at);
            (at - now).to_std().unwrap_or(Duration::ZERO)
        });

        let event = tokio::select! {
            biased;
            command = self.rx.recv() => match command {
                Some(command) => Event::Command(command),
                None => Event::Closed,
            },
            _ = sleep_for(delay) => Event::Tick,
        };
        if matches!(event, Event::Tick) {
            self.last_fired = next;
        }
        event
    }

    /// Next firing after `now`, skipping the one already served.
    fn next_firing(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let from = match self.last_fired {
            Some(last) if last > now => last,
            _ => now,
        };
        self.schedule.next_after(from)
    }

    /// Swallows queued refresh requests; the first other command is kept
    /// for the next turn of the loop.
    fn drain_refreshes(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            if command != Command::RefreshNow {
                self.stashed = Some(command);
                break;
            }
            debug!("Coalesced a queued refresh");
        }
    }

    async fn cycle(&mut self) {
        if let Err(e) = self.manager.update().await {
            error!("Refresh produced an invalid rotation: {}", e);
        }
    }
}
