/*
 *  lib.rs
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

//! Drives a multi-line LED information column: the controller wire
//! protocol, TCP delivery, and the daemon that keeps the content fresh.

pub mod activities;
pub mod config;
pub mod layout;
pub mod logging;
pub mod manager;
pub mod motd;
pub mod protocol;
pub mod scheduler;
pub mod transport;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
