/*
 *  protocol/mod.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Control string codec for the LED column controller
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

//! Encoding is pure and synchronous; nothing here touches the network.

pub mod command;
pub mod constants;
pub mod error;
pub mod page;
pub mod rotation;

pub use command::{set_clock, set_display_mode, DisplayMode};
pub use constants::{decode_value, encode_value};
pub use error::ProtocolError;
pub use page::{Page, Schedule};
pub use rotation::Rotation;

/// Renders a control string for logs, control characters escaped.
pub fn escape_frame(frame: &[u8]) -> String {
    frame.escape_ascii().to_string()
}
