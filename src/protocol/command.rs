/*
 *  protocol/command.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Controller-level one-shot commands: display mode and real time clock
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

use chrono::{Datelike, Timelike};
use std::fmt;

use super::constants::*;
use super::error::{check_in_range, ProtocolError};
use super::page::Schedule;

/// Display modes known to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Blank until restarted or re-enabled, pages are kept.
    Blank = 0,
    Normal = 1,
    /// Leaves test mode and accepts normal pages again.
    TestOff = 2,
    /// Test mode pauses on the visible page.
    TestHalt = 3,
    /// Enters test mode. Deletes the stored pages!
    TestOn = 4,
    /// Toggles the external output, if connected.
    OutputToggle = 10,
}

impl TryFrom<i64> for DisplayMode {
    type Error = ProtocolError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DisplayMode::Blank),
            1 => Ok(DisplayMode::Normal),
            2 => Ok(DisplayMode::TestOff),
            3 => Ok(DisplayMode::TestHalt),
            4 => Ok(DisplayMode::TestOn),
            10 => Ok(DisplayMode::OutputToggle),
            other => Err(ProtocolError::UnknownDisplayMode(other)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayMode::Blank => "blank",
            DisplayMode::Normal => "normal",
            DisplayMode::TestOff => "test-off",
            DisplayMode::TestHalt => "test-halt",
            DisplayMode::TestOn => "test-on",
            DisplayMode::OutputToggle => "output-toggle",
        };
        write!(f, "{} ({})", name, *self as u8)
    }
}

/// `SOH <address> FS ESC D <mode> FS CR`
pub fn set_display_mode(address: u8, mode: DisplayMode) -> Result<Vec<u8>, ProtocolError> {
    check_in_range("Controller address", address, 0u8, ADDRESS_MAX)?;
    let mut out = start_frame(address);
    out.extend([ESC, CMD_DISPLAY_MODE, encode_value(mode as u8), FS, CR]);
    Ok(out)
}

/// `SOH <address> FS ESC T <year month 0 day hour minute second> FS CR`
///
/// Only calendar years 1980..=2075 can be represented.
pub fn set_clock<T: Datelike + Timelike>(address: u8, when: &T) -> Result<Vec<u8>, ProtocolError> {
    check_in_range("Controller address", address, 0u8, ADDRESS_MAX)?;
    let moment = Schedule::from_datetime(when);
    moment.validate()?;

    let mut out = start_frame(address);
    out.extend([ESC, CMD_SET_CLOCK]);
    moment.encode_into(&mut out);
    out.extend([FS, CR]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_mode_encoding() {
        let wire = set_display_mode(2, DisplayMode::OutputToggle).unwrap();
        assert_eq!(wire, vec![SOH, encode_value(2), FS, ESC, b'D', encode_value(10), FS, CR]);
    }

    #[test]
    fn test_display_mode_from_number() {
        assert_eq!(DisplayMode::try_from(3i64).unwrap(), DisplayMode::TestHalt);
        assert_eq!(DisplayMode::try_from(10i64).unwrap(), DisplayMode::OutputToggle);
        assert_eq!(DisplayMode::try_from(5i64), Err(ProtocolError::UnknownDisplayMode(5)));
        assert_eq!(DisplayMode::try_from(-1i64), Err(ProtocolError::UnknownDisplayMode(-1)));
    }

    #[test]
    fn test_set_clock_encoding() {
        let when = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(23, 59, 7).unwrap();
        let wire = set_clock(0, &when).unwrap();
        let expected = vec![
            SOH, encode_value(0), FS, ESC, b'T',
            encode_value(44), encode_value(2), encode_value(0), encode_value(29),
            encode_value(23), encode_value(59), encode_value(7),
            FS, CR,
        ];
        assert_eq!(wire, expected);
    }

    #[test]
    fn test_set_clock_year_range() {
        let early = NaiveDate::from_ymd_opt(1979, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(set_clock(0, &early).unwrap_err().field(), Some("Year"));
        let late = NaiveDate::from_ymd_opt(2076, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(set_clock(0, &late).unwrap_err().field(), Some("Year"));
        let last = NaiveDate::from_ymd_opt(2075, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(set_clock(0, &last).is_ok());
    }

    #[test]
    fn test_address_range() {
        assert!(set_display_mode(32, DisplayMode::Normal).is_err());
        let when = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(set_clock(32, &when).is_err());
    }
}
