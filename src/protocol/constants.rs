/*
 *  protocol/constants.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Control characters, attribute letters and value encoding of the
 *	controller wire format.
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

// Control characters
/// Start of heading, opens every frame.
pub const SOH: u8 = 0x01;
/// Carriage return, closes every frame.
pub const CR: u8 = 0x0D;
/// Synchronisation, ends a multi-page rotation before the CR.
pub const SYN: u8 = 0x16;
/// Escape, prefixes every attribute command.
pub const ESC: u8 = 0x1B;
/// Field separator, delimits lines and attribute blocks.
pub const FS: u8 = 0x1C;

// Attribute command letters
pub const CMD_DURATION: u8 = b'A';
pub const CMD_BLINK: u8 = b'B';
pub const CMD_DISPLAY_MODE: u8 = b'D';
pub const CMD_SCHEDULE: u8 = b'P';
pub const CMD_BRIGHTNESS: u8 = b'Q';
pub const CMD_SCROLL: u8 = b'R';
pub const CMD_FADE: u8 = b'S';
pub const CMD_SET_CLOCK: u8 = b'T';

/// Number of line slots the controller expects on every page.
pub const LINES_PER_PAGE: usize = 8;
/// Visible characters per line on the column.
pub const LINE_WIDTH: usize = 32;

/// Highest value a single encoded character can carry.
pub const MAX_ENCODED_VALUE: u8 = 95;
/// Calendar year that encodes as zero in clock and schedule fields.
pub const YEAR_BASE: u16 = 1980;

/// Duration quantum of the controller, in milliseconds.
pub const DURATION_STEP_MS: f64 = 26.7;

// Attribute ranges, inclusive
pub const BLINK_SPEED_MAX: u8 = 4;
pub const DURATION_MIN_MS: u32 = 1;
pub const DURATION_MAX_MS: u32 = 218_450;
pub const BRIGHTNESS_MAX: u8 = 17;
pub const ADDRESS_MAX: u8 = 31;
pub const YEAR_MIN: u16 = YEAR_BASE;
pub const YEAR_MAX: u16 = YEAR_BASE + MAX_ENCODED_VALUE as u16;

/// Encodes a value in `0..=95` as one transmissible character.
#[inline]
pub fn encode_value(value: u8) -> u8 {
    value + 32
}

/// Inverse of [`encode_value`].
#[inline]
pub fn decode_value(character: u8) -> u8 {
    character - 32
}

/// Common frame header: `SOH <address> FS`.
pub(crate) fn start_frame(address: u8) -> Vec<u8> {
    vec![SOH, encode_value(address), FS]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_decode() {
        for value in 0..=MAX_ENCODED_VALUE {
            assert_eq!(decode_value(encode_value(value)), value);
        }
    }

    #[test]
    fn test_encoded_values_are_printable() {
        assert_eq!(encode_value(0), b' ');
        assert_eq!(encode_value(1), b'!');
        assert_eq!(encode_value(MAX_ENCODED_VALUE), 0x7F);
        assert!((0..MAX_ENCODED_VALUE).all(|v| encode_value(v).is_ascii_graphic() || v == 0));
    }

    #[test]
    fn test_year_range_matches_encoding() {
        assert_eq!(YEAR_MAX, 2075);
    }
}
