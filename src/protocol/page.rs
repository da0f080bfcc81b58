/*
 *  protocol/page.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	One screenful of text plus its display attributes
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
use log::debug;
use serde::{Deserialize, Serialize};

use super::constants::*;
use super::error::{check_in_range, ProtocolError};

pub const DEFAULT_BLINK_SPEED: u8 = 1;
pub const DEFAULT_DURATION_MS: u32 = 10_000;
pub const DEFAULT_BRIGHTNESS: u8 = BRIGHTNESS_MAX;

fn default_blink_speed() -> u8 { DEFAULT_BLINK_SPEED }
fn default_duration() -> u32 { DEFAULT_DURATION_MS }
fn default_brightness() -> u8 { DEFAULT_BRIGHTNESS }

// "omit if zero" mirrors the controller: zero and disabled are the same thing
fn is_zero_u8(v: &u8) -> bool { *v == 0 }
fn is_zero_u32(v: &u32) -> bool { *v == 0 }
fn is_false(v: &bool) -> bool { !*v }

/// A calendar moment as the controller stores it, used both for page
/// scheduling and for setting the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Schedule {
    pub fn from_datetime<T: Datelike + Timelike>(when: &T) -> Self {
        Self {
            year: when.year(),
            month: when.month() as u8,
            day: when.day() as u8,
            hours: when.hour() as u8,
            minutes: when.minute() as u8,
            seconds: when.second() as u8,
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_in_range("Year", self.year, YEAR_MIN, YEAR_MAX)?;
        check_in_range("Month", self.month, 1u8, 12u8)?;
        check_in_range("Day", self.day, 1u8, 31u8)?;
        check_in_range("Hour", self.hours, 0u8, 23u8)?;
        check_in_range("Minute", self.minutes, 0u8, 59u8)?;
        check_in_range("Second", self.seconds, 0u8, 59u8)?;
        Ok(())
    }

    /// Appends the seven date characters. Must only be called after `validate`.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        let year = (self.year - i32::from(YEAR_BASE)) as u8;
        // third slot is reserved by the controller and always zero
        out.extend(
            [year, self.month, 0, self.day, self.hours, self.minutes, self.seconds]
                .map(encode_value),
        );
    }
}

/// One screenful of text. Attributes left at zero are not transmitted, so
/// the controller keeps whatever the previous page used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub lines: Vec<String>,

    /// Transition speed to the next page, in half seconds (0..=4).
    #[serde(rename = "blinkspeed", default = "default_blink_speed", skip_serializing_if = "is_zero_u8")]
    pub blink_speed: u8,

    /// Time on screen in milliseconds (1..=218450), quantized on send.
    #[serde(default = "default_duration", skip_serializing_if = "is_zero_u32")]
    pub duration: u32,

    #[serde(rename = "schedular", default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,

    /// LED brightness (0..=17).
    #[serde(default = "default_brightness", skip_serializing_if = "is_zero_u8")]
    pub brightness: u8,

    /// Letters scroll in from above.
    #[serde(default, skip_serializing_if = "is_false")]
    pub scrolling: bool,

    /// Page contents fade in and out.
    #[serde(default, skip_serializing_if = "is_false")]
    pub fading: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Page {
    /// Creates a page with the given text and default attributes.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            blink_speed: DEFAULT_BLINK_SPEED,
            duration: DEFAULT_DURATION_MS,
            schedule: None,
            brightness: DEFAULT_BRIGHTNESS,
            scrolling: false,
            fading: false,
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(Into::into).collect())
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_in_range("Line amount", self.lines.len() as i64, 0, LINES_PER_PAGE as i64)?;
        check_in_range("Blink speed", self.blink_speed, 0u8, BLINK_SPEED_MAX)?;
        check_in_range("Duration", self.duration, DURATION_MIN_MS, DURATION_MAX_MS)?;
        check_in_range("Brightness", self.brightness, 0u8, BRIGHTNESS_MAX)?;
        if let Some(schedule) = &self.schedule {
            schedule.validate()?;
        }
        Ok(())
    }

    /// Encodes the page block. Nothing is returned unless every attribute
    /// is within range.
    pub fn to_wire(&self) -> Result<Vec<u8>, ProtocolError> {
        self.validate()?;
        let mut out = Vec::with_capacity(LINES_PER_PAGE * (LINE_WIDTH + 2) + 32);
        self.encode_into(&mut out);
        Ok(out)
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        // always all slots, missing lines go out empty
        for slot in 0..LINES_PER_PAGE {
            out.push(b'0' + slot as u8);
            if let Some(line) = self.lines.get(slot) {
                out.extend_from_slice(line.as_bytes());
            }
            out.push(FS);
        }

        if self.blink_speed != 0 {
            out.extend([ESC, CMD_BLINK, encode_value(self.blink_speed), FS]);
        }

        out.extend([ESC, CMD_DURATION]);
        out.extend(duration_digits(self.duration).map(encode_value));
        out.push(FS);

        if let Some(schedule) = &self.schedule {
            out.extend([ESC, CMD_SCHEDULE]);
            schedule.encode_into(out);
            out.push(FS);
        }

        if self.brightness != 0 {
            out.extend([ESC, CMD_BRIGHTNESS, encode_value(self.brightness), FS]);
        }

        if self.scrolling {
            out.extend([ESC, CMD_SCROLL, encode_value(1), FS]);
        }
        if self.fading {
            out.extend([ESC, CMD_FADE, encode_value(1), FS]);
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a page, filling every absent attribute with its default.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Rounds a duration down to the controller's ~26.7 ms step.
pub fn quantize_duration(duration_ms: u32) -> u32 {
    (f64::from(duration_ms) / DURATION_STEP_MS).floor() as u32
}

/// Splits the quantized duration into digits of weight 4096, 256, 16 and 1,
/// most significant first.
pub fn duration_digits(duration_ms: u32) -> [u8; 4] {
    let mut steps = quantize_duration(duration_ms);
    let a = steps / 4096;
    steps %= 4096;
    let b = steps / 256;
    steps %= 256;
    let c = steps / 16;
    let d = steps % 16;
    debug!("duration: {} {} {} {}", a, b, c, d);
    [a as u8, b as u8, c as u8, d as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot_markers(wire: &[u8]) -> usize {
        // a slot marker is the digit that follows the previous FS (or starts the block)
        let mut count = 0;
        let mut at_slot_start = true;
        for &byte in wire {
            if byte == ESC {
                break;
            }
            if at_slot_start && byte.is_ascii_digit() {
                count += 1;
            }
            at_slot_start = byte == FS;
        }
        count
    }

    #[test]
    fn test_defaults() {
        let page = Page::from_lines(["hello"]);
        assert_eq!(page.blink_speed, 1);
        assert_eq!(page.duration, 10_000);
        assert_eq!(page.brightness, 17);
        assert_eq!(page.schedule, None);
        assert!(!page.scrolling);
        assert!(!page.fading);
    }

    #[test]
    fn test_always_eight_slots() {
        for n in 0..=LINES_PER_PAGE {
            let page = Page::new((0..n).map(|i| format!("line {i}")).collect());
            let wire = page.to_wire().unwrap();
            assert_eq!(slot_markers(&wire), LINES_PER_PAGE, "with {n} lines");
        }
    }

    #[test]
    fn test_line_layout() {
        let wire = Page::from_lines(["ab", "c"]).to_wire().unwrap();
        let parts: [&[u8]; 16] = [
            b"0ab", &[FS], b"1c", &[FS], b"2", &[FS], b"3", &[FS],
            b"4", &[FS], b"5", &[FS], b"6", &[FS], b"7", &[FS],
        ];
        let expected_lines = parts.concat();
        assert!(wire.starts_with(&expected_lines));
    }

    #[test]
    fn test_default_attribute_block() {
        let wire = Page::default().to_wire().unwrap();
        let tail = &wire[16..];
        let expected = [
            ESC, b'B', encode_value(1), FS,
            ESC, b'A', encode_value(0), encode_value(1), encode_value(7), encode_value(6), FS,
            ESC, b'Q', encode_value(17), FS,
        ];
        assert_eq!(tail, expected);
    }

    #[test]
    fn test_duration_quantization() {
        // floor(10000 / 26.7) = 374 = 1*256 + 7*16 + 6
        assert_eq!(quantize_duration(10_000), 374);
        assert_eq!(duration_digits(10_000), [0, 1, 7, 6]);
        assert_eq!(duration_digits(1), [0, 0, 0, 0]);
        // 218450 ms is the largest accepted value: 8181 = 1*4096 + 15*256 + 15*16 + 5
        assert_eq!(duration_digits(218_450), [1, 15, 15, 5]);
    }

    #[test]
    fn test_zero_attributes_are_omitted() {
        let mut page = Page::default();
        page.blink_speed = 0;
        page.brightness = 0;
        let wire = page.to_wire().unwrap();
        assert!(!wire.windows(2).any(|w| w == [ESC, b'B']));
        assert!(!wire.windows(2).any(|w| w == [ESC, b'Q']));
        assert!(wire.windows(2).any(|w| w == [ESC, b'A']));
    }

    #[test]
    fn test_effect_flags() {
        let mut page = Page::default();
        page.scrolling = true;
        page.fading = true;
        let wire = page.to_wire().unwrap();
        assert!(wire.ends_with(&[ESC, b'R', encode_value(1), FS, ESC, b'S', encode_value(1), FS]));
    }

    #[test]
    fn test_schedule_block() {
        let when = NaiveDate::from_ymd_opt(2016, 6, 8).unwrap().and_hms_opt(12, 34, 56).unwrap();
        let mut page = Page::default();
        page.brightness = 0;
        page.schedule = Some(Schedule::from_datetime(&when));
        let wire = page.to_wire().unwrap();
        let expected = [ESC, b'P', encode_value(36), encode_value(6), encode_value(0), encode_value(8),
            encode_value(12), encode_value(34), encode_value(56), FS];
        assert!(wire.ends_with(&expected));
    }

    #[test]
    fn test_out_of_range_fields() {
        let cases: Vec<(&str, Box<dyn Fn(&mut Page)>)> = vec![
            ("Brightness", Box::new(|p: &mut Page| p.brightness = 18)),
            ("Blink speed", Box::new(|p: &mut Page| p.blink_speed = 5)),
            ("Duration", Box::new(|p: &mut Page| p.duration = 0)),
            ("Duration", Box::new(|p: &mut Page| p.duration = 300_000)),
            ("Line amount", Box::new(|p: &mut Page| p.lines = vec![String::new(); 9])),
        ];
        for (field, mutate) in cases {
            let mut page = Page::default();
            mutate(&mut page);
            let err = page.to_wire().unwrap_err();
            assert_eq!(err.field(), Some(field));
            assert!(err.to_string().starts_with(field));
        }
    }

    #[test]
    fn test_schedule_out_of_range() {
        let mut page = Page::default();
        page.schedule = Some(Schedule { year: 2076, month: 1, day: 1, hours: 0, minutes: 0, seconds: 0 });
        assert_eq!(page.to_wire().unwrap_err().field(), Some("Year"));

        page.schedule = Some(Schedule { year: 2000, month: 13, day: 1, hours: 0, minutes: 0, seconds: 0 });
        assert_eq!(page.to_wire().unwrap_err().field(), Some("Month"));

        page.schedule = Some(Schedule { year: 2000, month: 1, day: 1, hours: 24, minutes: 0, seconds: 0 });
        assert_eq!(page.to_wire().unwrap_err().field(), Some("Hour"));
    }

    #[test]
    fn test_minimal_json_gets_defaults() {
        let page = Page::from_json(r#"{"lines": ["a", "b"]}"#).unwrap();
        assert_eq!(page, Page::from_lines(["a", "b"]));
        assert!(page.to_wire().is_ok());
    }

    #[test]
    fn test_json_omits_zero_and_restores_defaults() {
        let mut page = Page::from_lines(["x"]);
        page.brightness = 0;
        page.scrolling = true;
        let json = page.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("brightness").is_none());
        assert!(value.get("schedular").is_none());
        assert!(value.get("fading").is_none());
        assert_eq!(value["blinkspeed"], 1);
        assert_eq!(value["scrolling"], true);

        // zero brightness is indistinguishable from "not set"
        let back = Page::from_json(&json).unwrap();
        assert_eq!(back.brightness, DEFAULT_BRIGHTNESS);
        assert!(back.scrolling);
    }

    #[test]
    fn test_json_requires_lines() {
        assert!(matches!(Page::from_json(r#"{"duration": 100}"#), Err(ProtocolError::Malformed(_))));
    }
}
