/*
 *  protocol/error.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Validation errors raised while encoding or decoding control strings
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

use thiserror::Error;

/// Error type for everything the codec refuses to encode or decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A numeric field is outside its documented range.
    #[error("{field} out of range: {value} (min={min}, max={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The display mode is not one the controller knows.
    #[error("unknown display mode: {0}")]
    UnknownDisplayMode(i64),

    /// Structured (JSON) input could not be turned into pages.
    #[error("malformed rotation document: {0}")]
    Malformed(String),
}

impl ProtocolError {
    /// Name of the field that failed range validation, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ProtocolError::OutOfRange { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Malformed(err.to_string())
    }
}

/// Fails with [`ProtocolError::OutOfRange`] unless `min <= value <= max`.
pub(crate) fn check_in_range(
    field: &'static str,
    value: impl Into<i64>,
    min: impl Into<i64>,
    max: impl Into<i64>,
) -> Result<(), ProtocolError> {
    let (value, min, max) = (value.into(), min.into(), max.into());
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ProtocolError::OutOfRange { field, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(check_in_range("Brightness", 0u8, 0u8, 17u8).is_ok());
        assert!(check_in_range("Brightness", 17u8, 0u8, 17u8).is_ok());
        let err = check_in_range("Brightness", 18u8, 0u8, 17u8).unwrap_err();
        assert_eq!(err.field(), Some("Brightness"));
    }

    #[test]
    fn test_message_names_field_value_and_range() {
        let err = check_in_range("Duration", 0u32, 1u32, 218_450u32).unwrap_err();
        assert_eq!(err.to_string(), "Duration out of range: 0 (min=1, max=218450)");
    }
}
