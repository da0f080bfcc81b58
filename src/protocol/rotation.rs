/*
 *  protocol/rotation.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	A full set of pages addressed to one controller
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

use serde::{Deserialize, Serialize};

use super::constants::{start_frame, ADDRESS_MAX, CR, SYN};
use super::error::{check_in_range, ProtocolError};
use super::page::Page;

/// Pages shown in order by the controller at `address`.
///
/// The controller only holds a limited number of pages; keeping the list
/// short enough is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub address: u8,
    pub pages: Vec<Page>,
}

impl Rotation {
    pub fn new(address: u8, pages: Vec<Page>) -> Result<Self, ProtocolError> {
        check_in_range("Controller address", address, 0u8, ADDRESS_MAX)?;
        Ok(Self { address, pages })
    }

    /// Encodes the complete frame: header, every page, then `SYN CR`.
    pub fn to_wire(&self) -> Result<Vec<u8>, ProtocolError> {
        // address is a pub field, check again
        check_in_range("Address", self.address, 0u8, ADDRESS_MAX)?;
        for page in &self.pages {
            page.validate()?;
        }

        let mut out = start_frame(self.address);
        for page in &self.pages {
            page.encode_into(&mut out);
        }
        out.extend([SYN, CR]);
        Ok(out)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a rotation; both `address` and `pages` must be present.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let rotation: Rotation = serde_json::from_str(json)?;
        Self::new(rotation.address, rotation.pages)
    }
}
