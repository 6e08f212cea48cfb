// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! MSF (Minute:Second:Frame) disc time
//!
//! The CDD exchanges times as six decimal digits, one per nibble:
//! minute tens, minute units, second tens, second units, frame tens,
//! frame units. There are 75 frames per second.

use std::fmt;
use std::str::FromStr;

use crate::core::error::ConfigError;

/// Frames (blocks) per second
pub const FRAMES_PER_SECOND: u32 = 75;

/// Frames (blocks) per minute
pub const FRAMES_PER_MINUTE: u32 = FRAMES_PER_SECOND * 60;

/// Last address the six-digit form can express (99:59:74)
pub const MAX_LBA: u32 = 100 * FRAMES_PER_MINUTE - 1;

/// Disc time in MSF format
///
/// All values are stored as plain binary, not BCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Msf {
    /// Minute (0-99)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Frame (0-74)
    pub frame: u8,
}

impl Msf {
    /// 00:00:00
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a new time
    pub const fn new(minute: u8, second: u8, frame: u8) -> Self {
        Self {
            minute,
            second,
            frame,
        }
    }

    /// Convert a logical block address to MSF
    ///
    /// Addresses past 99:59:74 saturate there.
    pub fn from_lba(lba: u32) -> Self {
        let lba = lba.min(MAX_LBA);
        let seconds = lba / FRAMES_PER_SECOND;
        Self {
            minute: (seconds / 60) as u8,
            second: (seconds % 60) as u8,
            frame: (lba % FRAMES_PER_SECOND) as u8,
        }
    }

    /// Convert MSF to a logical block address
    ///
    /// LBA = (minute * 60 + second) * 75 + frame
    pub fn to_lba(&self) -> u32 {
        (u32::from(self.minute) * 60 + u32::from(self.second)) * FRAMES_PER_SECOND
            + u32::from(self.frame)
    }

    /// Split into the six decimal digit nibbles used on the wire
    pub fn to_digits(&self) -> [u8; 6] {
        [
            self.minute / 10,
            self.minute % 10,
            self.second / 10,
            self.second % 10,
            self.frame / 10,
            self.frame % 10,
        ]
    }

    /// Join six decimal digit nibbles
    ///
    /// Digits are taken as-is; the drive firmware does not range-check
    /// them, so `0:9:9` style out-of-range seconds still produce an address.
    pub fn from_digits(digits: [u8; 6]) -> Self {
        Self {
            minute: digits[0].wrapping_mul(10).wrapping_add(digits[1]),
            second: digits[2].wrapping_mul(10).wrapping_add(digits[3]),
            frame: digits[4].wrapping_mul(10).wrapping_add(digits[5]),
        }
    }
}

impl fmt::Display for Msf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.minute, self.second, self.frame)
    }
}

impl FromStr for Msf {
    type Err = ConfigError;

    /// Parse an `MM:SS:FF` string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidMsf(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let minute: u8 = parts[0].parse().map_err(|_| invalid())?;
        let second: u8 = parts[1].parse().map_err(|_| invalid())?;
        let frame: u8 = parts[2].parse().map_err(|_| invalid())?;
        if minute > 99 || second > 59 || u32::from(frame) >= FRAMES_PER_SECOND {
            return Err(invalid());
        }

        Ok(Self::new(minute, second, frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msf_to_lba() {
        assert_eq!(Msf::new(0, 0, 0).to_lba(), 0);
        assert_eq!(Msf::new(0, 2, 0).to_lba(), 150);
        assert_eq!(Msf::new(1, 0, 0).to_lba(), 4500);
        assert_eq!(Msf::new(10, 30, 15).to_lba(), 47_265);
    }

    #[test]
    fn test_lba_to_msf() {
        assert_eq!(Msf::from_lba(0), Msf::ZERO);
        assert_eq!(Msf::from_lba(150), Msf::new(0, 2, 0));
        assert_eq!(Msf::from_lba(47_265), Msf::new(10, 30, 15));
        assert_eq!(Msf::from_lba(74), Msf::new(0, 0, 74));
    }

    #[test]
    fn test_lba_saturates_at_last_digit_time() {
        assert_eq!(Msf::from_lba(MAX_LBA), Msf::new(99, 59, 74));
        assert_eq!(Msf::from_lba(MAX_LBA + 1), Msf::new(99, 59, 74));
        assert_eq!(Msf::from_lba(300 * FRAMES_PER_MINUTE), Msf::new(99, 59, 74));
        assert!(Msf::from_lba(u32::MAX).to_digits().iter().all(|&d| d < 10));
    }

    #[test]
    fn test_digits() {
        let msf = Msf::new(12, 34, 56);
        assert_eq!(msf.to_digits(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(Msf::from_digits([1, 2, 3, 4, 5, 6]), msf);
    }

    #[test]
    fn test_unchecked_digits() {
        // Second digits of 9:9 are not rejected, they just add up
        let msf = Msf::from_digits([0, 0, 9, 9, 0, 0]);
        assert_eq!(msf.to_lba(), 99 * 75);
    }

    #[test]
    fn test_parse() {
        assert_eq!("02:30:10".parse::<Msf>().unwrap(), Msf::new(2, 30, 10));
        assert_eq!(" 00:02:00 ".parse::<Msf>().unwrap(), Msf::new(0, 2, 0));
        assert!("02:30".parse::<Msf>().is_err());
        assert!("aa:00:00".parse::<Msf>().is_err());
        assert!("00:60:00".parse::<Msf>().is_err());
        assert!("00:00:75".parse::<Msf>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Msf::new(1, 2, 3).to_string(), "01:02:03");
    }
}
