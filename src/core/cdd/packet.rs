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

//! CDD status and command records
//!
//! Both records are ten nibbles, each carried in its own byte.
//!
//! # Status Record
//!
//! ```text
//! [0] status code    [1] report format    [2..=7] payload    [8] flags    [9] checksum
//! ```
//!
//! | Format | Payload                                             |
//! |--------|-----------------------------------------------------|
//! | 0 ABS  | absolute time MM SS FF                              |
//! | 1 REL  | track-relative time MM SS FF                        |
//! | 2 TRK  | track number, control (4 = data), ADR (1)           |
//! | 3 TOCO | disc length MM SS FF                                |
//! | 4 TOCT | first track, last track, version                    |
//! | 5 TOCN | track start MM SS FF, bit 7 of FF units = data track|
//! | F      | not ready                                           |
//!
//! For TOCN the flags nibble carries the track number's units digit.
//!
//! # Command Record
//!
//! ```text
//! [0] command type   [1] must be zero   [2..=8] payload   [9] checksum
//! ```
//!
//! | Command          | Payload                                         |
//! |------------------|-------------------------------------------------|
//! | 3 Read / 4 Seek  | `[2..=7]` target time MM SS FF                  |
//! | 2 Report request | `[3]` format, `[4..=5]` track number            |
//! | A Track skip     | `[3]` direction (non-zero = back), `[4..=7]` count |
//!
//! # Checksum
//!
//! The tenth nibble is the inverted low nibble of the sum of the first nine.

use super::msf::Msf;

/// Record size in nibbles
pub const RECORD_SIZE: usize = 10;

/// Raw record, one nibble per byte
pub type Record = [u8; RECORD_SIZE];

/// Bit set in the TOCN frame units digit for a data track
pub const TOCN_DATA_TRACK: u8 = 0x80;

/// Compute the record checksum over the first nine nibbles
///
/// # Example
///
/// ```
/// use segacd_cdd::core::cdd::packet::checksum;
///
/// assert_eq!(checksum(&[0; 10]), 0x0F);
/// assert_eq!(checksum(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]), 0x0E);
/// ```
pub fn checksum(record: &Record) -> u8 {
    let sum = record[..RECORD_SIZE - 1]
        .iter()
        .fold(0u8, |acc, &nibble| acc.wrapping_add(nibble));
    !sum & 0x0F
}

/// Store the checksum into the last nibble
pub fn seal(record: &mut Record) {
    record[RECORD_SIZE - 1] = checksum(record);
}

/// Drive status codes (status nibble 0)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStatus {
    Stopped = 0x0,
    Playing = 0x1,
    Seeking = 0x2,
    Scanning = 0x3,
    Paused = 0x4,
    DoorOpen = 0x5,
    ChecksumError = 0x6,
    CommandError = 0x7,
    FunctionError = 0x8,
    TocReading = 0x9,
    Tracking = 0xA,
    NoDisc = 0xB,
    Leadout = 0xC,
    Leadin = 0xD,
    TrayMoving = 0xE,
}

impl DriveStatus {
    /// Decode a status nibble
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        Some(match nibble {
            0x0 => Self::Stopped,
            0x1 => Self::Playing,
            0x2 => Self::Seeking,
            0x3 => Self::Scanning,
            0x4 => Self::Paused,
            0x5 => Self::DoorOpen,
            0x6 => Self::ChecksumError,
            0x7 => Self::CommandError,
            0x8 => Self::FunctionError,
            0x9 => Self::TocReading,
            0xA => Self::Tracking,
            0xB => Self::NoDisc,
            0xC => Self::Leadout,
            0xD => Self::Leadin,
            0xE => Self::TrayMoving,
            _ => return None,
        })
    }

    /// Whether the tray or disc edge blocks positioning commands
    pub fn blocks_positioning(self) -> bool {
        matches!(
            self,
            Self::DoorOpen | Self::TrayMoving | Self::Leadout | Self::Leadin
        )
    }
}

/// Status report formats (status nibble 1)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Absolute = 0x0,
    Relative = 0x1,
    Track = 0x2,
    TocOverview = 0x3,
    TocTrackCount = 0x4,
    TocTrackNumber = 0x5,
    NotReady = 0xF,
}

impl ReportFormat {
    /// Decode a format nibble
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        Some(match nibble {
            0x0 => Self::Absolute,
            0x1 => Self::Relative,
            0x2 => Self::Track,
            0x3 => Self::TocOverview,
            0x4 => Self::TocTrackCount,
            0x5 => Self::TocTrackNumber,
            0xF => Self::NotReady,
            _ => return None,
        })
    }

    /// TOCO, TOCT or TOCN
    pub fn is_toc(self) -> bool {
        matches!(
            self,
            Self::TocOverview | Self::TocTrackCount | Self::TocTrackNumber
        )
    }
}

/// Format-dependent part of a status record (nibbles 2-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPayload {
    /// Absolute, relative or disc-length time
    Time(Msf),
    /// Current track number and its control nibble
    Track { number: u8, data: bool },
    /// First and last track numbers
    TrackRange { first: u8, last: u8, version: u8 },
    /// Start time of a requested track
    TrackStart { time: Msf, data: bool },
    /// Zero-filled
    Empty,
}

impl StatusPayload {
    fn to_nibbles(self) -> [u8; 6] {
        match self {
            Self::Time(time) => time.to_digits(),
            Self::Track { number, data } => [
                number / 10,
                number % 10,
                if data { 4 } else { 0 },
                1,
                0,
                0,
            ],
            Self::TrackRange {
                first,
                last,
                version,
            } => [first / 10, first % 10, last / 10, last % 10, version, 0],
            Self::TrackStart { time, data } => {
                let mut digits = time.to_digits();
                if data {
                    digits[5] |= TOCN_DATA_TRACK;
                }
                digits
            }
            Self::Empty => [0; 6],
        }
    }

    fn from_nibbles(format: ReportFormat, n: [u8; 6]) -> Self {
        match format {
            ReportFormat::Absolute | ReportFormat::Relative | ReportFormat::TocOverview => {
                Self::Time(Msf::from_digits(n))
            }
            ReportFormat::Track => Self::Track {
                number: n[0] * 10 + n[1],
                data: n[2] & 4 != 0,
            },
            ReportFormat::TocTrackCount => Self::TrackRange {
                first: n[0] * 10 + n[1],
                last: n[2] * 10 + n[3],
                version: n[4],
            },
            ReportFormat::TocTrackNumber => {
                let data = n[5] & TOCN_DATA_TRACK != 0;
                let mut digits = n;
                digits[5] &= !TOCN_DATA_TRACK;
                Self::TrackStart {
                    time: Msf::from_digits(digits),
                    data,
                }
            }
            ReportFormat::NotReady => Self::Empty,
        }
    }
}

/// Decoded status record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPacket {
    pub status: DriveStatus,
    pub format: ReportFormat,
    pub payload: StatusPayload,
    /// Flags nibble; the track units digit for TOCN
    pub flags: u8,
}

impl StatusPacket {
    /// Record sent before the drive has accepted its first command
    pub const IDLE: Self = Self {
        status: DriveStatus::Stopped,
        format: ReportFormat::Absolute,
        payload: StatusPayload::Empty,
        flags: 0,
    };

    /// Pack into a sealed record
    pub fn to_record(&self) -> Record {
        let mut record = [0; RECORD_SIZE];
        record[0] = self.status as u8;
        record[1] = self.format as u8;
        record[2..8].copy_from_slice(&self.payload.to_nibbles());
        record[8] = self.flags;
        seal(&mut record);
        record
    }

    /// Unpack a record, verifying its checksum
    pub fn from_record(record: &Record) -> Option<Self> {
        if checksum(record) != record[RECORD_SIZE - 1] {
            return None;
        }
        let status = DriveStatus::from_nibble(record[0])?;
        let format = ReportFormat::from_nibble(record[1])?;
        let mut payload = [0; 6];
        payload.copy_from_slice(&record[2..8]);
        Some(Self {
            status,
            format,
            payload: StatusPayload::from_nibbles(format, payload),
            flags: record[8],
        })
    }
}

/// Command type tags (command nibble 0)
pub mod command_type {
    pub const NOP: u8 = 0x0;
    pub const STOP: u8 = 0x1;
    pub const REPORT_REQUEST: u8 = 0x2;
    pub const READ: u8 = 0x3;
    pub const SEEK: u8 = 0x4;
    pub const PAUSE: u8 = 0x6;
    pub const PLAY: u8 = 0x7;
    pub const FAST_FORWARD: u8 = 0x8;
    pub const REWIND: u8 = 0x9;
    pub const TRACK_SKIP: u8 = 0xA;
    pub const TRACK_CUE: u8 = 0xB;
    pub const DOOR_CLOSE: u8 = 0xC;
    pub const DOOR_OPEN: u8 = 0xD;
}

/// Decoded command record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Nop,
    Stop,
    /// Select a report format; `track` is only used by TOCN
    ReportRequest { format: u8, track: u8 },
    Read(Msf),
    Seek(Msf),
    Pause,
    Play,
    FastForward,
    Rewind,
    TrackSkip { count: u16, backward: bool },
    TrackCue,
    DoorClose,
    DoorOpen,
    Unknown(u8),
}

/// Reason a command record was refused before dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFault {
    /// Stored checksum does not match the computed one
    Checksum { stored: u8, computed: u8 },
    /// The must-be-zero nibble is set
    Reserved(u8),
}

impl Command {
    /// Validate and decode a command record
    pub fn from_record(record: &Record) -> Result<Self, CommandFault> {
        let computed = checksum(record);
        let stored = record[RECORD_SIZE - 1];
        if computed != stored {
            return Err(CommandFault::Checksum { stored, computed });
        }
        if record[1] != 0 {
            return Err(CommandFault::Reserved(record[1]));
        }
        Ok(Self::decode(record))
    }

    /// Decode a command record without validation
    pub fn decode(record: &Record) -> Self {
        let time = || {
            let mut digits = [0; 6];
            digits.copy_from_slice(&record[2..8]);
            Msf::from_digits(digits)
        };

        match record[0] {
            command_type::NOP => Self::Nop,
            command_type::STOP => Self::Stop,
            command_type::REPORT_REQUEST => Self::ReportRequest {
                format: record[3],
                track: record[4].wrapping_mul(10).wrapping_add(record[5]),
            },
            command_type::READ => Self::Read(time()),
            command_type::SEEK => Self::Seek(time()),
            command_type::PAUSE => Self::Pause,
            command_type::PLAY => Self::Play,
            command_type::FAST_FORWARD => Self::FastForward,
            command_type::REWIND => Self::Rewind,
            command_type::TRACK_SKIP => Self::TrackSkip {
                count: record[4..8]
                    .iter()
                    .fold(0u16, |acc, &n| (acc << 4) | u16::from(n & 0x0F)),
                backward: record[3] != 0,
            },
            command_type::TRACK_CUE => Self::TrackCue,
            command_type::DOOR_CLOSE => Self::DoorClose,
            command_type::DOOR_OPEN => Self::DoorOpen,
            other => Self::Unknown(other),
        }
    }

    /// Command type nibble
    pub fn type_nibble(&self) -> u8 {
        match self {
            Self::Nop => command_type::NOP,
            Self::Stop => command_type::STOP,
            Self::ReportRequest { .. } => command_type::REPORT_REQUEST,
            Self::Read(_) => command_type::READ,
            Self::Seek(_) => command_type::SEEK,
            Self::Pause => command_type::PAUSE,
            Self::Play => command_type::PLAY,
            Self::FastForward => command_type::FAST_FORWARD,
            Self::Rewind => command_type::REWIND,
            Self::TrackSkip { .. } => command_type::TRACK_SKIP,
            Self::TrackCue => command_type::TRACK_CUE,
            Self::DoorClose => command_type::DOOR_CLOSE,
            Self::DoorOpen => command_type::DOOR_OPEN,
            Self::Unknown(tag) => *tag,
        }
    }

    /// Pack into a sealed record (host side)
    pub fn to_record(&self) -> Record {
        let mut record = [0; RECORD_SIZE];
        record[0] = self.type_nibble();
        match *self {
            Self::Read(time) | Self::Seek(time) => {
                record[2..8].copy_from_slice(&time.to_digits());
            }
            Self::ReportRequest { format, track } => {
                record[3] = format;
                record[4] = track / 10;
                record[5] = track % 10;
            }
            Self::TrackSkip { count, backward } => {
                record[3] = u8::from(backward);
                record[4] = (count >> 12) as u8 & 0x0F;
                record[5] = (count >> 8) as u8 & 0x0F;
                record[6] = (count >> 4) as u8 & 0x0F;
                record[7] = count as u8 & 0x0F;
            }
            _ => {}
        }
        seal(&mut record);
        record
    }
}
