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

//! CDD command implementations
//!
//! Commands never fail loudly: a rejected command latches an error status
//! that the next status record reports, and otherwise leaves the drive
//! untouched.

use super::msf::Msf;
use super::packet::{Command, CommandFault, DriveStatus, ReportFormat};
use super::status::{disc_length, track_start};
use super::{CddMcu, LEADIN_SECTORS};

impl CddMcu {
    /// Validate and execute the command record that was just shifted in
    pub(super) fn run_command(&mut self) {
        let command = match Command::from_record(&self.command_record) {
            Ok(command) => command,
            Err(CommandFault::Checksum { stored, computed }) => {
                log::warn!(
                    "CDD: Command checksum mismatch (stored {:X}, computed {:X})",
                    stored,
                    computed
                );
                self.pending_error = Some(DriveStatus::ChecksumError);
                return;
            }
            Err(CommandFault::Reserved(value)) => {
                log::warn!("CDD: Command reserved nibble set to {:X}", value);
                self.pending_error = Some(DriveStatus::CommandError);
                return;
            }
        };

        self.first_command_received = true;
        log::debug!("CDD: Command {:?}", command);

        match command {
            Command::Nop => {}
            Command::Stop => self.cmd_stop(),
            Command::ReportRequest { format, track } => self.cmd_report_request(format, track),
            Command::Read(time) => self.cmd_read_seek(time, DriveStatus::Playing),
            Command::Seek(time) => self.cmd_read_seek(time, DriveStatus::Paused),
            Command::Pause => self.cmd_pause(),
            Command::Play => self.cmd_play(),
            Command::TrackSkip { count, backward } => self.cmd_track_skip(count, backward),
            Command::FastForward
            | Command::Rewind
            | Command::TrackCue
            | Command::DoorClose
            | Command::DoorOpen
            | Command::Unknown(_) => {
                log::warn!(
                    "CDD: Unimplemented command {:X}",
                    command.type_nibble()
                );
            }
        }
    }

    /// Latch a command error
    fn reject(&mut self, reason: &str) {
        log::warn!("CDD: Command rejected, {}", reason);
        self.pending_error = Some(DriveStatus::CommandError);
    }

    /// Shared gate for commands that move the head
    fn positioning_allowed(&mut self) -> bool {
        if self.status.blocks_positioning() {
            self.reject("tray or disc edge blocks positioning");
            return false;
        }
        self.toc_ready()
    }

    /// Drop a TOCT/TOCN report selection back to absolute time, then
    /// require a valid TOC
    fn toc_ready(&mut self) -> bool {
        if matches!(
            self.requested_format,
            ReportFormat::TocTrackCount | ReportFormat::TocTrackNumber
        ) {
            self.requested_format = ReportFormat::Absolute;
        }
        if !self.toc_valid {
            self.reject("TOC not read");
            return false;
        }
        true
    }

    /// Start of the first track in PBA
    fn first_track_pba(&self) -> Option<u32> {
        track_start(self.tracks(), 0).map(|start| start + LEADIN_SECTORS)
    }

    /// Start a TOC scan from block 0
    fn start_toc_read(&mut self) {
        self.status = DriveStatus::TocReading;
        self.seeking = true;
        self.seek_pba = 0;
    }

    /// Command 0x1: Stop
    fn cmd_stop(&mut self) {
        self.status = DriveStatus::Stopped;
        self.requested_format = ReportFormat::Absolute;
    }

    /// Commands 0x3 / 0x4: Read and Seek
    ///
    /// Read plays from the target once it is reached; Seek pauses there.
    fn cmd_read_seek(&mut self, time: Msf, next: DriveStatus) {
        if !self.positioning_allowed() {
            return;
        }

        let lba = time.to_lba();
        let length = disc_length(self.tracks());
        if lba >= length {
            self.reject("target beyond end of disc");
            return;
        }

        self.seek_pba = (lba + LEADIN_SECTORS).saturating_sub(self.config.pre_roll);
        self.seeking = true;
        self.status = next;
        log::debug!(
            "CDD: {} to {} (LBA {}), seeking to PBA {}",
            if next == DriveStatus::Playing { "Read" } else { "Seek" },
            time,
            lba,
            self.seek_pba
        );
    }

    /// Command 0x2: Report request
    fn cmd_report_request(&mut self, format: u8, track: u8) {
        match ReportFormat::from_nibble(format) {
            Some(
                selected @ (ReportFormat::Absolute | ReportFormat::Relative | ReportFormat::Track),
            ) => self.requested_format = selected,
            Some(ReportFormat::TocOverview) => {
                if self.toc_valid {
                    self.requested_format = ReportFormat::TocOverview;
                } else {
                    self.reject("TOCO before TOC read");
                    self.requested_format = ReportFormat::Absolute;
                }
            }
            Some(ReportFormat::TocTrackCount) => {
                if !self.toc_valid || self.status == DriveStatus::Stopped {
                    self.start_toc_read();
                }
                self.requested_format = ReportFormat::TocTrackCount;
            }
            Some(ReportFormat::TocTrackNumber) => {
                self.requested_track = track;
                let count = self.media.as_ref().map_or(0, |m| m.num_tracks());
                if track == 0 || usize::from(track) > count {
                    self.reject("TOCN track out of range");
                    self.requested_format = ReportFormat::Absolute;
                    return;
                }
                self.start_toc_read();
                self.requested_format = ReportFormat::TocTrackNumber;
            }
            _ => log::warn!("CDD: Unsupported report format {:X}", format),
        }
        log::debug!(
            "CDD: Report request {:X}, format now {:?}",
            format,
            self.requested_format
        );
    }

    /// Command 0x6: Pause
    fn cmd_pause(&mut self) {
        if !self.positioning_allowed() {
            return;
        }

        if self.status == DriveStatus::Stopped {
            if let Some(target) = self.first_track_pba() {
                self.seeking = true;
                self.seek_pba = target;
                log::debug!("CDD: Pause, seeking to PBA {}", target);
            }
        }
        self.status = DriveStatus::Paused;
        if !self.seeking {
            self.pause_pba = self.head_pba;
        }
    }

    /// Command 0x7: Play
    fn cmd_play(&mut self) {
        if !self.positioning_allowed() {
            return;
        }

        if matches!(self.status, DriveStatus::Stopped | DriveStatus::TocReading) {
            if let Some(target) = self.first_track_pba() {
                self.seeking = true;
                self.seek_pba = target.saturating_sub(self.config.pre_roll);
                log::debug!("CDD: Play, seeking to PBA {}", self.seek_pba);
            }
        }
        self.status = DriveStatus::Playing;
    }

    /// Command 0xA: Track skip
    ///
    /// The distance is an estimate: a fixed number of blocks per track.
    fn cmd_track_skip(&mut self, count: u16, backward: bool) {
        if !matches!(
            self.status,
            DriveStatus::Playing | DriveStatus::Paused | DriveStatus::Leadout
        ) {
            self.reject("track skip needs play or pause");
            return;
        }
        if !self.toc_ready() {
            return;
        }

        let distance = u32::from(count) * self.config.skip_sectors_per_track;
        self.seek_pba = if backward {
            self.head_pba.saturating_sub(distance)
        } else {
            self.head_pba.saturating_add(distance)
        };
        self.seeking = true;
        self.status = DriveStatus::Tracking;
        log::debug!(
            "CDD: Track skip {}{} tracks, seeking to PBA {}",
            if backward { "-" } else { "+" },
            count,
            self.seek_pba
        );
    }
}
