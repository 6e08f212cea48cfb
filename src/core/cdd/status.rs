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

//! Per-sector drive state update and status report generation
//!
//! Once per subcode period the drive first runs the tick for its current
//! mode (head motion, TOC scan, track resolution), then samples its state
//! into the outgoing status record.

use super::msf::Msf;
use super::packet::{DriveStatus, ReportFormat, StatusPacket, StatusPayload};
use super::{CddMcu, LEADIN_SECTORS};
use crate::core::gate_array::{CddControl, GateArray};
use crate::core::media::{MediaType, Track, TrackType};

/// Locate a disc-relative block in the track table
///
/// Block addresses include every fake pregap; track start/end values do
/// not. Inside a pregap (or any gap before a track's start) the relative
/// time counts down, reaching zero where the track begins.
///
/// # Returns
///
/// `(track index, relative blocks)`. Past the last track the index stays on
/// the last track and the block count is the address minus all pregaps.
///
/// # Example
///
/// ```
/// use segacd_cdd::core::cdd::status::locate;
/// use segacd_cdd::core::media::{Track, TrackType};
///
/// let tracks = [
///     Track::new(TrackType::Data, 0, 1000, 150),
///     Track::new(TrackType::Audio, 1000, 2000, 0),
/// ];
/// assert_eq!(locate(&tracks, 0), (0, 150));
/// assert_eq!(locate(&tracks, 150), (0, 0));
/// assert_eq!(locate(&tracks, 1200), (1, 50));
/// ```
pub fn locate(tracks: &[Track], lba: u32) -> (usize, u32) {
    let mut shift = 0;
    for (index, track) in tracks.iter().enumerate() {
        shift += track.fake_pregap;
        if lba < track.end_lba + shift {
            return (index, (track.start_lba + shift).abs_diff(lba));
        }
    }
    (tracks.len().saturating_sub(1), lba.saturating_sub(shift))
}

/// Total disc length in blocks, pregaps included
pub fn disc_length(tracks: &[Track]) -> u32 {
    let pregaps: u32 = tracks.iter().map(|t| t.fake_pregap).sum();
    tracks.last().map_or(0, |t| t.end_lba) + pregaps
}

/// Start of a track (0-based index) in disc-relative blocks
pub fn track_start(tracks: &[Track], index: usize) -> Option<u32> {
    let track = tracks.get(index)?;
    let pregaps: u32 = tracks[..=index].iter().map(|t| t.fake_pregap).sum();
    Some(track.start_lba + pregaps)
}

impl CddMcu {
    /// Run the current mode's tick and rebuild the status record
    pub(super) fn update_status(&mut self, gate_array: &mut GateArray) {
        gate_array.set_control(CddControl::MUTE);

        match self.status {
            DriveStatus::Playing => {
                self.advance_seek();
                if !self.seeking {
                    self.head_pba += 1;
                }
                self.resolve_track(gate_array);
            }
            DriveStatus::Paused => {
                self.advance_seek();
                if !self.seeking {
                    self.head_pba += 1;
                    let fine = self.config.fine_seek;
                    if self.head_pba > self.pause_pba.saturating_add(fine) {
                        self.head_pba = self.pause_pba.saturating_sub(fine).max(LEADIN_SECTORS);
                    }
                }
                self.resolve_track(gate_array);
            }
            DriveStatus::TocReading => self.toc_read_tick(),
            DriveStatus::Tracking => {
                self.advance_seek();
                if !self.seeking {
                    log::debug!("CDD: Track skip landed at PBA {}", self.head_pba);
                    self.status = DriveStatus::Paused;
                    self.pause_pba = self.head_pba;
                }
                self.resolve_track(gate_array);
            }
            _ => {}
        }

        let packet = if self.first_command_received {
            let muted = gate_array.control_set(CddControl::MUTE);
            self.build_report(muted)
        } else {
            StatusPacket::IDLE
        };

        self.status_record = packet.to_record();
        if packet.format != ReportFormat::NotReady {
            log::trace!("CDD: Status {:X?}", self.status_record);
        }
    }

    fn toc_read_tick(&mut self) {
        self.advance_seek();
        if self.seeking {
            return;
        }
        self.head_pba += 1;

        let tracks = match &self.media {
            Some(media) if media.media_type() == MediaType::CdRom && media.num_tracks() > 0 => {
                media.tracks()
            }
            _ => {
                log::debug!("CDD: No disc found during TOC read");
                self.status = DriveStatus::NoDisc;
                return;
            }
        };

        let scan_budget = 3 * (tracks.len() as u32 + 2);
        if self.head_pba > scan_budget {
            let first = tracks[0];
            self.toc_valid = true;
            self.seeking = true;
            self.seek_pba = LEADIN_SECTORS + first.start_lba + first.fake_pregap;
            self.status = DriveStatus::Paused;
            log::debug!(
                "CDD: TOC read complete ({} tracks), seeking to PBA {}",
                tracks.len(),
                self.seek_pba
            );
        }
    }

    /// Position the media on the head's block and unmute over audio
    fn resolve_track(&mut self, gate_array: &mut GateArray) {
        if self.head_pba < LEADIN_SECTORS {
            return;
        }
        let Some(media) = self.media.as_mut() else {
            return;
        };

        let index = media.seek(self.head_pba - LEADIN_SECTORS);
        let audio = media
            .tracks()
            .get(index)
            .is_some_and(|t| t.track_type == TrackType::Audio);
        if !self.seeking && audio {
            gate_array.clear_control(CddControl::MUTE);
        }
    }

    /// Sample the drive state into a status packet
    ///
    /// A selection that is not valid right now degrades to NotReady for
    /// this record only; `requested_format` is left alone.
    fn build_report(&mut self, muted: bool) -> StatusPacket {
        let (mut format, mut payload) = match self.report_payload() {
            Some(payload) => (self.requested_format, payload),
            None => (ReportFormat::NotReady, StatusPayload::Empty),
        };

        let status = match self.pending_error.take() {
            Some(error) => {
                format = ReportFormat::NotReady;
                payload = StatusPayload::Empty;
                error
            }
            None if self.requested_format.is_toc() => DriveStatus::TocReading,
            None if self.seeking && self.status != DriveStatus::Tracking => DriveStatus::Seeking,
            None => self.status,
        };

        let flags = if self.requested_format == ReportFormat::TocTrackNumber {
            self.requested_track % 10
        } else {
            u8::from(muted)
        };

        StatusPacket {
            status,
            format,
            payload,
            flags,
        }
    }

    /// Payload for the requested format, or `None` when not ready
    fn report_payload(&self) -> Option<StatusPayload> {
        let tracks = self.tracks();
        if tracks.is_empty() || !self.toc_valid {
            return None;
        }
        let head_lba = self.head_pba.checked_sub(LEADIN_SECTORS);

        match self.requested_format {
            ReportFormat::Absolute => Some(StatusPayload::Time(Msf::from_lba(head_lba?))),
            ReportFormat::Relative => {
                let (_, relative) = locate(tracks, head_lba?);
                Some(StatusPayload::Time(Msf::from_lba(relative)))
            }
            ReportFormat::Track => {
                let (index, _) = locate(tracks, head_lba?);
                Some(StatusPayload::Track {
                    number: (index + 1) as u8,
                    data: tracks[index].track_type == TrackType::Data,
                })
            }
            ReportFormat::TocOverview => {
                Some(StatusPayload::Time(Msf::from_lba(disc_length(tracks))))
            }
            ReportFormat::TocTrackCount => Some(StatusPayload::TrackRange {
                first: 1,
                last: tracks.len() as u8,
                version: 0,
            }),
            ReportFormat::TocTrackNumber => {
                let index = usize::from(self.requested_track).checked_sub(1)?;
                let Some(start) = track_start(tracks, index) else {
                    log::warn!("CDD: TOCN for track {} is out of range", self.requested_track);
                    return None;
                };
                Some(StatusPayload::TrackStart {
                    time: Msf::from_lba(start),
                    data: tracks[index].track_type == TrackType::Data,
                })
            }
            ReportFormat::NotReady => None,
        }
    }
}
