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

//! CDD test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: Initialization, cold start, accessors
//! - `seek`: Seek model steps and convergence
//! - `status`: Per-mode ticks and status report formats
//! - `commands`: Command validation and execution
//! - `transport`: Nibble transport, handshake and sector streaming

use super::packet::{Command, StatusPayload};
use super::*;
use crate::core::cdc::SectorCapture;
use crate::core::fader::CdFader;
use crate::core::media::{MemoryDisc, TrackType};
use crate::core::timing::{CD_BLOCK_CLOCK_RATE, MASTER_CLOCK_RATE};



#[cfg(test)]
mod status;



/// Data track (60s, 2s pregap) followed by two audio tracks (40s, 20s)
fn three_track_disc() -> MemoryDisc {
    MemoryDisc::from_lengths(&[
        (TrackType::Data, 4500, 150),
        (TrackType::Audio, 3000, 0),
        (TrackType::Audio, 1500, 0),
    ])
    .unwrap()
}

/// Data track (60s, 2s pregap) followed by one audio track (40s)
fn two_track_disc() -> MemoryDisc {
    MemoryDisc::from_lengths(&[(TrackType::Data, 4500, 150), (TrackType::Audio, 3000, 0)])
        .unwrap()
}

fn drive_with(disc: MemoryDisc) -> CddMcu {
    CddMcu::new(Some(Box::new(disc)), CddConfig::default())
}

/// Execute a command as if it had just been shifted in
fn execute(cdd: &mut CddMcu, command: Command) {
    cdd.command_record = command.to_record();
    cdd.run_command();
}

/// Run one subcode period's state update and return the decoded report
fn tick(cdd: &mut CddMcu, ga: &mut GateArray) -> StatusPacket {
    cdd.update_status(ga);
    StatusPacket::from_record(&cdd.status_record).expect("status record should decode")
}

/// Request TOCT and tick until the drive has finished the TOC scan and
/// settled on the first track
fn read_toc(cdd: &mut CddMcu, ga: &mut GateArray) {
    execute(
        cdd,
        Command::ReportRequest {
            format: ReportFormat::TocTrackCount as u8,
            track: 0,
        },
    );
    for _ in 0..1000 {
        tick(cdd, ga);
        if cdd.toc_valid && !cdd.seeking {
            return;
        }
    }
    panic!("TOC read did not finish");
}

/// Master clock cycle whose conversion lands exactly on `internal`
fn host_for(internal: Cycle) -> Cycle {
    (u64::from(internal) * MASTER_CLOCK_RATE).div_ceil(CD_BLOCK_CLOCK_RATE) as Cycle
}

/// Drive wired to its collaborators with the link enabled at cycle 0
struct Rig {
    cdd: CddMcu,
    ga: GateArray,
    cdc: SectorCapture,
    fader: CdFader,
}

impl Rig {
    fn new(disc: MemoryDisc) -> Self {
        let mut ga = GateArray::new();
        ga.set_control(CddControl::HOCK);
        let mut cdd = drive_with(disc);
        cdd.hock_enabled();
        Self {
            cdd,
            ga,
            cdc: SectorCapture::new(),
            fader: CdFader::new(),
        }
    }

    /// Run until every MCU step before CD block cycle `internal` has executed
    fn run_to(&mut self, internal: Cycle) {
        self.cdd.run(
            host_for(internal),
            &mut self.ga,
            &mut self.cdc,
            &mut self.fader,
        );
    }

    fn run_sectors(&mut self, sectors: u32) {
        let target = self.cdd.cycle() + sectors * SECTOR_CLOCKS;
        self.run_to(target);
    }

    /// Host side: queue a command for the next command window
    fn send(&mut self, command: Command) {
        self.ga.write_command(&command.to_record());
        self.cdd.start_command_receive(&mut self.ga);
    }

    fn report(&self) -> StatusPacket {
        StatusPacket::from_record(&self.ga.read_status()).expect("status record should decode")
    }
}
