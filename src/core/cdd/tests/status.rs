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

use super::*;

/// Skip the TOC scan: mark the TOC read and the link live
fn ready(cdd: &mut CddMcu, format: ReportFormat) {
    cdd.toc_valid = true;
    cdd.first_command_received = true;
    cdd.requested_format = format;
}

fn time_of(report: &StatusPacket) -> Msf {
    match report.payload {
        StatusPayload::Time(time) => time,
        other => panic!("expected a time payload, got {:?}", other),
    }
}

#[test]
fn test_toc_bring_up() {
    let mut cdd = drive_with(three_track_disc());
    let mut ga = GateArray::new();

    execute(
        &mut cdd,
        Command::ReportRequest {
            format: ReportFormat::TocTrackCount as u8,
            track: 0,
        },
    );
    assert_eq!(cdd.status(), DriveStatus::TocReading);

    // Scan budget is 3 * (3 + 2) blocks
    for _ in 0..15 {
        let report = tick(&mut cdd, &mut ga);
        assert_eq!(report.status, DriveStatus::TocReading);
        assert_eq!(report.format, ReportFormat::NotReady);
        assert!(!cdd.toc_valid());
    }

    let report = tick(&mut cdd, &mut ga);
    assert!(cdd.toc_valid());
    assert_eq!(cdd.status(), DriveStatus::Paused);
    assert_eq!(cdd.seek_pba(), LEADIN_SECTORS + 150);
    assert_eq!(report.status, DriveStatus::TocReading);
    assert_eq!(report.format, ReportFormat::TocTrackCount);
    assert_eq!(
        report.payload,
        StatusPayload::TrackRange {
            first: 1,
            last: 3,
            version: 0
        }
    );

    execute(
        &mut cdd,
        Command::ReportRequest {
            format: ReportFormat::TocOverview as u8,
            track: 0,
        },
    );
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.format, ReportFormat::TocOverview);
    assert_eq!(report.status, DriveStatus::TocReading);
    // 4500 + 3000 + 1500 blocks plus the 150 block pregap
    assert_eq!(time_of(&report), Msf::new(2, 2, 0));
}

#[test]
fn test_toc_read_settles_on_first_track() {
    let mut cdd = drive_with(three_track_disc());
    let mut ga = GateArray::new();
    read_toc(&mut cdd, &mut ga);

    assert_eq!(cdd.status(), DriveStatus::Paused);
    assert_eq!(cdd.pause_pba, LEADIN_SECTORS + 150);
}

#[test]
fn test_pause_wobbles_around_pause_point() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    read_toc(&mut cdd, &mut ga);
    let pause = cdd.pause_pba;

    let mut wrapped = false;
    let mut previous = cdd.head_pba();
    for _ in 0..100 {
        tick(&mut cdd, &mut ga);
        let head = cdd.head_pba();
        assert!(head >= pause - 10 && head <= pause + 10, "head {} strayed", head);
        wrapped |= head < previous;
        previous = head;
    }
    assert!(wrapped);
}

#[test]
fn test_pause_wobble_floor_is_leadin() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    cdd.status = DriveStatus::Paused;
    cdd.pause_pba = LEADIN_SECTORS + 2;
    cdd.head_pba = LEADIN_SECTORS + 12;

    tick(&mut cdd, &mut ga);
    assert_eq!(cdd.head_pba(), LEADIN_SECTORS);
}

#[test]
fn test_absolute_time() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.head_pba = LEADIN_SECTORS + 4500;

    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.status, DriveStatus::Stopped);
    assert_eq!(report.format, ReportFormat::Absolute);
    assert_eq!(time_of(&report), Msf::new(1, 0, 0));
}

#[test]
fn test_absolute_not_ready_in_leadin() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.head_pba = LEADIN_SECTORS - 1;

    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.format, ReportFormat::NotReady);
    assert_eq!(report.payload, StatusPayload::Empty);
    // The selection itself survives
    assert_eq!(cdd.report_format(), ReportFormat::Absolute);
}

#[test]
fn test_relative_time_counts_down_in_pregap() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Relative);

    let mut previous = None;
    for lba in 0..=150 {
        cdd.head_pba = LEADIN_SECTORS + lba;
        let relative = time_of(&tick(&mut cdd, &mut ga)).to_lba();
        assert_eq!(relative, 150 - lba);
        if let Some(previous) = previous {
            assert!(relative < previous);
        }
        previous = Some(relative);
    }

    cdd.head_pba = LEADIN_SECTORS + 151;
    assert_eq!(time_of(&tick(&mut cdd, &mut ga)).to_lba(), 1);
}

#[test]
fn test_relative_time_second_track() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Relative);

    cdd.head_pba = LEADIN_SECTORS + 4649;
    assert_eq!(time_of(&tick(&mut cdd, &mut ga)).to_lba(), 4499);

    cdd.head_pba = LEADIN_SECTORS + 4650;
    assert_eq!(time_of(&tick(&mut cdd, &mut ga)).to_lba(), 0);

    cdd.head_pba = LEADIN_SECTORS + 4650 + 75 * 30;
    assert_eq!(time_of(&tick(&mut cdd, &mut ga)), Msf::new(0, 30, 0));
}

#[test]
fn test_track_report() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Track);

    cdd.head_pba = LEADIN_SECTORS + 200;
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(
        report.payload,
        StatusPayload::Track {
            number: 1,
            data: true
        }
    );
    assert_eq!(cdd.status_record()[4], 4);
    assert_eq!(cdd.status_record()[5], 1);

    cdd.head_pba = LEADIN_SECTORS + 5000;
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(
        report.payload,
        StatusPayload::Track {
            number: 2,
            data: false
        }
    );

    // Past the end of the disc stays on the last track
    cdd.head_pba = LEADIN_SECTORS + 100_000;
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(
        report.payload,
        StatusPayload::Track {
            number: 2,
            data: false
        }
    );
}

#[test]
fn test_tocn_report() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);

    execute(
        &mut cdd,
        Command::ReportRequest {
            format: ReportFormat::TocTrackNumber as u8,
            track: 2,
        },
    );
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.status, DriveStatus::TocReading);
    assert_eq!(report.format, ReportFormat::TocTrackNumber);
    assert_eq!(
        report.payload,
        StatusPayload::TrackStart {
            time: Msf::new(1, 2, 0),
            data: false
        }
    );
    assert_eq!(report.flags, 2);

    execute(
        &mut cdd,
        Command::ReportRequest {
            format: ReportFormat::TocTrackNumber as u8,
            track: 1,
        },
    );
    tick(&mut cdd, &mut ga);
    let record = cdd.status_record();
    assert_eq!(&record[2..8], &[0, 0, 0, 2, 0, 0x80]);
    assert_eq!(record[8], 1);
}

#[test]
fn test_toct_not_ready_before_toc() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    cdd.first_command_received = true;
    cdd.requested_format = ReportFormat::TocTrackCount;

    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.format, ReportFormat::NotReady);
    assert_eq!(report.status, DriveStatus::TocReading);
}

#[test]
fn test_error_reported_once() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.head_pba = LEADIN_SECTORS + 300;
    cdd.pending_error = Some(DriveStatus::CommandError);

    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.status, DriveStatus::CommandError);
    assert_eq!(report.format, ReportFormat::NotReady);
    assert_eq!(report.payload, StatusPayload::Empty);

    let report = tick(&mut cdd, &mut ga);
    assert_eq!(report.status, DriveStatus::Stopped);
    assert_eq!(report.format, ReportFormat::Absolute);
}

#[test]
fn test_seeking_status_override() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Playing;
    cdd.head_pba = LEADIN_SECTORS + 100;
    cdd.seek_pba = LEADIN_SECTORS + 4000;
    cdd.seeking = true;

    assert_eq!(tick(&mut cdd, &mut ga).status, DriveStatus::Seeking);

    cdd.status = DriveStatus::Tracking;
    assert_eq!(tick(&mut cdd, &mut ga).status, DriveStatus::Tracking);
}

#[test]
fn test_tracking_lands_paused() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Tracking;
    cdd.head_pba = LEADIN_SECTORS + 1000;
    cdd.seek_pba = LEADIN_SECTORS + 1000;
    cdd.seeking = true;

    tick(&mut cdd, &mut ga);
    assert_eq!(cdd.status(), DriveStatus::Paused);
    assert_eq!(cdd.pause_pba, LEADIN_SECTORS + 1000);
}

#[test]
fn test_play_unmutes_over_audio() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Playing;
    cdd.head_pba = LEADIN_SECTORS + 4650;

    let report = tick(&mut cdd, &mut ga);
    assert!(!ga.control_set(CddControl::MUTE));
    assert_eq!(report.status, DriveStatus::Playing);
    assert_eq!(report.flags, 0);
    assert_eq!(time_of(&report).to_lba(), 4651);
}

#[test]
fn test_play_stays_muted_over_data() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Playing;
    cdd.head_pba = LEADIN_SECTORS + 500;

    let report = tick(&mut cdd, &mut ga);
    assert!(ga.control_set(CddControl::MUTE));
    assert_eq!(report.flags, 1);
}

#[test]
fn test_play_advances_one_block_per_tick() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Playing;
    cdd.head_pba = LEADIN_SECTORS + 1000;

    for expected in 1001..1010 {
        let report = tick(&mut cdd, &mut ga);
        assert_eq!(time_of(&report).to_lba(), expected);
    }
}

#[test]
fn test_play_past_last_time_keeps_decimal_digits() {
    let mut cdd = drive_with(two_track_disc());
    let mut ga = GateArray::new();
    ready(&mut cdd, ReportFormat::Absolute);
    cdd.status = DriveStatus::Playing;
    cdd.head_pba = LEADIN_SECTORS + crate::core::cdd::msf::MAX_LBA - 2;

    for _ in 0..5 {
        let report = tick(&mut cdd, &mut ga);
        assert!(cdd.status_record()[2..8].iter().all(|&d| d < 10));
        assert!(time_of(&report) <= Msf::new(99, 59, 74));
    }
    assert_eq!(time_of(&tick(&mut cdd, &mut ga)), Msf::new(99, 59, 74));

    cdd.requested_format = ReportFormat::Relative;
    cdd.head_pba = LEADIN_SECTORS + 600_000;
    let report = tick(&mut cdd, &mut ga);
    assert_eq!(time_of(&report), Msf::new(99, 59, 74));
    assert!(cdd.status_record()[2..8].iter().all(|&d| d < 10));
}

#[test]
fn test_locate_helpers() {
    use crate::core::cdd::status::{disc_length, locate, track_start};
    use crate::core::media::Media;

    let disc = three_track_disc();
    let tracks = disc.tracks();
    assert_eq!(disc_length(tracks), 9150);
    assert_eq!(track_start(tracks, 0), Some(150));
    assert_eq!(track_start(tracks, 2), Some(7650));
    assert_eq!(track_start(tracks, 3), None);
    assert_eq!(locate(tracks, 7650), (2, 0));
    // Past the end: the last track, with every pregap removed
    assert_eq!(locate(tracks, 9150), (2, 9000));
    assert_eq!(disc_length(&[]), 0);
}
