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

//! Read head seek model
//!
//! The head moves once per sector tick:
//!
//! ```text
//! forward:   distance >= coarse or head in lead-in  -> coarse step
//!            distance >= fine                       -> fine step
//!            otherwise                              -> one block
//! backward:  distance >= coarse                     -> coarse step
//!            distance >= fine                       -> fine step
//!            otherwise                              -> snap onto target
//! ```
//!
//! No step ever carries the head past the target, so every seek reaches
//! its target and the remaining distance shrinks on every tick.

use super::{CddMcu, LEADIN_SECTORS};
use crate::core::cdd::packet::DriveStatus;
use crate::core::config::CddConfig;

/// Compute the head position after one seek step
///
/// # Arguments
///
/// * `head` - Current head PBA
/// * `target` - Seek target PBA
/// * `config` - Coarse and fine step sizes
///
/// # Example
///
/// ```
/// use segacd_cdd::core::cdd::seek::step_toward;
/// use segacd_cdd::core::config::CddConfig;
///
/// let config = CddConfig::default();
/// assert_eq!(step_toward(20_000, 30_000, &config), 22_200);
/// assert_eq!(step_toward(20_000, 20_050, &config), 20_010);
/// assert_eq!(step_toward(20_000, 20_003, &config), 20_001);
/// assert_eq!(step_toward(20_003, 20_000, &config), 20_000);
/// ```
pub fn step_toward(head: u32, target: u32, config: &CddConfig) -> u32 {
    if target > head {
        let distance = target - head;
        let step = if distance >= config.coarse_seek || head < LEADIN_SECTORS {
            config.coarse_seek
        } else if distance >= config.fine_seek {
            config.fine_seek
        } else {
            1
        };
        head + step.min(distance)
    } else {
        let distance = head - target;
        if distance >= config.coarse_seek {
            head - config.coarse_seek
        } else if distance >= config.fine_seek {
            head - config.fine_seek
        } else {
            target
        }
    }
}

impl CddMcu {
    /// Move the head one step toward the seek target
    ///
    /// Ends the seek on arrival; a paused drive latches its pause point
    /// there.
    pub(super) fn advance_seek(&mut self) {
        if !self.seeking {
            return;
        }

        if self.head_pba == self.seek_pba {
            self.seeking = false;
            if self.status == DriveStatus::Paused {
                self.pause_pba = self.head_pba;
            }
            log::debug!("CDD: Seek complete at PBA {}", self.head_pba);
            return;
        }

        self.head_pba = step_toward(self.head_pba, self.seek_pba, &self.config);
        log::trace!(
            "CDD: Seeking, head {} target {}",
            self.head_pba,
            self.seek_pba
        );
    }
}
