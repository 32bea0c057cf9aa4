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

//! Neo Geo interrupt controller
//!
//! The main board wires three sources to the 68000's autovector levels.
//! Lines stay asserted until the guest acknowledges them through the
//! acknowledge register at `0x3C000C`.
//!
//! ## Interrupt Sources
//!
//! ```text
//! Level | Source     | Acknowledge bit
//! ------|------------|----------------
//! 1     | VBLANK     | bit 2
//! 2     | TIMER      | bit 1
//! 3     | COLD_BOOT  | bit 0
//! ```

/// Autovector levels of the wired interrupt sources
pub mod lines {
    /// Vertical blank (level 1)
    pub const VBLANK: u8 = 1;

    /// Programmable timer / raster (level 2)
    pub const TIMER: u8 = 2;

    /// Cold boot / reset line (level 3)
    pub const COLD_BOOT: u8 = 3;
}

/// Level-triggered interrupt line state
///
/// # Example
///
/// ```
/// use neorx::core::interrupt::{lines, InterruptController};
///
/// let mut ic = InterruptController::new();
/// ic.raise(lines::VBLANK);
/// assert_eq!(ic.highest_pending(), Some(1));
///
/// // Guest acknowledge: bit 2 clears the VBlank line
/// ic.acknowledge_bits(0b100);
/// assert_eq!(ic.highest_pending(), None);
/// ```
pub struct InterruptController {
    /// Bit `n` set = level `n` asserted (bits 1..=7)
    asserted: u8,
}

impl InterruptController {
    /// Create a controller with all lines released
    pub fn new() -> Self {
        Self { asserted: 0 }
    }

    /// Assert an interrupt line (level 1-7)
    pub fn raise(&mut self, level: u8) {
        if (1..=7).contains(&level) {
            self.asserted |= 1 << level;
            log::trace!("interrupt line {level} raised");
        } else {
            log::warn!("attempt to raise invalid interrupt level {level}");
        }
    }

    /// Release an interrupt line
    pub fn clear(&mut self, level: u8) {
        if (1..=7).contains(&level) {
            self.asserted &= !(1 << level);
        }
    }

    /// Release every line
    pub fn clear_all(&mut self) {
        self.asserted = 0;
    }

    /// Highest asserted level, if any
    pub fn highest_pending(&self) -> Option<u8> {
        if self.asserted == 0 {
            None
        } else {
            Some(7 - self.asserted.leading_zeros() as u8)
        }
    }

    /// Guest acknowledge register: bit 0 clears level 3, bit 1 level 2,
    /// bit 2 level 1
    pub fn acknowledge_bits(&mut self, value: u8) {
        if value & 0b001 != 0 {
            self.clear(lines::COLD_BOOT);
        }
        if value & 0b010 != 0 {
            self.clear(lines::TIMER);
        }
        if value & 0b100 != 0 {
            self.clear(lines::VBLANK);
        }
        log::trace!("irq acknowledge {value:02X}, lines now {:02X}", self.asserted);
    }

    /// Raw line state, for save states
    pub fn raw_lines(&self) -> u8 {
        self.asserted
    }

    /// Restore raw line state from a save state
    pub fn set_raw_lines(&mut self, lines: u8) {
        self.asserted = lines & 0xFE;
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lines_asserted() {
        let ic = InterruptController::new();
        assert_eq!(ic.highest_pending(), None);
    }

    #[test]
    fn test_highest_level_wins() {
        let mut ic = InterruptController::new();
        ic.raise(lines::VBLANK);
        ic.raise(lines::COLD_BOOT);
        assert_eq!(ic.highest_pending(), Some(3));

        ic.clear(lines::COLD_BOOT);
        assert_eq!(ic.highest_pending(), Some(1));
    }

    #[test]
    fn test_lines_stay_until_acknowledged() {
        let mut ic = InterruptController::new();
        ic.raise(lines::TIMER);
        assert_eq!(ic.highest_pending(), Some(2));
        assert_eq!(ic.highest_pending(), Some(2));

        ic.acknowledge_bits(0b010);
        assert_eq!(ic.highest_pending(), None);
    }

    #[test]
    fn test_acknowledge_only_named_lines() {
        let mut ic = InterruptController::new();
        ic.raise(lines::VBLANK);
        ic.raise(lines::TIMER);

        // Acknowledge only the timer
        ic.acknowledge_bits(0b010);
        assert_eq!(ic.highest_pending(), Some(lines::VBLANK));
    }

    #[test]
    fn test_invalid_levels_ignored() {
        let mut ic = InterruptController::new();
        ic.raise(0);
        ic.raise(8);
        assert_eq!(ic.highest_pending(), None);
    }

    #[test]
    fn test_raw_roundtrip() {
        let mut ic = InterruptController::new();
        ic.raise(lines::VBLANK);
        ic.raise(lines::COLD_BOOT);
        let raw = ic.raw_lines();

        let mut restored = InterruptController::new();
        restored.set_raw_lines(raw);
        assert_eq!(restored.highest_pending(), Some(3));
    }
}
