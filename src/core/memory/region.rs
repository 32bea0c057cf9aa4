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

//! Page classification for the 24-bit guest address space
//!
//! The address space is divided into 4,096 pages of 4 KiB. Every access
//! indexes the page table with `(addr >> 12) & 0xFFF` and dispatches on the
//! page kind — the dense-table equivalent of per-page access routines.

use super::Bus;

/// What lives in one 4 KiB page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Program ROM, vector table at address 0
    MainRom,
    /// 64 KiB work RAM
    WorkRam,
    /// Bank-switched ROM window (bank select register at the top)
    BankedRom,
    /// Hardware registers (inputs, watchdog, sound latch, video)
    Io,
    /// Palette RAM
    Palette,
    /// System BIOS ROM
    Bios,
    /// Battery-backed backup RAM
    BackupRam,
    /// Nothing decodes here
    Unmapped,
}

/// Build the 4,096-entry page table for the Neo Geo memory map
pub(super) fn build_page_table() -> [PageKind; 4096] {
    let mut pages = [PageKind::Unmapped; 4096];
    for (index, page) in pages.iter_mut().enumerate() {
        *page = match index {
            0x000..=0x0FF => PageKind::MainRom,
            0x100..=0x10F => PageKind::WorkRam,
            0x200..=0x2FF => PageKind::BankedRom,
            0x300..=0x3FF => PageKind::Io,
            0x400..=0x401 => PageKind::Palette,
            0xC00..=0xC1F => PageKind::Bios,
            0xD00..=0xD0F => PageKind::BackupRam,
            _ => PageKind::Unmapped,
        };
    }
    pages
}

impl Bus {
    /// Page kind an address decodes to
    pub fn page_kind(&self, addr: u32) -> PageKind {
        self.page(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_map_layout() {
        let bus = Bus::new();

        assert_eq!(bus.page_kind(0x00_0000), PageKind::MainRom);
        assert_eq!(bus.page_kind(0x0F_FFFF), PageKind::MainRom);
        assert_eq!(bus.page_kind(0x10_0000), PageKind::WorkRam);
        assert_eq!(bus.page_kind(0x10_FFFF), PageKind::WorkRam);
        assert_eq!(bus.page_kind(0x11_0000), PageKind::Unmapped);
        assert_eq!(bus.page_kind(0x20_0000), PageKind::BankedRom);
        assert_eq!(bus.page_kind(0x2F_FFFF), PageKind::BankedRom);
        assert_eq!(bus.page_kind(0x30_0000), PageKind::Io);
        assert_eq!(bus.page_kind(0x3C_000C), PageKind::Io);
        assert_eq!(bus.page_kind(0x40_0000), PageKind::Palette);
        assert_eq!(bus.page_kind(0x40_1FFF), PageKind::Palette);
        assert_eq!(bus.page_kind(0x40_2000), PageKind::Unmapped);
        assert_eq!(bus.page_kind(0xC0_0000), PageKind::Bios);
        assert_eq!(bus.page_kind(0xD0_0000), PageKind::BackupRam);
        assert_eq!(bus.page_kind(0xE0_0000), PageKind::Unmapped);
    }

    #[test]
    fn test_addresses_wrap_to_24_bits() {
        let bus = Bus::new();
        // The 68000 only drives 24 address lines
        assert_eq!(bus.page_kind(0xFF10_0000), PageKind::WorkRam);
    }
}
