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

//! Effective-address resolution
//!
//! Operand *decoding* happened at block-compile time; what remains at
//! execution time is resolving register-relative addresses and applying the
//! post-increment / pre-decrement side effects, which are live state and
//! must re-run on every pass through a compiled block.

use super::decode::{IndexExt, Operand, Size};
use super::Cpu;
use crate::core::memory::Bus;

impl Cpu {
    /// Address register step for (An)+ / -(An)
    ///
    /// A byte-sized access through A7 moves by two to keep the stack
    /// pointer word-aligned.
    #[inline(always)]
    fn step_for(reg: u8, size: Size) -> u32 {
        if reg == 7 && matches!(size, Size::Byte) {
            2
        } else {
            size.bytes()
        }
    }

    /// Index contribution of a brief extension word
    #[inline(always)]
    fn index_offset(&self, ext: IndexExt) -> u32 {
        let raw = if ext.addr_reg {
            self.regs.a[ext.reg as usize]
        } else {
            self.regs.d[ext.reg as usize]
        };
        let idx = if ext.long {
            raw
        } else {
            raw as u16 as i16 as i32 as u32
        };
        idx.wrapping_add(ext.disp as i32 as u32)
    }

    /// Resolve the guest address of a memory operand
    ///
    /// Applies the (An)+ / -(An) register side effect, so call at most once
    /// per operand per execution.
    pub(crate) fn ea_addr(&mut self, op: Operand, size: Size) -> u32 {
        match op {
            Operand::AddrInd(r) => self.regs.a[r as usize],
            Operand::PostInc(r) => {
                let addr = self.regs.a[r as usize];
                self.regs.a[r as usize] = addr.wrapping_add(Self::step_for(r, size));
                addr
            }
            Operand::PreDec(r) => {
                let addr = self.regs.a[r as usize].wrapping_sub(Self::step_for(r, size));
                self.regs.a[r as usize] = addr;
                addr
            }
            Operand::Disp16(r, d) => self.regs.a[r as usize].wrapping_add(d as i32 as u32),
            Operand::Index8(r, ext) => self.regs.a[r as usize].wrapping_add(self.index_offset(ext)),
            Operand::Abs(a) => a,
            Operand::PcRel(a) => a,
            Operand::PcIndex(base, ext) => base.wrapping_add(self.index_offset(ext)),
            _ => unreachable!("not a memory operand: {op:?}"),
        }
    }

    /// Read an operand value at the given size
    pub(crate) fn read_operand(&mut self, bus: &mut Bus, op: Operand, size: Size) -> u32 {
        match op {
            Operand::DataReg(r) => self.regs.d_read(r, size),
            Operand::AddrReg(r) => self.regs.a[r as usize] & size.mask(),
            Operand::Imm(v) => v & size.mask(),
            Operand::None => unreachable!("read of an absent operand"),
            _ => {
                let addr = self.ea_addr(op, size);
                bus.read_sized(addr, size)
            }
        }
    }

    /// Write an operand value at the given size
    ///
    /// Writes to address registers always replace the full register with the
    /// sign-extended value, as the 68000 does.
    pub(crate) fn write_operand(&mut self, bus: &mut Bus, op: Operand, size: Size, value: u32) {
        match op {
            Operand::DataReg(r) => self.regs.d_write(r, size, value),
            Operand::AddrReg(r) => self.regs.a[r as usize] = size.sign_extend(value),
            Operand::None | Operand::Imm(_) => unreachable!("write to a read-only operand"),
            _ => {
                let addr = self.ea_addr(op, size);
                bus.write_sized(addr, value, size);
            }
        }
    }

    /// Read-modify-write an operand, resolving a memory address only once
    pub(crate) fn rmw_operand(
        &mut self,
        bus: &mut Bus,
        op: Operand,
        size: Size,
        f: impl FnOnce(&mut Cpu, u32) -> u32,
    ) {
        match op {
            Operand::DataReg(r) => {
                let v = self.regs.d_read(r, size);
                let result = f(self, v);
                self.regs.d_write(r, size, result);
            }
            Operand::AddrReg(r) => {
                let v = self.regs.a[r as usize] & size.mask();
                let result = f(self, v);
                self.regs.a[r as usize] = size.sign_extend(result);
            }
            _ => {
                let addr = self.ea_addr(op, size);
                let v = bus.read_sized(addr, size);
                let result = f(self, v);
                bus.write_sized(addr, result, size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Cpu, Bus) {
        (Cpu::new(), Bus::new())
    }

    #[test]
    fn test_postincrement_steps_by_size() {
        let (mut cpu, _) = setup();
        cpu.regs.a[2] = 0x0010_0000;

        assert_eq!(cpu.ea_addr(Operand::PostInc(2), Size::Byte), 0x0010_0000);
        assert_eq!(cpu.regs.a[2], 0x0010_0001);

        assert_eq!(cpu.ea_addr(Operand::PostInc(2), Size::Word), 0x0010_0001);
        assert_eq!(cpu.regs.a[2], 0x0010_0003);

        assert_eq!(cpu.ea_addr(Operand::PostInc(2), Size::Long), 0x0010_0003);
        assert_eq!(cpu.regs.a[2], 0x0010_0007);
    }

    #[test]
    fn test_predecrement_steps_before_use() {
        let (mut cpu, _) = setup();
        cpu.regs.a[3] = 0x0010_0010;

        assert_eq!(cpu.ea_addr(Operand::PreDec(3), Size::Long), 0x0010_000C);
        assert_eq!(cpu.regs.a[3], 0x0010_000C);
    }

    #[test]
    fn test_byte_stack_accesses_stay_word_aligned() {
        let (mut cpu, _) = setup();
        cpu.regs.a[7] = 0x0010_F000;

        cpu.ea_addr(Operand::PostInc(7), Size::Byte);
        assert_eq!(cpu.regs.a[7], 0x0010_F002);

        assert_eq!(cpu.ea_addr(Operand::PreDec(7), Size::Byte), 0x0010_F000);
        assert_eq!(cpu.regs.a[7], 0x0010_F000);
    }

    #[test]
    fn test_displacement_addressing() {
        let (mut cpu, _) = setup();
        cpu.regs.a[1] = 0x0010_0100;
        assert_eq!(cpu.ea_addr(Operand::Disp16(1, 0x20), Size::Word), 0x0010_0120);
        assert_eq!(cpu.ea_addr(Operand::Disp16(1, -0x10), Size::Word), 0x0010_00F0);
        // Register is untouched
        assert_eq!(cpu.regs.a[1], 0x0010_0100);
    }

    #[test]
    fn test_index_word_and_long() {
        let (mut cpu, _) = setup();
        cpu.regs.a[0] = 0x0010_0000;
        cpu.regs.d[1] = 0xFFFF_FFFE; // -2 as long, -2 as word

        // Word-sized index sign-extends the low word
        let ext = IndexExt {
            reg: 1,
            addr_reg: false,
            long: false,
            disp: 4,
        };
        assert_eq!(cpu.ea_addr(Operand::Index8(0, ext), Size::Word), 0x0010_0002);

        // Long index uses the whole register
        let ext = IndexExt {
            reg: 1,
            addr_reg: false,
            long: true,
            disp: 4,
        };
        assert_eq!(cpu.ea_addr(Operand::Index8(0, ext), Size::Word), 0x0010_0002);

        // Positive word index, address register
        cpu.regs.a[2] = 0x100;
        let ext = IndexExt {
            reg: 2,
            addr_reg: true,
            long: false,
            disp: -8,
        };
        assert_eq!(cpu.ea_addr(Operand::Index8(0, ext), Size::Word), 0x0010_00F8);
    }

    #[test]
    fn test_register_read_write_masking() {
        let (mut cpu, mut bus) = setup();
        cpu.regs.d[4] = 0x1122_3344;

        assert_eq!(cpu.read_operand(&mut bus, Operand::DataReg(4), Size::Byte), 0x44);
        assert_eq!(cpu.read_operand(&mut bus, Operand::DataReg(4), Size::Word), 0x3344);

        cpu.write_operand(&mut bus, Operand::DataReg(4), Size::Byte, 0xFF);
        assert_eq!(cpu.regs.d[4], 0x1122_33FF);
    }

    #[test]
    fn test_address_register_write_sign_extends() {
        let (mut cpu, mut bus) = setup();
        cpu.write_operand(&mut bus, Operand::AddrReg(5), Size::Word, 0x8000);
        assert_eq!(cpu.regs.a[5], 0xFFFF_8000);
    }

    #[test]
    fn test_memory_roundtrip_through_ram() {
        let (mut cpu, mut bus) = setup();
        cpu.regs.a[0] = 0x0010_0040;

        cpu.write_operand(&mut bus, Operand::AddrInd(0), Size::Long, 0xDEAD_BEEF);
        assert_eq!(cpu.read_operand(&mut bus, Operand::AddrInd(0), Size::Long), 0xDEAD_BEEF);
        // Big-endian layout in guest memory
        assert_eq!(bus.read_byte(0x0010_0040), 0xDE);
        assert_eq!(bus.read_byte(0x0010_0043), 0xEF);
    }

    #[test]
    fn test_rmw_applies_side_effect_once() {
        let (mut cpu, mut bus) = setup();
        cpu.regs.a[6] = 0x0010_0020;
        bus.write_word(0x0010_001E, 0x00FF);

        // -(A6) must decrement exactly once even though the operand is both
        // read and written
        cpu.rmw_operand(&mut bus, Operand::PreDec(6), Size::Word, |_, v| v + 1);
        assert_eq!(cpu.regs.a[6], 0x0010_001E);
        assert_eq!(bus.read_word(0x0010_001E), 0x0100);
    }
}
