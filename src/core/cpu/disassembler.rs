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

//! Diagnostic disassembler
//!
//! Formats instructions from the same descriptor table the interpreter
//! runs, so the trace output always matches what actually executes.

use super::decode::{self, Operand};
use crate::core::memory::Bus;

/// 68000 disassembler over the live instruction stream
pub struct Disassembler;

impl Disassembler {
    /// Disassemble the instruction at `pc`
    ///
    /// Undecodable words render as data (`dc.w`).
    pub fn disassemble(bus: &Bus, pc: u32) -> String {
        let opcode = bus.read_word(pc);
        let Some(info) = decode::lookup(opcode) else {
            return format!("dc.w ${opcode:04X}");
        };
        let op = decode::decode_op(bus, pc, opcode, info);

        let mut text = info.name.to_string();
        let operands: Vec<String> = [op.src, op.dst]
            .iter()
            .filter_map(|operand| Self::format_operand(*operand))
            .collect();
        if !operands.is_empty() {
            text.push(' ');
            text.push_str(&operands.join(","));
        }
        text
    }

    fn format_operand(op: Operand) -> Option<String> {
        Some(match op {
            Operand::None => return None,
            Operand::DataReg(r) => format!("d{r}"),
            Operand::AddrReg(r) => format!("a{r}"),
            Operand::AddrInd(r) => format!("(a{r})"),
            Operand::PostInc(r) => format!("(a{r})+"),
            Operand::PreDec(r) => format!("-(a{r})"),
            Operand::Disp16(r, d) => format!("{d}(a{r})"),
            Operand::Index8(r, x) => {
                let kind = if x.addr_reg { 'a' } else { 'd' };
                let width = if x.long { ".l" } else { ".w" };
                format!("{}(a{r},{kind}{}{width})", x.disp, x.reg)
            }
            Operand::Abs(a) => format!("${a:06X}"),
            Operand::PcRel(a) => format!("${a:06X}(pc)"),
            Operand::PcIndex(a, x) => {
                let kind = if x.addr_reg { 'a' } else { 'd' };
                format!("${a:06X}(pc,{kind}{})", x.reg)
            }
            Operand::Imm(v) => format!("#${v:X}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_mnemonics() {
        let mut bus = Bus::new();
        bus.patch_rom_word(0x1000, 0x4E71);
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "nop");

        bus.patch_rom_word(0x1000, 0x4E75);
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "rts");
    }

    #[test]
    fn test_register_operands() {
        let mut bus = Bus::new();
        // MOVE.W D1,D0
        bus.patch_rom_word(0x1000, 0x3001);
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "move.w d1,d0");
    }

    #[test]
    fn test_immediate_and_memory_operands() {
        let mut bus = Bus::new();
        // MOVE.W #$1234,(A0)
        bus.patch_rom_word(0x1000, 0x30BC);
        bus.patch_rom_word(0x1002, 0x1234);
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "move.w #$1234,(a0)");
    }

    #[test]
    fn test_branch_target_is_resolved() {
        let mut bus = Bus::new();
        // BRA.S -2 parks on itself
        bus.patch_rom_word(0x1000, 0x60FE);
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "bra $001000");
    }

    #[test]
    fn test_undecodable_word_renders_as_data() {
        let mut bus = Bus::new();
        bus.patch_rom_word(0x1000, 0x4AC0); // TAS, not implemented
        assert_eq!(Disassembler::disassemble(&bus, 0x1000), "dc.w $4AC0");
    }
}
