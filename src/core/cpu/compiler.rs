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

//! Basic-block compiler
//!
//! Pre-decodes a straight-line run of instructions starting at a guest PC
//! into a [`CompiledBlock`]: an array of [`DecodedOp`] records plus the
//! summed clock cost, tagged with the ROM bank seen at compile time. A block
//! ends at the first instruction that can change control flow, at a 4 KiB
//! page boundary, at an undecodable word, or at a safety cap.
//!
//! Compilation only reads guest memory. Two compilations of the same ROM
//! range under the same bank produce identical blocks.

use std::cell::Cell;

use super::decode::{self, DecodedOp};
use crate::core::memory::Bus;

/// Upper bound on records per block; real blocks end long before this
pub const MAX_BLOCK_OPS: usize = 256;

/// A pre-decoded basic block
///
/// Blocks are immutable once built; the pass counter is diagnostic only.
#[derive(Debug)]
pub struct CompiledBlock {
    /// Guest address of the first instruction
    pub pc: u32,
    /// ROM bank register captured at compile time (0 outside the window)
    pub bank: u32,
    /// Sum of the member descriptor clocks, billed once per execution
    pub clocks: u32,
    /// The decoded instructions, in program order
    pub ops: Vec<DecodedOp>,
    /// Number of times the block has been executed
    passes: Cell<u64>,
}

impl CompiledBlock {
    /// Assemble a block from its parts
    pub fn new(pc: u32, bank: u32, clocks: u32, ops: Vec<DecodedOp>) -> Self {
        Self {
            pc,
            bank,
            clocks,
            ops,
            passes: Cell::new(0),
        }
    }

    /// Record one execution of this block
    #[inline(always)]
    pub fn note_pass(&self) {
        self.passes.set(self.passes.get() + 1);
    }

    /// Number of times the block has been executed
    pub fn passes(&self) -> u64 {
        self.passes.get()
    }
}

/// Compile the block starting at `pc` under the given bank tag
///
/// An empty `ops` array means the very first word did not decode; the
/// execution driver falls back to the live illegal-instruction path in that
/// case.
pub fn compile_block(bus: &Bus, pc: u32, bank: u32) -> CompiledBlock {
    let page = pc & !0xFFF;
    let mut ops = Vec::new();
    let mut clocks = 0;
    let mut cursor = pc;

    loop {
        let opcode = bus.read_word(cursor);
        let Some(info) = decode::lookup(opcode) else {
            // Cut the block before the undecodable word so the driver can
            // raise the exception with live state
            break;
        };
        let op = decode::decode_op(bus, cursor, opcode, info);
        cursor = op.next_pc();
        clocks += info.clocks;
        ops.push(op);

        if info.ends_block || ops.len() >= MAX_BLOCK_OPS {
            break;
        }
        // Refuse to follow the stream into the next page
        if cursor & !0xFFF != page {
            break;
        }
    }

    CompiledBlock::new(pc, bank, clocks, ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn program(bus: &mut Bus, base: u32, words: &[u16]) {
        let mut addr = base;
        for &w in words {
            bus.patch_rom_word(addr, w);
            addr += 2;
        }
    }

    #[test]
    fn test_block_ends_at_control_flow() {
        let mut bus = Bus::new();
        // NOP; NOP; RTS; NOP (the trailing NOP must not be included)
        program(&mut bus, 0x1000, &[0x4E71, 0x4E71, 0x4E75, 0x4E71]);

        let block = compile_block(&bus, 0x1000, 0);
        assert_eq!(block.ops.len(), 3);
        assert_eq!(block.clocks, 4 + 4 + 16);
        assert_eq!(block.ops[0].pc, 0x1000);
        assert_eq!(block.ops[2].pc, 0x1004);
    }

    #[test]
    fn test_block_cut_before_undecodable_word() {
        let mut bus = Bus::new();
        // NOP; MOVEP encoding (not implemented)
        program(&mut bus, 0x1000, &[0x4E71, 0x0188]);

        let block = compile_block(&bus, 0x1000, 0);
        assert_eq!(block.ops.len(), 1);
        assert_eq!(block.clocks, 4);
    }

    #[test]
    fn test_block_with_illegal_first_word_is_empty() {
        let mut bus = Bus::new();
        program(&mut bus, 0x1000, &[0x0188]);

        let block = compile_block(&bus, 0x1000, 0);
        assert!(block.ops.is_empty());
        assert_eq!(block.clocks, 0);
    }

    #[test]
    fn test_block_respects_page_boundary() {
        let mut bus = Bus::new();
        // Fill the tail of a page with NOPs and continue into the next one
        let base = 0x1FF8;
        program(&mut bus, base, &[0x4E71, 0x4E71, 0x4E71, 0x4E71, 0x4E71, 0x4E75]);

        let block = compile_block(&bus, base, 0);
        // 0x1FF8, 0x1FFA, 0x1FFC, 0x1FFE then the page ends
        assert_eq!(block.ops.len(), 4);
        assert_eq!(block.ops.last().unwrap().pc, 0x1FFE);
    }

    #[test]
    fn test_extension_words_are_folded_in() {
        let mut bus = Bus::new();
        // MOVE.W #$1234,D0; BRA.S -2
        program(&mut bus, 0x1000, &[0x303C, 0x1234, 0x60FE]);

        let block = compile_block(&bus, 0x1000, 0);
        assert_eq!(block.ops.len(), 2);
        assert_eq!(block.ops[0].length, 4);
        assert_eq!(block.ops[1].pc, 0x1004);
    }

    #[test]
    fn test_bank_tag_is_recorded() {
        let mut bus = Bus::new();
        bus.set_bank_address(0xA);
        bus.patch_rom_word(0x20_0100, 0x4E75);

        let block = compile_block(&bus, 0x20_0100, bus.bank_address());
        assert_eq!(block.bank, 0xA);
    }

    proptest! {
        /// Compiling the same address twice yields identical blocks
        #[test]
        fn prop_compilation_is_pure(words in proptest::collection::vec(any::<u16>(), 1..32)) {
            let mut bus = Bus::new();
            let mut addr = 0x2000u32;
            for &w in &words {
                bus.patch_rom_word(addr, w);
                addr += 2;
            }

            let a = compile_block(&bus, 0x2000, 0);
            let b = compile_block(&bus, 0x2000, 0);
            prop_assert_eq!(a.ops, b.ops);
            prop_assert_eq!(a.clocks, b.clocks);
        }

        /// Non-terminating records advance the pc by their encoded length,
        /// which is always 2-10 bytes
        #[test]
        fn prop_record_lengths_bounded(words in proptest::collection::vec(any::<u16>(), 1..32)) {
            let mut bus = Bus::new();
            let mut addr = 0x2000u32;
            for &w in &words {
                bus.patch_rom_word(addr, w);
                addr += 2;
            }

            let block = compile_block(&bus, 0x2000, 0);
            for op in &block.ops {
                prop_assert!(op.length >= 2 && op.length <= 10);
                prop_assert!(op.length % 2 == 0);
            }
            // Records are contiguous
            for pair in block.ops.windows(2) {
                prop_assert_eq!(pair[0].next_pc(), pair[1].pc);
            }
        }
    }
}
