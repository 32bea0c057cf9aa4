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

//! Motorola 68000 CPU core
//!
//! A block-compiling interpreter: steady-state execution runs pre-decoded
//! basic blocks out of a per-address cache, while code in work RAM is
//! decoded fresh on every pass because the guest can rewrite it.
//!
//! # Specifications
//! - Architecture: Motorola 68000 (16/32-bit, 24-bit address bus)
//! - Clock frequency: 12 MHz on the Neo Geo main board
//! - Registers: D0-D7, A0-A7 (A7 doubles as the active stack pointer),
//!   PC, SR, and a shadow stack pointer for the inactive mode
//!
//! # Execution model
//!
//! [`Cpu::execute`] runs whole blocks until a clock budget is exhausted and
//! returns the overrun, so an outer scheduler can subtract it from the next
//! slice. [`Cpu::step`] executes a single instruction for callers that need
//! per-instruction granularity. Interrupt lines are sampled at block
//! boundaries; delivery follows the 68000 autovector protocol.
//!
//! # Example
//! ```
//! use neorx::core::cpu::Cpu;
//! use neorx::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//! bus.patch_rom_word(0x1000, 0x4E71); // NOP
//! bus.patch_rom_word(0x1002, 0x60FE); // BRA.S -2
//!
//! let mut cpu = Cpu::new();
//! cpu.regs.pc = 0x1000;
//! let overrun = cpu.execute(&mut bus, 12);
//! assert_eq!(cpu.clocks(), 14); // NOP (4) + BRA (10)
//! assert_eq!(overrun, 2);
//! ```

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::core::memory::{
    Bus, ADDR_MASK, BANK_WINDOW_END, BANK_WINDOW_START, WORK_RAM_END, WORK_RAM_START,
};

pub mod decode;

mod cache;
mod compiler;
mod disassembler;
mod ea;
mod instructions;
mod registers;
mod tracer;

pub use cache::{BlockCache, TABLE_LEN};
pub use compiler::{compile_block, CompiledBlock, MAX_BLOCK_OPS};
pub use disassembler::Disassembler;
pub use registers::{RegisterFile, StatusRegister};
pub use tracer::CpuTracer;

/// Illegal instruction vector
pub const VEC_ILLEGAL: u8 = 4;
/// Integer divide-by-zero vector
pub const VEC_ZERO_DIVIDE: u8 = 5;
/// CHK out-of-bounds vector
pub const VEC_CHK: u8 = 6;
/// TRAPV vector
pub const VEC_TRAPV: u8 = 7;
/// Privilege violation vector
pub const VEC_PRIVILEGE: u8 = 8;
/// Line-A emulator vector
pub const VEC_LINE_A: u8 = 10;
/// Line-F emulator vector
pub const VEC_LINE_F: u8 = 11;
/// Base vector for autovectored interrupts
pub const VEC_AUTO_BASE: u8 = 24;
/// Base vector for TRAP #0-15
pub const VEC_TRAP_BASE: u8 = 32;

/// Clock cost charged for exception processing of undecodable words
pub(crate) const EXCEPTION_CLOCKS: u32 = 34;

/// Serializable CPU state for save states
///
/// The block cache is deliberately absent: it is reproducible from ROM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuState {
    pub regs: RegisterFile,
    pub pending: u8,
    pub stopped: bool,
    pub clocks: u64,
}

/// Motorola 68000 CPU
pub struct Cpu {
    /// Register file
    pub regs: RegisterFile,

    /// Latched interrupt level awaiting delivery (0 = none, 1-7 otherwise)
    pending: u8,

    /// Suspended by STOP, waiting for an interrupt
    stopped: bool,

    /// Interrupt delivery inhibited while the host catches up subordinate
    /// timing (the live PC is not meaningful during such a window)
    frozen: bool,

    /// Monotonic cycle accumulator
    clocks: u64,

    /// Compiled-block cache
    cache: BlockCache,
}

impl Cpu {
    /// Create a CPU in the reset state (supervisor mode, all interrupts
    /// masked, PC at 0)
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            pending: 0,
            stopped: false,
            frozen: false,
            clocks: 0,
            cache: BlockCache::new(),
        }
    }

    /// Cold-start reset: load SSP and PC from the vector table
    ///
    /// Vector 0 holds the initial supervisor stack pointer, vector 1 the
    /// entry point. The block cache is dropped because the bank register
    /// may have been reset underneath it.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.regs = RegisterFile::new();
        self.regs.set_sp(bus.read_long(0));
        self.regs.pc = bus.read_long(4);
        self.pending = 0;
        self.stopped = false;
        self.frozen = false;
        self.cache.clear();
        log::info!(
            "cpu reset: pc={:06X} ssp={:06X}",
            self.regs.pc,
            self.regs.sp()
        );
    }

    /// Total clocks executed so far
    #[inline(always)]
    pub fn clocks(&self) -> u64 {
        self.clocks
    }

    /// Latched interrupt level (0 when none)
    #[inline(always)]
    pub fn pending(&self) -> u8 {
        self.pending
    }

    /// True while suspended by STOP
    #[inline(always)]
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    /// True while interrupt delivery is inhibited
    #[inline(always)]
    pub fn frozen(&self) -> bool {
        self.frozen
    }

    /// Inhibit or re-allow interrupt delivery
    ///
    /// Set before driving subordinate timing consumers from inside a guest
    /// memory write, cleared afterwards. Interrupt requests raised in
    /// between are latched and delivered at the next block boundary.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// The compiled-block cache (diagnostics and tests)
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    // -- Stack helpers -----------------------------------------------------

    pub(crate) fn push_long(&mut self, bus: &mut Bus, value: u32) {
        let sp = self.regs.sp().wrapping_sub(4);
        self.regs.set_sp(sp);
        bus.write_long(sp, value);
    }

    pub(crate) fn push_word(&mut self, bus: &mut Bus, value: u16) {
        let sp = self.regs.sp().wrapping_sub(2);
        self.regs.set_sp(sp);
        bus.write_word(sp, value);
    }

    pub(crate) fn pop_long(&mut self, bus: &mut Bus) -> u32 {
        let sp = self.regs.sp();
        self.regs.set_sp(sp.wrapping_add(4));
        bus.read_long(sp)
    }

    pub(crate) fn pop_word(&mut self, bus: &mut Bus) -> u16 {
        let sp = self.regs.sp();
        self.regs.set_sp(sp.wrapping_add(2));
        bus.read_word(sp)
    }

    /// Verify supervisor mode, raising a privilege violation otherwise
    ///
    /// Returns false when the violation was taken; the handler must bail out
    /// without touching guest state.
    pub(crate) fn check_supervisor(&mut self, bus: &mut Bus, op: &decode::DecodedOp) -> bool {
        if self.regs.sr.supervisor() {
            true
        } else {
            log::debug!("privilege violation at {:06X}", op.pc);
            self.vector(bus, VEC_PRIVILEGE, op.pc);
            false
        }
    }

    // -- Execution ---------------------------------------------------------

    /// Decode and execute exactly one instruction at the current PC
    ///
    /// Returns the clocks charged. Undecodable words log a diagnostic and
    /// take the illegal-instruction exception; the core never panics on
    /// guest input.
    fn step_one(&mut self, bus: &mut Bus) -> (u32, bool) {
        let pc24 = self.regs.pc & ADDR_MASK;
        let opcode = bus.read_word(pc24);
        match decode::lookup(opcode) {
            None => {
                log::error!("invalid instruction {opcode:04X} at {pc24:06X}");
                self.vector(bus, VEC_ILLEGAL, pc24);
                (EXCEPTION_CLOCKS, true)
            }
            Some(info) => {
                let op = decode::decode_op(bus, pc24, opcode, info);
                (op.handler)(self, bus, &op);
                (info.clocks, info.ends_block)
            }
        }
    }

    /// Execute one instruction and return its clock cost
    ///
    /// A deliverable pending interrupt is delivered first. While stopped,
    /// nothing executes and 0 is returned.
    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        self.poll_interrupts(bus);
        if self.stopped {
            return 0;
        }
        let (clks, _) = self.step_one(bus);
        self.clocks += u64::from(clks);
        clks
    }

    /// Execute at least `clocks` cycles; return the non-negative overrun
    ///
    /// Whole blocks are billed atomically, so the return value tells the
    /// caller how much the slice overshot; subtract it from the next budget.
    /// Interrupt lines and the pending latch are sampled at every block
    /// boundary. While stopped with no deliverable interrupt the remaining
    /// budget is idled away and 0 is returned.
    pub fn execute(&mut self, bus: &mut Bus, clocks: u32) -> u32 {
        let mut remaining = i64::from(clocks);

        self.poll_interrupts(bus);
        loop {
            if self.stopped {
                return 0;
            }

            let pc24 = self.regs.pc & ADDR_MASK;
            if (WORK_RAM_START..=WORK_RAM_END).contains(&pc24) {
                // Work RAM is writable by the guest: never cache, decode
                // fresh on every pass so self-modifying code is honored
                loop {
                    let (clks, ends) = self.step_one(bus);
                    remaining -= i64::from(clks);
                    self.clocks += u64::from(clks);
                    if ends || self.interrupt_ready(bus) {
                        break;
                    }
                }
            } else {
                let bank = if (BANK_WINDOW_START..=BANK_WINDOW_END).contains(&pc24) {
                    bus.bank_address()
                } else {
                    0
                };
                let block = match self.cache.lookup(pc24, bank) {
                    Some(block) => block,
                    None => {
                        let block = Rc::new(compiler::compile_block(bus, pc24, bank));
                        log::trace!(
                            "compiled block at {:06X} bank {:X}: {} ops, {} clocks",
                            pc24,
                            bank,
                            block.ops.len(),
                            block.clocks
                        );
                        self.cache.insert(Rc::clone(&block));
                        block
                    }
                };
                if block.ops.is_empty() {
                    // The first word did not decode; take the exception live
                    let (clks, _) = self.step_one(bus);
                    remaining -= i64::from(clks);
                    self.clocks += u64::from(clks);
                } else {
                    for op in &block.ops {
                        (op.handler)(self, bus, op);
                    }
                    block.note_pass();
                    remaining -= i64::from(block.clocks);
                    self.clocks += u64::from(block.clocks);
                }
            }

            self.poll_interrupts(bus);
            if remaining <= 0 {
                break;
            }
        }

        (-remaining) as u32
    }

    // -- Interrupts and exceptions -----------------------------------------

    /// Request delivery of autovectored interrupt `level` (1-7)
    ///
    /// Delivers immediately when the mask allows and the core is not
    /// frozen; otherwise the level is latched for the next opportunity.
    pub fn autovector(&mut self, bus: &mut Bus, level: u8) {
        if !(1..=7).contains(&level) {
            log::warn!("autovector request with invalid level {level}");
            return;
        }
        self.internal_autovector(bus, level);
    }

    /// True when a latched or line-asserted interrupt would deliver now
    ///
    /// Used to cut a RAM run short: real hardware samples interrupts
    /// between any two instructions, so uncached execution does too.
    fn interrupt_ready(&self, bus: &Bus) -> bool {
        if self.frozen {
            return false;
        }
        let level = bus.interrupt_level().unwrap_or(0).max(self.pending);
        level != 0 && (self.regs.sr.interrupt_mask() < level || level == 7)
    }

    /// Merge the interrupt-controller lines with the latch and attempt
    /// delivery; called at block boundaries
    fn poll_interrupts(&mut self, bus: &mut Bus) {
        let line = bus.interrupt_level().unwrap_or(0);
        let requested = line.max(self.pending);
        if requested != 0 {
            self.internal_autovector(bus, requested);
        }
    }

    /// Deliver-or-latch core of autovectored interrupts
    ///
    /// Level 7 is non-maskable. While frozen, nothing is delivered no
    /// matter the level; the request overwrites the latch instead and is
    /// picked up at the next opportunity.
    fn internal_autovector(&mut self, bus: &mut Bus, level: u8) {
        let current = self.regs.sr.interrupt_mask();
        if (current < level || level == 7) && !self.frozen {
            if self.stopped {
                // Step past the STOP instruction whose wait just ended
                self.regs.pc = self.regs.pc.wrapping_add(4);
                self.stopped = false;
            }
            self.regs.enter_supervisor();
            self.push_long(bus, self.regs.pc);
            self.push_word(bus, self.regs.sr.bits());
            self.regs.sr.remove(StatusRegister::TRACE);
            self.regs.sr.set_interrupt_mask(level);
            let slot = (u32::from(VEC_AUTO_BASE) + u32::from(level) - 1) * 4;
            self.regs.pc = bus.read_long(slot);
            self.pending = 0;
            log::debug!("autovector level {level} -> {:06X}", self.regs.pc);
        } else {
            self.pending = level;
            log::trace!(
                "interrupt level {level} latched (mask {current}, frozen {})",
                self.frozen
            );
        }
    }

    /// Deliver a synchronous exception through `vector`, pushing `saved_pc`
    ///
    /// Used for traps and faults where the caller knows the precise return
    /// address. Leaves `pending`, the stop state, trace and the interrupt
    /// mask alone; specific traps layer their own rules on top.
    pub fn vector(&mut self, bus: &mut Bus, vector: u8, saved_pc: u32) {
        self.regs.enter_supervisor();
        self.push_long(bus, saved_pc);
        self.push_word(bus, self.regs.sr.bits());
        self.regs.pc = bus.read_long(u32::from(vector) * 4);
        log::trace!("vector {vector} -> {:06X}", self.regs.pc);
    }

    // -- Diagnostics and save states ---------------------------------------

    /// Print every cached block chain: PC, bank tag and pass count
    pub fn dump_cache_stats(&self) {
        println!("block cache: {} blocks", self.cache.len());
        for block in self.cache.iter() {
            println!(
                "{:06X} bank {:08X} ops {:3} clocks {:4} passes {}",
                block.pc,
                block.bank,
                block.ops.len(),
                block.clocks,
                block.passes()
            );
        }
    }

    /// Dump the register file for debugging
    pub fn dump_registers(&self) {
        println!("PC: {:08X}  SR: {:04X}", self.regs.pc, self.regs.sr.bits());
        for i in 0..8 {
            print!("D{i}: {:08X}  ", self.regs.d[i]);
            if i % 4 == 3 {
                println!();
            }
        }
        for i in 0..8 {
            print!("A{i}: {:08X}  ", self.regs.a[i]);
            if i % 4 == 3 {
                println!();
            }
        }
        println!(
            "shadow sp: {:08X}  pending: {}  stopped: {}  clocks: {}",
            self.regs.shadow_sp, self.pending, self.stopped, self.clocks
        );
    }

    /// Snapshot the serializable CPU state (never includes the block cache)
    pub fn save_state(&self) -> CpuState {
        CpuState {
            regs: self.regs.clone(),
            pending: self.pending,
            stopped: self.stopped,
            clocks: self.clocks,
        }
    }

    /// Restore a snapshot; the block cache is rebuilt on demand
    pub fn load_state(&mut self, state: CpuState) {
        self.regs = state.regs;
        self.pending = state.pending;
        self.stopped = state.stopped;
        self.clocks = state.clocks;
        self.frozen = false;
        self.cache.clear();
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
