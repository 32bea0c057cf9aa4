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

//! Control flow: branches, jumps, returns, traps and machine control
//!
//! Branch targets were resolved at decode time, so taking a branch is just a
//! `pc` assignment. Every handler here terminates a pre-decoded block.

use crate::core::cpu::decode::{DecodedOp, Operand, Size};
use crate::core::cpu::registers::StatusRegister;
use crate::core::cpu::{Cpu, VEC_ILLEGAL, VEC_LINE_A, VEC_LINE_F, VEC_TRAPV, VEC_TRAP_BASE};
use crate::core::memory::Bus;

impl Cpu {
    fn branch_target(op: &DecodedOp) -> u32 {
        match op.src {
            Operand::Abs(target) => target,
            _ => unreachable!(),
        }
    }

    /// BRA <label>
    pub(crate) fn op_bra(&mut self, _bus: &mut Bus, op: &DecodedOp) {
        self.regs.pc = Self::branch_target(op);
    }

    /// BSR <label>
    pub(crate) fn op_bsr(&mut self, bus: &mut Bus, op: &DecodedOp) {
        self.push_long(bus, op.next_pc());
        self.regs.pc = Self::branch_target(op);
    }

    /// Bcc <label>
    pub(crate) fn op_bcc(&mut self, _bus: &mut Bus, op: &DecodedOp) {
        let cond = ((op.opcode >> 8) & 0xF) as u8;
        self.regs.pc = if self.test_condition(cond) {
            Self::branch_target(op)
        } else {
            op.next_pc()
        };
    }

    /// DBcc Dn,<label>: decrement and branch until -1, unless cc holds
    pub(crate) fn op_dbcc(&mut self, _bus: &mut Bus, op: &DecodedOp) {
        let cond = ((op.opcode >> 8) & 0xF) as u8;
        if self.test_condition(cond) {
            self.regs.pc = op.next_pc();
            return;
        }
        let r = match op.dst {
            Operand::DataReg(r) => r,
            _ => unreachable!(),
        };
        let counter = self.regs.d_read(r, Size::Word).wrapping_sub(1) & 0xFFFF;
        self.regs.d_write(r, Size::Word, counter);
        self.regs.pc = if counter == 0xFFFF {
            op.next_pc()
        } else {
            Self::branch_target(op)
        };
    }

    /// JMP <ea>
    pub(crate) fn op_jmp(&mut self, _bus: &mut Bus, op: &DecodedOp) {
        self.regs.pc = self.ea_addr(op.src, Size::Long);
    }

    /// JSR <ea>
    pub(crate) fn op_jsr(&mut self, bus: &mut Bus, op: &DecodedOp) {
        let target = self.ea_addr(op.src, Size::Long);
        self.push_long(bus, op.next_pc());
        self.regs.pc = target;
    }

    /// RTS
    pub(crate) fn op_rts(&mut self, bus: &mut Bus, _op: &DecodedOp) {
        self.regs.pc = self.pop_long(bus);
    }

    /// RTR: restore CCR, then return
    pub(crate) fn op_rtr(&mut self, bus: &mut Bus, _op: &DecodedOp) {
        let ccr = self.pop_word(bus);
        self.regs.sr.set_ccr(ccr as u8);
        self.regs.pc = self.pop_long(bus);
    }

    /// RTE (privileged): restore the full SR, then return
    pub(crate) fn op_rte(&mut self, bus: &mut Bus, op: &DecodedOp) {
        if !self.check_supervisor(bus, op) {
            return;
        }
        // Read the whole frame before the SR write can switch stacks
        let sp = self.regs.sp();
        let sr = bus.read_word(sp);
        let pc = bus.read_long(sp.wrapping_add(2));
        self.regs.set_sp(sp.wrapping_add(6));
        self.regs.set_sr(sr);
        self.regs.pc = pc;
    }

    /// TRAP #n
    pub(crate) fn op_trap(&mut self, bus: &mut Bus, op: &DecodedOp) {
        let n = match op.src {
            Operand::Imm(v) => v as u8,
            _ => unreachable!(),
        };
        log::trace!("trap #{n} at {:06X}", op.pc);
        self.vector(bus, VEC_TRAP_BASE + n, op.next_pc());
    }

    /// TRAPV: trap on overflow
    pub(crate) fn op_trapv(&mut self, bus: &mut Bus, op: &DecodedOp) {
        if self.regs.sr.contains(StatusRegister::V) {
            self.vector(bus, VEC_TRAPV, op.next_pc());
        } else {
            self.regs.pc = op.next_pc();
        }
    }

    /// ILLEGAL: the designated illegal-instruction encoding
    pub(crate) fn op_illegal(&mut self, bus: &mut Bus, op: &DecodedOp) {
        log::debug!("illegal instruction at {:06X}", op.pc);
        self.vector(bus, VEC_ILLEGAL, op.pc);
    }

    /// Line-A trap ($Axxx)
    pub(crate) fn op_line_a(&mut self, bus: &mut Bus, op: &DecodedOp) {
        self.vector(bus, VEC_LINE_A, op.pc);
    }

    /// Line-F trap ($Fxxx)
    pub(crate) fn op_line_f(&mut self, bus: &mut Bus, op: &DecodedOp) {
        self.vector(bus, VEC_LINE_F, op.pc);
    }

    /// STOP #imm (privileged): load SR and halt until an interrupt
    ///
    /// The CPU parks on the STOP instruction itself; interrupt delivery
    /// steps `pc` past it when it wakes the core.
    pub(crate) fn op_stop(&mut self, bus: &mut Bus, op: &DecodedOp) {
        if !self.check_supervisor(bus, op) {
            return;
        }
        let imm = match op.src {
            Operand::Imm(v) => v as u16,
            _ => unreachable!(),
        };
        self.regs.set_sr(imm);
        self.set_stopped(true);
        self.regs.pc = op.pc;
    }

    /// RESET (privileged): pulse the reset line to the peripherals
    pub(crate) fn op_reset(&mut self, bus: &mut Bus, op: &DecodedOp) {
        if !self.check_supervisor(bus, op) {
            return;
        }
        bus.assert_reset();
        self.regs.pc = op.next_pc();
    }

    /// NOP
    pub(crate) fn op_nop(&mut self, _bus: &mut Bus, op: &DecodedOp) {
        self.regs.pc = op.next_pc();
    }
}
