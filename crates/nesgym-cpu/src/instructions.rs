//! Instruction implementations.
//!
//! Every method spends its cycles through the ticked accessors on [`Cpu`];
//! internal cycles with no bus traffic call [`Cpu::tick`] directly. Memory
//! read-modify-write instructions write the unmodified value back first (the
//! hardware's dummy write) as a plain internal cycle.

use crate::addressing::Mode;
use crate::bus::Bus;
use crate::cpu::{Cpu, Interrupt};
use crate::status::Status;

impl Cpu {
    // ==== Loads and stores =================================================

    pub(crate) fn lda(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.a = self.rd(bus, addr);
        self.status.set_zn(self.a);
    }

    pub(crate) fn ldx(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.x = self.rd(bus, addr);
        self.status.set_zn(self.x);
    }

    pub(crate) fn ldy(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.y = self.rd(bus, addr);
        self.status.set_zn(self.y);
    }

    pub(crate) fn sta(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.wr(bus, addr, self.a);
    }

    pub(crate) fn stx(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.wr(bus, addr, self.x);
    }

    pub(crate) fn sty(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.wr(bus, addr, self.y);
    }

    // ==== Register transfers ===============================================

    pub(crate) fn tax(&mut self, bus: &mut impl Bus) {
        self.x = self.a;
        self.status.set_zn(self.x);
        self.tick(bus);
    }

    pub(crate) fn tay(&mut self, bus: &mut impl Bus) {
        self.y = self.a;
        self.status.set_zn(self.y);
        self.tick(bus);
    }

    pub(crate) fn txa(&mut self, bus: &mut impl Bus) {
        self.a = self.x;
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    pub(crate) fn tya(&mut self, bus: &mut impl Bus) {
        self.a = self.y;
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    pub(crate) fn tsx(&mut self, bus: &mut impl Bus) {
        self.x = self.sp;
        self.status.set_zn(self.x);
        self.tick(bus);
    }

    /// TXS does not touch the flags.
    pub(crate) fn txs(&mut self, bus: &mut impl Bus) {
        self.sp = self.x;
        self.tick(bus);
    }

    // ==== Arithmetic and logic =============================================

    pub(crate) fn ora(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.a |= self.rd(bus, addr);
        self.status.set_zn(self.a);
    }

    pub(crate) fn and(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.a &= self.rd(bus, addr);
        self.status.set_zn(self.a);
    }

    pub(crate) fn eor(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        self.a ^= self.rd(bus, addr);
        self.status.set_zn(self.a);
    }

    pub(crate) fn adc(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        let value = self.rd(bus, addr);
        self.add(value);
    }

    /// SBC is ADC of the one's complement; the 2A03 has no decimal mode.
    pub(crate) fn sbc(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        let value = self.rd(bus, addr);
        self.add(value ^ 0xFF);
    }

    fn add(&mut self, value: u8) {
        let a = u16::from(self.a);
        let v = u16::from(value);
        let c = u16::from(self.status.contains(Status::C));
        let sum = a + v + c;

        self.status.set_flag(Status::C, sum > 0xFF);
        self.status
            .set_flag(Status::V, (!(a ^ v) & (a ^ sum)) & 0x80 != 0);
        self.a = sum as u8;
        self.status.set_zn(self.a);
    }

    pub(crate) fn bit(&mut self, bus: &mut impl Bus, mode: Mode) {
        let addr = self.operand(bus, mode);
        let value = self.rd(bus, addr);
        self.status.set_flag(Status::Z, self.a & value == 0);
        self.status.set_flag(Status::V, value & 0x40 != 0);
        self.status.set_flag(Status::N, value & 0x80 != 0);
    }

    pub(crate) fn cmp(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.compare(bus, mode, self.a);
    }

    pub(crate) fn cpx(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.compare(bus, mode, self.x);
    }

    pub(crate) fn cpy(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.compare(bus, mode, self.y);
    }

    fn compare(&mut self, bus: &mut impl Bus, mode: Mode, reg: u8) {
        let addr = self.operand(bus, mode);
        let value = self.rd(bus, addr);
        self.status.set_zn(reg.wrapping_sub(value));
        self.status.set_flag(Status::C, reg >= value);
    }

    // ==== Shifts and rotates ===============================================

    /// Read, dummy-write cycle, write the shifted value.
    fn rmw(&mut self, bus: &mut impl Bus, mode: Mode, op: impl Fn(&mut Self, u8) -> u8) {
        let addr = self.operand(bus, mode);
        let value = self.rd(bus, addr);
        self.tick(bus);
        let result = op(self, value);
        self.wr(bus, addr, result);
        self.status.set_zn(result);
    }

    fn shl(&mut self, value: u8) -> u8 {
        self.status.set_flag(Status::C, value & 0x80 != 0);
        value << 1
    }

    fn shr(&mut self, value: u8) -> u8 {
        self.status.set_flag(Status::C, value & 0x01 != 0);
        value >> 1
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set_flag(Status::C, value & 0x80 != 0);
        (value << 1) | carry_in
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C)) << 7;
        self.status.set_flag(Status::C, value & 0x01 != 0);
        (value >> 1) | carry_in
    }

    pub(crate) fn asl(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, Self::shl);
    }

    pub(crate) fn lsr(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, Self::shr);
    }

    pub(crate) fn rol(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, Self::rol_value);
    }

    pub(crate) fn ror(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, Self::ror_value);
    }

    pub(crate) fn asl_a(&mut self, bus: &mut impl Bus) {
        self.a = self.shl(self.a);
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    pub(crate) fn lsr_a(&mut self, bus: &mut impl Bus) {
        self.a = self.shr(self.a);
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    pub(crate) fn rol_a(&mut self, bus: &mut impl Bus) {
        self.a = self.rol_value(self.a);
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    pub(crate) fn ror_a(&mut self, bus: &mut impl Bus) {
        self.a = self.ror_value(self.a);
        self.status.set_zn(self.a);
        self.tick(bus);
    }

    // ==== Increments and decrements ========================================

    pub(crate) fn inc(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, |_, v| v.wrapping_add(1));
    }

    pub(crate) fn dec(&mut self, bus: &mut impl Bus, mode: Mode) {
        self.rmw(bus, mode, |_, v| v.wrapping_sub(1));
    }

    pub(crate) fn inx(&mut self, bus: &mut impl Bus) {
        self.x = self.x.wrapping_add(1);
        self.status.set_zn(self.x);
        self.tick(bus);
    }

    pub(crate) fn iny(&mut self, bus: &mut impl Bus) {
        self.y = self.y.wrapping_add(1);
        self.status.set_zn(self.y);
        self.tick(bus);
    }

    pub(crate) fn dex(&mut self, bus: &mut impl Bus) {
        self.x = self.x.wrapping_sub(1);
        self.status.set_zn(self.x);
        self.tick(bus);
    }

    pub(crate) fn dey(&mut self, bus: &mut impl Bus) {
        self.y = self.y.wrapping_sub(1);
        self.status.set_zn(self.y);
        self.tick(bus);
    }

    // ==== Branches and jumps ===============================================

    /// Branch when `flag` equals `expected`: one extra cycle when taken.
    /// No additional page-crossing penalty is modeled.
    pub(crate) fn branch(&mut self, bus: &mut impl Bus, flag: Status, expected: bool) {
        let at = self.pc;
        self.pc = self.pc.wrapping_add(1);
        let offset = self.rd(bus, at) as i8;
        if self.status.contains(flag) == expected {
            self.tick(bus);
            self.pc = self.pc.wrapping_add(offset as u16);
        }
    }

    pub(crate) fn jmp(&mut self, bus: &mut impl Bus) {
        self.pc = self.abs(bus);
    }

    /// JMP (indirect) with the 6502 page-wrap bug: the high byte of the
    /// target comes from the start of the pointer's page when the pointer's
    /// low byte is $FF.
    pub(crate) fn jmp_ind(&mut self, bus: &mut impl Bus) {
        let ptr = self.abs(bus);
        let hi_at = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
        self.pc = self.rd16_pair(bus, ptr, hi_at);
    }

    /// JSR pushes the address of its own last byte; RTS adds one.
    pub(crate) fn jsr(&mut self, bus: &mut impl Bus) {
        let ret = self.pc.wrapping_add(1);
        self.tick(bus);
        self.push(bus, (ret >> 8) as u8);
        self.push(bus, (ret & 0xFF) as u8);
        self.pc = self.abs(bus);
    }

    pub(crate) fn rts(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
        self.tick(bus);
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        self.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
        self.tick(bus);
    }

    pub(crate) fn rti(&mut self, bus: &mut impl Bus) {
        self.plp(bus);
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // ==== Stack and flag operations ========================================

    pub(crate) fn pha(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
        self.push(bus, self.a);
    }

    /// PHP always pushes with the B flag set.
    pub(crate) fn php(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
        self.push(bus, self.status.to_stack_byte(true));
    }

    pub(crate) fn pla(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
        self.tick(bus);
        self.a = self.pop(bus);
        self.status.set_zn(self.a);
    }

    /// PLP clears the B bit of the loaded value.
    pub(crate) fn plp(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
        self.tick(bus);
        let value = self.pop(bus);
        self.status = Status::from_stack_byte(value);
    }

    pub(crate) fn flag(&mut self, bus: &mut impl Bus, flag: Status, value: bool) {
        self.status.set_flag(flag, value);
        self.tick(bus);
    }

    // ==== Misc =============================================================

    /// BRK runs the shared interrupt sequence with the B flag in the pushed
    /// status. An NMI raised before the handler's first instruction wins the
    /// next boundary poll, hijacking the BRK.
    pub(crate) fn brk(&mut self, bus: &mut impl Bus) {
        self.interrupt(bus, Interrupt::Brk);
    }

    pub(crate) fn nop(&mut self, bus: &mut impl Bus) {
        self.tick(bus);
    }
}
