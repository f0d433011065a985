//! 6502 interpreter core.
//!
//! The CPU is the timing master of the machine: every memory access calls
//! [`Cpu::tick`] first, which forwards to [`Bus::tick`] (three PPU dots on a
//! NES bus) and decrements the frame cycle budget. Instruction timing
//! therefore falls out of the number and order of bus operations rather than
//! a per-opcode cycle table.

use crate::addressing::Mode;
use crate::bus::Bus;
use crate::status::Status;
use crate::{vectors, TOTAL_CYCLES};

/// Interrupt kinds, in the order of their hardware vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Non-maskable interrupt (vector $FFFA).
    Nmi,
    /// Power-on / reset sequence (vector $FFFC, stack writes suppressed).
    Reset,
    /// Maskable interrupt request (vector $FFFE).
    Irq,
    /// BRK instruction (vector $FFFE, B flag set in the pushed status).
    Brk,
}

impl Interrupt {
    /// Vector address read at the end of the sequence.
    const fn vector(self) -> u16 {
        match self {
            Self::Nmi => vectors::NMI,
            Self::Reset => vectors::RESET,
            Self::Irq | Self::Brk => vectors::IRQ,
        }
    }
}

/// MOS 6502 CPU (NES 2A03 variant: no decimal mode).
#[derive(Debug, Clone)]
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer, offset into page $01.
    pub sp: u8,
    /// Program counter.
    pub pc: u16,
    /// Status flags.
    pub status: Status,
    /// Latched NMI edge, serviced at the next instruction boundary and
    /// cleared at acknowledgment.
    nmi: bool,
    /// Level-sensitive IRQ request (mapper seam).
    irq: bool,
    /// Cycles left in the current frame budget; may go negative and the
    /// deficit carries into the next frame.
    remaining: i32,
    /// Total cycles since power, used for DMA alignment and by tests.
    cycles: u64,
}

impl Cpu {
    /// Create a CPU in its pre-reset power-on state.
    ///
    /// Registers are zeroed and interrupts disabled; [`Cpu::power`] must run
    /// the RESET sequence before execution starts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            status: Status::POWER_ON,
            nmi: false,
            irq: false,
            remaining: 0,
            cycles: 0,
        }
    }

    /// Power on: run the RESET interrupt sequence.
    ///
    /// Leaves `sp` at $FD (three suppressed pushes from 0) and `pc` loaded
    /// from the vector at $FFFC.
    pub fn power(&mut self, bus: &mut impl Bus) {
        self.interrupt(bus, Interrupt::Reset);
    }

    /// Latch an NMI edge.
    pub fn set_nmi(&mut self) {
        self.nmi = true;
    }

    /// Drive the level-sensitive IRQ request.
    pub fn set_irq(&mut self, active: bool) {
        self.irq = active;
    }

    /// Total cycles executed since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles left in the current frame budget.
    #[must_use]
    pub fn remaining_cycles(&self) -> i32 {
        self.remaining
    }

    /// Run one frame's worth of cycles.
    ///
    /// Tops the budget up by [`TOTAL_CYCLES`] and executes until it is
    /// exhausted; the instruction in flight when the budget reaches zero
    /// completes, and the overshoot is deducted from the next frame.
    pub fn run_frame(&mut self, bus: &mut impl Bus) {
        self.remaining += TOTAL_CYCLES;
        while self.remaining > 0 {
            self.step(bus);
        }
    }

    /// Service a pending interrupt or execute one instruction.
    ///
    /// Priority between instructions is NMI, then IRQ when the I flag is
    /// clear, then normal execution.
    pub fn step(&mut self, bus: &mut impl Bus) {
        if self.nmi {
            self.interrupt(bus, Interrupt::Nmi);
        } else if (self.irq || bus.irq_line()) && !self.status.contains(Status::I) {
            self.interrupt(bus, Interrupt::Irq);
        } else {
            self.exec(bus);
        }
    }

    // ==== Cycle and memory plumbing ========================================

    /// Burn one cycle: advance the rest of the system, collect NMI edges.
    pub(crate) fn tick(&mut self, bus: &mut impl Bus) {
        bus.tick();
        if bus.poll_nmi() {
            self.nmi = true;
        }
        self.cycles += 1;
        self.remaining -= 1;
    }

    /// Ticked read.
    pub(crate) fn rd(&mut self, bus: &mut impl Bus, addr: u16) -> u8 {
        self.tick(bus);
        bus.read(addr)
    }

    /// Ticked write. A write that latches OAM DMA ($4014) is followed by
    /// the full transfer before the instruction stream resumes.
    pub(crate) fn wr(&mut self, bus: &mut impl Bus, addr: u16, value: u8) {
        self.tick(bus);
        bus.write(addr, value);
        if let Some(page) = bus.take_dma_page() {
            self.dma_oam(bus, page);
        }
    }

    /// Ticked little-endian 16-bit read.
    pub(crate) fn rd16(&mut self, bus: &mut impl Bus, addr: u16) -> u16 {
        let lo = self.rd(bus, addr);
        let hi = self.rd(bus, addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// 16-bit read from an explicit byte pair (zero-page and JMP-indirect
    /// wrapping).
    pub(crate) fn rd16_pair(&mut self, bus: &mut impl Bus, lo: u16, hi: u16) -> u16 {
        let lo = self.rd(bus, lo);
        let hi = self.rd(bus, hi);
        u16::from_le_bytes([lo, hi])
    }

    /// Push a byte; the stack window is $0100-$01FF and `sp` wraps within it.
    pub(crate) fn push(&mut self, bus: &mut impl Bus, value: u8) {
        self.wr(bus, 0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pop a byte (pre-increment).
    pub(crate) fn pop(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.rd(bus, 0x0100 | u16::from(self.sp))
    }

    // ==== Interrupts and DMA ===============================================

    /// Interrupt sequence shared by NMI, RESET, IRQ and BRK.
    ///
    /// BRK arrives having already spent its opcode fetch, so it burns one
    /// fewer internal cycle. RESET suppresses the three stack writes but
    /// still decrements `sp` and spends the cycles. The IRQ and BRK vectors
    /// coincide; an NMI raised during BRK wins at the next boundary because
    /// the pending flag is still set ("hijack").
    pub(crate) fn interrupt(&mut self, bus: &mut impl Bus, kind: Interrupt) {
        self.tick(bus);
        if kind != Interrupt::Brk {
            self.tick(bus);
        }

        if kind == Interrupt::Reset {
            self.sp = self.sp.wrapping_sub(3);
            self.tick(bus);
            self.tick(bus);
            self.tick(bus);
        } else {
            self.push(bus, (self.pc >> 8) as u8);
            self.push(bus, (self.pc & 0xFF) as u8);
            self.push(bus, self.status.to_stack_byte(kind == Interrupt::Brk));
        }

        self.status.insert(Status::I);
        self.pc = self.rd16(bus, kind.vector());

        if kind == Interrupt::Nmi {
            self.nmi = false;
        }
    }

    /// OAM DMA: 256 read/write pairs through the ordinary ticked accessors,
    /// plus one alignment cycle (two when triggered on an odd cycle), for a
    /// total of 513 or 514 cycles.
    fn dma_oam(&mut self, bus: &mut impl Bus, page: u8) {
        let odd = self.cycles % 2 == 1;
        self.tick(bus);
        if odd {
            self.tick(bus);
        }
        let base = u16::from(page) << 8;
        for offset in 0..256u16 {
            let value = self.rd(bus, base | offset);
            self.wr(bus, 0x2004, value);
        }
    }

    // ==== Dispatch =========================================================

    /// Fetch and execute one instruction.
    fn exec(&mut self, bus: &mut impl Bus) {
        let opcode = self.rd(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);

        match opcode {
            0x00 => self.brk(bus),
            0x01 => self.ora(bus, Mode::Izx),
            0x05 => self.ora(bus, Mode::Zp),
            0x06 => self.asl(bus, Mode::Zp),
            0x08 => self.php(bus),
            0x09 => self.ora(bus, Mode::Imm),
            0x0A => self.asl_a(bus),
            0x0D => self.ora(bus, Mode::Abs),
            0x0E => self.asl(bus, Mode::Abs),
            0x10 => self.branch(bus, Status::N, false),
            0x11 => self.ora(bus, Mode::Izy),
            0x15 => self.ora(bus, Mode::Zpx),
            0x16 => self.asl(bus, Mode::Zpx),
            0x18 => self.flag(bus, Status::C, false),
            0x19 => self.ora(bus, Mode::Aby),
            0x1D => self.ora(bus, Mode::Abx),
            0x1E => self.asl(bus, Mode::AbxW),
            0x20 => self.jsr(bus),
            0x21 => self.and(bus, Mode::Izx),
            0x24 => self.bit(bus, Mode::Zp),
            0x25 => self.and(bus, Mode::Zp),
            0x26 => self.rol(bus, Mode::Zp),
            0x28 => self.plp(bus),
            0x29 => self.and(bus, Mode::Imm),
            0x2A => self.rol_a(bus),
            0x2C => self.bit(bus, Mode::Abs),
            0x2D => self.and(bus, Mode::Abs),
            0x2E => self.rol(bus, Mode::Abs),
            0x30 => self.branch(bus, Status::N, true),
            0x31 => self.and(bus, Mode::Izy),
            0x35 => self.and(bus, Mode::Zpx),
            0x36 => self.rol(bus, Mode::Zpx),
            0x38 => self.flag(bus, Status::C, true),
            0x39 => self.and(bus, Mode::Aby),
            0x3D => self.and(bus, Mode::Abx),
            0x3E => self.rol(bus, Mode::AbxW),
            0x40 => self.rti(bus),
            0x41 => self.eor(bus, Mode::Izx),
            0x45 => self.eor(bus, Mode::Zp),
            0x46 => self.lsr(bus, Mode::Zp),
            0x48 => self.pha(bus),
            0x49 => self.eor(bus, Mode::Imm),
            0x4A => self.lsr_a(bus),
            0x4C => self.jmp(bus),
            0x4D => self.eor(bus, Mode::Abs),
            0x4E => self.lsr(bus, Mode::Abs),
            0x50 => self.branch(bus, Status::V, false),
            0x51 => self.eor(bus, Mode::Izy),
            0x55 => self.eor(bus, Mode::Zpx),
            0x56 => self.lsr(bus, Mode::Zpx),
            0x58 => self.flag(bus, Status::I, false),
            0x59 => self.eor(bus, Mode::Aby),
            0x5D => self.eor(bus, Mode::Abx),
            0x5E => self.lsr(bus, Mode::AbxW),
            0x60 => self.rts(bus),
            0x61 => self.adc(bus, Mode::Izx),
            0x65 => self.adc(bus, Mode::Zp),
            0x66 => self.ror(bus, Mode::Zp),
            0x68 => self.pla(bus),
            0x69 => self.adc(bus, Mode::Imm),
            0x6A => self.ror_a(bus),
            0x6C => self.jmp_ind(bus),
            0x6D => self.adc(bus, Mode::Abs),
            0x6E => self.ror(bus, Mode::Abs),
            0x70 => self.branch(bus, Status::V, true),
            0x71 => self.adc(bus, Mode::Izy),
            0x75 => self.adc(bus, Mode::Zpx),
            0x76 => self.ror(bus, Mode::Zpx),
            0x78 => self.flag(bus, Status::I, true),
            0x79 => self.adc(bus, Mode::Aby),
            0x7D => self.adc(bus, Mode::Abx),
            0x7E => self.ror(bus, Mode::AbxW),
            0x81 => self.sta(bus, Mode::Izx),
            0x84 => self.sty(bus, Mode::Zp),
            0x85 => self.sta(bus, Mode::Zp),
            0x86 => self.stx(bus, Mode::Zp),
            0x88 => self.dey(bus),
            0x8A => self.txa(bus),
            0x8C => self.sty(bus, Mode::Abs),
            0x8D => self.sta(bus, Mode::Abs),
            0x8E => self.stx(bus, Mode::Abs),
            0x90 => self.branch(bus, Status::C, false),
            0x91 => self.sta(bus, Mode::IzyW),
            0x94 => self.sty(bus, Mode::Zpx),
            0x95 => self.sta(bus, Mode::Zpx),
            0x96 => self.stx(bus, Mode::Zpy),
            0x98 => self.tya(bus),
            0x99 => self.sta(bus, Mode::AbyW),
            0x9A => self.txs(bus),
            0x9D => self.sta(bus, Mode::AbxW),
            0xA0 => self.ldy(bus, Mode::Imm),
            0xA1 => self.lda(bus, Mode::Izx),
            0xA2 => self.ldx(bus, Mode::Imm),
            0xA4 => self.ldy(bus, Mode::Zp),
            0xA5 => self.lda(bus, Mode::Zp),
            0xA6 => self.ldx(bus, Mode::Zp),
            0xA8 => self.tay(bus),
            0xA9 => self.lda(bus, Mode::Imm),
            0xAA => self.tax(bus),
            0xAC => self.ldy(bus, Mode::Abs),
            0xAD => self.lda(bus, Mode::Abs),
            0xAE => self.ldx(bus, Mode::Abs),
            0xB0 => self.branch(bus, Status::C, true),
            0xB1 => self.lda(bus, Mode::Izy),
            0xB4 => self.ldy(bus, Mode::Zpx),
            0xB5 => self.lda(bus, Mode::Zpx),
            0xB6 => self.ldx(bus, Mode::Zpy),
            0xB8 => self.flag(bus, Status::V, false),
            0xB9 => self.lda(bus, Mode::Aby),
            0xBA => self.tsx(bus),
            0xBC => self.ldy(bus, Mode::Abx),
            0xBD => self.lda(bus, Mode::Abx),
            0xBE => self.ldx(bus, Mode::Aby),
            0xC0 => self.cpy(bus, Mode::Imm),
            0xC1 => self.cmp(bus, Mode::Izx),
            0xC4 => self.cpy(bus, Mode::Zp),
            0xC5 => self.cmp(bus, Mode::Zp),
            0xC6 => self.dec(bus, Mode::Zp),
            0xC8 => self.iny(bus),
            0xC9 => self.cmp(bus, Mode::Imm),
            0xCA => self.dex(bus),
            0xCC => self.cpy(bus, Mode::Abs),
            0xCD => self.cmp(bus, Mode::Abs),
            0xCE => self.dec(bus, Mode::Abs),
            0xD0 => self.branch(bus, Status::Z, false),
            0xD1 => self.cmp(bus, Mode::Izy),
            0xD5 => self.cmp(bus, Mode::Zpx),
            0xD6 => self.dec(bus, Mode::Zpx),
            0xD8 => self.flag(bus, Status::D, false),
            0xD9 => self.cmp(bus, Mode::Aby),
            0xDD => self.cmp(bus, Mode::Abx),
            0xDE => self.dec(bus, Mode::AbxW),
            0xE0 => self.cpx(bus, Mode::Imm),
            0xE1 => self.sbc(bus, Mode::Izx),
            0xE4 => self.cpx(bus, Mode::Zp),
            0xE5 => self.sbc(bus, Mode::Zp),
            0xE6 => self.inc(bus, Mode::Zp),
            0xE8 => self.inx(bus),
            0xE9 => self.sbc(bus, Mode::Imm),
            0xEA => self.nop(bus),
            0xEC => self.cpx(bus, Mode::Abs),
            0xED => self.sbc(bus, Mode::Abs),
            0xEE => self.inc(bus, Mode::Abs),
            0xF0 => self.branch(bus, Status::Z, true),
            0xF1 => self.sbc(bus, Mode::Izy),
            0xF5 => self.sbc(bus, Mode::Zpx),
            0xF6 => self.inc(bus, Mode::Zpx),
            0xF8 => self.flag(bus, Status::D, true),
            0xF9 => self.sbc(bus, Mode::Aby),
            0xFD => self.sbc(bus, Mode::Abx),
            0xFE => self.inc(bus, Mode::AbxW),
            _ => {
                log::warn!(
                    "invalid opcode ${:02X} at ${:04X}, executing as NOP",
                    opcode,
                    self.pc.wrapping_sub(1)
                );
                self.nop(bus);
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
