//! The machine aggregate.
//!
//! One value owns the whole console: CPU, bus, PPU, cartridge, joypad and
//! frame sink. Because ownership is exclusive and every component is
//! `Clone`, a snapshot is an ordinary deep copy and restore is assignment —
//! there is no pointer graph to fix up.

use crate::bus::NesBus;
use crate::cartridge::Cartridge;
use crate::frame::{FrameSink, FRAME_SIZE};
use nesgym_cpu::Cpu;

/// A complete NES.
#[derive(Clone)]
pub struct Machine {
    cpu: Cpu,
    bus: NesBus,
}

impl Machine {
    /// Assemble a machine around a cartridge and a frame sink.
    #[must_use]
    pub fn new(cart: Box<dyn Cartridge>, sink: Box<dyn FrameSink>) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: NesBus::new(cart, sink),
        }
    }

    /// Power on: run the CPU reset sequence and blank the PPU.
    pub fn power(&mut self) {
        self.cpu.power(&mut self.bus);
        self.bus.ppu.reset();
    }

    /// Emulate one frame's worth of CPU cycles.
    pub fn run_frame(&mut self) {
        self.cpu.run_frame(&mut self.bus);
    }

    /// Service pending interrupts and execute a single instruction,
    /// ignoring the frame budget. Conformance harnesses drive this.
    pub fn step(&mut self) {
        self.cpu.step(&mut self.bus);
    }

    /// Set the held buttons on a controller port.
    pub fn set_buttons(&mut self, port: usize, buttons: u8) {
        self.bus.joypad.write_buttons(port, buttons);
    }

    /// The PPU framebuffer as of the last completed frame.
    #[must_use]
    pub fn frame(&self) -> &[u32; FRAME_SIZE] {
        self.bus.ppu.frame_buffer()
    }

    /// Side-effect-free memory read (RAM and cartridge space).
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Direct RAM store for memory hacks.
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.bus.poke(addr, value);
    }

    /// CPU state.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU state, for test harnesses that force the program
    /// counter (nestest automation mode).
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Bus and peripherals.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Mutable bus and peripherals.
    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }
}
