//! System bus: the CPU-visible memory map.
//!
//! ```text
//! $0000-$1FFF  2 KiB work RAM, mirrored every $800
//! $2000-$3FFF  PPU registers, mirrored every 8 bytes
//! $4000-$4013  APU stub
//! $4014        OAM-DMA trigger (write only)
//! $4015        APU stub
//! $4016        joypad strobe (write) / joypad 0 serial (read)
//! $4017        joypad 1 serial (read)
//! $4018-$FFFF  cartridge
//! ```
//!
//! The bus also carries the machine's cycle seam: [`nesgym_cpu::Bus::tick`]
//! advances the PPU three dots, which is how every CPU memory access keeps
//! the two chips interleaved.

use crate::apu::ApuStub;
use crate::cartridge::Cartridge;
use crate::frame::FrameSink;
use crate::input::Joypad;
use crate::ppu::Ppu;

/// Everything on the far side of the CPU pins.
#[derive(Clone)]
pub struct NesBus {
    /// Work RAM; the hardware powers up with it in an all-ones pattern.
    ram: [u8; 0x800],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio register stub.
    apu: ApuStub,
    /// Cartridge mapper.
    pub cart: Box<dyn Cartridge>,
    /// Controller ports.
    pub joypad: Joypad,
    /// Frame receiver.
    sink: Box<dyn FrameSink>,
    /// Page latched by a $4014 write, taken by the CPU.
    dma_page: Option<u8>,
}

impl NesBus {
    /// Assemble a bus around a cartridge and a frame sink. The PPU takes
    /// its nametable mirroring from the cartridge once, at this point.
    #[must_use]
    pub fn new(cart: Box<dyn Cartridge>, sink: Box<dyn FrameSink>) -> Self {
        let mirroring = cart.mirroring();
        Self {
            ram: [0xFF; 0x800],
            ppu: Ppu::new(mirroring),
            apu: ApuStub,
            cart,
            joypad: Joypad::new(),
            sink,
            dma_page: None,
        }
    }

    /// Single decode point for CPU-space accesses.
    fn access(&mut self, addr: u16, value: u8, write: bool) -> u8 {
        match addr {
            0x0000..=0x1FFF => {
                let slot = &mut self.ram[(addr & 0x07FF) as usize];
                if write {
                    *slot = value;
                }
                *slot
            }
            0x2000..=0x3FFF => {
                if write {
                    self.ppu.write_register(&mut *self.cart, addr & 7, value);
                    value
                } else {
                    self.ppu.read_register(&mut *self.cart, addr & 7)
                }
            }
            0x4000..=0x4013 | 0x4015 => self.apu.access(addr, value, write),
            0x4014 => {
                if write {
                    self.dma_page = Some(value);
                }
                0
            }
            0x4016 => {
                if write {
                    self.joypad.write_strobe(value & 1);
                    0
                } else {
                    self.joypad.read_state(0)
                }
            }
            0x4017 => {
                if write {
                    1
                } else {
                    self.joypad.read_state(1)
                }
            }
            0x4018..=0xFFFF => {
                if write {
                    self.cart.write_prg(addr, value);
                    value
                } else {
                    self.cart.read_prg(addr)
                }
            }
        }
    }

    /// Side-effect-free read of RAM and cartridge space, for debuggers and
    /// RL reward extraction. Hardware-register ranges read as zero.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x4018..=0xFFFF => self.cart.read_prg(addr),
            _ => 0,
        }
    }

    /// Direct RAM store, bypassing the device decode; addresses outside
    /// the RAM mirrors are ignored.
    pub fn poke(&mut self, addr: u16, value: u8) {
        if addr <= 0x1FFF {
            self.ram[(addr & 0x07FF) as usize] = value;
        }
    }
}

impl nesgym_cpu::Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.access(addr, 0, false)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.access(addr, value, true);
    }

    /// One CPU cycle elapses: the PPU runs three dots.
    fn tick(&mut self) {
        for _ in 0..3 {
            self.ppu.step(&mut *self.cart, &mut *self.sink);
        }
    }

    fn poll_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    fn irq_line(&mut self) -> bool {
        self.cart.irq_pending()
    }

    fn take_dma_page(&mut self) -> Option<u8> {
        self.dma_page.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::load_cartridge;
    use crate::frame::BufferSink;
    use nesgym_cpu::Bus;

    fn bus() -> NesBus {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1, 0, 0];
        image.resize(16 + 16384 + 8192, 0);
        NesBus::new(
            load_cartridge(&image).unwrap(),
            Box::new(BufferSink::new()),
        )
    }

    #[test]
    fn ram_mirrors_every_0x800() {
        let mut bus = bus();
        bus.write(0x0000, 0x12);
        assert_eq!(bus.read(0x0800), 0x12);
        assert_eq!(bus.read(0x1000), 0x12);
        assert_eq!(bus.read(0x1800), 0x12);
    }

    #[test]
    fn ram_powers_up_all_ones() {
        let mut bus = bus();
        assert_eq!(bus.read(0x0123), 0xFF);
    }

    #[test]
    fn ppu_registers_mirror_every_eight() {
        let mut bus = bus();
        bus.write(0x2006, 0x21);
        bus.write(0x3FFE, 0x08); // $2006 mirror
        bus.write(0x2007, 0x42);

        bus.write(0x2006, 0x21);
        bus.write(0x2006, 0x08);
        bus.read(0x2007);
        assert_eq!(bus.read(0x2007), 0x42);
    }

    #[test]
    fn apu_range_reads_sentinel() {
        let mut bus = bus();
        assert_eq!(bus.read(0x4000), 1);
        assert_eq!(bus.read(0x4015), 1);
        bus.write(0x4000, 0xFF); // discarded
        assert_eq!(bus.read(0x4000), 1);
    }

    #[test]
    fn dma_write_latches_page() {
        let mut bus = bus();
        assert_eq!(bus.take_dma_page(), None);
        bus.write(0x4014, 0x07);
        assert_eq!(bus.take_dma_page(), Some(0x07));
        assert_eq!(bus.take_dma_page(), None);
    }

    #[test]
    fn joypad_strobe_and_read() {
        let mut bus = bus();
        bus.joypad.write_buttons(0, 0b0000_1001); // A + Start
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        let bits: Vec<u8> = (0..4).map(|_| bus.read(0x4016) & 1).collect();
        assert_eq!(bits, vec![1, 0, 0, 1]);
    }

    #[test]
    fn tick_advances_ppu_three_dots() {
        let mut bus = bus();
        bus.tick();
        assert_eq!(bus.ppu.dot(), 3);
        bus.tick();
        assert_eq!(bus.ppu.dot(), 6);
    }

    #[test]
    fn unmapped_reads_return_zero() {
        let mut bus = bus();
        // NROM maps nothing below $6000 in cartridge space.
        assert_eq!(bus.read(0x5000), 0);
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut bus = bus();
        bus.poke(0x0042, 0x99);
        assert_eq!(bus.peek(0x0042), 0x99);
        assert_eq!(bus.peek(0x0842), 0x99);
        // Peeking a PPU register does not disturb its state.
        assert_eq!(bus.peek(0x2002), 0);
    }
}
