//! Instruction timing conformance.
//!
//! Counts the cycles an instruction spends between two instruction
//! boundaries and checks them against the canonical 6502 timing table,
//! including the forced-penalty store/RMW modes and this core's documented
//! branch simplification (no page-cross penalty).

use nesgym_cpu::{Bus, Cpu, Status};

struct FlatBus {
    memory: Box<[u8; 0x10000]>,
}

impl FlatBus {
    fn with_program(program: &[u8]) -> Self {
        let mut memory = Box::new([0u8; 0x10000]);
        memory[0x0200..0x0200 + program.len()].copy_from_slice(program);
        memory[0xFFFC] = 0x00;
        memory[0xFFFD] = 0x02;
        Self { memory }
    }
}

impl Bus for FlatBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
}

/// Cycles spent by the first instruction of `program` (registers zeroed, so
/// indexed modes do not cross pages).
fn cycles_of(program: &[u8]) -> u64 {
    let mut bus = FlatBus::with_program(program);
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    let before = cpu.cycles();
    cpu.step(&mut bus);
    cpu.cycles() - before
}

/// The documented opcodes with their base cycle counts (no page crossings,
/// branches excluded). Layout: instruction bytes, expected cycles.
#[rustfmt::skip]
const TIMING_TABLE: &[(&[u8], u64)] = &[
    (&[0x00],             7), // BRK
    (&[0x01, 0x10],       6), // ORA (zp,X)
    (&[0x05, 0x10],       3), // ORA zp
    (&[0x06, 0x10],       5), // ASL zp
    (&[0x08],             3), // PHP
    (&[0x09, 0x01],       2), // ORA #imm
    (&[0x0A],             2), // ASL A
    (&[0x0D, 0x00, 0x03], 4), // ORA abs
    (&[0x0E, 0x00, 0x03], 6), // ASL abs
    (&[0x11, 0x10],       5), // ORA (zp),Y
    (&[0x15, 0x10],       4), // ORA zp,X
    (&[0x16, 0x10],       6), // ASL zp,X
    (&[0x18],             2), // CLC
    (&[0x19, 0x00, 0x03], 4), // ORA abs,Y
    (&[0x1D, 0x00, 0x03], 4), // ORA abs,X
    (&[0x1E, 0x00, 0x03], 7), // ASL abs,X
    (&[0x20, 0x00, 0x03], 6), // JSR
    (&[0x21, 0x10],       6), // AND (zp,X)
    (&[0x24, 0x10],       3), // BIT zp
    (&[0x25, 0x10],       3), // AND zp
    (&[0x26, 0x10],       5), // ROL zp
    (&[0x28],             4), // PLP
    (&[0x29, 0x01],       2), // AND #imm
    (&[0x2A],             2), // ROL A
    (&[0x2C, 0x00, 0x03], 4), // BIT abs
    (&[0x2D, 0x00, 0x03], 4), // AND abs
    (&[0x2E, 0x00, 0x03], 6), // ROL abs
    (&[0x31, 0x10],       5), // AND (zp),Y
    (&[0x35, 0x10],       4), // AND zp,X
    (&[0x36, 0x10],       6), // ROL zp,X
    (&[0x38],             2), // SEC
    (&[0x39, 0x00, 0x03], 4), // AND abs,Y
    (&[0x3D, 0x00, 0x03], 4), // AND abs,X
    (&[0x3E, 0x00, 0x03], 7), // ROL abs,X
    (&[0x41, 0x10],       6), // EOR (zp,X)
    (&[0x45, 0x10],       3), // EOR zp
    (&[0x46, 0x10],       5), // LSR zp
    (&[0x48],             3), // PHA
    (&[0x49, 0x01],       2), // EOR #imm
    (&[0x4A],             2), // LSR A
    (&[0x4C, 0x00, 0x03], 3), // JMP abs
    (&[0x4D, 0x00, 0x03], 4), // EOR abs
    (&[0x4E, 0x00, 0x03], 6), // LSR abs
    (&[0x51, 0x10],       5), // EOR (zp),Y
    (&[0x55, 0x10],       4), // EOR zp,X
    (&[0x56, 0x10],       6), // LSR zp,X
    (&[0x58],             2), // CLI
    (&[0x59, 0x00, 0x03], 4), // EOR abs,Y
    (&[0x5D, 0x00, 0x03], 4), // EOR abs,X
    (&[0x5E, 0x00, 0x03], 7), // LSR abs,X
    (&[0x61, 0x10],       6), // ADC (zp,X)
    (&[0x65, 0x10],       3), // ADC zp
    (&[0x66, 0x10],       5), // ROR zp
    (&[0x68],             4), // PLA
    (&[0x69, 0x01],       2), // ADC #imm
    (&[0x6A],             2), // ROR A
    (&[0x6C, 0x00, 0x03], 5), // JMP (ind)
    (&[0x6D, 0x00, 0x03], 4), // ADC abs
    (&[0x6E, 0x00, 0x03], 6), // ROR abs
    (&[0x71, 0x10],       5), // ADC (zp),Y
    (&[0x75, 0x10],       4), // ADC zp,X
    (&[0x76, 0x10],       6), // ROR zp,X
    (&[0x78],             2), // SEI
    (&[0x79, 0x00, 0x03], 4), // ADC abs,Y
    (&[0x7D, 0x00, 0x03], 4), // ADC abs,X
    (&[0x7E, 0x00, 0x03], 7), // ROR abs,X
    (&[0x81, 0x10],       6), // STA (zp,X)
    (&[0x84, 0x10],       3), // STY zp
    (&[0x85, 0x10],       3), // STA zp
    (&[0x86, 0x10],       3), // STX zp
    (&[0x88],             2), // DEY
    (&[0x8A],             2), // TXA
    (&[0x8C, 0x00, 0x03], 4), // STY abs
    (&[0x8D, 0x00, 0x03], 4), // STA abs
    (&[0x8E, 0x00, 0x03], 4), // STX abs
    (&[0x91, 0x10],       6), // STA (zp),Y
    (&[0x94, 0x10],       4), // STY zp,X
    (&[0x95, 0x10],       4), // STA zp,X
    (&[0x96, 0x10],       4), // STX zp,Y
    (&[0x98],             2), // TYA
    (&[0x99, 0x00, 0x03], 5), // STA abs,Y
    (&[0x9A],             2), // TXS
    (&[0x9D, 0x00, 0x03], 5), // STA abs,X
    (&[0xA0, 0x01],       2), // LDY #imm
    (&[0xA1, 0x10],       6), // LDA (zp,X)
    (&[0xA2, 0x01],       2), // LDX #imm
    (&[0xA4, 0x10],       3), // LDY zp
    (&[0xA5, 0x10],       3), // LDA zp
    (&[0xA6, 0x10],       3), // LDX zp
    (&[0xA8],             2), // TAY
    (&[0xA9, 0x01],       2), // LDA #imm
    (&[0xAA],             2), // TAX
    (&[0xAC, 0x00, 0x03], 4), // LDY abs
    (&[0xAD, 0x00, 0x03], 4), // LDA abs
    (&[0xAE, 0x00, 0x03], 4), // LDX abs
    (&[0xB1, 0x10],       5), // LDA (zp),Y
    (&[0xB4, 0x10],       4), // LDY zp,X
    (&[0xB5, 0x10],       4), // LDA zp,X
    (&[0xB6, 0x10],       4), // LDX zp,Y
    (&[0xB8],             2), // CLV
    (&[0xB9, 0x00, 0x03], 4), // LDA abs,Y
    (&[0xBA],             2), // TSX
    (&[0xBC, 0x00, 0x03], 4), // LDY abs,X
    (&[0xBD, 0x00, 0x03], 4), // LDA abs,X
    (&[0xBE, 0x00, 0x03], 4), // LDX abs,Y
    (&[0xC0, 0x01],       2), // CPY #imm
    (&[0xC1, 0x10],       6), // CMP (zp,X)
    (&[0xC4, 0x10],       3), // CPY zp
    (&[0xC5, 0x10],       3), // CMP zp
    (&[0xC6, 0x10],       5), // DEC zp
    (&[0xC8],             2), // INY
    (&[0xC9, 0x01],       2), // CMP #imm
    (&[0xCA],             2), // DEX
    (&[0xCC, 0x00, 0x03], 4), // CPY abs
    (&[0xCD, 0x00, 0x03], 4), // CMP abs
    (&[0xCE, 0x00, 0x03], 6), // DEC abs
    (&[0xD1, 0x10],       5), // CMP (zp),Y
    (&[0xD5, 0x10],       4), // CMP zp,X
    (&[0xD6, 0x10],       6), // DEC zp,X
    (&[0xD8],             2), // CLD
    (&[0xD9, 0x00, 0x03], 4), // CMP abs,Y
    (&[0xDD, 0x00, 0x03], 4), // CMP abs,X
    (&[0xDE, 0x00, 0x03], 7), // DEC abs,X
    (&[0xE0, 0x01],       2), // CPX #imm
    (&[0xE1, 0x10],       6), // SBC (zp,X)
    (&[0xE4, 0x10],       3), // CPX zp
    (&[0xE5, 0x10],       3), // SBC zp
    (&[0xE6, 0x10],       5), // INC zp
    (&[0xE8],             2), // INX
    (&[0xE9, 0x01],       2), // SBC #imm
    (&[0xEA],             2), // NOP
    (&[0xEC, 0x00, 0x03], 4), // CPX abs
    (&[0xED, 0x00, 0x03], 4), // SBC abs
    (&[0xEE, 0x00, 0x03], 6), // INC abs
    (&[0xF1, 0x10],       5), // SBC (zp),Y
    (&[0xF5, 0x10],       4), // SBC zp,X
    (&[0xF6, 0x10],       6), // INC zp,X
    (&[0xF8],             2), // SED
    (&[0xF9, 0x00, 0x03], 4), // SBC abs,Y
    (&[0xFD, 0x00, 0x03], 4), // SBC abs,X
    (&[0xFE, 0x00, 0x03], 7), // INC abs,X
];

#[test]
fn documented_opcode_base_cycles() {
    for (bytes, expected) in TIMING_TABLE {
        let got = cycles_of(bytes);
        assert_eq!(
            got, *expected,
            "opcode ${:02X}: expected {expected} cycles, got {got}",
            bytes[0]
        );
    }
}

#[test]
fn rts_and_rti_cycles() {
    // JSR sets up a frame for RTS.
    let mut bus = FlatBus::with_program(&[0x20, 0x10, 0x02]);
    bus.memory[0x0210] = 0x60;
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.step(&mut bus);

    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 6, "RTS");

    // BRK sets up a frame for RTI.
    let mut bus = FlatBus::with_program(&[0x00]);
    bus.memory[0xFFFE] = 0x10;
    bus.memory[0xFFFF] = 0x02;
    bus.memory[0x0210] = 0x40;
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.step(&mut bus);

    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 6, "RTI");
}

#[test]
fn indexed_read_page_cross_penalty() {
    // LDA $02F0,X with X = $20 crosses into $0310: 5 cycles.
    let mut bus = FlatBus::with_program(&[0xBD, 0xF0, 0x02]);
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.x = 0x20;

    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 5);
}

#[test]
fn indexed_store_penalty_is_unconditional() {
    // STA $0300,X with X = 0: still 5 cycles.
    assert_eq!(cycles_of(&[0x9D, 0x00, 0x03]), 5);
    // STA (zp),Y with Y = 0: still 6 cycles.
    assert_eq!(cycles_of(&[0x91, 0x10]), 6);
}

#[test]
fn branch_not_taken_is_two_cycles() {
    // BEQ with Z clear.
    assert_eq!(cycles_of(&[0xF0, 0x10]), 2);
}

#[test]
fn branch_taken_is_three_cycles() {
    let mut bus = FlatBus::with_program(&[0xF0, 0x10]);
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.status.insert(Status::Z);

    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 3);
    assert_eq!(cpu.pc, 0x0212);
}

/// This core deliberately omits the branch page-cross penalty: a taken
/// branch is three cycles wherever it lands.
#[test]
fn branch_page_cross_takes_one_extra_cycle() {
    // BEQ -$30 from $0202 lands at $01D2, crossing a page.
    let mut bus = FlatBus::with_program(&[0xF0, 0xD0]);
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.status.insert(Status::Z);

    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 3);
    assert_eq!(cpu.pc, 0x01D2);
}

#[test]
fn nmi_service_takes_seven_cycles() {
    let mut bus = FlatBus::with_program(&[0xEA]);
    bus.memory[0xFFFA] = 0x00;
    bus.memory[0xFFFB] = 0x05;
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);

    cpu.set_nmi();
    let before = cpu.cycles();
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles() - before, 7);
    assert_eq!(cpu.pc, 0x0500);
}

/// Bus that latches a $4014 write the way the NES bus does, so the CPU-side
/// OAM-DMA transfer loop can be timed in isolation.
struct DmaBus {
    memory: Box<[u8; 0x10000]>,
    dma_page: Option<u8>,
    oam_writes: u32,
}

impl Bus for DmaBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4014 => self.dma_page = Some(value),
            0x2004 => self.oam_writes += 1,
            _ => self.memory[addr as usize] = value,
        }
    }

    fn take_dma_page(&mut self) -> Option<u8> {
        self.dma_page.take()
    }
}

#[test]
fn oam_dma_transfer_cycles() {
    // LDA #$07, STA $4014.
    let mut memory = Box::new([0u8; 0x10000]);
    memory[0x0200..0x0205].copy_from_slice(&[0xA9, 0x07, 0x8D, 0x14, 0x40]);
    memory[0xFFFC] = 0x00;
    memory[0xFFFD] = 0x02;
    let mut bus = DmaBus {
        memory,
        dma_page: None,
        oam_writes: 0,
    };
    let mut cpu = Cpu::new();
    cpu.power(&mut bus);
    cpu.step(&mut bus); // LDA

    let before = cpu.cycles();
    cpu.step(&mut bus); // STA + transfer
    let spent = cpu.cycles() - before;

    assert_eq!(bus.oam_writes, 256);
    let dma_cycles = spent - 4;
    assert!(
        dma_cycles == 513 || dma_cycles == 514,
        "DMA took {dma_cycles} cycles"
    );
}
