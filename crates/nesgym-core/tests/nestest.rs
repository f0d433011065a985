//! nestest.nes conformance run.
//!
//! Runs the ROM in automation mode (PC forced to $C000) when a copy is
//! available at `test-roms/nestest.nes` under the workspace root; skips
//! quietly otherwise so CI does not need the ROM checked in.

use std::fs;
use std::path::PathBuf;

use nesgym_core::Environment;

fn rom_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-roms/nestest.nes")
}

#[test]
fn nestest_automation_run() {
    let path = rom_path();
    let Ok(data) = fs::read(&path) else {
        println!("skipping nestest: ROM not found at {path:?}");
        return;
    };

    let mut env = Environment::from_bytes(&data).expect("nestest.nes should load");

    // Automation mode starts at $C000 instead of the reset vector.
    env.machine_mut().cpu_mut().pc = 0xC000;

    // The documented run ends at $C66E on cycle 26,554.
    let mut steps = 0u32;
    while env.machine().cpu().pc != 0xC66E && steps < 10_000 {
        env.machine_mut().step();
        steps += 1;
    }

    let cpu = env.machine().cpu();
    assert_eq!(cpu.pc, 0xC66E, "did not reach the automation exit");
    assert_eq!(cpu.cycles(), 26_554);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.x, 0xFF);
    assert_eq!(cpu.y, 0x00);
    assert_eq!(cpu.status.bits(), 0x24);
    assert_eq!(cpu.sp, 0xFD);
    // Error codes from the test harness.
    assert_eq!(env.peek(0x0002), 0x00, "documented opcode failures");
    assert_eq!(env.peek(0x0003), 0x00, "addressing failures");
}
