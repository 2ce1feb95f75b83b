//! Basic translation example: demonstrates the one-shot and builder APIs.
//!
//! Run with: `cargo run --example basic`

use y2x86::{translate, Dialect, Translator};

fn main() {
    println!("=== y2x86 basic example ===\n");

    // --- One-shot translation ---
    println!("1. One-shot translation (irmovl $42, %eax; ret):");
    let bytes = translate(&[0x30, 0xF0, 0x2A, 0, 0, 0, 0x90]).unwrap();
    print_hex("   ", &bytes);

    // --- Builder API ---
    println!("\n2. Builder API (sum 1..=5 with a loop):");
    #[rustfmt::skip]
    let program = [
        0x30, 0xF0, 0, 0, 0, 0,         // 0x00 irmovl $0, %eax
        0x30, 0xF1, 5, 0, 0, 0,         // 0x06 irmovl $5, %ecx
        0x30, 0xF2, 1, 0, 0, 0,         // 0x0C irmovl $1, %edx
        0x60, 0x10,                     // 0x12 addl %ecx, %eax
        0x61, 0x21,                     // 0x14 subl %edx, %ecx
        0x74, 0x12, 0, 0, 0,            // 0x16 jne 0x12
        0x00,                           // 0x1B halt
    ];
    let mut t = Translator::new();
    t.dialect(Dialect::Canonical)
        .base_address(0x0804_8000)
        .enable_listing();
    let result = t.translate(&program).unwrap();
    print_hex("   ", result.bytes());

    println!("\n   Listing:");
    for line in result.listing().lines() {
        println!("   {}", line);
    }

    println!("\n   Relocations:");
    for r in result.relocations() {
        println!(
            "   0x{:04X}: target 0x{:X} -> out 0x{:X}, rel32 {}",
            r.source_offset, r.target, r.target_output, r.displacement
        );
    }
}

fn print_hex(prefix: &str, bytes: &[u8]) {
    print!("{}", prefix);
    for b in bytes {
        print!("{:02X} ", b);
    }
    println!("({} bytes)", bytes.len());
}
