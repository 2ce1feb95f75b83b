//! End-to-end translation tests over complete Y86 programs.

use y2x86::{
    translate, translate_with, Dialect, ErrorCategory, Mnemonic, TranslateError, Translator,
};

fn rel32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// ─── Basic programs ─────────────────────────────────────────────────────────

#[test]
fn jmp_to_third_instruction() {
    // 0x00 jmp 0x07
    // 0x05 halt
    // 0x06 nop
    // 0x07 halt
    let src = [0x70, 0x07, 0, 0, 0, 0x00, 0x10, 0x00];
    let code = translate(&src).unwrap();
    assert_eq!(code, [0xE9, 0x02, 0, 0, 0, 0xF4, 0x90, 0xF4]);
}

#[test]
fn straight_line_program() {
    // irmovl $10, %eax
    // irmovl $3, %ebx
    // addl %ebx, %eax
    // pushl %eax
    // popl %ecx
    // halt
    let src = [
        0x30, 0xF0, 0x0A, 0, 0, 0, //
        0x30, 0xF3, 0x03, 0, 0, 0, //
        0x60, 0x30, //
        0xA0, 0x0F, //
        0xB0, 0x1F, //
        0x00,
    ];
    let code = translate(&src).unwrap();
    assert_eq!(
        code,
        [
            0xB8, 0x0A, 0, 0, 0, //
            0xBB, 0x03, 0, 0, 0, //
            0x01, 0xD8, //
            0x50, //
            0x59, //
            0xF4,
        ]
    );
}

#[test]
fn counting_loop() {
    // 0x00 irmovl $5, %ecx
    // 0x06 irmovl $1, %edx
    // 0x0C subl %edx, %ecx
    // 0x0E jne 0x0C
    // 0x13 halt
    let src = [
        0x30, 0xF1, 0x05, 0, 0, 0, //
        0x30, 0xF2, 0x01, 0, 0, 0, //
        0x61, 0x21, //
        0x74, 0x0C, 0, 0, 0, //
        0x00,
    ];
    let result = Translator::new().translate(&src).unwrap();
    let code = result.bytes();
    // mov ecx,5 (5) mov edx,1 (5) sub ecx,edx (2) jne rel32 (6) hlt (1)
    assert_eq!(code.len(), 19);
    assert_eq!(&code[10..12], &[0x29, 0xD1]);
    assert_eq!(&code[12..14], &[0x0F, 0x85]);
    // target out 10, field at 14: 10 - 18
    assert_eq!(rel32(code, 14), -8);
    assert_eq!(code[18], 0xF4);
}

#[test]
fn call_and_return() {
    // 0x00 call 0x06
    // 0x05 halt
    // 0x06 xorl %eax, %eax
    // 0x08 ret
    let src = [0x80, 0x06, 0, 0, 0, 0x00, 0x63, 0x00, 0x90];
    let code = translate(&src).unwrap();
    assert_eq!(code, [0xE8, 0x01, 0, 0, 0, 0xF4, 0x31, 0xC0, 0xC3]);
}

#[test]
fn every_conditional_jump_and_move() {
    let jumps = [
        (0x71, 0x8E),
        (0x72, 0x8C),
        (0x73, 0x84),
        (0x74, 0x85),
        (0x75, 0x8D),
        (0x76, 0x8F),
    ];
    for (y86, ia32) in jumps {
        // jXX 0x05; halt
        let code = translate(&[y86, 0x05, 0, 0, 0, 0x00]).unwrap();
        assert_eq!(code, [0x0F, ia32, 0, 0, 0, 0, 0xF4], "opcode 0x{y86:02X}");
    }

    let moves = [
        (0x21, 0x4E),
        (0x22, 0x4C),
        (0x23, 0x44),
        (0x24, 0x45),
        (0x25, 0x4D),
        (0x26, 0x4F),
    ];
    for (y86, ia32) in moves {
        // cmovXX %eax, %edx -> cmovcc edx, eax
        let code = translate(&[y86, 0x02]).unwrap();
        assert_eq!(code, [0x0F, ia32, 0xD0], "opcode 0x{y86:02X}");
    }
}

#[test]
fn memory_forms() {
    // rmmovl %esi, -4(%ebp); mrmovl 0x100, %edi (canonical)
    let src = [
        0x40, 0x65, 0xFC, 0xFF, 0xFF, 0xFF, //
        0x50, 0x7F, 0x00, 0x01, 0, 0,
    ];
    let code = translate_with(&src, Dialect::Canonical).unwrap();
    assert_eq!(
        code,
        [
            0x89, 0xB5, 0xFC, 0xFF, 0xFF, 0xFF, //
            0x8B, 0x3D, 0x00, 0x01, 0, 0,
        ]
    );
}

#[test]
fn trap_passthrough() {
    assert_eq!(translate(&[0xCD, 0x80]).unwrap(), [0xCD, 0x80]);
}

// ─── Dialects ───────────────────────────────────────────────────────────────

#[test]
fn legacy_and_canonical_agree_without_mrmovl() {
    let src = [0x30, 0xF0, 0x01, 0, 0, 0, 0x40, 0x03, 0x08, 0, 0, 0, 0x00];
    assert_eq!(
        translate_with(&src, Dialect::Legacy).unwrap(),
        translate_with(&src, Dialect::Canonical).unwrap()
    );
}

#[test]
fn legacy_mrmovl_decodes_displacement_tail() {
    // mrmovl 8(%ebx), %eax: the last two displacement bytes (00 00) become
    // two halts under the legacy dialect.
    let src = [0x50, 0x03, 0x08, 0, 0, 0];
    assert_eq!(
        translate_with(&src, Dialect::Legacy).unwrap(),
        [0x8B, 0x83, 0x08, 0, 0, 0, 0xF4, 0xF4]
    );
    assert_eq!(
        translate_with(&src, Dialect::Canonical).unwrap(),
        [0x8B, 0x83, 0x08, 0, 0, 0]
    );
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[test]
fn unknown_opcode_fails_fast() {
    let err = translate(&[0x10, 0x10, 0xF0, 0x00]).unwrap_err();
    assert_eq!(
        err,
        TranslateError::UnknownOpcode {
            offset: 2,
            opcode: 0xF0
        }
    );
    assert_eq!(err.category(), ErrorCategory::Decode);
}

#[test]
fn out_of_range_target() {
    let err = translate(&[0x70, 0x00, 0x10, 0, 0, 0x00]).unwrap_err();
    assert_eq!(
        err,
        TranslateError::UnresolvedTarget {
            offset: 0,
            target: 0x1000
        }
    );
    assert_eq!(err.category(), ErrorCategory::Relocation);
}

#[test]
fn target_inside_an_instruction() {
    // jmp 0x06 lands in the middle of irmovl.
    let src = [0x70, 0x06, 0, 0, 0, 0x30, 0xF0, 0, 0, 0, 0];
    let err = translate(&src).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Relocation);
    assert_eq!(err.offset(), Some(0));
}

#[test]
fn truncated_tail() {
    let err = translate(&[0x10, 0x80, 0x00]).unwrap_err();
    assert_eq!(
        err,
        TranslateError::Truncated {
            offset: 1,
            needed: 5,
            available: 2
        }
    );
    assert_eq!(err.category(), ErrorCategory::Truncation);
}

// ─── Result metadata ────────────────────────────────────────────────────────

#[test]
fn address_map_covers_every_instruction() {
    let src = [0x10, 0x20, 0x01, 0x30, 0xF0, 0, 0, 0, 0, 0x00];
    let result = Translator::new().translate(&src).unwrap();
    let map: Vec<_> = result.address_map().iter().collect();
    assert_eq!(map, [(0, 0), (1, 1), (3, 3), (9, 8)]);
}

#[test]
fn applied_relocations_are_reported() {
    let src = [0x70, 0x07, 0, 0, 0, 0x00, 0x10, 0x00];
    let result = Translator::new().translate(&src).unwrap();
    let relocs = result.relocations();
    assert_eq!(relocs.len(), 1);
    assert_eq!(relocs[0].source_offset, 0);
    assert_eq!(relocs[0].field_offset, 1);
    assert_eq!(relocs[0].target, 7);
    assert_eq!(relocs[0].target_output, 7);
    assert_eq!(relocs[0].displacement, 2);
}

#[test]
fn hex_output_is_lowercase() {
    let result = Translator::new().translate(&[0x30, 0xF0, 0xAB, 0, 0, 0]).unwrap();
    assert_eq!(result.to_hex(), "b8ab000000");
}

#[test]
fn listing_shows_source_disassembly() {
    let mut t = Translator::new();
    t.enable_listing().base_address(0x0804_8000);
    let src = [0x30, 0xF3, 0x10, 0, 0, 0, 0x40, 0x03, 0x08, 0, 0, 0, 0x74, 0, 0, 0, 0];
    let listing = t.translate(&src).unwrap().listing();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("08048000  BB10000000"));
    assert!(lines[0].ends_with("irmovl $0x10, %ebx"));
    assert!(lines[1].ends_with("rmmovl %eax, 8(%ebx)"));
    assert!(lines[2].ends_with("jne 0x0"));
}

#[test]
fn decoder_is_usable_on_its_own() {
    let src = [0x10, 0x70, 0x00, 0, 0, 0, 0x90];
    let mnemonics: Vec<Mnemonic> = y2x86::Decoder::new(&src, Dialect::Legacy)
        .map(|r| r.unwrap().mnemonic())
        .collect();
    assert_eq!(mnemonics, [Mnemonic::Nop, Mnemonic::Jmp, Mnemonic::Ret]);
}
