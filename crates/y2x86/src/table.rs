//! The instruction encoding table.
//!
//! One [`Encoding`] per supported Y86 opcode byte, sorted by opcode so that
//! [`lookup`] is a binary search. The decoder uses [`Encoding::form`] and
//! [`Encoding::len`] to pull operands out of the source stream; the encoder
//! uses [`Encoding::target`] and [`Encoding::form`] to build the IA-32 bytes.

use crate::ir::Mnemonic;

// ─── IA-32 opcode families ─────────────────────────────────

/// `MOV r32, imm32` occupies `B8..BF`; low nibble is `8 + register`.
pub const X86_MOV_R32_IMM32: u8 = 0xB8;
/// `PUSH r32` occupies `50..57`; low nibble is the register.
pub const X86_PUSH_R32: u8 = 0x50;
/// `POP r32` occupies `58..5F`; low nibble is `8 + register`.
pub const X86_POP_R32: u8 = 0x58;

/// Cursor advance of `mrmovl` under [`Dialect::Legacy`].
pub const LEGACY_MRMOVL_STRIDE: usize = 4;

/// Operand layout of a source instruction, and how its IA-32 form is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Form {
    /// Opcode only.
    Fixed,
    /// `rA:rB`; ModR/M mod=11, reg=rA, rm=rB (`op r/m32, r32`).
    RegPair,
    /// `rA:rB`; ModR/M mod=11, reg=rB, rm=rA (`cmovcc r32, r/m32`).
    CondMove,
    /// `F:rB imm32`; register-indexed opcode plus the immediate.
    MovImm,
    /// `rA:rB disp32`; `mov [rB+disp32], rA`.
    Store,
    /// `rA:rB disp32`; `mov rA, [rB+disp32]`.
    Load,
    /// `dest32`; opcode plus a rel32 placeholder patched by the linker.
    Branch,
    /// `rA:F`; register-indexed `push`.
    Push,
    /// `rA:F`; register-indexed `pop`.
    Pop,
    /// `imm8`; opcode and vector copied through.
    Trap,
}

/// Decoding dialect.
///
/// The two dialects only differ in how far the cursor advances past
/// `mrmovl`. Both read the full 4-byte displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dialect {
    /// `mrmovl` advances the cursor by 4 bytes. The upper half of its
    /// displacement is then decoded as the next instructions.
    #[default]
    Legacy,
    /// CS:APP encoding: `mrmovl` advances the cursor by its full 6 bytes.
    Canonical,
}

/// Encoding rule for one source opcode byte.
#[derive(Debug, PartialEq, Eq)]
pub struct Encoding {
    /// Source opcode byte (`icode:ifun`).
    pub opcode: u8,
    /// Source mnemonic.
    pub mnemonic: Mnemonic,
    /// Operand form.
    pub form: Form,
    /// IA-32 opcode bytes. For register-indexed families the last byte is
    /// the family base and the register number is added to it.
    pub target: &'static [u8],
    /// Source bytes the instruction occupies (opcode included).
    pub len: u8,
}

impl Encoding {
    /// How far the decode cursor advances past this instruction.
    #[must_use]
    pub fn stride(&self, dialect: Dialect) -> usize {
        match (self.mnemonic, dialect) {
            (Mnemonic::Mrmovl, Dialect::Legacy) => LEGACY_MRMOVL_STRIDE,
            _ => self.len as usize,
        }
    }
}

macro_rules! enc {
    ($opcode:expr, $mnemonic:ident, $form:ident, [$($byte:expr),+], $len:expr) => {
        Encoding {
            opcode: $opcode,
            mnemonic: Mnemonic::$mnemonic,
            form: Form::$form,
            target: &[$($byte),+],
            len: $len,
        }
    };
}

/// All supported source instructions, sorted by opcode.
pub static ENCODINGS: [Encoding; 28] = [
    enc!(0x00, Halt, Fixed, [0xF4], 1),
    enc!(0x10, Nop, Fixed, [0x90], 1),
    enc!(0x20, Rrmovl, RegPair, [0x89], 2),
    enc!(0x21, Cmovle, CondMove, [0x0F, 0x4E], 2),
    enc!(0x22, Cmovl, CondMove, [0x0F, 0x4C], 2),
    enc!(0x23, Cmove, CondMove, [0x0F, 0x44], 2),
    enc!(0x24, Cmovne, CondMove, [0x0F, 0x45], 2),
    enc!(0x25, Cmovge, CondMove, [0x0F, 0x4D], 2),
    enc!(0x26, Cmovg, CondMove, [0x0F, 0x4F], 2),
    enc!(0x30, Irmovl, MovImm, [X86_MOV_R32_IMM32], 6),
    enc!(0x40, Rmmovl, Store, [0x89], 6),
    enc!(0x50, Mrmovl, Load, [0x8B], 6),
    enc!(0x60, Addl, RegPair, [0x01], 2),
    enc!(0x61, Subl, RegPair, [0x29], 2),
    enc!(0x62, Andl, RegPair, [0x21], 2),
    enc!(0x63, Xorl, RegPair, [0x31], 2),
    enc!(0x70, Jmp, Branch, [0xE9], 5),
    enc!(0x71, Jle, Branch, [0x0F, 0x8E], 5),
    enc!(0x72, Jl, Branch, [0x0F, 0x8C], 5),
    enc!(0x73, Je, Branch, [0x0F, 0x84], 5),
    enc!(0x74, Jne, Branch, [0x0F, 0x85], 5),
    enc!(0x75, Jge, Branch, [0x0F, 0x8D], 5),
    enc!(0x76, Jg, Branch, [0x0F, 0x8F], 5),
    enc!(0x80, Call, Branch, [0xE8], 5),
    enc!(0x90, Ret, Fixed, [0xC3], 1),
    enc!(0xA0, Pushl, Push, [X86_PUSH_R32], 2),
    enc!(0xB0, Popl, Pop, [X86_POP_R32], 2),
    enc!(0xCD, Int, Trap, [0xCD], 2),
];

/// Encoding rule for `opcode`, if the byte is a supported instruction.
#[inline]
#[must_use]
pub fn lookup(opcode: u8) -> Option<&'static Encoding> {
    ENCODINGS
        .binary_search_by_key(&opcode, |e| e.opcode)
        .ok()
        .map(|i| &ENCODINGS[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sorted_and_unique() {
        for pair in ENCODINGS.windows(2) {
            assert!(
                pair[0].opcode < pair[1].opcode,
                "0x{:02X} must sort before 0x{:02X}",
                pair[0].opcode,
                pair[1].opcode
            );
        }
    }

    #[test]
    fn every_entry_is_found() {
        for e in &ENCODINGS {
            let found = lookup(e.opcode).unwrap();
            assert_eq!(found.mnemonic, e.mnemonic);
            assert!(!e.target.is_empty());
        }
    }

    #[test]
    fn unsupported_bytes_miss() {
        for byte in [0x01, 0x27, 0x64, 0x77, 0x81, 0x91, 0xC0, 0xFF] {
            assert!(lookup(byte).is_none(), "0x{:02X} should miss", byte);
        }
    }

    #[test]
    fn source_lengths() {
        let len = |op: u8| lookup(op).unwrap().len;
        assert_eq!(len(0x00), 1);
        assert_eq!(len(0x10), 1);
        assert_eq!(len(0x20), 2);
        assert_eq!(len(0x30), 6);
        assert_eq!(len(0x40), 6);
        assert_eq!(len(0x50), 6);
        assert_eq!(len(0x63), 2);
        assert_eq!(len(0x70), 5);
        assert_eq!(len(0x80), 5);
        assert_eq!(len(0x90), 1);
        assert_eq!(len(0xA0), 2);
        assert_eq!(len(0xB0), 2);
        assert_eq!(len(0xCD), 2);
    }

    #[test]
    fn mrmovl_stride_depends_on_dialect() {
        let e = lookup(0x50).unwrap();
        assert_eq!(e.stride(Dialect::Legacy), 4);
        assert_eq!(e.stride(Dialect::Canonical), 6);
        let e = lookup(0x40).unwrap();
        assert_eq!(e.stride(Dialect::Legacy), 6);
        assert_eq!(e.stride(Dialect::Canonical), 6);
    }

    #[test]
    fn register_family_bases() {
        // Low nibble 8..F families.
        assert_eq!(X86_MOV_R32_IMM32 & 0x0F, 8);
        assert_eq!(X86_POP_R32 & 0x0F, 8);
        // Low nibble 0..7 family.
        assert_eq!(X86_PUSH_R32 & 0x0F, 0);
    }

    #[test]
    fn control_transfers_are_branch_form() {
        for e in &ENCODINGS {
            assert_eq!(e.mnemonic.is_control_transfer(), e.form == Form::Branch);
        }
    }
}
