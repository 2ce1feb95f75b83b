//! IA-32 instruction encoder.
//!
//! Appends the IA-32 counterpart of one decoded Y86 [`Instruction`] to the
//! output buffer. Control transfers get a zeroed rel32 field and a
//! [`Relocation`] telling the linker where that field sits.

use alloc::vec::Vec;

use crate::ir::{Instruction, Operands, Register};
use crate::table::Form;

/// A rel32 field written by [`encode_instruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Offset of the rel32 field in the output buffer.
    pub field_offset: usize,
    /// Absolute source address the field must reach.
    pub target: u32,
}

/// Width of every relocated displacement field.
pub const REL32_SIZE: usize = 4;

// ─── ModR/M / SIB ────────────────────────────────────────────

/// ModR/M `mod` for register-direct operands.
const MOD_REG: u8 = 0b11;
/// ModR/M `mod` for `[base + disp32]`.
const MOD_DISP32: u8 = 0b10;
/// ModR/M `mod` for `[disp32]` when paired with rm=101.
const MOD_INDIRECT: u8 = 0b00;
/// `rm` value that means "a SIB byte follows".
const RM_SIB: u8 = 0b100;
/// `rm` value that means `[disp32]` under `mod=00`.
const RM_DISP32: u8 = 0b101;
/// SIB for `[esp]`: scale 1, no index, base esp.
const SIB_ESP_BASE: u8 = 0x24;

/// Build ModR/M byte.
#[inline]
fn modrm(mod_: u8, reg: u8, rm: u8) -> u8 {
    (mod_ << 6) | ((reg & 7) << 3) | (rm & 7)
}

/// Append ModR/M (plus SIB when needed) and disp32 for `[base + disp]`.
fn push_memory(out: &mut Vec<u8>, reg: Register, base: Option<Register>, disp: u32) {
    match base {
        None => out.push(modrm(MOD_INDIRECT, reg.code(), RM_DISP32)),
        // rm=100 selects a SIB byte, so %esp as a base needs one.
        Some(Register::Esp) => {
            out.push(modrm(MOD_DISP32, reg.code(), RM_SIB));
            out.push(SIB_ESP_BASE);
        }
        Some(b) => out.push(modrm(MOD_DISP32, reg.code(), b.code())),
    }
    out.extend_from_slice(&disp.to_le_bytes());
}

/// Append a register-indexed opcode: all bytes of `target` with `reg`
/// added to the last one.
fn push_indexed(out: &mut Vec<u8>, target: &[u8], reg: Register) {
    if let Some((&base, prefix)) = target.split_last() {
        out.extend_from_slice(prefix);
        out.push(base + reg.code());
    }
}

/// Append the translation of `instr` to `out`.
///
/// Returns the rel32 field to patch for jumps and calls.
///
/// # Examples
///
/// ```
/// use y2x86::{decode_at, encode_instruction, Dialect};
///
/// // irmovl $0x2a, %ecx
/// let instr = decode_at(&[0x30, 0xF1, 0x2A, 0, 0, 0], 0, Dialect::Legacy)?;
/// let mut out = Vec::new();
/// let reloc = encode_instruction(&instr, &mut out);
/// assert_eq!(out, [0xB9, 0x2A, 0, 0, 0]);
/// assert!(reloc.is_none());
/// # Ok::<(), y2x86::TranslateError>(())
/// ```
pub fn encode_instruction(instr: &Instruction, out: &mut Vec<u8>) -> Option<Relocation> {
    let encoding = instr.encoding();
    match instr.operands() {
        Operands::None => out.extend_from_slice(encoding.target),
        Operands::RegReg { ra, rb } => {
            out.extend_from_slice(encoding.target);
            let (reg, rm) = match encoding.form {
                Form::CondMove => (rb, ra),
                _ => (ra, rb),
            };
            out.push(modrm(MOD_REG, reg.code(), rm.code()));
        }
        Operands::RegImm { rb, imm } => {
            push_indexed(out, encoding.target, rb);
            out.extend_from_slice(&imm.to_le_bytes());
        }
        Operands::Memory { ra, base, disp } => {
            out.extend_from_slice(encoding.target);
            push_memory(out, ra, base, disp);
        }
        Operands::Target(target) => {
            out.extend_from_slice(encoding.target);
            let field_offset = out.len();
            out.extend_from_slice(&[0; REL32_SIZE]);
            return Some(Relocation {
                field_offset,
                target,
            });
        }
        Operands::Reg(reg) => push_indexed(out, encoding.target, reg),
        Operands::Imm8(v) => {
            out.extend_from_slice(encoding.target);
            out.push(v);
        }
    }
    None
}
