//! # y2x86: Y86 to IA-32 binary translator
//!
//! `y2x86` translates raw Y86 machine code (the CS:APP teaching ISA) into
//! equivalent 32-bit x86 machine code.
//!
//! ## Quick Start
//!
//! ```rust
//! use y2x86::translate;
//!
//! // irmovl $0x2a, %eax; halt
//! let code = translate(&[0x30, 0xF0, 0x2A, 0, 0, 0, 0x00]).unwrap();
//! assert_eq!(code, vec![0xB8, 0x2A, 0, 0, 0, 0xF4]);
//! ```
//!
//! ## How it works
//!
//! - **Pass 1** decodes the stream left to right, encodes each instruction,
//!   and records where every translated instruction starts. Jumps and calls
//!   get a zeroed rel32 field.
//! - **Pass 2** turns each absolute Y86 target into a rel32 displacement
//!   against the recorded output offsets.
//! - **`no_std` + `alloc`**; diagnostics go through the `log` facade.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// A binary translator narrows and reinterprets integer widths constantly
// (u32 targets as usize offsets, u32 displacements as i32) and uses dense
// hex literals for opcodes.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::return_self_not_must_use
)]

extern crate alloc;

/// Y86 decoder: iterator over instructions with width-checked reads.
pub mod decoder;
/// IA-32 encoder (ModR/M, SIB, rel32 placeholders).
pub mod encoder;
/// Error types.
pub mod error;
/// Decoded instruction representation: registers, mnemonics, operands.
pub mod ir;
/// Address map and relocation resolution.
pub mod linker;
/// Static opcode table.
pub mod table;
/// Public translator API: builder, two-pass translation, `TranslationResult`.
pub mod translator;

// Re-exports
pub use decoder::{decode_at, Decoder};
pub use encoder::{encode_instruction, Relocation};
pub use error::{ErrorCategory, TranslateError};
pub use ir::{Instruction, Mnemonic, Operands, Register};
pub use linker::{AddressMap, AppliedRelocation, RelocationRecord};
pub use table::{lookup, Dialect, Encoding, Form};
pub use translator::{Emission, ListingEntry, ResourceLimits, TranslationResult, Translator};

use alloc::vec::Vec;

/// Translate a Y86 byte stream with the default dialect and limits.
///
/// # Errors
///
/// Returns [`TranslateError`] on an unknown opcode, an invalid register
/// field, a truncated final instruction, or a jump/call whose target is not
/// the start of a decoded instruction.
///
/// # Examples
///
/// ```rust
/// use y2x86::translate;
///
/// // jmp 0x6; nop; halt
/// let code = translate(&[0x70, 0x06, 0, 0, 0, 0x10, 0x00]).unwrap();
/// assert_eq!(code, vec![0xE9, 0x01, 0, 0, 0, 0x90, 0xF4]);
/// ```
pub fn translate(source: &[u8]) -> Result<Vec<u8>, TranslateError> {
    translate_with(source, Dialect::default())
}

/// Translate with an explicit decoding dialect.
///
/// # Errors
///
/// Returns [`TranslateError`] on failure (see [`translate`] for details).
///
/// # Examples
///
/// ```rust
/// use y2x86::{translate_with, Dialect};
///
/// // mrmovl 8(%ebx), %eax; halt
/// let src = [0x50, 0x03, 0x08, 0, 0, 0, 0x00];
/// let code = translate_with(&src, Dialect::Canonical).unwrap();
/// assert_eq!(code, vec![0x8B, 0x83, 0x08, 0, 0, 0, 0xF4]);
/// ```
pub fn translate_with(source: &[u8], dialect: Dialect) -> Result<Vec<u8>, TranslateError> {
    let mut t = Translator::new();
    t.dialect(dialect);
    Ok(t.translate(source)?.into_bytes())
}
