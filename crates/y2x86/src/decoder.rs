//! Y86 instruction decoder.
//!
//! Walks a raw byte slice left to right. Every read goes through a
//! bounds-checked accessor; an instruction whose operands run past the end
//! of the stream is reported before any of its operand bytes are read.

use crate::error::TranslateError;
use crate::ir::{Instruction, Operands, Register};
use crate::table::{self, Dialect, Encoding, Form};

/// Iterator over the instructions of a source stream.
///
/// Yields `Err` once and then stops when decoding fails.
///
/// # Examples
///
/// ```
/// use y2x86::{Decoder, Dialect, Mnemonic};
///
/// let src = [0x10, 0x30, 0xF0, 0x2A, 0x00, 0x00, 0x00, 0x00];
/// let mnemonics: Vec<Mnemonic> = Decoder::new(&src, Dialect::Legacy)
///     .map(|r| r.map(|i| i.mnemonic()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(mnemonics, [Mnemonic::Nop, Mnemonic::Irmovl, Mnemonic::Halt]);
/// # Ok::<(), y2x86::TranslateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    src: &'a [u8],
    pos: usize,
    dialect: Dialect,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at offset 0.
    pub fn new(src: &'a [u8], dialect: Dialect) -> Self {
        Self {
            src,
            pos: 0,
            dialect,
        }
    }

    /// Current cursor offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the cursor has reached the end of the stream.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Instruction, TranslateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_at_end() {
            return None;
        }
        match decode_at(self.src, self.pos, self.dialect) {
            Ok(instr) => {
                self.pos += instr.stride();
                Some(Ok(instr))
            }
            Err(e) => {
                self.pos = self.src.len();
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for Decoder<'_> {}

/// Decode the single instruction starting at `offset`.
///
/// # Errors
///
/// - [`TranslateError::UnknownOpcode`] if the byte at `offset` has no entry
///   in the encoding table.
/// - [`TranslateError::Truncated`] if the instruction extends past the end of
///   `src` (or `offset` itself is out of range).
/// - [`TranslateError::InvalidRegister`] if a required register nibble is
///   not one of the eight general-purpose registers.
pub fn decode_at(src: &[u8], offset: usize, dialect: Dialect) -> Result<Instruction, TranslateError> {
    let opcode = *src.get(offset).ok_or(TranslateError::Truncated {
        offset,
        needed: 1,
        available: 0,
    })?;
    let encoding = table::lookup(opcode).ok_or(TranslateError::UnknownOpcode { offset, opcode })?;
    let bytes = window(src, offset, encoding.len as usize)?;
    let operands = decode_operands(encoding, bytes, offset)?;
    Ok(Instruction {
        offset,
        encoding,
        operands,
        stride: encoding.stride(dialect),
    })
}

/// The `len` bytes starting at `offset`, or a truncation error.
fn window(src: &[u8], offset: usize, len: usize) -> Result<&[u8], TranslateError> {
    let available = src.len().saturating_sub(offset);
    offset
        .checked_add(len)
        .and_then(|end| src.get(offset..end))
        .ok_or(TranslateError::Truncated {
            offset,
            needed: len,
            available,
        })
}

fn decode_operands(
    encoding: &Encoding,
    bytes: &[u8],
    offset: usize,
) -> Result<Operands, TranslateError> {
    let ops = match encoding.form {
        Form::Fixed => Operands::None,
        Form::RegPair | Form::CondMove => {
            let (ra, rb) = nibbles(bytes, 1, offset)?;
            Operands::RegReg {
                ra: required(ra, offset)?,
                rb: required(rb, offset)?,
            }
        }
        Form::MovImm => {
            let (_, rb) = nibbles(bytes, 1, offset)?;
            Operands::RegImm {
                rb: required(rb, offset)?,
                imm: le32(bytes, 2, offset)?,
            }
        }
        Form::Store | Form::Load => {
            let (ra, rb) = nibbles(bytes, 1, offset)?;
            let base = if rb == Register::NONE_NIBBLE {
                None
            } else {
                Some(required(rb, offset)?)
            };
            Operands::Memory {
                ra: required(ra, offset)?,
                base,
                disp: le32(bytes, 2, offset)?,
            }
        }
        Form::Branch => Operands::Target(le32(bytes, 1, offset)?),
        Form::Push | Form::Pop => {
            let (ra, _) = nibbles(bytes, 1, offset)?;
            Operands::Reg(required(ra, offset)?)
        }
        Form::Trap => Operands::Imm8(byte(bytes, 1, offset)?),
    };
    Ok(ops)
}

// ─── Width-checked accessors ───────────────────────────────

fn byte(bytes: &[u8], at: usize, offset: usize) -> Result<u8, TranslateError> {
    bytes.get(at).copied().ok_or(TranslateError::Truncated {
        offset,
        needed: at + 1,
        available: bytes.len(),
    })
}

/// Split a register byte into its `(high, low)` nibbles.
fn nibbles(bytes: &[u8], at: usize, offset: usize) -> Result<(u8, u8), TranslateError> {
    let b = byte(bytes, at, offset)?;
    Ok((b >> 4, b & 0x0F))
}

fn le32(bytes: &[u8], at: usize, offset: usize) -> Result<u32, TranslateError> {
    let field: [u8; 4] = bytes
        .get(at..at + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(TranslateError::Truncated {
            offset,
            needed: at + 4,
            available: bytes.len(),
        })?;
    Ok(u32::from_le_bytes(field))
}

fn required(nibble: u8, offset: usize) -> Result<Register, TranslateError> {
    Register::from_nibble(nibble).ok_or(TranslateError::InvalidRegister { offset, nibble })
}
