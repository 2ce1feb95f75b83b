//! Error types for translation failures.

use alloc::string::String;
use core::fmt;

/// Coarse classification of a [`TranslateError`].
///
/// Decode errors come from pass 1, relocation errors from pass 2, and
/// truncation errors from an instruction whose operands run past the end of
/// the source stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCategory {
    /// The byte at the cursor is not a supported instruction.
    Decode,
    /// A control transfer targets an address that is not an instruction boundary.
    Relocation,
    /// An instruction claims operand bytes beyond the end of the stream.
    Truncation,
    /// A configured resource limit was exceeded.
    Limit,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Decode => write!(f, "decode error"),
            ErrorCategory::Relocation => write!(f, "relocation error"),
            ErrorCategory::Truncation => write!(f, "truncation error"),
            ErrorCategory::Limit => write!(f, "limit error"),
        }
    }
}

/// Translation error with the source offset it was detected at.
///
/// Every variant aborts the translation call: no partially translated or
/// partially patched buffer is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TranslateError {
    /// The opcode byte has no entry in the encoding table.
    UnknownOpcode {
        /// Source offset of the opcode byte.
        offset: usize,
        /// The unrecognized byte.
        opcode: u8,
    },

    /// A register nibble is outside the eight general-purpose registers.
    InvalidRegister {
        /// Source offset of the instruction holding the register field.
        offset: usize,
        /// The offending 4-bit value.
        nibble: u8,
    },

    /// The instruction at `offset` needs more bytes than the stream holds.
    Truncated {
        /// Source offset of the truncated instruction.
        offset: usize,
        /// Bytes the instruction needs, counted from `offset`.
        needed: usize,
        /// Bytes actually left in the stream from `offset`.
        available: usize,
    },

    /// A jump or call targets an address that was never decoded as an
    /// instruction start (misaligned or out of range).
    UnresolvedTarget {
        /// Source offset of the control-transfer instruction.
        offset: usize,
        /// The absolute source address it targets.
        target: u32,
    },

    /// The computed displacement does not fit a signed 32-bit field.
    DisplacementOverflow {
        /// Source offset of the control-transfer instruction.
        offset: usize,
        /// The displacement that overflowed.
        disp: i64,
    },

    /// A relocation record points outside the output buffer it is applied to.
    FieldOutOfBounds {
        /// Source offset of the control-transfer instruction.
        offset: usize,
        /// Output offset of the rel32 field.
        field_offset: usize,
        /// Length of the output buffer.
        output_len: usize,
    },

    /// A configurable resource limit was exceeded.
    ResourceLimitExceeded {
        /// Human-readable name of the resource (e.g. "source bytes").
        resource: String,
        /// The configured limit that was exceeded.
        limit: usize,
    },
}

impl TranslateError {
    /// The category this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslateError::UnknownOpcode { .. } | TranslateError::InvalidRegister { .. } => {
                ErrorCategory::Decode
            }
            TranslateError::Truncated { .. } => ErrorCategory::Truncation,
            TranslateError::UnresolvedTarget { .. }
            | TranslateError::DisplacementOverflow { .. }
            | TranslateError::FieldOutOfBounds { .. } => ErrorCategory::Relocation,
            TranslateError::ResourceLimitExceeded { .. } => ErrorCategory::Limit,
        }
    }

    /// Source offset the error was detected at, if it has one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            TranslateError::UnknownOpcode { offset, .. }
            | TranslateError::InvalidRegister { offset, .. }
            | TranslateError::Truncated { offset, .. }
            | TranslateError::UnresolvedTarget { offset, .. }
            | TranslateError::DisplacementOverflow { offset, .. }
            | TranslateError::FieldOutOfBounds { offset, .. } => Some(*offset),
            TranslateError::ResourceLimitExceeded { .. } => None,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::UnknownOpcode { offset, opcode } => {
                write!(f, "0x{:04X}: unknown opcode 0x{:02X}", offset, opcode)
            }
            TranslateError::InvalidRegister { offset, nibble } => {
                write!(f, "0x{:04X}: invalid register field 0x{:X}", offset, nibble)
            }
            TranslateError::Truncated {
                offset,
                needed,
                available,
            } => {
                write!(
                    f,
                    "0x{:04X}: truncated instruction (needs {} bytes, {} available)",
                    offset, needed, available
                )
            }
            TranslateError::UnresolvedTarget { offset, target } => {
                write!(
                    f,
                    "0x{:04X}: control transfer target 0x{:X} is not an instruction boundary",
                    offset, target
                )
            }
            TranslateError::DisplacementOverflow { offset, disp } => {
                write!(
                    f,
                    "0x{:04X}: displacement {} does not fit in 32 bits",
                    offset, disp
                )
            }
            TranslateError::FieldOutOfBounds {
                offset,
                field_offset,
                output_len,
            } => {
                write!(
                    f,
                    "0x{:04X}: rel32 field at output offset {} is outside the {}-byte output",
                    offset, field_offset, output_len
                )
            }
            TranslateError::ResourceLimitExceeded { resource, limit } => {
                write!(
                    f,
                    "resource limit exceeded: {} (limit: {})",
                    resource, limit
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TranslateError {}
