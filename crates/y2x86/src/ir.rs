//! Decoded Y86 instructions: registers, mnemonics, operands.
//!
//! These types are produced by the decoder and consumed by the encoder.

use core::fmt;

use crate::table::{Encoding, Form};

/// Y86 general-purpose register.
///
/// The Y86 register numbering is the same as the IA-32 3-bit register
/// numbering, so [`Register::code`] is used directly in ModR/M fields and
/// register-indexed opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Register {
    /// `%eax`
    Eax = 0,
    /// `%ecx`
    Ecx = 1,
    /// `%edx`
    Edx = 2,
    /// `%ebx`
    Ebx = 3,
    /// `%esp`
    Esp = 4,
    /// `%ebp`
    Ebp = 5,
    /// `%esi`
    Esi = 6,
    /// `%edi`
    Edi = 7,
}

impl Register {
    /// All registers in encoding order.
    pub const ALL: [Register; 8] = [
        Register::Eax,
        Register::Ecx,
        Register::Edx,
        Register::Ebx,
        Register::Esp,
        Register::Ebp,
        Register::Esi,
        Register::Edi,
    ];

    /// The "no register" nibble used by Y86 filler fields.
    pub const NONE_NIBBLE: u8 = 0xF;

    /// Register for a 4-bit field value, `None` for anything outside 0–7.
    #[must_use]
    pub fn from_nibble(nibble: u8) -> Option<Register> {
        Register::ALL.get(nibble as usize).copied()
    }

    /// 3-bit register number shared by Y86 and IA-32.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Bare register name (`"eax"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Register::Eax => "eax",
            Register::Ecx => "ecx",
            Register::Edx => "edx",
            Register::Ebx => "ebx",
            Register::Esp => "esp",
            Register::Ebp => "ebp",
            Register::Esi => "esi",
            Register::Edi => "edi",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.name())
    }
}

/// Y86 instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mnemonic {
    Halt,
    Nop,
    Rrmovl,
    Cmovle,
    Cmovl,
    Cmove,
    Cmovne,
    Cmovge,
    Cmovg,
    Irmovl,
    Rmmovl,
    Mrmovl,
    Addl,
    Subl,
    Andl,
    Xorl,
    Jmp,
    Jle,
    Jl,
    Je,
    Jne,
    Jge,
    Jg,
    Call,
    Ret,
    Pushl,
    Popl,
    Int,
}

impl Mnemonic {
    /// Assembler spelling of the mnemonic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Halt => "halt",
            Mnemonic::Nop => "nop",
            Mnemonic::Rrmovl => "rrmovl",
            Mnemonic::Cmovle => "cmovle",
            Mnemonic::Cmovl => "cmovl",
            Mnemonic::Cmove => "cmove",
            Mnemonic::Cmovne => "cmovne",
            Mnemonic::Cmovge => "cmovge",
            Mnemonic::Cmovg => "cmovg",
            Mnemonic::Irmovl => "irmovl",
            Mnemonic::Rmmovl => "rmmovl",
            Mnemonic::Mrmovl => "mrmovl",
            Mnemonic::Addl => "addl",
            Mnemonic::Subl => "subl",
            Mnemonic::Andl => "andl",
            Mnemonic::Xorl => "xorl",
            Mnemonic::Jmp => "jmp",
            Mnemonic::Jle => "jle",
            Mnemonic::Jl => "jl",
            Mnemonic::Je => "je",
            Mnemonic::Jne => "jne",
            Mnemonic::Jge => "jge",
            Mnemonic::Jg => "jg",
            Mnemonic::Call => "call",
            Mnemonic::Ret => "ret",
            Mnemonic::Pushl => "pushl",
            Mnemonic::Popl => "popl",
            Mnemonic::Int => "int",
        }
    }

    /// Whether the instruction carries an absolute target that needs relocation.
    #[must_use]
    pub fn is_control_transfer(self) -> bool {
        matches!(
            self,
            Mnemonic::Jmp
                | Mnemonic::Jle
                | Mnemonic::Jl
                | Mnemonic::Je
                | Mnemonic::Jne
                | Mnemonic::Jge
                | Mnemonic::Jg
                | Mnemonic::Call
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operands decoded from the bytes following the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// No operand bytes.
    None,
    /// `rA:rB` register pair.
    RegReg {
        /// High nibble of the register byte.
        ra: Register,
        /// Low nibble of the register byte.
        rb: Register,
    },
    /// Immediate loaded into `rB`.
    RegImm {
        /// Destination register.
        rb: Register,
        /// 32-bit immediate, as stored (little-endian) in the source.
        imm: u32,
    },
    /// `disp(base)` memory operand paired with a data register.
    Memory {
        /// Data register (source for stores, destination for loads).
        ra: Register,
        /// Base register; `None` for absolute addressing.
        base: Option<Register>,
        /// 32-bit displacement.
        disp: u32,
    },
    /// Absolute control-transfer target.
    Target(u32),
    /// Single register (push/pop).
    Reg(Register),
    /// 8-bit immediate (trap vector).
    Imm8(u8),
}

/// One decoded source instruction.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub(crate) offset: usize,
    pub(crate) encoding: &'static Encoding,
    pub(crate) operands: Operands,
    pub(crate) stride: usize,
}

impl Instruction {
    /// Source offset of the opcode byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The instruction's mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> Mnemonic {
        self.encoding.mnemonic
    }

    /// The encoding rule the instruction was decoded with.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Decoded operands.
    #[must_use]
    pub fn operands(&self) -> Operands {
        self.operands
    }

    /// Number of source bytes the decode cursor advances past this
    /// instruction. Under [`Dialect::Legacy`](crate::Dialect::Legacy) this is
    /// shorter than the encoded form for `mrmovl`.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The absolute target of a jump or call.
    #[must_use]
    pub fn target(&self) -> Option<u32> {
        match self.operands {
            Operands::Target(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.encoding.opcode == other.encoding.opcode
            && self.operands == other.operands
            && self.stride == other.stride
    }
}

impl Eq for Instruction {}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self.operands {
            Operands::None => write!(f, "{}", m),
            Operands::RegReg { ra, rb } => write!(f, "{} {}, {}", m, ra, rb),
            Operands::RegImm { rb, imm } => write!(f, "{} $0x{:x}, {}", m, imm, rb),
            Operands::Memory { ra, base, disp } => {
                let disp = disp as i32;
                let mem = MemFmt { base, disp };
                if self.encoding.form == Form::Load {
                    write!(f, "{} {}, {}", m, mem, ra)
                } else {
                    write!(f, "{} {}, {}", m, ra, mem)
                }
            }
            Operands::Target(t) => write!(f, "{} 0x{:x}", m, t),
            Operands::Reg(r) => write!(f, "{} {}", m, r),
            Operands::Imm8(v) => write!(f, "{} $0x{:x}", m, v),
        }
    }
}

struct MemFmt {
    base: Option<Register>,
    disp: i32,
}

impl fmt::Display for MemFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base {
            Some(base) if self.disp == 0 => write!(f, "({})", base),
            Some(base) => write!(f, "{}({})", self.disp, base),
            None => write!(f, "0x{:x}", self.disp as u32),
        }
    }
}
