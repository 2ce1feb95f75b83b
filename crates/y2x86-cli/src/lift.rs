//! Disassembly of translated code with iced-x86.

use std::fmt::Write;

use iced_x86::{Decoder, DecoderOptions, Formatter, Instruction, IntelFormatter};

/// Intel-syntax listing of 32-bit `code` loaded at `base`, one line per
/// instruction: address, bytes, text.
pub fn disassemble(code: &[u8], base: u32) -> String {
    let mut decoder = Decoder::with_ip(32, code, u64::from(base), DecoderOptions::NONE);
    let mut formatter = IntelFormatter::new();
    formatter.options_mut().set_first_operand_char_index(8);

    let mut out = String::new();
    let mut text = String::new();
    let mut instr = Instruction::default();
    while decoder.can_decode() {
        decoder.decode_out(&mut instr);
        text.clear();
        formatter.format(&instr, &mut text);

        let start = (instr.ip() - u64::from(base)) as usize;
        let bytes: String = code[start..start + instr.len()]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect();
        let _ = writeln!(out, "{:08X}  {:<20}  {}", instr.ip(), bytes, text);
    }
    out
}
