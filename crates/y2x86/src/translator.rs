//! Public translator API: builder, two-pass translation, and `TranslationResult`.
//!
//! This module ties together the decoder, encoder, and linker.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::decoder::Decoder;
use crate::encoder::encode_instruction;
use crate::error::TranslateError;
use crate::linker::{AddressMap, AppliedRelocation, Linker, RelocationRecord};
use crate::table::Dialect;

/// Configurable resource limits, checked while translating untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceLimits {
    /// Maximum source stream size in bytes. Default: 16 MiB.
    pub max_source_bytes: usize,
    /// Maximum translated output size in bytes. Default: 64 MiB.
    pub max_output_bytes: usize,
    /// Maximum number of decoded instructions. Default: 4 Mi.
    pub max_instructions: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: 16 * 1024 * 1024,
            max_output_bytes: 64 * 1024 * 1024,
            max_instructions: 4 * 1024 * 1024,
        }
    }
}

/// One line of a translation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingEntry {
    /// Source offset of the instruction.
    pub source_offset: usize,
    /// Output offset of its translation.
    pub output_offset: usize,
    /// Number of bytes emitted for it.
    pub len: usize,
    /// Y86 disassembly.
    pub text: String,
}

/// Builder-pattern translator.
///
/// # Examples
///
/// ```rust
/// use y2x86::{Dialect, Translator};
///
/// let mut t = Translator::new();
/// t.dialect(Dialect::Canonical).base_address(0x0804_8000);
/// // jmp 0x6; nop; halt
/// let result = t.translate(&[0x70, 0x06, 0, 0, 0, 0x10, 0x00])?;
/// assert_eq!(result.bytes(), &[0xE9, 0x01, 0, 0, 0, 0x90, 0xF4]);
/// assert_eq!(result.output_address(6), Some(0x0804_8006));
/// # Ok::<(), y2x86::TranslateError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    dialect: Dialect,
    base_address: u32,
    limits: ResourceLimits,
    listing_enabled: bool,
}

impl Translator {
    /// Create a translator with the legacy dialect, base address 0 and
    /// default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoding dialect.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Set the load address of the translated code.
    ///
    /// Displacements are relative, so this only affects listings and
    /// [`TranslationResult::output_address`].
    pub fn base_address(&mut self, addr: u32) -> &mut Self {
        self.base_address = addr;
        self
    }

    /// Set resource limits.
    pub fn limits(&mut self, limits: ResourceLimits) -> &mut Self {
        self.limits = limits;
        self
    }

    /// Record per-instruction annotations for [`TranslationResult::listing`].
    pub fn enable_listing(&mut self) -> &mut Self {
        self.listing_enabled = true;
        self
    }

    /// Run pass 1: decode and encode the whole stream.
    ///
    /// The returned [`Emission`] holds placeholder displacements until
    /// [`Emission::link`] is called.
    pub fn emit(&self, source: &[u8]) -> Result<Emission, TranslateError> {
        if source.len() > self.limits.max_source_bytes {
            return Err(TranslateError::ResourceLimitExceeded {
                resource: "source bytes".into(),
                limit: self.limits.max_source_bytes,
            });
        }

        let mut bytes = Vec::with_capacity(source.len());
        let mut map = AddressMap::new();
        let mut linker = Linker::new();
        let mut listing = Vec::new();

        for instr in Decoder::new(source, self.dialect) {
            let instr = instr?;
            if map.len() >= self.limits.max_instructions {
                return Err(TranslateError::ResourceLimitExceeded {
                    resource: "instructions".into(),
                    limit: self.limits.max_instructions,
                });
            }

            let start = bytes.len();
            let reloc = encode_instruction(&instr, &mut bytes);
            if bytes.len() > self.limits.max_output_bytes {
                return Err(TranslateError::ResourceLimitExceeded {
                    resource: "output bytes".into(),
                    limit: self.limits.max_output_bytes,
                });
            }
            let len = bytes.len() - start;

            map.insert(instr.offset(), start);
            if let Some(reloc) = reloc {
                linker.add(RelocationRecord {
                    source_offset: instr.offset(),
                    field_offset: reloc.field_offset,
                    target: reloc.target,
                });
            }

            log::trace!(
                "0x{:04X}: {} -> out 0x{:04X} ({} bytes)",
                instr.offset(),
                instr,
                start,
                len
            );
            if self.listing_enabled {
                listing.push(ListingEntry {
                    source_offset: instr.offset(),
                    output_offset: start,
                    len,
                    text: format!("{}", instr),
                });
            }
        }

        log::debug!(
            "pass 1: {} source bytes, {} instructions, {} output bytes, {} relocations",
            source.len(),
            map.len(),
            bytes.len(),
            linker.pending().len()
        );

        Ok(Emission {
            bytes,
            map,
            linker,
            listing,
            base_address: self.base_address,
        })
    }

    /// Translate `source` (pass 1 then pass 2).
    ///
    /// # Errors
    ///
    /// Any decode, truncation, relocation, or resource-limit error. No
    /// partially translated output is returned.
    pub fn translate(&self, source: &[u8]) -> Result<TranslationResult, TranslateError> {
        self.emit(source)?.link()
    }
}

/// Output of pass 1: translated bytes with zeroed displacement fields.
#[derive(Debug, Clone)]
pub struct Emission {
    bytes: Vec<u8>,
    map: AddressMap,
    linker: Linker,
    listing: Vec<ListingEntry>,
    base_address: u32,
}

impl Emission {
    /// Translated bytes, displacement fields still zero.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Source → output offsets of every decoded instruction.
    #[must_use]
    pub fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// Relocation records waiting for pass 2.
    #[must_use]
    pub fn pending_relocations(&self) -> &[RelocationRecord] {
        self.linker.pending()
    }

    /// Run pass 2: patch every displacement.
    ///
    /// # Errors
    ///
    /// [`TranslateError::UnresolvedTarget`] or
    /// [`TranslateError::DisplacementOverflow`].
    pub fn link(mut self) -> Result<TranslationResult, TranslateError> {
        let relocations = self.linker.resolve(&mut self.bytes, &self.map)?;
        log::debug!("pass 2: {} relocations applied", relocations.len());
        Ok(TranslationResult {
            bytes: self.bytes,
            address_map: self.map,
            relocations,
            base_address: self.base_address,
            listing: self.listing,
        })
    }
}

/// The result of a successful translation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct TranslationResult {
    bytes: Vec<u8>,
    address_map: AddressMap,
    relocations: Vec<AppliedRelocation>,
    base_address: u32,
    listing: Vec<ListingEntry>,
}

impl TranslationResult {
    /// The translated IA-32 bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Output size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Source → output offset of every decoded instruction.
    #[must_use]
    pub fn address_map(&self) -> &AddressMap {
        &self.address_map
    }

    /// Displacements patched in pass 2, in source order.
    #[must_use]
    pub fn relocations(&self) -> &[AppliedRelocation] {
        &self.relocations
    }

    /// Load address the result was translated for.
    #[must_use]
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    /// Absolute address of the translation of the instruction at `source_offset`.
    #[must_use]
    pub fn output_address(&self, source_offset: usize) -> Option<u32> {
        let out = self.address_map.get(source_offset)?;
        u32::try_from(out)
            .ok()
            .and_then(|o| self.base_address.checked_add(o))
    }

    /// Lowercase hex string of the output bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex(&self.bytes)
    }

    /// Per-instruction annotations (empty unless listing was enabled).
    #[must_use]
    pub fn listing_entries(&self) -> &[ListingEntry] {
        &self.listing
    }

    /// Human-readable listing: output address, emitted bytes, source
    /// offset, Y86 disassembly.
    ///
    /// # Example output
    ///
    /// ```text
    /// 00000000  E901000000            0000  jmp 0x6
    /// 00000005  90                    0005  nop
    /// 00000006  F4                    0006  halt
    /// ```
    #[must_use]
    pub fn listing(&self) -> String {
        use core::fmt::Write;

        let mut out = String::new();
        for entry in &self.listing {
            let addr = self
                .base_address
                .wrapping_add(entry.output_offset as u32);
            let end = entry.output_offset + entry.len;
            let code: String = self.bytes[entry.output_offset..end]
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect();
            let _ = writeln!(
                out,
                "{:08X}  {:<20}  {:04X}  {}",
                addr, code, entry.source_offset, entry.text
            );
        }
        out
    }
}

fn hex(bytes: &[u8]) -> String {
    use core::fmt::Write;

    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}
