//! Address map and relocation resolution.
//!
//! Pass 1 records, for every decoded instruction, where its translation
//! starts in the output buffer, and queues one [`RelocationRecord`] per
//! jump or call. Pass 2 ([`Linker::resolve`]) turns each record's absolute
//! source target into a rel32 displacement and patches it in place.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::encoder::REL32_SIZE;
use crate::error::TranslateError;

// ─── AddressMap ────────────────────────────────────────────

/// Source offset → output offset, one entry per decoded instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressMap {
    entries: BTreeMap<usize, usize>,
}

impl AddressMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the instruction at `source` starts at `output`.
    ///
    /// Returns the previous output offset if `source` was already mapped.
    pub fn insert(&mut self, source: usize, output: usize) -> Option<usize> {
        self.entries.insert(source, output)
    }

    /// Output offset of the instruction starting at `source`.
    #[must_use]
    pub fn get(&self, source: usize) -> Option<usize> {
        self.entries.get(&source).copied()
    }

    /// Whether `source` is the start of a decoded instruction.
    #[must_use]
    pub fn contains(&self, source: usize) -> bool {
        self.entries.contains_key(&source)
    }

    /// Number of mapped instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(source, output)` pairs in ascending source order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&s, &o)| (s, o))
    }
}

// ─── Records ───────────────────────────────────────────────

/// A pending rel32 patch queued during pass 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelocationRecord {
    /// Source offset of the jump or call.
    pub source_offset: usize,
    /// Output offset of the 4-byte displacement field.
    pub field_offset: usize,
    /// Absolute source address the instruction transfers control to.
    pub target: u32,
}

/// A patched displacement in the final output. Useful for listings,
/// debugging, and checking the output against a disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedRelocation {
    /// Source offset of the jump or call.
    pub source_offset: usize,
    /// Output offset where the displacement was written.
    pub field_offset: usize,
    /// Absolute source target.
    pub target: u32,
    /// Output offset the target maps to.
    pub target_output: usize,
    /// The written value: `target_output - (field_offset + 4)`.
    pub displacement: i32,
}

// ─── Linker ────────────────────────────────────────────────

/// Collects relocation records and patches them once the address map is
/// complete.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    records: Vec<RelocationRecord>,
}

impl Linker {
    /// Create an empty linker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a record.
    pub fn add(&mut self, record: RelocationRecord) {
        self.records.push(record);
    }

    /// Records queued so far, in emission order.
    #[must_use]
    pub fn pending(&self) -> &[RelocationRecord] {
        &self.records
    }

    /// Resolve every queued record against `map` and patch `output`.
    ///
    /// All displacements are computed before the first byte is written, so
    /// on error `output` still holds its placeholders.
    ///
    /// # Errors
    ///
    /// - [`TranslateError::UnresolvedTarget`] if a target is not a key of `map`.
    /// - [`TranslateError::DisplacementOverflow`] if a displacement does not
    ///   fit in an `i32`.
    /// - [`TranslateError::FieldOutOfBounds`] if a record's field does not lie
    ///   inside `output`.
    pub fn resolve(
        &mut self,
        output: &mut [u8],
        map: &AddressMap,
    ) -> Result<Vec<AppliedRelocation>, TranslateError> {
        let output_len = output.len();
        let applied = self
            .records
            .iter()
            .map(|rec| resolve_record(rec, map, output_len))
            .collect::<Result<Vec<_>, _>>()?;

        for reloc in &applied {
            let field = reloc.field_offset..reloc.field_offset + REL32_SIZE;
            output[field].copy_from_slice(&reloc.displacement.to_le_bytes());
            log::trace!(
                "patched 0x{:04X}: target 0x{:X} -> out 0x{:X}, rel32 {}",
                reloc.source_offset,
                reloc.target,
                reloc.target_output,
                reloc.displacement
            );
        }

        self.records.clear();
        Ok(applied)
    }
}

fn resolve_record(
    rec: &RelocationRecord,
    map: &AddressMap,
    output_len: usize,
) -> Result<AppliedRelocation, TranslateError> {
    let in_bounds = rec
        .field_offset
        .checked_add(REL32_SIZE)
        .is_some_and(|end| end <= output_len);
    if !in_bounds {
        return Err(TranslateError::FieldOutOfBounds {
            offset: rec.source_offset,
            field_offset: rec.field_offset,
            output_len,
        });
    }
    let target_output = map
        .get(rec.target as usize)
        .ok_or(TranslateError::UnresolvedTarget {
            offset: rec.source_offset,
            target: rec.target,
        })?;
    let next = rec.field_offset as i64 + REL32_SIZE as i64;
    let disp = target_output as i64 - next;
    let displacement = i32::try_from(disp).map_err(|_| TranslateError::DisplacementOverflow {
        offset: rec.source_offset,
        disp,
    })?;
    Ok(AppliedRelocation {
        source_offset: rec.source_offset,
        field_offset: rec.field_offset,
        target: rec.target,
        target_output,
        displacement,
    })
}
