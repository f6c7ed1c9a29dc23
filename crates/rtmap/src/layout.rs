// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout calculator.
//!
//! All offset arithmetic in the runtime goes through [`layout`]: struct field
//! placement and map entry placement alike. Generated code computes the same
//! offsets at compile time, so the two must never drift.

use crate::config::ENTRY_HEADER_SIZE;
use crate::error::{Error, Result};

/// Round `offset` up to the next multiple of `align`.
///
/// `align` must be a non-zero power of two; overflow wraps in release builds,
/// so use [`checked_align_to`] for untrusted input.
#[inline]
#[must_use]
pub const fn align_to(offset: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}

/// Checked variant of [`align_to`].
pub fn checked_align_to(offset: usize, align: usize) -> Result<usize> {
    if !align.is_power_of_two() {
        return Err(Error::InvalidAlignment(align));
    }
    offset
        .checked_add(align - 1)
        .map(|v| v & !(align - 1))
        .ok_or_else(|| Error::InvalidLayout {
            type_name: String::new(),
            reason: format!("offset {} overflows when aligned to {}", offset, align),
        })
}

/// Placement of an ordered run of (size, alignment) items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Offset of each item, in input order.
    pub offsets: Vec<usize>,
    /// One past the last byte of the last item (no trailing padding).
    pub end: usize,
    /// Largest item alignment (1 when empty).
    pub align: usize,
}

impl RecordLayout {
    /// `end` rounded up to `align`, i.e. the size of a struct with this
    /// layout.
    pub fn padded_size(&self) -> Result<usize> {
        checked_align_to(self.end, self.align)
    }
}

/// Place `items` one after another starting at `start`, each at the smallest
/// offset that satisfies its alignment.
///
/// # Example
///
/// ```rust
/// use rtmap::layout::layout;
///
/// // int32 key, float64 value
/// let l = layout(0, &[(4, 4), (8, 8)]).unwrap();
/// assert_eq!(l.offsets, vec![0, 8]);
/// assert_eq!(l.end, 16);
/// ```
pub fn layout(start: usize, items: &[(usize, usize)]) -> Result<RecordLayout> {
    let mut offsets = Vec::with_capacity(items.len());
    let mut cursor = start;
    let mut max_align = 1;
    for &(size, align) in items {
        let offset = checked_align_to(cursor, align)?;
        offsets.push(offset);
        cursor = offset.checked_add(size).ok_or_else(|| Error::InvalidLayout {
            type_name: String::new(),
            reason: format!("item of size {} at offset {} overflows", size, offset),
        })?;
        max_align = max_align.max(align);
    }
    Ok(RecordLayout {
        offsets,
        end: cursor,
        align: max_align,
    })
}

/// Byte placement of one map entry.
///
/// `[header][pad][key][pad][value]`, where the header is
/// [`ENTRY_HEADER_SIZE`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    pub key_offset: usize,
    pub key_size: usize,
    pub value_offset: usize,
    pub value_size: usize,
    /// `value_offset + value_size`.
    pub size: usize,
    /// Alignment of the whole block.
    pub align: usize,
}

impl EntryLayout {
    /// Compute the entry layout for a key and value type.
    pub fn new(key: (usize, usize), value: (usize, usize)) -> Result<Self> {
        Self::with_header(ENTRY_HEADER_SIZE, key, value)
    }

    /// Same as [`EntryLayout::new`] with an explicit header size.
    pub fn with_header(header: usize, key: (usize, usize), value: (usize, usize)) -> Result<Self> {
        let placed = layout(header, &[key, value])?;
        Ok(Self {
            key_offset: placed.offsets[0],
            key_size: key.0,
            value_offset: placed.offsets[1],
            value_size: value.0,
            size: placed.end,
            align: placed.align,
        })
    }

    /// Allocation layout for one entry block.
    ///
    /// Zero-sized entries still get one byte so every entry has a distinct
    /// address.
    pub fn block(&self) -> Result<std::alloc::Layout> {
        std::alloc::Layout::from_size_align(self.size.max(1), self.align).map_err(|e| {
            Error::InvalidLayout {
                type_name: String::new(),
                reason: format!("entry of {} bytes: {}", self.size, e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(0, 8), 0);
        assert_eq!(align_to(1, 8), 8);
        assert_eq!(align_to(8, 8), 8);
        assert_eq!(align_to(9, 4), 12);
        assert_eq!(align_to(5, 1), 5);
    }

    #[test]
    fn test_checked_align_rejects_bad_alignment() {
        assert_eq!(checked_align_to(3, 0), Err(Error::InvalidAlignment(0)));
        assert_eq!(checked_align_to(3, 6), Err(Error::InvalidAlignment(6)));
        assert!(checked_align_to(usize::MAX, 8).is_err());
    }

    #[test]
    fn test_alignment_is_minimal_for_all_pairs() {
        let aligns = [1usize, 2, 4, 8, 16];
        for header in [0usize, 3, 8] {
            for &ka in &aligns {
                for &va in &aligns {
                    for ks in 0..20usize {
                        for vs in [0usize, 1, 7, 8, 40] {
                            let e = EntryLayout::with_header(header, (ks, ka), (vs, va)).unwrap();
                            // key offset: smallest multiple of ka >= header
                            assert_eq!(e.key_offset % ka, 0);
                            assert!(e.key_offset >= header);
                            assert!(e.key_offset < header + ka);
                            // value offset: smallest multiple of va >= key end
                            let key_end = e.key_offset + ks;
                            assert_eq!(e.value_offset % va, 0);
                            assert!(e.value_offset >= key_end);
                            assert!(e.value_offset < key_end + va);
                            assert_eq!(e.size, e.value_offset + vs);
                            assert_eq!(e.align, ka.max(va));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_int32_float64_entry() {
        let e = EntryLayout::new((4, 4), (8, 8)).unwrap();
        assert_eq!(e.key_offset, 0);
        assert_eq!(e.value_offset, 8);
        assert_eq!(e.size, 16);
    }

    #[test]
    fn test_struct_padding() {
        // { a: u8, b: u32, c: u16 }
        let l = layout(0, &[(1, 1), (4, 4), (2, 2)]).unwrap();
        assert_eq!(l.offsets, vec![0, 4, 8]);
        assert_eq!(l.end, 10);
        assert_eq!(l.padded_size().unwrap(), 12);

        let empty = layout(0, &[]).unwrap();
        assert_eq!(empty.end, 0);
        assert_eq!(empty.align, 1);
    }

    #[test]
    fn test_zero_sized_entry_block() {
        let e = EntryLayout::new((0, 1), (0, 1)).unwrap();
        assert_eq!(e.size, 0);
        assert_eq!(e.block().unwrap().size(), 1);
    }
}
