use crate::block::{BlockId, AIR};
use crate::error::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

pub const SECTION_WIDTH: i32 = 16;
pub const SECTION_VOLUME: usize = 4096;

/// Minimum bits per palette index in a section's block state array.
pub const MIN_BITS_PER_ENTRY: u32 = 4;

/// A 16x16x16 cube of blocks, stored in YZX order: `y*256 + z*16 + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    y: u8,
    cells: Box<[BlockId]>,
}

impl Section {
    pub fn new(y: u8) -> Self {
        Section {
            y,
            cells: vec![AIR; SECTION_VOLUME].into_boxed_slice(),
        }
    }

    /// Section index within its chunk (0 covers world Y 0..=15).
    pub fn y(&self) -> u8 {
        self.y
    }

    #[inline(always)]
    pub fn index(x: i32, y: i32, z: i32) -> Result<usize> {
        Error::check_range('x', x, 0, SECTION_WIDTH - 1)?;
        Error::check_range('y', y, 0, SECTION_WIDTH - 1)?;
        Error::check_range('z', z, 0, SECTION_WIDTH - 1)?;
        Ok((y * 256 + z * 16 + x) as usize)
    }

    pub fn set_block(&mut self, block: BlockId, x: i32, y: i32, z: i32) -> Result<()> {
        let idx = Self::index(x, y, z)?;
        self.cells[idx] = block;
        Ok(())
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Result<BlockId> {
        Ok(self.cells[Self::index(x, y, z)?])
    }

    pub fn cells(&self) -> &[BlockId] {
        &self.cells
    }

    /// Distinct blocks in first-seen cell order, with air appended last when
    /// any cell is air. An all-air section yields `[AIR]`.
    pub fn palette(&self) -> Vec<BlockId> {
        let mut palette = Vec::new();
        let mut seen = FxHashSet::default();
        let mut has_air = false;
        for &block in self.cells.iter() {
            if block.is_air() {
                has_air = true;
            } else if seen.insert(block) {
                palette.push(block);
            }
        }
        if has_air || palette.is_empty() {
            palette.push(AIR);
        }
        palette
    }

    /// A section whose palette is exactly `[AIR]` is left out of the chunk.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_air())
    }

    /// Packs each cell's palette index into 64-bit words.
    ///
    /// Indices are written LSB-first and back to back; an index that does not
    /// fit in the rest of a word is split across it and the next one.
    /// Cells whose block is missing from `palette` fall back to air's index.
    pub fn encode_states(&self, palette: &[BlockId]) -> Vec<u64> {
        let bits = bits_per_entry(palette.len());
        let lookup: FxHashMap<BlockId, u64> = palette
            .iter()
            .enumerate()
            .map(|(i, &b)| (b, i as u64))
            .collect();
        let air_index = lookup.get(&AIR).copied().unwrap_or(0);

        let mut states = Vec::with_capacity(SECTION_VOLUME * bits as usize / 64);
        let mut current: u64 = 0;
        let mut current_len: u32 = 0;
        for block in self.cells.iter() {
            let index = lookup.get(block).copied().unwrap_or(air_index);
            if current_len + bits > 64 {
                let leftover = 64 - current_len;
                if leftover == 0 {
                    states.push(current);
                    current = index;
                } else {
                    let low_bits = index & ((1u64 << leftover) - 1);
                    states.push(current | (low_bits << current_len));
                    current = index >> leftover;
                }
                current_len = bits - leftover;
            } else {
                current |= index << current_len;
                current_len += bits;
            }
        }
        states.push(current);
        states
    }
}

/// `max(4, ceil(log2(palette_len)))`, with a single-entry palette needing 0 bits.
pub fn bits_per_entry(palette_len: usize) -> u32 {
    let needed = if palette_len <= 1 {
        0
    } else {
        usize::BITS - (palette_len - 1).leading_zeros()
    };
    needed.max(MIN_BITS_PER_ENTRY)
}

/// Inverse of [`Section::encode_states`]: reads 4096 indices back out of a
/// contiguous bitstream.
pub fn unpack_states(words: &[u64], palette_len: usize) -> Vec<u16> {
    let bits = bits_per_entry(palette_len) as usize;
    let mask = (1u64 << bits) - 1;
    let mut result = Vec::with_capacity(SECTION_VOLUME);

    for i in 0..SECTION_VOLUME {
        let bit = i * bits;
        let word = bit / 64;
        let offset = bit % 64;
        let Some(&low) = words.get(word) else {
            break;
        };
        let mut value = low >> offset;
        if offset + bits > 64 {
            let high = words.get(word + 1).copied().unwrap_or(0);
            value |= high << (64 - offset);
        }
        result.push((value & mask) as u16);
    }

    result.resize(SECTION_VOLUME, 0);
    result
}
