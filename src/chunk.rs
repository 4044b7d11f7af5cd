use crate::biome::{biome_index, BiomeId, CHUNK_BIOME_LEN, DEFAULT_BIOME};
use crate::block::{BlockId, BlockRegistry, AIR};
use crate::error::{Error, Result};
use crate::formats::nbt;
use crate::section::{Section, SECTION_WIDTH};

pub const SECTIONS_PER_CHUNK: usize = 16;
pub const CHUNK_HEIGHT: i32 = SECTION_WIDTH * SECTIONS_PER_CHUNK as i32;
pub const MAX_Y: i32 = CHUNK_HEIGHT - 1;

/// A 16-wide column of up to 16 sections (world Y 0..=255) plus its biomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    x: i32,
    z: i32,
    sections: [Option<Box<Section>>; SECTIONS_PER_CHUNK],
    biomes: Box<[BiomeId]>,
}

impl Chunk {
    /// `x`/`z` are world chunk coordinates (block coordinate floor-divided by 16).
    pub fn new(x: i32, z: i32) -> Self {
        Chunk {
            x,
            z,
            sections: Default::default(),
            biomes: vec![DEFAULT_BIOME; CHUNK_BIOME_LEN].into_boxed_slice(),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    /// Fails unless `y` is a valid chunk-local height.
    pub fn check_height(y: i32) -> Result<()> {
        Error::check_range('y', y, 0, MAX_Y)
    }

    /// Sets a block at chunk-local `x`/`z` (0..=15) and height `y` (0..=255),
    /// creating the section on first write.
    pub fn set_block(&mut self, block: BlockId, x: i32, y: i32, z: i32) -> Result<()> {
        Error::check_range('x', x, 0, SECTION_WIDTH - 1)?;
        Error::check_range('z', z, 0, SECTION_WIDTH - 1)?;
        Self::check_height(y)?;
        let section_y = y / SECTION_WIDTH;
        let section = self.sections[section_y as usize]
            .get_or_insert_with(|| Box::new(Section::new(section_y as u8)));
        section.set_block(block, x, y - section_y * SECTION_WIDTH, z)
    }

    /// Block at a chunk-local position; air where no section exists yet.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Result<BlockId> {
        Error::check_range('x', x, 0, SECTION_WIDTH - 1)?;
        Error::check_range('z', z, 0, SECTION_WIDTH - 1)?;
        Self::check_height(y)?;
        let section_y = y / SECTION_WIDTH;
        match &self.sections[section_y as usize] {
            Some(section) => section.get_block(x, y - section_y * SECTION_WIDTH, z),
            None => Ok(AIR),
        }
    }

    pub fn section(&self, y: usize) -> Option<&Section> {
        self.sections.get(y).and_then(|s| s.as_deref())
    }

    /// Materialized sections in increasing Y order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter_map(|s| s.as_deref())
    }

    /// Number of sections that would be written (palette other than `[air]`).
    pub fn non_empty_section_count(&self) -> usize {
        self.sections().filter(|s| !s.is_empty()).count()
    }

    pub fn biomes(&self) -> &[BiomeId] {
        &self.biomes
    }

    pub fn biome(&self, index: usize) -> Option<BiomeId> {
        self.biomes.get(index).copied()
    }

    /// Sets the biome of one 4x4x4 cell; `y_level` is the height divided by 4.
    pub fn set_biome(&mut self, x: i32, z: i32, y_level: i32, biome: BiomeId) -> Result<()> {
        Error::check_range('x', x, 0, SECTION_WIDTH - 1)?;
        Error::check_range('z', z, 0, SECTION_WIDTH - 1)?;
        Error::check_range('y', y_level, 0, CHUNK_HEIGHT / 4 - 1)?;
        if let Some(slot) = self.biomes.get_mut(biome_index(x, z, y_level)) {
            *slot = biome;
        }
        Ok(())
    }

    /// Sets the biome for every 4-block level covering `min_y..=max_y` in one
    /// column. Heights are clamped to the chunk and swapped if inverted.
    pub fn set_biome_column(
        &mut self,
        x: i32,
        z: i32,
        min_y: i32,
        max_y: i32,
        biome: BiomeId,
    ) -> Result<()> {
        let (min_y, max_y) = clamp_height_range(min_y, max_y);
        for y_level in (min_y / 4)..=(max_y / 4) {
            self.set_biome(x, z, y_level, biome)?;
        }
        Ok(())
    }

    /// Serializes this chunk into its NBT document.
    pub fn build(&self, registry: &BlockRegistry, data_version: i32) -> Result<Vec<u8>> {
        nbt::write_chunk(self, registry, data_version)
    }
}

/// Orders a height range and clamps both ends to `0..=255`.
pub(crate) fn clamp_height_range(min_y: i32, max_y: i32) -> (i32, i32) {
    let (low, high) = if min_y > max_y {
        (max_y, min_y)
    } else {
        (min_y, max_y)
    };
    (low.clamp(0, MAX_Y), high.clamp(0, MAX_Y))
}
