//! Numeric biome ids as stored in a chunk's `Biomes` array (pre-1.18 layout).

pub type BiomeId = i32;

pub const OCEAN: BiomeId = 0;
pub const PLAINS: BiomeId = 1;
pub const DESERT: BiomeId = 2;
pub const MOUNTAINS: BiomeId = 3;
pub const FOREST: BiomeId = 4;
pub const TAIGA: BiomeId = 5;
pub const SWAMP: BiomeId = 6;
pub const RIVER: BiomeId = 7;
pub const BEACH: BiomeId = 16;

/// Biome every chunk and region grid cell starts with.
pub const DEFAULT_BIOME: BiomeId = PLAINS;

/// Number of entries in a chunk's biome array (4x4x4-block cells).
pub const CHUNK_BIOME_LEN: usize = 1024;

/// Index into a chunk's biome array for a chunk-local column and a 4-block
/// vertical level.
///
/// The layout is `(z/4)*64 + (x/4)*16 + y_level`. Levels above 15 alias into
/// the next x cell.
#[inline]
pub fn biome_index(local_x: i32, local_z: i32, y_level: i32) -> usize {
    ((local_z / 4) * 64 + (local_x / 4) * 16 + y_level) as usize
}
