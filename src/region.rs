use crate::biome::{BiomeId, DEFAULT_BIOME};
use crate::block::{BlockId, BlockRegistry};
use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::formats::anvil::{
    assemble_region, chunk_slot_index, compress_chunk, floor_div, floor_mod, EncodedChunk,
    CHUNKS_PER_REGION, REGION_WIDTH,
};
use crate::formats::world::SaveOptions;
use crate::section::SECTION_WIDTH;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Blocks per region along each horizontal axis.
pub const REGION_BLOCK_WIDTH: i32 = REGION_WIDTH * SECTION_WIDTH;

/// Horizontal cells of the coarse biome grid (one per 4x4 block column).
pub const BIOME_GRID_WIDTH: usize = (REGION_BLOCK_WIDTH / 4) as usize;

/// 32x32 chunk slots covering a 512x512 block footprint.
#[derive(Debug, Clone)]
pub struct Region {
    x: i32,
    z: i32,
    chunks: Vec<Option<Box<Chunk>>>,
    /// 128x128 biome record at 4x4 column resolution, indexed `[gx * 128 + gz]`.
    /// Never serialized.
    biome_grid: Vec<BiomeId>,
}

impl Region {
    pub fn new(x: i32, z: i32) -> Self {
        Region {
            x,
            z,
            chunks: (0..CHUNKS_PER_REGION).map(|_| None).collect(),
            biome_grid: vec![DEFAULT_BIOME; BIOME_GRID_WIDTH * BIOME_GRID_WIDTH],
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    /// Region coordinates containing a world block position.
    pub fn coords_for_block(x: i32, z: i32) -> (i32, i32) {
        (
            floor_div(x, REGION_BLOCK_WIDTH),
            floor_div(z, REGION_BLOCK_WIDTH),
        )
    }

    pub fn contains_block(&self, x: i32, z: i32) -> bool {
        Self::coords_for_block(x, z) == (self.x, self.z)
    }

    pub fn contains_chunk(&self, chunk_x: i32, chunk_z: i32) -> bool {
        floor_div(chunk_x, REGION_WIDTH) == self.x && floor_div(chunk_z, REGION_WIDTH) == self.z
    }

    fn check_footprint(&self, x: i32, z: i32) -> Result<()> {
        check_axis('x', x, self.x, REGION_BLOCK_WIDTH)?;
        check_axis('z', z, self.z, REGION_BLOCK_WIDTH)
    }

    /// Sets a block by world coordinates, which must fall inside this region.
    pub fn set_block(&mut self, block: BlockId, x: i32, y: i32, z: i32) -> Result<()> {
        self.check_footprint(x, z)?;
        Chunk::check_height(y)?;
        let chunk = self.chunk_or_insert(floor_div(x, SECTION_WIDTH), floor_div(z, SECTION_WIDTH))?;
        chunk.set_block(
            block,
            floor_mod(x, SECTION_WIDTH),
            y,
            floor_mod(z, SECTION_WIDTH),
        )
    }

    /// Block at world coordinates; `None` unless the section holding it has
    /// been created.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if !self.contains_block(x, z) || Chunk::check_height(y).is_err() {
            return None;
        }
        self.chunk(floor_div(x, SECTION_WIDTH), floor_div(z, SECTION_WIDTH))?
            .section((y / SECTION_WIDTH) as usize)?
            .get_block(
                floor_mod(x, SECTION_WIDTH),
                y % SECTION_WIDTH,
                floor_mod(z, SECTION_WIDTH),
            )
            .ok()
    }

    /// Chunk at world chunk coordinates, if materialized.
    pub fn chunk(&self, chunk_x: i32, chunk_z: i32) -> Option<&Chunk> {
        if !self.contains_chunk(chunk_x, chunk_z) {
            return None;
        }
        self.chunks[chunk_slot_index(chunk_x, chunk_z)].as_deref()
    }

    /// Chunk at world chunk coordinates, created on first access.
    pub fn chunk_or_insert(&mut self, chunk_x: i32, chunk_z: i32) -> Result<&mut Chunk> {
        check_axis('x', chunk_x, self.x, REGION_WIDTH)?;
        check_axis('z', chunk_z, self.z, REGION_WIDTH)?;
        let slot = &mut self.chunks[chunk_slot_index(chunk_x, chunk_z)];
        Ok(slot.get_or_insert_with(|| Box::new(Chunk::new(chunk_x, chunk_z))))
    }

    /// Materialized chunks with their location table slot, in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, &Chunk)> {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.as_deref().map(|c| (slot, c)))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    /// Records a biome in the coarse grid cell holding world column `x`/`z`.
    pub fn set_biome_grid(&mut self, x: i32, z: i32, biome: BiomeId) -> Result<()> {
        self.check_footprint(x, z)?;
        let (gx, gz) = Self::grid_cell(x, z);
        self.biome_grid[gx * BIOME_GRID_WIDTH + gz] = biome;
        Ok(())
    }

    /// Coarse grid biome at cell `gx`/`gz` (each 0..128).
    pub fn biome_grid(&self, gx: usize, gz: usize) -> Option<BiomeId> {
        if gx >= BIOME_GRID_WIDTH || gz >= BIOME_GRID_WIDTH {
            return None;
        }
        Some(self.biome_grid[gx * BIOME_GRID_WIDTH + gz])
    }

    fn grid_cell(x: i32, z: i32) -> (usize, usize) {
        (
            (floor_mod(x, REGION_BLOCK_WIDTH) / 4) as usize,
            (floor_mod(z, REGION_BLOCK_WIDTH) / 4) as usize,
        )
    }

    /// Builds and compresses one chunk's document.
    pub fn encode_chunk(
        slot: usize,
        chunk: &Chunk,
        registry: &BlockRegistry,
        options: &SaveOptions,
    ) -> Result<EncodedChunk> {
        let document = chunk.build(registry, options.data_version)?;
        let compressed = compress_chunk(&document, options.compression_level)?;
        trace!(
            chunk_x = chunk.x(),
            chunk_z = chunk.z(),
            raw = document.len(),
            compressed = compressed.len(),
            "encoded chunk"
        );
        Ok(EncodedChunk {
            slot,
            x: chunk.x(),
            z: chunk.z(),
            compressed,
        })
    }

    /// Encodes the region into a complete region file.
    ///
    /// Chunks are encoded independently (on the rayon pool when
    /// `options.parallel` is set) and then laid out in slot order, so the
    /// output does not depend on scheduling.
    pub fn to_bytes(&self, registry: &BlockRegistry, options: &SaveOptions) -> Result<Vec<u8>> {
        let present: Vec<(usize, &Chunk)> = self.chunks().collect();

        let encoded: Vec<EncodedChunk> = if options.parallel {
            present
                .par_iter()
                .map(|&(slot, chunk)| Self::encode_chunk(slot, chunk, registry, options))
                .collect::<Result<Vec<_>>>()?
        } else {
            present
                .iter()
                .map(|&(slot, chunk)| Self::encode_chunk(slot, chunk, registry, options))
                .collect::<Result<Vec<_>>>()?
        };

        let bytes = assemble_region(&encoded)?;
        debug!(
            region_x = self.x,
            region_z = self.z,
            chunks = encoded.len(),
            bytes = bytes.len(),
            "encoded region"
        );
        Ok(bytes)
    }
}

/// Fails unless `value` floor-divides to region coordinate `origin`.
///
/// Regions far enough out have no coordinates in `i32` at all; their
/// reported bounds saturate.
fn check_axis(axis: char, value: i32, origin: i32, width: i32) -> Result<()> {
    if floor_div(value, width) == origin {
        return Ok(());
    }
    let min = origin.saturating_mul(width);
    Err(Error::OutOfRange {
        axis,
        value,
        min,
        max: min.saturating_add(width - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome;
    use crate::block::blocks;
    use crate::formats::anvil::{location_entry, HEADER_SIZE, SECTOR_SIZE};

    #[test]
    fn test_set_block_routes_to_chunk() {
        let mut region = Region::new(0, 0);
        region.set_block(blocks::STONE, 17, 64, 35).unwrap();

        let chunk = region.chunk(1, 2).unwrap();
        assert_eq!((chunk.x(), chunk.z()), (1, 2));
        assert_eq!(chunk.get_block(1, 64, 3).unwrap(), blocks::STONE);
        assert_eq!(region.get_block(17, 64, 35), Some(blocks::STONE));
        assert_eq!(region.get_block(18, 64, 35), Some(blocks::AIR));
        assert_eq!(region.get_block(17, 0, 35), None);
        assert_eq!(region.get_block(600, 64, 35), None);
        assert_eq!(region.chunk_count(), 1);
        assert_eq!(region.chunks().next().unwrap().0, 2 * 32 + 1);
    }

    #[test]
    fn test_negative_region_slots() {
        let mut region = Region::new(-1, -1);
        region.set_block(blocks::DIRT, -1, 0, -1).unwrap();
        let chunk = region.chunk(-1, -1).unwrap();
        assert_eq!((chunk.x(), chunk.z()), (-1, -1));
        assert_eq!(chunk.get_block(15, 0, 15).unwrap(), blocks::DIRT);
        assert_eq!(region.chunks().next().unwrap().0, 1023);

        region.set_block(blocks::DIRT, -512, 0, -512).unwrap();
        assert_eq!(region.chunks().next().unwrap().0, 0);
    }

    #[test]
    fn test_set_block_outside_footprint() {
        let mut region = Region::new(0, 0);
        assert!(region.set_block(blocks::STONE, 512, 0, 0).is_err());
        assert!(region.set_block(blocks::STONE, 0, 0, -1).is_err());
        assert!(region.set_block(blocks::STONE, 0, 256, 0).is_err());
        assert_eq!(region.chunk_count(), 0);
        assert!(region.chunk_or_insert(32, 0).is_err());
    }

    #[test]
    fn test_far_regions_do_not_overflow() {
        // the last region whose footprint fits in i32
        let mut edge = Region::new(4_194_303, -4_194_304);
        edge.set_block(blocks::STONE, i32::MAX, 0, i32::MIN).unwrap();
        assert_eq!(edge.get_block(i32::MAX, 0, i32::MIN), Some(blocks::STONE));
        assert_eq!(edge.chunks().next().unwrap().0, 31);
        assert!(edge.set_biome_grid(i32::MAX - 3, i32::MIN + 3, biome::RIVER).is_ok());

        let mut beyond = Region::new(4_194_304, 0);
        assert!(matches!(
            beyond.set_block(blocks::STONE, i32::MAX, 0, 0),
            Err(Error::OutOfRange { axis: 'x', min: i32::MAX, max: i32::MAX, .. })
        ));
        assert!(beyond.chunk_or_insert(0, 0).is_err());
        assert!(beyond.set_biome_grid(0, 0, biome::RIVER).is_err());

        let mut below = Region::new(i32::MIN, i32::MIN);
        assert!(matches!(
            below.set_block(blocks::STONE, 0, 0, 0),
            Err(Error::OutOfRange { axis: 'x', min: i32::MIN, .. })
        ));
        assert!(below.chunk_or_insert(i32::MIN, i32::MIN).is_err());
        assert_eq!(below.chunk_count(), 0);
        assert_eq!(beyond.chunk_count(), 0);
    }

    #[test]
    fn test_biome_grid() {
        let mut region = Region::new(1, 0);
        assert_eq!(region.biome_grid(0, 0), Some(biome::PLAINS));
        region.set_biome_grid(512 + 9, 6, biome::DESERT).unwrap();
        assert_eq!(region.biome_grid(2, 1), Some(biome::DESERT));
        assert_eq!(region.biome_grid(128, 0), None);
        assert!(region.set_biome_grid(0, 0, biome::DESERT).is_err());
    }

    #[test]
    fn test_empty_region_bytes() {
        let region = Region::new(0, 0);
        let bytes = region
            .to_bytes(&BlockRegistry::new(), &SaveOptions::default())
            .unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parallel_and_serial_output_match() {
        let mut region = Region::new(0, 0);
        for cx in 0..4 {
            for cz in 0..3 {
                for y in 0..20 {
                    let block = if y < 10 { blocks::STONE } else { blocks::GRASS_BLOCK };
                    region.set_block(block, cx * 16 + y % 16, y, cz * 16).unwrap();
                }
            }
        }
        let registry = BlockRegistry::new();
        let parallel = region.to_bytes(&registry, &SaveOptions::default()).unwrap();
        let serial = region
            .to_bytes(
                &registry,
                &SaveOptions {
                    parallel: false,
                    ..SaveOptions::default()
                },
            )
            .unwrap();
        assert_eq!(parallel, serial);
        assert_eq!(parallel.len() % SECTOR_SIZE, 0);

        // 12 small chunks, one sector each, packed from sector 2 in slot order
        let mut expected_sector = 2;
        for cz in 0..3 {
            for cx in 0..4 {
                assert_eq!(
                    location_entry(&parallel, cz * 32 + cx),
                    (expected_sector, 1)
                );
                expected_sector += 1;
            }
        }
    }

    #[test]
    fn test_unknown_block_aborts_save() {
        let mut region = Region::new(0, 0);
        region.set_block(blocks::STONE, 0, 0, 0).unwrap();
        let err = region
            .to_bytes(&BlockRegistry::empty(), &SaveOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownBlock(_)));
    }
}
