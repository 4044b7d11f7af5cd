use crate::biome::BiomeId;
use crate::block::{BlockId, BlockRegistry};
use crate::chunk::{clamp_height_range, Chunk};
use crate::error::{Error, Result};
use crate::formats::anvil::{floor_div, floor_mod};
use crate::formats::world::{ensure_dir, write_atomically, SaveOptions};
use crate::region::Region;
use crate::section::SECTION_WIDTH;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sparse voxel world keyed by region coordinates.
///
/// Regions, chunks and sections are created on first write; nothing is
/// allocated for space that was never touched.
#[derive(Debug, Clone, Default)]
pub struct World {
    registry: BlockRegistry,
    regions: FxHashMap<(i32, i32), Region>,
}

impl World {
    pub fn new() -> Self {
        Self::with_registry(BlockRegistry::new())
    }

    pub fn with_registry(registry: BlockRegistry) -> Self {
        World {
            registry,
            regions: FxHashMap::default(),
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    /// Shorthand for `registry_mut().register(name)`.
    pub fn register_block(&mut self, name: &str) -> Result<BlockId> {
        self.registry.register(name)
    }

    /// Places `block` at global coordinates.
    ///
    /// `y` must be in `0..=255` and `block` must come from this world's
    /// registry. Nothing is allocated when the call fails.
    pub fn set_block(&mut self, block: BlockId, x: i32, y: i32, z: i32) -> Result<()> {
        Chunk::check_height(y)?;
        if !self.registry.contains(block) {
            return Err(Error::UnknownBlock(block.raw()));
        }
        let coords = Region::coords_for_block(x, z);
        self.regions
            .entry(coords)
            .or_insert_with(|| Region::new(coords.0, coords.1))
            .set_block(block, x, y, z)
    }

    /// Registers `name` if needed, then places it.
    pub fn set_block_named(&mut self, name: &str, x: i32, y: i32, z: i32) -> Result<BlockId> {
        Chunk::check_height(y)?;
        let block = self.registry.register(name)?;
        self.set_block(block, x, y, z)?;
        Ok(block)
    }

    /// Block at global coordinates: air for untouched cells of an existing
    /// section, `None` where no section was ever created.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        self.regions
            .get(&Region::coords_for_block(x, z))?
            .get_block(x, y, z)
    }

    /// Sets the biome of the column at `x`/`z` for every 4-block level in
    /// `min_y..=max_y` (clamped to the world height, swapped if inverted).
    ///
    /// Only the chunk containing the column is written, even though a 4x4
    /// biome cell is shared with its neighbours in the coarse region grid.
    pub fn set_biome_column(
        &mut self,
        x: i32,
        z: i32,
        min_y: i32,
        max_y: i32,
        biome: BiomeId,
    ) -> Result<()> {
        let (min_y, max_y) = clamp_height_range(min_y, max_y);
        let coords = Region::coords_for_block(x, z);
        let region = self
            .regions
            .entry(coords)
            .or_insert_with(|| Region::new(coords.0, coords.1));
        region.set_biome_grid(x, z, biome)?;
        region
            .chunk_or_insert(floor_div(x, SECTION_WIDTH), floor_div(z, SECTION_WIDTH))?
            .set_biome_column(
                floor_mod(x, SECTION_WIDTH),
                floor_mod(z, SECTION_WIDTH),
                min_y,
                max_y,
                biome,
            )
    }

    pub fn region(&self, rx: i32, rz: i32) -> Option<&Region> {
        self.regions.get(&(rx, rz))
    }

    /// Materialized regions sorted by `(rx, rz)`.
    pub fn regions(&self) -> Vec<&Region> {
        let mut regions: Vec<&Region> = self.regions.values().collect();
        regions.sort_by_key(|r| (r.x(), r.z()));
        regions
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Encodes every materialized region, sorted by region coordinates.
    pub fn save_regions(&self, options: &SaveOptions) -> Result<Vec<((i32, i32), Vec<u8>)>> {
        self.regions()
            .into_iter()
            .map(|region| -> Result<_> {
                let bytes = region.to_bytes(&self.registry, options)?;
                Ok(((region.x(), region.z()), bytes))
            })
            .collect()
    }

    /// Writes one region file per materialized region into `dir`, creating
    /// it if needed. Returns the written paths in region order.
    ///
    /// Each file is encoded completely before anything is written, and is
    /// moved into place only once fully on disk.
    pub fn save(&self, dir: impl AsRef<Path>, options: &SaveOptions) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        ensure_dir(dir)?;

        let mut written = Vec::with_capacity(self.regions.len());
        for region in self.regions() {
            let bytes = region.to_bytes(&self.registry, options)?;
            let path = dir.join(options.region_file_name(region.x(), region.z()));
            write_atomically(&path, &bytes)?;
            info!(
                path = %path.display(),
                chunks = region.chunk_count(),
                bytes = bytes.len(),
                "wrote region file"
            );
            written.push(path);
        }
        debug!(dir = %dir.display(), files = written.len(), "world saved");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{self, biome_index};
    use crate::block::{blocks, AIR};
    use crate::formats::anvil::HEADER_SIZE;
    use crate::region::BIOME_GRID_WIDTH;
    use std::fs;

    // ─── Placement ──────────────────────────────────────────────────────────

    #[test]
    fn test_set_block_creates_region_lazily() {
        let mut world = World::new();
        assert_eq!(world.region_count(), 0);

        world.set_block(blocks::STONE, 5, 10, 5).unwrap();
        assert_eq!(world.region_count(), 1);
        assert_eq!(world.get_block(5, 10, 5), Some(blocks::STONE));
        assert_eq!(world.get_block(6, 10, 5), Some(AIR));
        assert_eq!(world.get_block(5, 100, 5), None);
        assert_eq!(world.get_block(1000, 10, 5), None);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let mut world = World::new();
        world.set_block(blocks::DIRT, -1, 0, -1).unwrap();
        let region = world.region(-1, -1).unwrap();
        let chunk = region.chunk(-1, -1).unwrap();
        assert_eq!(chunk.get_block(15, 0, 15).unwrap(), blocks::DIRT);

        world.set_block(blocks::DIRT, -513, 0, 512).unwrap();
        assert!(world.region(-2, 1).is_some());
        assert_eq!(world.get_block(-513, 0, 512), Some(blocks::DIRT));
    }

    #[test]
    fn test_rejected_writes_allocate_nothing() {
        let mut world = World::new();
        assert!(matches!(
            world.set_block(blocks::STONE, 0, 256, 0),
            Err(Error::OutOfRange { axis: 'y', .. })
        ));
        assert!(matches!(
            world.set_block(BlockId(50_000), 0, 0, 0),
            Err(Error::UnknownBlock(50_000))
        ));
        assert!(world.set_block_named("Not A Block", 0, 0, 0).is_err());
        let too_long = format!("minecraft:{}", "a".repeat(70_000));
        assert!(matches!(
            world.set_block_named(&too_long, 0, 0, 0),
            Err(Error::InvalidBlockName(_))
        ));
        assert_eq!(world.region_count(), 0);
    }

    #[test]
    fn test_set_block_named_registers() {
        let mut world = World::new();
        let id = world.set_block_named("create:andesite_casing", 1, 2, 3).unwrap();
        assert_eq!(world.registry().name(id), Some("create:andesite_casing"));
        assert_eq!(world.get_block(1, 2, 3), Some(id));
        assert_eq!(world.set_block_named("stone", 0, 0, 0).unwrap(), blocks::STONE);
    }

    #[test]
    fn test_regions_sorted() {
        let mut world = World::new();
        world.set_block(blocks::STONE, 600, 0, 0).unwrap();
        world.set_block(blocks::STONE, -600, 0, 0).unwrap();
        world.set_block(blocks::STONE, 0, 0, -600).unwrap();
        let coords: Vec<(i32, i32)> = world.regions().iter().map(|r| (r.x(), r.z())).collect();
        assert_eq!(coords, vec![(-2, 0), (0, -2), (1, 0)]);
    }

    // ─── Biomes ─────────────────────────────────────────────────────────────

    #[test]
    fn test_biome_column_touches_one_chunk() {
        let mut world = World::new();
        world.set_biome_column(20, 7, 0, 15, biome::DESERT).unwrap();

        let region = world.region(0, 0).unwrap();
        assert_eq!(region.chunk_count(), 1);
        let chunk = region.chunk(1, 0).unwrap();
        for y_level in 0..4 {
            assert_eq!(chunk.biome(biome_index(4, 7, y_level)), Some(biome::DESERT));
        }
        assert_eq!(chunk.biome(biome_index(4, 7, 4)), Some(biome::PLAINS));
        assert_eq!(region.biome_grid(5, 1), Some(biome::DESERT));
        assert_eq!(region.biome_grid(BIOME_GRID_WIDTH - 1, 0), Some(biome::PLAINS));
        // biome-only chunks carry no sections
        assert_eq!(chunk.sections().count(), 0);
    }

    #[test]
    fn test_biome_column_negative_and_inverted() {
        let mut world = World::new();
        world.set_biome_column(-1, -1, 400, -20, biome::OCEAN).unwrap();
        let chunk = world.region(-1, -1).unwrap().chunk(-1, -1).unwrap();
        assert_eq!(chunk.biome(biome_index(15, 15, 0)), Some(biome::OCEAN));
        assert_eq!(chunk.biome(biome_index(15, 15, 63)), Some(biome::OCEAN));
    }

    // ─── Saving ─────────────────────────────────────────────────────────────

    #[test]
    fn test_save_regions_sorted() {
        let mut world = World::new();
        world.set_block(blocks::STONE, 512, 0, 0).unwrap();
        world.set_block(blocks::STONE, 0, 0, 0).unwrap();
        world.set_biome_column(-5, 0, 0, 255, biome::FOREST).unwrap();

        let saved = world.save_regions(&SaveOptions::default()).unwrap();
        let coords: Vec<(i32, i32)> = saved.iter().map(|(c, _)| *c).collect();
        assert_eq!(coords, vec![(-1, 0), (0, 0), (1, 0)]);
        for (_, bytes) in &saved {
            assert!(bytes.len() > HEADER_SIZE);
            assert_eq!(bytes.len() % 4096, 0);
        }
    }

    #[test]
    fn test_save_writes_named_files() {
        let dir = std::env::temp_dir().join(format!("anvil-forge-world-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut world = World::new();
        world.set_block(blocks::STONE, 0, 0, 0).unwrap();
        world.set_block(blocks::STONE, -1, 0, 700).unwrap();
        let paths = world.save(&dir, &SaveOptions::default()).unwrap();

        assert_eq!(paths, vec![dir.join("r.-1.1.mca"), dir.join("r.0.0.mca")]);
        let expected = world.save_regions(&SaveOptions::default()).unwrap();
        for (path, (_, bytes)) in paths.iter().zip(expected) {
            assert_eq!(fs::read(path).unwrap(), bytes);
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_world_saves_nothing() {
        let world = World::new();
        assert!(world.save_regions(&SaveOptions::default()).unwrap().is_empty());
    }
}
