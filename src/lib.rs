//! Encodes sparse voxel worlds into Anvil region files (`r.<x>.<z>.mca`).
//!
//! Blocks are placed by global coordinates into a [`World`]; regions,
//! chunks and sections are created on demand. Saving builds one NBT document
//! per chunk, compresses it with zlib and lays the payloads out in 4 KiB
//! sectors behind the region location table.
//!
//! ```no_run
//! use anvil_forge::{blocks, SaveOptions, World};
//!
//! let mut world = World::new();
//! for x in 0..16 {
//!     for z in 0..16 {
//!         world.set_block(blocks::BEDROCK, x, 0, z)?;
//!         world.set_block(blocks::STONE, x, 1, z)?;
//!     }
//! }
//! world.save("world/region", &SaveOptions::default())?;
//! # Ok::<(), anvil_forge::Error>(())
//! ```

pub mod biome;
pub mod block;
pub mod chunk;
pub mod error;
pub mod formats;
pub mod region;
pub mod section;
pub mod world;

pub use biome::BiomeId;
pub use block::{blocks, Block, BlockId, BlockRegistry, AIR};
pub use chunk::Chunk;
pub use error::{Error, Result};
pub use formats::world::SaveOptions;
pub use region::Region;
pub use section::Section;
pub use world::World;
