use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Longest `namespace:id` that fits an NBT string's u16 length prefix.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// A named block type, e.g. `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub namespace: SmolStr,
    pub id: SmolStr,
    name: SmolStr,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Block {
    pub fn new(namespace: impl Into<SmolStr>, id: impl Into<SmolStr>) -> Result<Self> {
        let namespace = namespace.into();
        let id = id.into();
        let name = format!("{}:{}", namespace, id);
        if !is_valid_namespace(&namespace) || !is_valid_path(&id) || name.len() > MAX_NAME_LEN {
            return Err(Error::InvalidBlockName(name));
        }
        let name = SmolStr::from(name);
        Ok(Block {
            namespace,
            id,
            name,
        })
    }

    /// Parses `namespace:id`; a bare id gets the `minecraft` namespace.
    pub fn parse(name: &str) -> Result<Self> {
        match name.split_once(':') {
            Some((namespace, id)) => Block::new(namespace, id),
            None => Block::new(DEFAULT_NAMESPACE, name),
        }
    }

    /// Canonical `namespace:id` name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn is_air(&self) -> bool {
        self.name == "minecraft:air"
    }
}

fn is_valid_namespace(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.'))
}

fn is_valid_path(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'/'))
}

/// Interned handle for a block registered in a [`BlockRegistry`].
///
/// Handles are only meaningful for the registry that issued them. Within
/// one registry every name maps to exactly one handle, so comparing handles
/// compares names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

pub const AIR: BlockId = BlockId(0);

macro_rules! well_known_blocks {
    ($($konst:ident => $id:literal),* $(,)?) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms, dead_code)]
        #[repr(u32)]
        enum Slot {
            AIR = 0,
            $($konst),*
        }

        /// Handles for the vanilla blocks every [`BlockRegistry::new`]
        /// registry starts with.
        pub mod blocks {
            use super::{BlockId, Slot};

            pub const AIR: BlockId = super::AIR;
            $(pub const $konst: BlockId = BlockId(Slot::$konst as u32);)*
        }

        const WELL_KNOWN: &[&str] = &[$($id),*];
    };
}

well_known_blocks! {
    STONE => "stone",
    DIRT => "dirt",
    GRASS_BLOCK => "grass_block",
    WATER => "water",
    LAVA => "lava",
    SAND => "sand",
    GRAVEL => "gravel",
    OAK_PLANKS => "oak_planks",
    OAK_LOG => "oak_log",
    OAK_LEAVES => "oak_leaves",
    BEDROCK => "bedrock",
    COAL_ORE => "coal_ore",
    IRON_ORE => "iron_ore",
    GOLD_ORE => "gold_ore",
    DIAMOND_ORE => "diamond_ore",
    EMERALD_ORE => "emerald_ore",
    REDSTONE_ORE => "redstone_ore",
    LAPIS_ORE => "lapis_ore",
    OBSIDIAN => "obsidian",
    COBBLESTONE => "cobblestone",
    MOSSY_COBBLESTONE => "mossy_cobblestone",
    BRICKS => "bricks",
    NETHERRACK => "netherrack",
    SOUL_SAND => "soul_sand",
    GLOWSTONE => "glowstone",
    END_STONE => "end_stone",
    TNT => "tnt",
    GLASS => "glass",
    ICE => "ice",
    SNOW_BLOCK => "snow_block",
    CLAY => "clay",
    PUMPKIN => "pumpkin",
    MELON => "melon",
    MYCELIUM => "mycelium",
    NETHER_QUARTZ_ORE => "nether_quartz_ore",
    HAY_BLOCK => "hay_block",
    EMERALD_BLOCK => "emerald_block",
    REDSTONE_BLOCK => "redstone_block",
    SEA_LANTERN => "sea_lantern",
    PRISMARINE => "prismarine",
    DARK_PRISMARINE => "dark_prismarine",
    SLIME_BLOCK => "slime_block",
    CHORUS_PLANT => "chorus_plant",
    PURPUR_BLOCK => "purpur_block",
    END_ROD => "end_rod",
    MAGMA_BLOCK => "magma_block",
    NETHER_WART_BLOCK => "nether_wart_block",
    BONE_BLOCK => "bone_block",
    HONEY_BLOCK => "honey_block",
    CRYING_OBSIDIAN => "crying_obsidian",
    BLACKSTONE => "blackstone",
    BASALT => "basalt",
    NETHER_GOLD_ORE => "nether_gold_ore",
    ANCIENT_DEBRIS => "ancient_debris",
    GILDED_BLACKSTONE => "gilded_blackstone",
    AMETHYST_BLOCK => "amethyst_block",
    COPPER_ORE => "copper_ore",
    DEEPSLATE => "deepslate",
    TUFF => "tuff",
    CALCITE => "calcite",
    DRIPSTONE_BLOCK => "dripstone_block",
    POINTED_DRIPSTONE => "pointed_dripstone",
    ROOTED_DIRT => "rooted_dirt",
    MUD => "mud",
    MUDDY_MANGROVE_ROOTS => "muddy_mangrove_roots",
    PACKED_MUD => "packed_mud",
    MUD_BRICKS => "mud_bricks",
    DEEPSLATE_COAL_ORE => "deepslate_coal_ore",
    DEEPSLATE_IRON_ORE => "deepslate_iron_ore",
    DEEPSLATE_GOLD_ORE => "deepslate_gold_ore",
    DEEPSLATE_DIAMOND_ORE => "deepslate_diamond_ore",
    DEEPSLATE_EMERALD_ORE => "deepslate_emerald_ore",
    DEEPSLATE_REDSTONE_ORE => "deepslate_redstone_ore",
    DEEPSLATE_LAPIS_ORE => "deepslate_lapis_ore",
    DEEPSLATE_COPPER_ORE => "deepslate_copper_ore",
    RAW_IRON_BLOCK => "raw_iron_block",
    RAW_GOLD_BLOCK => "raw_gold_block",
    RAW_COPPER_BLOCK => "raw_copper_block",
}

/// Interns block names. Handle 0 is always `minecraft:air`.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
    index: FxHashMap<SmolStr, BlockId>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Registry holding air and the well-known vanilla blocks, in the order
    /// the [`blocks`] constants expect.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for id in WELL_KNOWN {
            let block = Block {
                namespace: SmolStr::new_inline(DEFAULT_NAMESPACE),
                id: SmolStr::new(id),
                name: SmolStr::from(format!("{}:{}", DEFAULT_NAMESPACE, id)),
            };
            registry.insert(block);
        }
        registry
    }

    /// Registry holding only air.
    pub fn empty() -> Self {
        let mut registry = BlockRegistry {
            blocks: Vec::with_capacity(WELL_KNOWN.len() + 1),
            index: FxHashMap::default(),
        };
        registry.insert(Block {
            namespace: SmolStr::new_inline(DEFAULT_NAMESPACE),
            id: SmolStr::new_inline("air"),
            name: SmolStr::new_inline("minecraft:air"),
        });
        registry
    }

    fn insert(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.index.insert(block.name.clone(), id);
        self.blocks.push(block);
        id
    }

    /// Returns the handle for `name`, registering it on first use.
    pub fn register(&mut self, name: &str) -> Result<BlockId> {
        if let Some(&id) = self.index.get(name) {
            return Ok(id);
        }
        let block = Block::parse(name)?;
        if let Some(&id) = self.index.get(block.name()) {
            // bare id of an already registered minecraft block
            return Ok(id);
        }
        Ok(self.insert(block))
    }

    pub fn register_parts(&mut self, namespace: &str, id: &str) -> Result<BlockId> {
        let block = Block::new(namespace, id)?;
        if let Some(&existing) = self.index.get(block.name()) {
            return Ok(existing);
        }
        Ok(self.insert(block))
    }

    pub fn get(&self, name: &str) -> Option<BlockId> {
        if let Some(&id) = self.index.get(name) {
            return Some(id);
        }
        if !name.contains(':') {
            return self
                .index
                .get(format!("{}:{}", DEFAULT_NAMESPACE, name).as_str())
                .copied();
        }
        None
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0 as usize)
    }

    pub fn name(&self, id: BlockId) -> Option<&str> {
        self.block(id).map(Block::name)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        (id.0 as usize) < self.blocks.len()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        // air is always present
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (BlockId(i as u32), block))
    }
}
