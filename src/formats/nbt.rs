//! Fixed-schema NBT writer for chunk documents.
//!
//! There is no tag tree here: each record shape of the chunk document has its
//! own function that writes its fields in order, so the byte layout can be
//! read straight off the code.

use crate::block::{BlockRegistry, MAX_NAME_LEN};
use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::section::Section;

/// NBT tag type ids.
pub mod tag {
    pub const END: u8 = 0;
    pub const BYTE: u8 = 1;
    pub const INT: u8 = 3;
    pub const LONG: u8 = 4;
    pub const STRING: u8 = 8;
    pub const LIST: u8 = 9;
    pub const COMPOUND: u8 = 10;
    pub const INT_ARRAY: u8 = 11;
    pub const LONG_ARRAY: u8 = 12;
}

/// `DataVersion` of Minecraft 1.16.5, the last version using this layout.
pub const DEFAULT_DATA_VERSION: i32 = 2566;

/// Big-endian NBT primitive writer.
#[derive(Debug, Default)]
pub struct NbtWriter {
    buf: Vec<u8>,
}

impl NbtWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        NbtWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// u16 length prefix followed by the bytes. Names and block ids are ASCII,
    /// where modified UTF-8 and UTF-8 agree. Block names are capped at
    /// `MAX_NAME_LEN` when registered, so every string written here fits.
    fn put_str(&mut self, s: &str) {
        debug_assert!(s.len() <= MAX_NAME_LEN);
        self.put_u16(s.len() as u16);
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn header(&mut self, tag: u8, name: &str) {
        self.put_u8(tag);
        self.put_str(name);
    }

    pub fn begin_compound(&mut self, name: &str) {
        self.header(tag::COMPOUND, name);
    }

    pub fn end_compound(&mut self) {
        self.put_u8(tag::END);
    }

    pub fn byte(&mut self, name: &str, v: i8) {
        self.header(tag::BYTE, name);
        self.put_u8(v as u8);
    }

    pub fn int(&mut self, name: &str, v: i32) {
        self.header(tag::INT, name);
        self.put_i32(v);
    }

    pub fn long(&mut self, name: &str, v: i64) {
        self.header(tag::LONG, name);
        self.put_i64(v);
    }

    pub fn string(&mut self, name: &str, v: &str) {
        self.header(tag::STRING, name);
        self.put_str(v);
    }

    /// List header; the caller writes `len` unnamed elements of `element`.
    pub fn begin_list(&mut self, name: &str, element: u8, len: usize) {
        self.header(tag::LIST, name);
        self.put_u8(element);
        self.put_i32(len as i32);
    }

    pub fn int_array(&mut self, name: &str, values: &[i32]) {
        self.header(tag::INT_ARRAY, name);
        self.put_i32(values.len() as i32);
        for &v in values {
            self.put_i32(v);
        }
    }

    /// Long array; words are written with their raw bit pattern.
    pub fn long_array(&mut self, name: &str, values: &[u64]) {
        self.header(tag::LONG_ARRAY, name);
        self.put_i32(values.len() as i32);
        for &v in values {
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
    }
}

// ─── Chunk document ─────────────────────────────────────────────────────────

/// Serializes one chunk column:
///
/// ```text
/// {
///   DataVersion: int,
///   Level: {
///     Entities: [], TileEntities: [], LiquidTicks: [],
///     xPos: int, zPos: int, LastUpdate: long, InhabitedTime: long,
///     isLightOn: byte, Status: "full",
///     Sections: [{ Y: byte, Palette: [{ Name: string }], BlockStates: long[] }],
///     Biomes: int[1024]
///   }
/// }
/// ```
pub fn write_chunk(chunk: &Chunk, registry: &BlockRegistry, data_version: i32) -> Result<Vec<u8>> {
    let mut w = NbtWriter::with_capacity(16 * 1024);
    w.begin_compound("");
    w.int("DataVersion", data_version);
    write_level(&mut w, chunk, registry)?;
    w.end_compound();
    Ok(w.into_bytes())
}

fn write_level(w: &mut NbtWriter, chunk: &Chunk, registry: &BlockRegistry) -> Result<()> {
    w.begin_compound("Level");
    w.begin_list("Entities", tag::COMPOUND, 0);
    w.begin_list("TileEntities", tag::COMPOUND, 0);
    w.begin_list("LiquidTicks", tag::COMPOUND, 0);
    w.int("xPos", chunk.x());
    w.int("zPos", chunk.z());
    w.long("LastUpdate", 0);
    w.long("InhabitedTime", 0);
    w.byte("isLightOn", 1);
    w.string("Status", "full");

    let present: Vec<&Section> = chunk.sections().filter(|s| !s.is_empty()).collect();
    w.begin_list("Sections", tag::COMPOUND, present.len());
    for section in present {
        write_section(w, section, registry)?;
    }

    w.int_array("Biomes", chunk.biomes());
    w.end_compound();
    Ok(())
}

fn write_section(w: &mut NbtWriter, section: &Section, registry: &BlockRegistry) -> Result<()> {
    let palette = section.palette();
    w.byte("Y", section.y() as i8);
    w.begin_list("Palette", tag::COMPOUND, palette.len());
    for &block in &palette {
        let name = registry
            .name(block)
            .ok_or(Error::UnknownBlock(block.raw()))?;
        write_palette_entry(w, name);
    }
    w.long_array("BlockStates", &section.encode_states(&palette));
    w.end_compound();
    Ok(())
}

fn write_palette_entry(w: &mut NbtWriter, name: &str) {
    w.string("Name", name);
    w.end_compound();
}
