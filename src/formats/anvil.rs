//! Anvil region container layout.
//!
//! - Bytes 0..4096: location table (1024 entries of 3-byte sector offset + 1-byte sector count)
//! - Bytes 4096..8192: timestamp table (left zeroed)
//! - Bytes 8192..: chunk payloads, each padded to whole 4 KiB sectors

use crate::error::{Error, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Size of one sector in bytes.
pub const SECTOR_SIZE: usize = 4096;

/// Location table plus timestamp table.
pub const HEADER_SIZE: usize = SECTOR_SIZE * 2;

/// Chunks per region along each horizontal axis.
pub const REGION_WIDTH: i32 = 32;

pub const CHUNKS_PER_REGION: usize = (REGION_WIDTH * REGION_WIDTH) as usize;

/// The location table stores sector counts in a single byte.
pub const MAX_CHUNK_SECTORS: usize = u8::MAX as usize;

/// Compression method byte for zlib payloads.
pub const COMPRESSION_ZLIB: u8 = 2;

/// zlib level used unless configured otherwise.
pub const BEST_COMPRESSION: u32 = 9;

/// A compressed chunk document waiting to be laid out in a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Slot in the location table, `z_in_region * 32 + x_in_region`.
    pub slot: usize,
    /// World chunk coordinates, for error reporting.
    pub x: i32,
    pub z: i32,
    pub compressed: Vec<u8>,
}

impl EncodedChunk {
    /// Length prefix + compression byte + payload, before sector padding.
    pub fn framed_len(&self) -> usize {
        4 + 1 + self.compressed.len()
    }

    pub fn sector_count(&self) -> usize {
        self.framed_len().div_ceil(SECTOR_SIZE)
    }
}

/// Compresses a chunk document with zlib at `level` (0..=9).
pub fn compress_chunk(document: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(document.len() / 4),
        Compression::new(level.min(BEST_COMPRESSION)),
    );
    encoder.write_all(document).map_err(Error::Compression)?;
    encoder.finish().map_err(Error::Compression)
}

/// Frames a compressed payload as `[u32 BE length][method][data]` and pads it
/// with zeros to whole sectors.
pub fn frame_chunk_payload(compressed: &[u8]) -> Vec<u8> {
    let payload_len = compressed.len() as u32 + 1;
    let framed_len = 4 + payload_len as usize;
    let padded_len = framed_len.div_ceil(SECTOR_SIZE) * SECTOR_SIZE;

    let mut framed = Vec::with_capacity(padded_len);
    framed.extend_from_slice(&payload_len.to_be_bytes());
    framed.push(COMPRESSION_ZLIB);
    framed.extend_from_slice(compressed);
    framed.resize(padded_len, 0);
    framed
}

/// Lays out a region file from compressed chunks.
///
/// Chunks are written in slot order starting at sector 2. Slots without a
/// chunk keep an all-zero location entry. Fails without producing output if
/// any chunk needs more sectors than a location entry can hold.
pub fn assemble_region(chunks: &[EncodedChunk]) -> Result<Vec<u8>> {
    let mut ordered: Vec<&EncodedChunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.slot);

    for chunk in &ordered {
        let sectors = chunk.sector_count();
        if sectors > MAX_CHUNK_SECTORS {
            return Err(Error::ChunkTooLarge {
                x: chunk.x,
                z: chunk.z,
                sectors,
            });
        }
    }

    let body_sectors: usize = ordered.iter().map(|c| c.sector_count()).sum();
    let mut result = vec![0u8; HEADER_SIZE];
    result.reserve(body_sectors * SECTOR_SIZE);

    let mut current_sector: u32 = (HEADER_SIZE / SECTOR_SIZE) as u32;
    for chunk in ordered {
        let sector_count = chunk.sector_count();
        let loc_offset = chunk.slot * 4;
        result[loc_offset] = ((current_sector >> 16) & 0xFF) as u8;
        result[loc_offset + 1] = ((current_sector >> 8) & 0xFF) as u8;
        result[loc_offset + 2] = (current_sector & 0xFF) as u8;
        result[loc_offset + 3] = sector_count as u8;

        result.extend_from_slice(&frame_chunk_payload(&chunk.compressed));
        current_sector += sector_count as u32;
    }

    // Every payload is already sector-padded; this only matters if that ever changes.
    let padded_len = result.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
    result.resize(padded_len, 0);
    Ok(result)
}

// ─── Coordinates ────────────────────────────────────────────────────────────

/// Floor division (toward negative infinity).
#[inline]
pub fn floor_div(a: i32, b: i32) -> i32 {
    a.div_euclid(b)
}

/// Floor modulo, always in `0..b` for positive `b`.
#[inline]
pub fn floor_mod(a: i32, b: i32) -> i32 {
    a.rem_euclid(b)
}

/// Location table slot of a chunk given its world chunk coordinates.
#[inline]
pub fn chunk_slot_index(chunk_x: i32, chunk_z: i32) -> usize {
    (floor_mod(chunk_z, REGION_WIDTH) * REGION_WIDTH + floor_mod(chunk_x, REGION_WIDTH)) as usize
}

/// Reads a location table entry back as `(sector_offset, sector_count)`.
pub fn location_entry(header: &[u8], slot: usize) -> (u32, u8) {
    let offset = slot * 4;
    let sector = ((header[offset] as u32) << 16)
        | ((header[offset + 1] as u32) << 8)
        | (header[offset + 2] as u32);
    (sector, header[offset + 3])
}
