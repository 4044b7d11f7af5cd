use crate::error::{Error, Result};
use crate::formats::anvil::BEST_COMPRESSION;
use crate::formats::nbt::DEFAULT_DATA_VERSION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// ─── Options ────────────────────────────────────────────────────────────────

/// Options for region encoding and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// `DataVersion` written into every chunk (2566 = 1.16.5)
    #[serde(default = "default_data_version")]
    pub data_version: i32,
    /// zlib level, 0..=9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// Region file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Build and compress chunks on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_data_version() -> i32 {
    DEFAULT_DATA_VERSION
}
fn default_compression_level() -> u32 {
    BEST_COMPRESSION
}
fn default_extension() -> String {
    "mca".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            data_version: default_data_version(),
            compression_level: default_compression_level(),
            extension: default_extension(),
            parallel: true,
        }
    }
}

impl SaveOptions {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: SaveOptions = serde_json::from_str(json)?;
        options.compression_level = options.compression_level.min(BEST_COMPRESSION);
        Ok(options)
    }

    /// The default options as pretty-printed JSON.
    pub fn schema_json() -> Option<String> {
        serde_json::to_string_pretty(&SaveOptions::default()).ok()
    }

    pub fn region_file_name(&self, rx: i32, rz: i32) -> String {
        region_file_name(rx, rz, &self.extension)
    }
}

// ─── File names ─────────────────────────────────────────────────────────────

/// `r.<rx>.<rz>.<ext>`
pub fn region_file_name(rx: i32, rz: i32, extension: &str) -> String {
    format!("r.{}.{}.{}", rx, rz, extension)
}

/// Parses region coordinates out of `r.<rx>.<rz>.<ext>`, with or without a
/// leading directory.
pub fn parse_region_file_name(name: &str) -> Option<(i32, i32)> {
    let basename = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let parts: Vec<&str> = basename.split('.').collect();
    if parts.len() >= 4 && parts[0] == "r" {
        let x = parts[1].parse::<i32>().ok()?;
        let z = parts[2].parse::<i32>().ok()?;
        Some((x, z))
    } else {
        None
    }
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Writes `data` to a `.tmp` sibling of `path` and renames it into place, so
/// `path` never holds a partially written file.
pub fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(path, e));
    }
    Ok(())
}

/// Creates `dir` (and parents) if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))
}
