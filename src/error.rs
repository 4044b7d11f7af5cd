use std::path::PathBuf;

/// Error type for world construction and region encoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{axis} coordinate {value} is outside {min}..={max}")]
    OutOfRange {
        axis: char,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("invalid block name `{0}`")]
    InvalidBlockName(String),
    #[error("block id {0} is not known to this registry")]
    UnknownBlock(u32),
    #[error("compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("chunk ({x}, {z}) needs {sectors} sectors, a region slot holds at most 255")]
    ChunkTooLarge { x: i32, z: i32, sectors: usize },
    #[error("IO error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid save options: {0}")]
    Options(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Checks `value` against an inclusive range, naming the axis on failure.
    pub(crate) fn check_range(axis: char, value: i32, min: i32, max: i32) -> Result<()> {
        if value < min || value > max {
            return Err(Error::OutOfRange {
                axis,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_bounds_are_inclusive() {
        assert!(Error::check_range('x', 0, 0, 15).is_ok());
        assert!(Error::check_range('x', 15, 0, 15).is_ok());
        assert!(Error::check_range('x', 16, 0, 15).is_err());
        assert!(Error::check_range('y', -1, 0, 255).is_err());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = Error::check_range('z', 16, 0, 15).unwrap_err();
        assert_eq!(err.to_string(), "z coordinate 16 is outside 0..=15");
    }
}
