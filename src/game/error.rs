//! Error types for level table loading.

use thiserror::Error;

/// Errors that can occur when loading a level parameter table.
#[derive(Debug, Error)]
pub enum LevelTableError {
    /// File could not be read.
    #[error("Failed to read level table '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed.
    #[error("Parse error in level table: {0}")]
    Parse(#[from] serde_json::Error),

    /// The table must describe every level exactly once.
    #[error("Level table has {actual} entries, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    /// A level asked for more (or fewer) hues than exist.
    #[error("Level {level} uses {count} colors, allowed range is {min}..={max}")]
    ColorCount {
        level: usize,
        count: u8,
        min: u8,
        max: u8,
    },
}
