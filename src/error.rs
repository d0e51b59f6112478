//! Error types shared by the portfolio core.
//!
//! Nothing here is fatal to the application: storage problems fall back to
//! curriculum defaults and surface as a dismissible notice, and a missing
//! drawing surface simply turns drawing into a no-op.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Everything that can go wrong while editing, persisting or exporting a portfolio.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// The persisted blob could not be read or did not match the curriculum.
    #[error("could not read saved portfolio: {0}")]
    StorageRead(String),

    /// Writing the portfolio to durable storage failed.
    #[error("could not save portfolio: {0}")]
    StorageWrite(String),

    /// The aggregate could not be serialized or deserialized.
    #[error("portfolio JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No episode with the requested id exists in the curriculum.
    #[error("no episode with id {0}")]
    UnknownEpisode(u32),

    /// An index into one of the fixed-length lists was out of range.
    #[error("{list} index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Which list was indexed
        list: &'static str,
        /// The rejected index
        index: usize,
        /// Length of the list
        len: usize,
    },

    /// Self-assessment ratings are limited to 0..=5.
    #[error("rating {0} is outside 0..=5")]
    RatingOutOfRange(u8),

    /// The host cannot provide a 2D bitmap for drawing.
    #[error("drawing surface unavailable")]
    DrawingSurfaceUnavailable,

    /// The bitmap could not be encoded or decoded as PNG.
    #[error("canvas image error: {0}")]
    CanvasEncode(String),

    /// Handing the export file to the user failed.
    #[error("export failed: {0}")]
    Export(String),
}
