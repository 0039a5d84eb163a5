use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = YuvError> = std::result::Result<T, E>;

/// Error type for opening, reading and converting raw YUV frames.
///
/// Reaching the end of a stream is not an error: [`FrameSource::read_frame`]
/// returns `Ok(None)` in that case.
///
/// # Example
/// ```
/// use yuvist::{FrameConfig, FrameGeometry, ChromaFormat, YuvError};
///
/// let result = FrameGeometry::new(FrameConfig {
///     width: 0,
///     height: 1080,
///     chroma: ChromaFormat::Yuv420,
/// });
///
/// assert!(matches!(result, Err(YuvError::InvalidDimensions { .. })));
/// ```
///
/// [`FrameSource::read_frame`]: crate::FrameSource::read_frame
#[derive(Debug, Error)]
pub enum YuvError {
    #[error("Cannot open {}: file not found.", path.display())]
    FileNotFound { path: PathBuf },
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Width or height is zero, or the frame size does not fit in memory.
    #[error("Invalid frame dimensions {width}x{height}.")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Unsupported chroma format {0:?}.")]
    UnsupportedFormat(String),
    #[error("Unsupported output color format {0:?}.")]
    UnsupportedOutputFormat(String),
    #[error("Unsupported conversion strategy {0:?}.")]
    UnsupportedStrategy(String),
    #[error("Cannot seek to negative frame index {0}.")]
    NegativeSeek(i64),
    #[error("Seek to frame {index} is past the end of the stream ({frame_count} frames).")]
    SeekOutOfRange { index: i64, frame_count: u64 },
    #[error("Frame rate must be positive and finite, got {0}.")]
    InvalidFrameRate(f64),
    /// A plane or output buffer is smaller than the frame geometry requires.
    #[error("{plane} buffer holds {actual} bytes, expected at least {expected}.")]
    PlaneSizeMismatch {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The file ended in the middle of a frame.
    #[error("Frame {index} is truncated: read {read} of {expected} bytes.")]
    TruncatedFrame {
        index: u64,
        expected: usize,
        read: usize,
    },
}
