use std::fmt;
use std::str::FromStr;

use crate::{Result, YuvError};

/// Chroma layout of a raw planar YUV file.
///
/// Each layout maps to a `(horizontal, vertical)` subsampling pair. Chroma
/// planes are `width / horizontal` by `height / vertical` samples, rounded
/// down. [`ChromaFormat::Mono400`] has no chroma planes at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromaFormat {
    Mono400,
    #[default]
    Yuv420,
    Yuv422,
    Yuv422v,
    Yuv444,
}

impl ChromaFormat {
    pub const ALL: [ChromaFormat; 5] = [
        ChromaFormat::Mono400,
        ChromaFormat::Yuv420,
        ChromaFormat::Yuv422,
        ChromaFormat::Yuv422v,
        ChromaFormat::Yuv444,
    ];

    /// Returns the `(horizontal, vertical)` subsampling factors.
    #[must_use]
    pub const fn subsampling(self) -> (usize, usize) {
        match self {
            ChromaFormat::Mono400 | ChromaFormat::Yuv444 => (1, 1),
            ChromaFormat::Yuv420 => (2, 2),
            ChromaFormat::Yuv422 => (1, 2),
            ChromaFormat::Yuv422v => (2, 1),
        }
    }

    #[must_use]
    pub const fn is_mono(self) -> bool {
        matches!(self, ChromaFormat::Mono400)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChromaFormat::Mono400 => "yuv400",
            ChromaFormat::Yuv420 => "yuv420",
            ChromaFormat::Yuv422 => "yuv422",
            ChromaFormat::Yuv422v => "yuv422v",
            ChromaFormat::Yuv444 => "yuv444",
        }
    }
}

impl fmt::Display for ChromaFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChromaFormat {
    type Err = YuvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yuv400" | "mono400" => Ok(ChromaFormat::Mono400),
            "yuv420" => Ok(ChromaFormat::Yuv420),
            "yuv422" => Ok(ChromaFormat::Yuv422),
            "yuv422v" => Ok(ChromaFormat::Yuv422v),
            "yuv444" => Ok(ChromaFormat::Yuv444),
            _ => Err(YuvError::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// Out-of-band description of a raw YUV file. The format has no header, so
/// the caller has to know the resolution and chroma layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub width: usize,
    pub height: usize,
    pub chroma: ChromaFormat,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            chroma: ChromaFormat::Yuv420,
        }
    }
}

/// Byte layout of a single frame, derived from a validated [`FrameConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    config: FrameConfig,
    chroma_width: usize,
    chroma_height: usize,
    luma_size: usize,
    chroma_size: usize,
    frame_size: usize,
}

impl FrameGeometry {
    /// # Errors
    /// - If width or height is zero
    /// - If the frame size overflows `usize`
    pub fn new(config: FrameConfig) -> Result<Self> {
        let FrameConfig {
            width,
            height,
            chroma,
        } = config;
        let invalid = || YuvError::InvalidDimensions { width, height };

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        let (h_sub, v_sub) = chroma.subsampling();
        let (chroma_width, chroma_height) = if chroma.is_mono() {
            (0, 0)
        } else {
            if width % h_sub != 0 || height % v_sub != 0 {
                log::warn!(
                    "{}x{} is not a multiple of the {} subsampling, chroma planes are truncated",
                    width,
                    height,
                    chroma
                );
            }
            (width / h_sub, height / v_sub)
        };

        let luma_size = width.checked_mul(height).ok_or_else(invalid)?;
        let chroma_size = chroma_width * chroma_height;
        let frame_size = chroma_size
            .checked_mul(2)
            .and_then(|c| c.checked_add(luma_size))
            .ok_or_else(invalid)?;

        Ok(Self {
            config,
            chroma_width,
            chroma_height,
            luma_size,
            chroma_size,
            frame_size,
        })
    }

    #[must_use]
    #[inline(always)]
    pub const fn config(&self) -> FrameConfig {
        self.config
    }

    #[must_use]
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.config.width
    }

    #[must_use]
    #[inline(always)]
    pub const fn height(&self) -> usize {
        self.config.height
    }

    #[must_use]
    #[inline(always)]
    pub const fn chroma(&self) -> ChromaFormat {
        self.config.chroma
    }

    #[must_use]
    #[inline(always)]
    pub const fn chroma_width(&self) -> usize {
        self.chroma_width
    }

    #[must_use]
    #[inline(always)]
    pub const fn chroma_height(&self) -> usize {
        self.chroma_height
    }

    /// Bytes in the Y plane.
    #[must_use]
    #[inline(always)]
    pub const fn luma_size(&self) -> usize {
        self.luma_size
    }

    /// Bytes in each of the U and V planes, 0 for mono.
    #[must_use]
    #[inline(always)]
    pub const fn chroma_size(&self) -> usize {
        self.chroma_size
    }

    /// Bytes in one whole frame.
    #[must_use]
    #[inline(always)]
    pub const fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Bytes in the interleaved RGB output for one frame.
    #[must_use]
    #[inline(always)]
    pub const fn rgb_size(&self) -> usize {
        self.luma_size * 3
    }
}
