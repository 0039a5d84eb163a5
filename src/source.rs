//! Seek-and-read access to raw planar YUV files.
//!
//! A raw file is a plain concatenation of frames with no header:
//! `[Y: width*height][U: cw*ch][V: cw*ch]` per frame, with U and V absent
//! for mono input.


use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::{ChromaFormat, FrameBuffers, FrameConfig, FrameGeometry, Result, YuvError};

/// Reads frames out of a raw planar YUV stream.
///
/// The source keeps a cursor, `current_frame`, in `0..=frame_count`. Reading
/// advances the cursor by one; a cursor equal to `frame_count` is the end of
/// the stream.
#[derive(Debug)]
pub struct FrameSource<R = File> {
    reader: R,
    geometry: FrameGeometry,
    file_size: u64,
    frame_count: u64,
    current_frame: u64,
}

impl FrameSource<File> {
    /// Opens a raw YUV file.
    ///
    /// # Errors
    /// - If the dimensions are invalid
    /// - If the file does not exist or cannot be opened
    pub fn open<P: AsRef<Path>>(path: P, config: FrameConfig) -> Result<Self> {
        let path = path.as_ref();
        let geometry = FrameGeometry::new(config)?;

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => YuvError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => YuvError::Io(e),
        })?;
        let file_size = file.metadata()?.len();

        let source = Self::with_size(file, geometry, file_size);
        log::debug!(
            "opened {}: {}x{} {}, {} frames",
            path.display(),
            config.width,
            config.height,
            config.chroma,
            source.frame_count
        );
        Ok(source)
    }

    /// Opens a raw YUV file described by a chroma format string such as
    /// `"yuv420"`.
    ///
    /// # Errors
    /// - If `format` is not a known chroma format
    /// - See [`FrameSource::open`]
    pub fn open_str<P: AsRef<Path>>(
        path: P,
        width: usize,
        height: usize,
        format: &str,
    ) -> Result<Self> {
        let chroma: ChromaFormat = format.parse()?;
        Self::open(
            path,
            FrameConfig {
                width,
                height,
                chroma,
            },
        )
    }
}

impl<R: Read + Seek> FrameSource<R> {
    /// Wraps any seekable reader, e.g. an in-memory [`io::Cursor`].
    ///
    /// # Errors
    /// - If the dimensions are invalid
    /// - If the stream length cannot be determined
    pub fn from_reader(mut reader: R, config: FrameConfig) -> Result<Self> {
        let geometry = FrameGeometry::new(config)?;
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self::with_size(reader, geometry, file_size))
    }

    fn with_size(reader: R, geometry: FrameGeometry, file_size: u64) -> Self {
        let frame_size = geometry.frame_size() as u64;
        let frame_count = file_size / frame_size;
        let trailing = file_size % frame_size;
        if trailing != 0 {
            log::warn!(
                "stream has {} trailing bytes after {} whole frames of {} bytes",
                trailing,
                frame_count,
                frame_size
            );
        }

        Self {
            reader,
            geometry,
            file_size,
            frame_count,
            current_frame: 0,
        }
    }

    /// Moves the cursor to frame `index`.
    ///
    /// Seeking to `frame_count` marks the end of the stream without touching
    /// the reader; the next [`read_frame`](Self::read_frame) returns `None`.
    ///
    /// # Errors
    /// - If `index` is negative or past `frame_count`
    /// - If the underlying seek fails
    pub fn seek_to_frame(&mut self, index: i64) -> Result<()> {
        if index < 0 {
            return Err(YuvError::NegativeSeek(index));
        }
        let target = index as u64;
        if target > self.frame_count {
            return Err(YuvError::SeekOutOfRange {
                index,
                frame_count: self.frame_count,
            });
        }

        if target < self.frame_count {
            self.reader
                .seek(SeekFrom::Start(target * self.geometry.frame_size() as u64))?;
        }
        self.current_frame = target;
        Ok(())
    }

    /// Reads the frame under the cursor and advances the cursor.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    /// - If the stream ends in the middle of the frame
    /// - If the underlying read fails
    pub fn read_frame(&mut self) -> Result<Option<FrameBuffers>> {
        if self.is_eos() {
            log::trace!("end of stream at frame {}", self.current_frame);
            return Ok(None);
        }

        let index = self.current_frame;
        let mut frame = FrameBuffers::with_geometry(index, self.geometry);
        let expected = self.geometry.frame_size();

        let mut read = read_full(&mut self.reader, &mut frame.y)?;
        if read == frame.y.len() && !frame.u.is_empty() {
            read += read_full(&mut self.reader, &mut frame.u)?;
            if read == frame.y.len() + frame.u.len() {
                read += read_full(&mut self.reader, &mut frame.v)?;
            }
        }
        if read < expected {
            // Leave the reader at the start of the frame the cursor points to.
            self.reader
                .seek(SeekFrom::Start(index * expected as u64))?;
            return Err(YuvError::TruncatedFrame {
                index,
                expected,
                read,
            });
        }

        self.current_frame += 1;
        Ok(Some(frame))
    }

    #[must_use]
    #[inline(always)]
    pub const fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    #[must_use]
    #[inline(always)]
    pub const fn config(&self) -> FrameConfig {
        self.geometry.config()
    }

    /// Length of the stream in bytes.
    #[must_use]
    #[inline(always)]
    pub const fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of whole frames in the stream.
    #[must_use]
    #[inline(always)]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Index of the frame the next read returns.
    #[must_use]
    #[inline(always)]
    pub const fn current_frame(&self) -> u64 {
        self.current_frame
    }

    #[must_use]
    #[inline(always)]
    pub const fn is_eos(&self) -> bool {
        self.current_frame >= self.frame_count
    }

    /// Stream length in seconds at `fps` frames per second.
    ///
    /// # Errors
    /// - If `fps` is not positive and finite
    pub fn duration_seconds(&self, fps: f64) -> Result<f64> {
        Ok(self.frame_count as f64 / check_fps(fps)?)
    }

    /// Cursor position in seconds at `fps` frames per second.
    ///
    /// # Errors
    /// - If `fps` is not positive and finite
    pub fn position_seconds(&self, fps: f64) -> Result<f64> {
        Ok(self.current_frame as f64 / check_fps(fps)?)
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> Iterator for FrameSource<R> {
    type Item = Result<FrameBuffers>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.frame_count - self.current_frame.min(self.frame_count)) as usize;
        (0, Some(remaining))
    }
}

pub(crate) fn check_fps(fps: f64) -> Result<f64> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(YuvError::InvalidFrameRate(fps))
    }
}

/// Reads until `buf` is full or the reader is exhausted, returning the number
/// of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
