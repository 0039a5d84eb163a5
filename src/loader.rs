//! Time-based playback over a [`FrameSource`].
//!
//! The loader maps a position in seconds onto frame indices at a fixed frame
//! rate, decodes the frame under the position and publishes it through a
//! [`FrameSlot`]. A playback clock calls [`Loader::tick`] once per frame
//! period; a render thread drains the slot.

#[cfg(test)]
mod tests;

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::source::check_fps;
use crate::{
    ColorConverter, ConversionStrategy, FrameBuffers, FrameConfig, FrameSlot, FrameSource, Result,
    YuvError,
};

/// Absorbs accumulated rounding in `seconds * fps` so that `n / fps` maps
/// back to frame `n`.
const FRAME_EPSILON: f64 = 1e-6;

/// How decoded frames are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// The Y, U and V planes as read, for upload as single-channel textures.
    #[default]
    Luminance,
    /// One interleaved RGB buffer.
    Rgb,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Luminance => "luminance",
            OutputFormat::Rgb => "rgb",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = YuvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "luminance" => Ok(OutputFormat::Luminance),
            "rgb" => Ok(OutputFormat::Rgb),
            _ => Err(YuvError::UnsupportedOutputFormat(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderConfig {
    pub frame: FrameConfig,
    pub output: OutputFormat,
    pub strategy: ConversionStrategy,
    pub fps: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            output: OutputFormat::default(),
            strategy: ConversionStrategy::default(),
            fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// A frame published by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    Planar(FrameBuffers),
    Rgb {
        index: u64,
        width: usize,
        height: usize,
        data: Vec<u8>,
    },
}

impl DecodedFrame {
    #[must_use]
    pub const fn index(&self) -> u64 {
        match *self {
            DecodedFrame::Planar(ref frame) => frame.index(),
            DecodedFrame::Rgb { index, .. } => index,
        }
    }

    /// `(width, height)` of each of the three planes; absent planes are
    /// `(0, 0)`.
    #[must_use]
    pub const fn plane_sizes(&self) -> [(usize, usize); 3] {
        match *self {
            DecodedFrame::Planar(ref frame) => {
                let g = frame.geometry();
                let chroma = (g.chroma_width(), g.chroma_height());
                [(g.width(), g.height()), chroma, chroma]
            }
            DecodedFrame::Rgb { width, height, .. } => [(width, height), (0, 0), (0, 0)],
        }
    }
}

#[derive(Debug)]
pub struct Loader<R = File> {
    source: FrameSource<R>,
    converter: ColorConverter,
    output: OutputFormat,
    fps: f64,
    position: f64,
    duration: f64,
    eos: bool,
    state: PlaybackState,
    last_decoded: Option<u64>,
    slot: Arc<FrameSlot<DecodedFrame>>,
}

impl Loader<File> {
    /// Opens a raw YUV file and publishes its first frame.
    ///
    /// # Errors
    /// - If `config.fps` is not positive and finite
    /// - See [`FrameSource::open`]
    pub fn open<P: AsRef<Path>>(path: P, config: LoaderConfig) -> Result<Self> {
        check_fps(config.fps)?;
        let source = FrameSource::open(path, config.frame)?;
        Self::with_source(source, config)
    }
}

impl<R: Read + Seek> Loader<R> {
    /// # Errors
    /// - See [`Loader::open`] and [`FrameSource::from_reader`]
    pub fn from_reader(reader: R, config: LoaderConfig) -> Result<Self> {
        check_fps(config.fps)?;
        let source = FrameSource::from_reader(reader, config.frame)?;
        Self::with_source(source, config)
    }

    fn with_source(source: FrameSource<R>, config: LoaderConfig) -> Result<Self> {
        let fps = check_fps(config.fps)?;
        let duration = source.duration_seconds(fps)?;

        let mut loader = Self {
            source,
            converter: ColorConverter::new(config.strategy),
            output: config.output,
            fps,
            position: 0.0,
            duration,
            eos: false,
            state: PlaybackState::Stopped,
            last_decoded: None,
            slot: Arc::new(FrameSlot::new()),
        };
        loader.set_position(0.0)?;
        Ok(loader)
    }

    /// Moves to `seconds` and publishes the frame there.
    ///
    /// Negative positions rewind to the start. Positions at or past the
    /// duration set the end-of-stream flag and pause playback.
    ///
    /// # Errors
    /// - If reading or converting the frame fails
    pub fn set_position(&mut self, seconds: f64) -> Result<()> {
        let seconds = if seconds.is_nan() || seconds < 0.0 {
            0.0
        } else {
            seconds
        };

        if seconds >= self.duration {
            if !self.eos {
                log::debug!("end of stream after {} frames", self.source.frame_count());
            }
            self.position = self.duration;
            self.eos = true;
            // The source cursor moves past the last frame decoded.
            self.last_decoded = None;
            self.state = PlaybackState::Paused;
            return self.source.seek_to_frame(self.source.frame_count() as i64);
        }

        self.position = seconds;
        self.eos = false;
        // `seconds < duration` keeps this below `frame_count` up to rounding.
        let index = self.frame_at(seconds).min(self.source.frame_count() - 1);
        if self.last_decoded == Some(index) {
            return Ok(());
        }
        self.decode(index)
    }

    /// Moves to `percent` (`0.0..=1.0`) of the duration.
    ///
    /// # Errors
    /// - See [`Loader::set_position`]
    pub fn seek(&mut self, percent: f64) -> Result<()> {
        self.set_position(percent * self.duration)
    }

    /// Advances one frame period while playing; does nothing otherwise.
    ///
    /// # Errors
    /// - See [`Loader::set_position`]
    pub fn tick(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        let next = self.frame_at(self.position) + 1;
        self.set_position(next as f64 / self.fps)
    }

    pub fn play(&mut self) {
        log::debug!("play from {:.3}s", self.position);
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        log::debug!("pause at {:.3}s", self.position);
        self.state = PlaybackState::Paused;
    }

    /// Stops playback and rewinds to the first frame.
    ///
    /// # Errors
    /// - See [`Loader::set_position`]
    pub fn stop(&mut self) -> Result<()> {
        log::debug!("stop");
        self.set_position(0.0)?;
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    /// Takes the pending decoded frame, if any.
    pub fn take_frame(&self) -> Option<DecodedFrame> {
        self.slot.take()
    }

    /// Shared handle on the mailbox, for a consumer on another thread.
    #[must_use]
    pub fn slot(&self) -> Arc<FrameSlot<DecodedFrame>> {
        Arc::clone(&self.slot)
    }

    /// Changes the frame rate. The position is kept in seconds and the frame
    /// under it is published.
    ///
    /// # Errors
    /// - If `fps` is not positive and finite
    /// - See [`Loader::set_position`]
    pub fn set_fps(&mut self, fps: f64) -> Result<()> {
        let fps = check_fps(fps)?;
        self.fps = fps;
        self.duration = self.source.duration_seconds(fps)?;
        self.set_position(self.position)
    }

    #[must_use]
    #[inline(always)]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    #[inline(always)]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    #[inline(always)]
    pub const fn fps(&self) -> f64 {
        self.fps
    }

    #[must_use]
    #[inline(always)]
    pub const fn eos(&self) -> bool {
        self.eos
    }

    #[must_use]
    #[inline(always)]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    #[inline(always)]
    pub const fn output(&self) -> OutputFormat {
        self.output
    }

    #[must_use]
    #[inline(always)]
    pub const fn source(&self) -> &FrameSource<R> {
        &self.source
    }

    #[must_use]
    #[inline(always)]
    pub const fn converter(&self) -> &ColorConverter {
        &self.converter
    }

    fn frame_at(&self, seconds: f64) -> u64 {
        seconds.mul_add(self.fps, FRAME_EPSILON).floor() as u64
    }

    fn decode(&mut self, index: u64) -> Result<()> {
        self.source.seek_to_frame(index as i64)?;
        let Some(frame) = self.source.read_frame()? else {
            return Ok(());
        };
        self.last_decoded = Some(index);

        let decoded = match self.output {
            OutputFormat::Luminance => DecodedFrame::Planar(frame),
            OutputFormat::Rgb => DecodedFrame::Rgb {
                index,
                width: frame.geometry().width(),
                height: frame.geometry().height(),
                data: self.converter.convert_frame(&frame)?,
            },
        };

        if !self.slot.offer(decoded) {
            log::trace!("dropped frame {}, previous frame not taken yet", index);
        }
        Ok(())
    }
}
