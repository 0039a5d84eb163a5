//! Conversion from 8-bit BT.601 limited-range YUV to interleaved 8-bit RGB.
//!
//! Three interchangeable strategies are provided. [`FixedPointTable`] is the
//! one meant for playback: integer only, no multiplications per pixel beyond
//! table lookups. [`FloatingPoint`] and [`IntegerScaled`] exist so the table
//! path can be checked against them; all three agree within ±2 per channel.
//!
//! [`FixedPointTable`]: ConversionStrategy::FixedPointTable
//! [`FloatingPoint`]: ConversionStrategy::FloatingPoint
//! [`IntegerScaled`]: ConversionStrategy::IntegerScaled

#![allow(clippy::many_single_char_names)]

pub mod tables;


use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};
use num_traits::clamp;

use self::tables::{Tables, YUV_FIX};
use crate::{FrameBuffers, FrameGeometry, Result, YuvError};

/// Numeric strategy used by [`ColorConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversionStrategy {
    FloatingPoint,
    IntegerScaled,
    #[default]
    FixedPointTable,
}

impl ConversionStrategy {
    pub const ALL: [ConversionStrategy; 3] = [
        ConversionStrategy::FloatingPoint,
        ConversionStrategy::IntegerScaled,
        ConversionStrategy::FixedPointTable,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConversionStrategy::FloatingPoint => "float",
            ConversionStrategy::IntegerScaled => "int",
            ConversionStrategy::FixedPointTable => "table",
        }
    }
}

impl fmt::Display for ConversionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionStrategy {
    type Err = YuvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "float" => Ok(ConversionStrategy::FloatingPoint),
            "int" => Ok(ConversionStrategy::IntegerScaled),
            "table" => Ok(ConversionStrategy::FixedPointTable),
            _ => Err(YuvError::UnsupportedStrategy(s.to_owned())),
        }
    }
}

/// YUV to RGB converter holding the precomputed lookup tables.
#[derive(Debug, Clone)]
pub struct ColorConverter {
    strategy: ConversionStrategy,
    tables: Box<Tables>,
    matrix: Matrix3<f64>,
}

impl Default for ColorConverter {
    fn default() -> Self {
        Self::new(ConversionStrategy::default())
    }
}

impl ColorConverter {
    #[must_use]
    pub fn new(strategy: ConversionStrategy) -> Self {
        #[rustfmt::skip]
        let matrix = Matrix3::new(
            1.164,  0.0,    1.596,
            1.164, -0.391, -0.813,
            1.164,  2.018,  0.0,
        );

        Self {
            strategy,
            tables: Box::new(Tables::new()),
            matrix,
        }
    }

    #[must_use]
    #[inline(always)]
    pub const fn strategy(&self) -> ConversionStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: ConversionStrategy) {
        self.strategy = strategy;
    }

    /// Converts one sample triple with the selected strategy.
    #[must_use]
    #[inline]
    pub fn convert_pixel(&self, y: u8, u: u8, v: u8) -> [u8; 3] {
        self.convert_pixel_with(self.strategy, y, u, v)
    }

    /// Converts one sample triple with an explicit strategy.
    #[must_use]
    #[inline]
    pub fn convert_pixel_with(&self, strategy: ConversionStrategy, y: u8, u: u8, v: u8) -> [u8; 3] {
        match strategy {
            ConversionStrategy::FloatingPoint => self.rgb_float(y, u, v),
            ConversionStrategy::IntegerScaled => rgb_int(y, u, v),
            ConversionStrategy::FixedPointTable => self.rgb_table(y, u, v),
        }
    }

    #[inline(always)]
    fn rgb_float(&self, y: u8, u: u8, v: u8) -> [u8; 3] {
        let yuv = Vector3::new(
            f64::from(y) - 16.0,
            f64::from(u) - 128.0,
            f64::from(v) - 128.0,
        );
        let rgb = self.matrix * yuv;
        [
            clamp(rgb[0].round(), 0.0, 255.0) as u8,
            clamp(rgb[1].round(), 0.0, 255.0) as u8,
            clamp(rgb[2].round(), 0.0, 255.0) as u8,
        ]
    }

    #[inline(always)]
    fn rgb_table(&self, y: u8, u: u8, v: u8) -> [u8; 3] {
        let t = &*self.tables;
        let (y, u, v) = (i32::from(y), usize::from(u), usize::from(v));

        let r_off = t.v_to_r[v];
        let g_off = (t.v_to_g[v] + t.u_to_g[u]) >> YUV_FIX;
        let b_off = t.u_to_b[u];

        [t.clip(y + r_off), t.clip(y + g_off), t.clip(y + b_off)]
    }

    /// Converts a whole frame's planes into a new interleaved RGB buffer of
    /// `3 * width * height` bytes, top row first.
    ///
    /// Chroma is upsampled nearest-neighbour: luma pixel `(x, y)` uses chroma
    /// sample `(x / h_sub, y / v_sub)`. For mono input the chroma planes are
    /// never read and may be empty.
    ///
    /// # Errors
    /// - If a plane is smaller than `geometry` requires
    pub fn convert_raster(
        &self,
        y: &[u8],
        u: &[u8],
        v: &[u8],
        geometry: &FrameGeometry,
    ) -> Result<Vec<u8>> {
        let mut out = vec![0; geometry.rgb_size()];
        self.convert_raster_into(y, u, v, geometry, &mut out)?;
        Ok(out)
    }

    /// Same as [`ColorConverter::convert_raster`], writing into `out`.
    ///
    /// # Errors
    /// - If a plane or `out` is smaller than `geometry` requires
    pub fn convert_raster_into(
        &self,
        y: &[u8],
        u: &[u8],
        v: &[u8],
        geometry: &FrameGeometry,
        out: &mut [u8],
    ) -> Result<()> {
        check_len("Y plane", y, geometry.luma_size())?;
        if !geometry.chroma().is_mono() {
            check_len("U plane", u, geometry.chroma_size())?;
            check_len("V plane", v, geometry.chroma_size())?;
        }
        check_len("RGB output", out, geometry.rgb_size())?;

        match self.strategy {
            ConversionStrategy::FloatingPoint => {
                raster(y, u, v, geometry, out, |y, u, v| self.rgb_float(y, u, v));
            }
            ConversionStrategy::IntegerScaled => raster(y, u, v, geometry, out, rgb_int),
            ConversionStrategy::FixedPointTable => {
                raster(y, u, v, geometry, out, |y, u, v| self.rgb_table(y, u, v));
            }
        }
        Ok(())
    }

    /// Converts the planes of a frame read by [`FrameSource`](crate::FrameSource).
    ///
    /// # Errors
    /// - If the buffers do not match their geometry
    pub fn convert_frame(&self, frame: &FrameBuffers) -> Result<Vec<u8>> {
        let [y, u, v] = frame.planes();
        self.convert_raster(y, u, v, frame.geometry())
    }
}

#[inline(always)]
fn rgb_int(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = 298 * (i32::from(y) - 16);
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;

    let r = c + 409 * e;
    let g = c - 100 * d - 208 * e;
    let b = c + 516 * d;

    [
        clamp((r + 128) >> 8, 0, 255) as u8,
        clamp((g + 128) >> 8, 0, 255) as u8,
        clamp((b + 128) >> 8, 0, 255) as u8,
    ]
}

fn check_len(plane: &'static str, buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() < expected {
        return Err(YuvError::PlaneSizeMismatch {
            plane,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

fn raster<F>(y: &[u8], u: &[u8], v: &[u8], geometry: &FrameGeometry, out: &mut [u8], convert: F)
where
    F: Fn(u8, u8, u8) -> [u8; 3],
{
    let width = geometry.width();
    let (h_sub, v_sub) = geometry.chroma().subsampling();
    let chroma_width = geometry.chroma_width();
    let chroma_height = geometry.chroma_height();
    let chroma_size = geometry.chroma_size();
    // Mono, or a subsampled plane too small to hold a single sample.
    let neutral = chroma_size == 0;

    let rows = y.chunks_exact(width).zip(out.chunks_exact_mut(width * 3));
    for (row, (y_row, out_row)) in rows.take(geometry.height()).enumerate() {
        let pixels = out_row.chunks_exact_mut(3).zip(y_row);
        if neutral {
            for (pixel, &luma) in pixels {
                pixel.copy_from_slice(&convert(luma, 128, 128));
            }
            continue;
        }

        let chroma_row = chroma_width * (row / v_sub);
        for (col, (pixel, &luma)) in pixels.enumerate() {
            let mut p = chroma_row + col / h_sub;
            if p >= chroma_size {
                // Trailing luma row of an odd height: stay on the last chroma row.
                p = (chroma_width * (chroma_height - 1) + col / h_sub).min(chroma_size - 1);
            }
            pixel.copy_from_slice(&convert(luma, u[p], v[p]));
        }
    }
}
