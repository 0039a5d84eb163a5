use v_frame::{frame::Frame, plane::Plane};

use crate::FrameGeometry;

/// Y, U and V planes of one frame, as stored in the file.
///
/// `u` and `v` are empty for [`ChromaFormat::Mono400`].
///
/// [`ChromaFormat::Mono400`]: crate::ChromaFormat::Mono400
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffers {
    pub(crate) index: u64,
    pub(crate) geometry: FrameGeometry,
    pub(crate) y: Vec<u8>,
    pub(crate) u: Vec<u8>,
    pub(crate) v: Vec<u8>,
}

impl FrameBuffers {
    pub(crate) fn with_geometry(index: u64, geometry: FrameGeometry) -> Self {
        Self {
            index,
            geometry,
            y: vec![0; geometry.luma_size()],
            u: vec![0; geometry.chroma_size()],
            v: vec![0; geometry.chroma_size()],
        }
    }

    /// Index of the frame in its file.
    #[must_use]
    #[inline(always)]
    pub const fn index(&self) -> u64 {
        self.index
    }

    #[must_use]
    #[inline(always)]
    pub const fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    #[must_use]
    #[inline(always)]
    pub fn y(&self) -> &[u8] {
        &self.y
    }

    #[must_use]
    #[inline(always)]
    pub fn u(&self) -> &[u8] {
        &self.u
    }

    #[must_use]
    #[inline(always)]
    pub fn v(&self) -> &[u8] {
        &self.v
    }

    #[must_use]
    #[inline(always)]
    pub fn planes(&self) -> [&[u8]; 3] {
        [&self.y, &self.u, &self.v]
    }

    #[must_use]
    pub fn into_planes(self) -> [Vec<u8>; 3] {
        [self.y, self.u, self.v]
    }

    /// Copies the planes into a [`v_frame`] frame.
    ///
    /// Mono frames get full-resolution chroma planes filled with the neutral
    /// value 128, so the result always describes a displayable image.
    #[must_use]
    pub fn to_frame(&self) -> Frame<u8> {
        let geometry = &self.geometry;
        let (width, height) = (geometry.width(), geometry.height());

        let mut luma = Plane::new(width, height, 0, 0, 0, 0);
        copy_plane(&mut luma, &self.y, width);

        if geometry.chroma().is_mono() || geometry.chroma_size() == 0 {
            let mut u = Plane::new(width, height, 0, 0, 0, 0);
            let mut v = Plane::new(width, height, 0, 0, 0, 0);
            fill_plane(&mut u, width, 128);
            fill_plane(&mut v, width, 128);
            return Frame {
                planes: [luma, u, v],
            };
        }

        let (h_sub, v_sub) = geometry.chroma().subsampling();
        // Subsampling factors are 1 or 2, so the decimation shift is 0 or 1.
        let xdec = usize::from(h_sub == 2);
        let ydec = usize::from(v_sub == 2);
        let (chroma_width, chroma_height) = (geometry.chroma_width(), geometry.chroma_height());

        let mut u = Plane::new(chroma_width, chroma_height, xdec, ydec, 0, 0);
        let mut v = Plane::new(chroma_width, chroma_height, xdec, ydec, 0, 0);
        copy_plane(&mut u, &self.u, chroma_width);
        copy_plane(&mut v, &self.v, chroma_width);

        Frame {
            planes: [luma, u, v],
        }
    }
}

fn copy_plane(plane: &mut Plane<u8>, src: &[u8], width: usize) {
    let stride = plane.cfg.stride;
    let height = plane.cfg.height;
    let origin = plane.data_origin_mut();
    for (dst, src) in origin.chunks_mut(stride).zip(src.chunks_exact(width)).take(height) {
        dst[..width].copy_from_slice(src);
    }
}

fn fill_plane(plane: &mut Plane<u8>, width: usize, value: u8) {
    let stride = plane.cfg.stride;
    let height = plane.cfg.height;
    let origin = plane.data_origin_mut();
    for row in origin.chunks_mut(stride).take(height) {
        row[..width].fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChromaFormat, FrameConfig};

    fn frame(width: usize, height: usize, chroma: ChromaFormat) -> FrameBuffers {
        let geometry = FrameGeometry::new(FrameConfig {
            width,
            height,
            chroma,
        })
        .unwrap();
        let mut frame = FrameBuffers::with_geometry(3, geometry);
        for (i, val) in frame.y.iter_mut().enumerate() {
            *val = i as u8;
        }
        for (i, val) in frame.u.iter_mut().enumerate() {
            *val = 100 + i as u8;
        }
        for (i, val) in frame.v.iter_mut().enumerate() {
            *val = 200 - i as u8;
        }
        frame
    }

    fn plane_rows(plane: &Plane<u8>) -> Vec<Vec<u8>> {
        let width = plane.cfg.width;
        plane
            .data_origin()
            .chunks(plane.cfg.stride)
            .take(plane.cfg.height)
            .map(|row| row[..width].to_vec())
            .collect()
    }

    #[test]
    fn yuv420_to_frame() {
        let buffers = frame(8, 4, ChromaFormat::Yuv420);
        let out = buffers.to_frame();

        assert_eq!(out.planes[0].cfg.width, 8);
        assert_eq!(out.planes[0].cfg.height, 4);
        assert_eq!(out.planes[1].cfg.width, 4);
        assert_eq!(out.planes[1].cfg.height, 2);
        assert_eq!(out.planes[1].cfg.xdec, 1);
        assert_eq!(out.planes[1].cfg.ydec, 1);

        let luma: Vec<u8> = plane_rows(&out.planes[0]).concat();
        assert_eq!(luma, buffers.y());
        assert_eq!(plane_rows(&out.planes[1]).concat(), buffers.u());
        assert_eq!(plane_rows(&out.planes[2]).concat(), buffers.v());
    }

    #[test]
    fn yuv422_decimation() {
        let out = frame(8, 4, ChromaFormat::Yuv422).to_frame();
        assert_eq!((out.planes[1].cfg.xdec, out.planes[1].cfg.ydec), (0, 1));
        assert_eq!((out.planes[1].cfg.width, out.planes[1].cfg.height), (8, 2));

        let out = frame(8, 4, ChromaFormat::Yuv422v).to_frame();
        assert_eq!((out.planes[1].cfg.xdec, out.planes[1].cfg.ydec), (1, 0));
        assert_eq!((out.planes[1].cfg.width, out.planes[1].cfg.height), (4, 4));
    }

    #[test]
    fn mono_to_frame_has_neutral_chroma() {
        let buffers = frame(6, 2, ChromaFormat::Mono400);
        assert!(buffers.u().is_empty());
        assert!(buffers.v().is_empty());

        let out = buffers.to_frame();
        assert_eq!(plane_rows(&out.planes[0]).concat(), buffers.y());
        for plane in &out.planes[1..] {
            assert_eq!(plane.cfg.width, 6);
            assert_eq!(plane.cfg.height, 2);
            assert!(plane_rows(plane).concat().iter().all(|&s| s == 128));
        }
    }

    #[test]
    fn into_planes_keeps_order() {
        let buffers = frame(2, 2, ChromaFormat::Yuv444);
        let index = buffers.index();
        let [y, u, v] = buffers.into_planes();
        assert_eq!(index, 3);
        assert_eq!(y, vec![0, 1, 2, 3]);
        assert_eq!(u, vec![100, 101, 102, 103]);
        assert_eq!(v, vec![200, 199, 198, 197]);
    }
}
