//! Fixed-point lookup tables for the BT.601 limited-range YUV to RGB
//! transform, 16 bits of fractional precision.

/// Fractional bits of the fixed-point coefficients.
pub const YUV_FIX: u32 = 16;
/// Rounding bias added before shifting out the fractional bits.
pub const YUV_HALF: i32 = 1 << (YUV_FIX - 1);
/// Lowest luma + chroma offset the clip table accepts.
pub const YUV_RANGE_MIN: i32 = -227;
/// One past the highest luma + chroma offset the clip table accepts.
pub const YUV_RANGE_MAX: i32 = 256 + 226;
/// Number of entries in the clip table.
pub const CLIP_TABLE_LEN: usize = (YUV_RANGE_MAX - YUV_RANGE_MIN) as usize;

#[derive(Debug, Clone)]
pub(crate) struct Tables {
    pub v_to_r: [i32; 256],
    pub u_to_g: [i32; 256],
    pub v_to_g: [i32; 256],
    pub u_to_b: [i32; 256],
    pub clip: [u8; CLIP_TABLE_LEN],
}

impl Tables {
    pub fn new() -> Self {
        let mut v_to_r = [0; 256];
        let mut u_to_g = [0; 256];
        let mut v_to_g = [0; 256];
        let mut u_to_b = [0; 256];
        for i in 0..256 {
            let c = i as i32 - 128;
            v_to_r[i] = (89858 * c + YUV_HALF) >> YUV_FIX;
            // Left unshifted, summed with `v_to_g` before the final shift.
            u_to_g[i] = -22014 * c + YUV_HALF;
            v_to_g[i] = -45773 * c;
            u_to_b[i] = (113_618 * c + YUV_HALF) >> YUV_FIX;
        }

        let mut clip = [0; CLIP_TABLE_LEN];
        for (entry, i) in clip.iter_mut().zip(YUV_RANGE_MIN..YUV_RANGE_MAX) {
            let k = ((i - 16) * 76283 + YUV_HALF) >> YUV_FIX;
            *entry = k.clamp(0, 255) as u8;
        }

        Self {
            v_to_r,
            u_to_g,
            v_to_g,
            u_to_b,
            clip,
        }
    }

    #[inline(always)]
    pub fn clip(&self, value: i32) -> u8 {
        // In range for every byte input: y + offset lies in [-222, 475].
        self.clip[(value - YUV_RANGE_MIN) as usize]
    }
}
