use image::Rgba;
use serde::{Deserialize, Serialize};

/// Every color function in the crate emits opaque RGBA pixels.
pub type Color = Rgba<u8>;

/// Returned whenever an iteration exhausts its budget without escaping or converging.
pub const BACKGROUND_COLOR: Color = Rgba([0, 0, 0, 255]);

/**
 * A color in the JFIF YCbCr space. Palette entries are stored this way so that
 * the iteration-count attenuation only touches the luma channel and leaves the
 * hue of each root's basin intact.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct YCbCr {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

impl YCbCr {
    pub const fn new(y: u8, cb: u8, cr: u8) -> YCbCr {
        YCbCr { y, cb, cr }
    }

    /// JFIF conversion in 16.16 fixed point, saturating each channel to [0, 255].
    pub fn to_rgba(&self) -> Color {
        let luma = (self.y as i32) * 0x10101;
        let cb = (self.cb as i32) - 128;
        let cr = (self.cr as i32) - 128;

        let red = luma + 91881 * cr;
        let green = luma - 22554 * cb - 46802 * cr;
        let blue = luma + 116130 * cb;

        Rgba([
            clamp_fixed_point(red),
            clamp_fixed_point(green),
            clamp_fixed_point(blue),
            255,
        ])
    }
}

fn clamp_fixed_point(value: i32) -> u8 {
    if (value as u32) & 0xff00_0000 == 0 {
        (value >> 16) as u8
    } else {
        // negative values saturate to 0, overflowing values to 255
        (!(value >> 31)) as u8
    }
}

pub const DEFAULT_BASE_COLORS: [YCbCr; 5] = [
    YCbCr::new(109, 105, 203), // English Vermillion
    YCbCr::new(219, 139, 99),  // Powder blue
    YCbCr::new(197, 54, 182),  // Yellow Orange
    YCbCr::new(220, 15, 127),  // Arctic Lime
    YCbCr::new(70, 172, 102),  // Dark Cornflower Blue
];

pub const DEFAULT_LUMA_DECAY: f64 = 0.92;

/**
 * Maps a root index and an iteration count to a color. Root indices cycle
 * through the base colors, so index `base_colors.len()` reuses the first color:
 * a polynomial with six distinct roots will paint its first and last basins alike.
 * The luma of the selected color decays geometrically with the iteration count.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Palette {
    pub base_colors: Vec<YCbCr>,
    pub luma_decay: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            base_colors: DEFAULT_BASE_COLORS.to_vec(),
            luma_decay: DEFAULT_LUMA_DECAY,
        }
    }
}

impl Palette {
    pub fn len(&self) -> usize {
        self.base_colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base_colors.is_empty()
    }

    /// Attenuated palette entry, still in YCbCr.
    pub fn attenuated(&self, root_index: usize, iteration_count: u32) -> YCbCr {
        if self.base_colors.is_empty() {
            return YCbCr::new(0, 128, 128);
        }
        let mut color = self.base_colors[root_index % self.base_colors.len()];
        let scale = self.luma_decay.powi(iteration_count.min(i32::MAX as u32) as i32);
        color.y = ((color.y as f64) * scale) as u8;
        color
    }

    pub fn color_for(&self, root_index: usize, iteration_count: u32) -> Color {
        self.attenuated(root_index, iteration_count).to_rgba()
    }
}
