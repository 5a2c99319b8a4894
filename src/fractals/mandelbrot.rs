use image::Rgba;
use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::{
    color_map::{Color, BACKGROUND_COLOR},
    image_utils::ImageSpecification,
};

use super::common::PointColor;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConvergenceParams {
    pub escape_radius_squared: f64,
    pub max_iter_count: u32,
}

impl Default for ConvergenceParams {
    fn default() -> Self {
        ConvergenceParams {
            escape_radius_squared: 4.0,
            max_iter_count: 200,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MandelbrotParams {
    #[serde(default)]
    pub image_specification: ImageSpecification,
    #[serde(default)]
    pub convergence_params: ConvergenceParams,
}

/// Escape-time coloring of the Mandelbrot set: `v <- v^2 + c` from `v = 0`.
#[derive(Debug, Clone, Default)]
pub struct Mandelbrot {
    pub convergence_params: ConvergenceParams,
}

impl Mandelbrot {
    pub fn new(convergence_params: ConvergenceParams) -> Mandelbrot {
        Mandelbrot { convergence_params }
    }

    /// Number of updates after which `|v|` first exceeds the escape radius, or
    /// `None` if it stays bounded for `max_iter_count` updates.
    pub fn escape_count(&self, c: Complex64) -> Option<u32> {
        let mut v = Complex64::new(0.0, 0.0);
        for iter_count in 1..=self.convergence_params.max_iter_count {
            v = v * v + c;
            if v.norm_sqr() > self.convergence_params.escape_radius_squared {
                return Some(iter_count);
            }
        }
        None
    }

    /// Color of a point that escaped after `escape_count` updates. Channels are
    /// taken from the count modulo 256.
    pub fn escape_color(escape_count: u32) -> Color {
        let n = escape_count as u8;
        let clamped = n.min(16) as u16;
        Rgba([
            n / 2,
            n,
            (clamped * clamped).min(u8::MAX as u16) as u8,
            255,
        ])
    }
}

impl PointColor for Mandelbrot {
    fn color(&self, point: Complex64) -> Color {
        match self.escape_count(point) {
            Some(count) => Mandelbrot::escape_color(count),
            None => BACKGROUND_COLOR,
        }
    }
}
