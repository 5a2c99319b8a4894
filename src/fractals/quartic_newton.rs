use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::{
    color_map::{Color, Palette, BACKGROUND_COLOR},
    image_utils::ImageSpecification,
};

use super::{
    common::PointColor,
    newtons_method_core::{
        converge_to_known_root, ComplexFunctionWithSlope, NewtonConvergenceParams,
        RootConvergence, DEFAULT_TOLERANCE,
    },
};

/// The four roots of `z^4 - 1`, in palette order.
pub const QUARTIC_ROOTS: [Complex64; 4] = [
    Complex64::new(1.0, 0.0),
    Complex64::new(0.0, 1.0),
    Complex64::new(-1.0, 0.0),
    Complex64::new(0.0, -1.0),
];

pub fn default_quartic_convergence() -> NewtonConvergenceParams {
    NewtonConvergenceParams {
        max_iter_count: 80,
        root_tolerance: 0.002,
        step_tolerance: DEFAULT_TOLERANCE,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuarticNewtonParams {
    #[serde(default)]
    pub image_specification: ImageSpecification,
    #[serde(default = "default_quartic_convergence")]
    pub convergence_params: NewtonConvergenceParams,
    #[serde(default)]
    pub palette: Palette,
}

impl Default for QuarticNewtonParams {
    fn default() -> Self {
        QuarticNewtonParams {
            image_specification: ImageSpecification::default(),
            convergence_params: default_quartic_convergence(),
            palette: Palette::default(),
        }
    }
}

/// f(z) = z^4 - 1
pub struct QuarticFunction;

impl ComplexFunctionWithSlope for QuarticFunction {
    #[inline]
    fn value(&self, z: Complex64) -> Complex64 {
        let z_sqr = z * z;
        z_sqr * z_sqr - 1.0
    }

    #[inline]
    fn slope(&self, z: Complex64) -> Complex64 {
        4.0 * z * z * z
    }
}

/// Newton basins of `z^4 - 1`, with the roots known up front.
#[derive(Debug, Clone)]
pub struct QuarticNewton {
    pub convergence_params: NewtonConvergenceParams,
    pub palette: Palette,
}

impl Default for QuarticNewton {
    fn default() -> Self {
        QuarticNewton::new(default_quartic_convergence(), Palette::default())
    }
}

impl QuarticNewton {
    pub fn new(convergence_params: NewtonConvergenceParams, palette: Palette) -> QuarticNewton {
        QuarticNewton {
            convergence_params,
            palette,
        }
    }

    pub fn converge(&self, z: Complex64) -> Option<RootConvergence> {
        converge_to_known_root(z, &QuarticFunction, &QUARTIC_ROOTS, &self.convergence_params)
    }
}

impl PointColor for QuarticNewton {
    fn color(&self, point: Complex64) -> Color {
        match self.converge(point) {
            Some(convergence) => self
                .palette
                .color_for(convergence.root_index, convergence.iter_count),
            None => BACKGROUND_COLOR,
        }
    }
}
