use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::{
    color_map::{Color, Palette, BACKGROUND_COLOR},
    error::FractalError,
    image_utils::ImageSpecification,
};

use super::{
    common::PointColor,
    newtons_method_core::{
        converge_to_known_root, ComplexFunctionWithSlope, NewtonConvergenceParams,
        RootConvergence, DEFAULT_TOLERANCE,
    },
};

pub fn default_roots_of_unity_convergence() -> NewtonConvergenceParams {
    NewtonConvergenceParams {
        max_iter_count: 120,
        root_tolerance: DEFAULT_TOLERANCE,
        step_tolerance: DEFAULT_TOLERANCE,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RootsOfUnityParams {
    #[serde(default)]
    pub image_specification: ImageSpecification,
    pub degree: i64,
    #[serde(default = "default_roots_of_unity_convergence")]
    pub convergence_params: NewtonConvergenceParams,
    #[serde(default)]
    pub palette: Palette,
}

/// Parse the degree of a roots of unity fractal from text, such as a path segment.
pub fn parse_degree(text: &str) -> Result<i64, FractalError> {
    let degree = text
        .trim()
        .parse::<i64>()
        .map_err(|_| FractalError::InvalidDegree(text.to_owned()))?;
    if degree < 1 {
        return Err(FractalError::NonPositiveDegree(degree));
    }
    Ok(degree)
}

/// f(z) = z^n - 1
#[derive(Debug, Clone)]
pub struct RootsOfUnityFunction {
    degree: u32,
}

impl ComplexFunctionWithSlope for RootsOfUnityFunction {
    #[inline]
    fn value(&self, z: Complex64) -> Complex64 {
        z.powu(self.degree - 1) * z - 1.0
    }

    #[inline]
    fn slope(&self, z: Complex64) -> Complex64 {
        z.powu(self.degree - 1) * (self.degree as f64)
    }
}

/**
 * Newton basins of `z^n - 1`. The `n` roots `exp(2πik/n)` are computed once
 * here and only read afterwards, so one instance can color pixels from any
 * number of threads.
 */
#[derive(Debug, Clone)]
pub struct RootsOfUnityNewton {
    function: RootsOfUnityFunction,
    roots: Vec<Complex64>,
    pub convergence_params: NewtonConvergenceParams,
    pub palette: Palette,
}

impl RootsOfUnityNewton {
    pub fn new(
        degree: i64,
        convergence_params: NewtonConvergenceParams,
        palette: Palette,
    ) -> Result<RootsOfUnityNewton, FractalError> {
        if degree < 1 {
            return Err(FractalError::NonPositiveDegree(degree));
        }
        let degree =
            u32::try_from(degree).map_err(|_| FractalError::InvalidDegree(degree.to_string()))?;
        let coef = degree as f64;
        let roots: Vec<Complex64> = (0..degree)
            .map(|k| Complex64::new(0.0, 2.0 * (k as f64) * PI / coef).exp())
            .collect();
        log::info!("{}th roots: {:?}", degree, roots);

        Ok(RootsOfUnityNewton {
            function: RootsOfUnityFunction { degree },
            roots,
            convergence_params,
            palette,
        })
    }

    pub fn degree(&self) -> u32 {
        self.function.degree
    }

    pub fn roots(&self) -> &[Complex64] {
        &self.roots
    }

    pub fn converge(&self, z: Complex64) -> Option<RootConvergence> {
        converge_to_known_root(z, &self.function, &self.roots, &self.convergence_params)
    }
}

impl PointColor for RootsOfUnityNewton {
    fn color(&self, point: Complex64) -> Color {
        match self.converge(point) {
            Some(convergence) => self
                .palette
                .color_for(convergence.root_index, convergence.iter_count),
            None => BACKGROUND_COLOR,
        }
    }
}
