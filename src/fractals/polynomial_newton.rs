use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::{
    color_map::{Color, Palette, BACKGROUND_COLOR},
    error::FractalError,
    image_utils::{
        generate_image_parallel, generate_image_sequential, ImageSpecification, PixelGrid,
        ScanOrder,
    },
};

use super::{
    newtons_method_core::{newton_raphson_step, NewtonConvergenceParams, DEFAULT_TOLERANCE},
    polynomial::{DifferentiablePolynomial, Polynomial},
    root_registry::RootRegistry,
};

pub fn default_polynomial_convergence() -> NewtonConvergenceParams {
    NewtonConvergenceParams {
        max_iter_count: 200,
        root_tolerance: DEFAULT_TOLERANCE,
        step_tolerance: DEFAULT_TOLERANCE,
    }
}

/**
 * How the roots of a polynomial Newton fractal are numbered, which decides the
 * palette entry of each basin.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootOrdering {
    /// Roots are numbered in the order the scan first converges onto them. The
    /// render is sequential, and a different scan order may recolor the basins.
    #[default]
    Discovery,
    /// Every pixel is iterated first (in parallel), the converged points are
    /// deduplicated and numbered by angle, and only then are pixels colored.
    /// The result does not depend on the scan order.
    Canonical,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PolynomialNewtonParams {
    #[serde(default)]
    pub image_specification: ImageSpecification,
    pub coefficients: Polynomial,
    #[serde(default = "default_polynomial_convergence")]
    pub convergence_params: NewtonConvergenceParams,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub scan_order: ScanOrder,
    #[serde(default)]
    pub root_ordering: RootOrdering,
}

/// Where a Newton iteration stopped moving, and how many steps preceded that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConvergence {
    pub point: Complex64,
    pub iter_count: u32,
}

/**
 * Newton basins of an arbitrary integer polynomial. Unlike the fixed-root
 * fractals, the roots are not known up front: they are collected into a
 * `RootRegistry` as pixels converge. The registry lives in a
 * `PolynomialNewtonPass`, one per rendered image.
 */
#[derive(Debug, Clone)]
pub struct PolynomialNewton {
    function: DifferentiablePolynomial,
    pub convergence_params: NewtonConvergenceParams,
    pub palette: Palette,
    pub scan_order: ScanOrder,
    pub root_ordering: RootOrdering,
}

impl PolynomialNewton {
    pub fn new(
        polynomial: Polynomial,
        convergence_params: NewtonConvergenceParams,
        palette: Palette,
    ) -> Result<PolynomialNewton, FractalError> {
        Ok(PolynomialNewton {
            function: DifferentiablePolynomial::new(polynomial)?,
            convergence_params,
            palette,
            scan_order: ScanOrder::default(),
            root_ordering: RootOrdering::default(),
        })
    }

    pub fn from_params(params: &PolynomialNewtonParams) -> Result<PolynomialNewton, FractalError> {
        let mut fractal = PolynomialNewton::new(
            params.coefficients.clone(),
            params.convergence_params,
            params.palette.clone(),
        )?;
        fractal.scan_order = params.scan_order;
        fractal.root_ordering = params.root_ordering;
        Ok(fractal)
    }

    pub fn with_scan_order(mut self, scan_order: ScanOrder) -> PolynomialNewton {
        self.scan_order = scan_order;
        self
    }

    pub fn with_root_ordering(mut self, root_ordering: RootOrdering) -> PolynomialNewton {
        self.root_ordering = root_ordering;
        self
    }

    pub fn polynomial(&self) -> &Polynomial {
        self.function.polynomial()
    }

    /**
     * Iterate `z <- z - P(z)/P'(z)` until a step shorter than `step_tolerance`.
     * A zero derivative, or any non-finite quotient, ends the iteration without
     * convergence. This only reads `self`, so it is safe to call from many threads.
     */
    pub fn converge(&self, mut z: Complex64) -> Option<StepConvergence> {
        for iter_count in 0..self.convergence_params.max_iter_count {
            let next = newton_raphson_step(z, &self.function)?;
            let step = (next - z).norm();
            z = next;
            if step < self.convergence_params.step_tolerance {
                return Some(StepConvergence {
                    point: z,
                    iter_count,
                });
            }
        }
        None
    }

    /// Start coloring a new image, with an empty registry.
    pub fn begin_pass(&self) -> PolynomialNewtonPass<'_> {
        PolynomialNewtonPass {
            fractal: self,
            registry: RootRegistry::new(),
        }
    }

    /// Render one image, returning it along with the roots found while rendering.
    pub fn render(&self, spec: &ImageSpecification) -> (PixelGrid<Color>, RootRegistry) {
        let (pixels, registry) = match self.root_ordering {
            RootOrdering::Discovery => self.render_in_discovery_order(spec, self.scan_order),
            RootOrdering::Canonical => self.render_in_canonical_order(spec),
        };
        if registry.len() > self.palette.len() {
            log::warn!(
                "{} roots discovered but the palette has {} colors; basins will share colors",
                registry.len(),
                self.palette.len()
            );
        }
        (pixels, registry)
    }

    pub fn render_in_discovery_order(
        &self,
        spec: &ImageSpecification,
        scan_order: ScanOrder,
    ) -> (PixelGrid<Color>, RootRegistry) {
        let mut pass = self.begin_pass();
        let pixels =
            generate_image_sequential(spec, scan_order, BACKGROUND_COLOR, |z| pass.color(z));
        (pixels, pass.into_registry())
    }

    pub fn render_in_canonical_order(
        &self,
        spec: &ImageSpecification,
    ) -> (PixelGrid<Color>, RootRegistry) {
        let tolerance = self.convergence_params.root_tolerance;
        let convergence = generate_image_parallel(spec, None, |z| self.converge(z));

        let points: Vec<Complex64> = convergence.iter().flatten().map(|c| c.point).collect();
        let registry = RootRegistry::canonical_from_points(&points, tolerance);

        let pixels = convergence.par_map(|maybe_convergence| {
            maybe_convergence
                .and_then(|c| {
                    registry
                        .find(c.point, tolerance)
                        .map(|index| self.palette.color_for(index, c.iter_count))
                })
                .unwrap_or(BACKGROUND_COLOR)
        });
        (pixels, registry)
    }
}

/**
 * Colors the pixels of a single image. Every call may append to the registry,
 * so the color of a pixel depends on which pixels were colored before it.
 */
pub struct PolynomialNewtonPass<'a> {
    fractal: &'a PolynomialNewton,
    registry: RootRegistry,
}

impl<'a> PolynomialNewtonPass<'a> {
    pub fn color(&mut self, point: Complex64) -> Color {
        match self.fractal.converge(point) {
            Some(convergence) => {
                let root_index = self.registry.find_or_insert(
                    convergence.point,
                    self.fractal.convergence_params.root_tolerance,
                );
                self.fractal
                    .palette
                    .color_for(root_index, convergence.iter_count)
            }
            None => BACKGROUND_COLOR,
        }
    }

    pub fn registry(&self) -> &RootRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> RootRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(coefficients: Vec<i64>) -> PolynomialNewton {
        PolynomialNewton::new(
            Polynomial::new(coefficients).unwrap(),
            default_polynomial_convergence(),
            Palette::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_degree_zero_is_rejected() {
        let result = PolynomialNewton::new(
            Polynomial::new(vec![4]).unwrap(),
            default_polynomial_convergence(),
            Palette::default(),
        );
        assert!(matches!(result, Err(FractalError::DegreeZeroPolynomial(_))));
    }

    #[test]
    fn test_converges_to_cube_root() {
        // z^3 - 8 has a real root at 2.
        let fractal = build(vec![-8, 0, 0, 1]);
        let convergence = fractal.converge(Complex64::new(2.5, 0.0)).unwrap();
        more_asserts::assert_lt!((convergence.point - Complex64::new(2.0, 0.0)).norm(), 1e-4);
    }

    #[test]
    fn test_registry_assigns_indices_in_visit_order() {
        let fractal = build(vec![-1, 0, 0, 0, 1]);
        let near_i = Complex64::new(0.05, 1.1);
        let near_one = Complex64::new(1.1, -0.05);

        let mut pass = fractal.begin_pass();
        let first = pass.color(near_i);
        let second = pass.color(near_one);
        assert_eq!(pass.registry().len(), 2);
        more_asserts::assert_lt!((pass.registry().roots()[0] - Complex64::new(0.0, 1.0)).norm(), 1e-3);

        let mut reversed_pass = fractal.begin_pass();
        let reversed_second = reversed_pass.color(near_one);
        let reversed_first = reversed_pass.color(near_i);

        // Same basins, swapped palette entries.
        let iter_one = fractal.converge(near_one).unwrap().iter_count;
        let iter_i = fractal.converge(near_i).unwrap().iter_count;
        assert_eq!(second, fractal.palette.color_for(1, iter_one));
        assert_eq!(reversed_second, fractal.palette.color_for(0, iter_one));
        assert_eq!(first, fractal.palette.color_for(0, iter_i));
        assert_eq!(reversed_first, fractal.palette.color_for(1, iter_i));
        assert_ne!(second, reversed_second);
    }

    #[test]
    fn test_revisiting_a_basin_reuses_its_index() {
        let fractal = build(vec![-1, 0, 0, 0, 1]);
        let mut pass = fractal.begin_pass();
        pass.color(Complex64::new(1.2, 0.1));
        pass.color(Complex64::new(0.1, -1.3));
        pass.color(Complex64::new(0.8, -0.1));
        pass.color(Complex64::new(-0.05, -0.9));
        assert_eq!(pass.registry().len(), 2);
    }

    #[test]
    fn test_zero_derivative_is_background() {
        // z^2 - 1 has P'(0) = 0.
        let fractal = build(vec![-1, 0, 1]);
        assert_eq!(fractal.converge(Complex64::new(0.0, 0.0)), None);

        let mut pass = fractal.begin_pass();
        assert_eq!(pass.color(Complex64::new(0.0, 0.0)), BACKGROUND_COLOR);
        assert!(pass.registry().is_empty());
    }

    #[test]
    fn test_vanishing_derivative_everywhere_is_background() {
        // [3, 0] is constant in value; its derivative is identically zero.
        let fractal = build(vec![3, 0]);
        let mut pass = fractal.begin_pass();
        assert_eq!(pass.color(Complex64::new(0.7, -0.2)), BACKGROUND_COLOR);
        assert!(pass.registry().is_empty());
    }

    #[test]
    fn test_each_pass_starts_empty() {
        let fractal = build(vec![2, -2, 0, 1]);
        let spec = ImageSpecification::new(16, 16, [-2.0, 2.0], [-2.0, 2.0]);
        let (_, first_registry) = fractal.render(&spec);
        assert!(!first_registry.is_empty());
        assert!(fractal.begin_pass().registry().is_empty());
        let (_, second_registry) = fractal.render(&spec);
        assert_eq!(first_registry, second_registry);
    }

    #[test]
    fn test_canonical_order_is_independent_of_scan_order() {
        let spec = ImageSpecification::new(24, 24, [-2.0, 2.0], [-2.0, 2.0]);
        let fractal = build(vec![-1, 0, 0, 0, 1]).with_root_ordering(RootOrdering::Canonical);
        let (forward, registry) = fractal.clone().with_scan_order(ScanOrder::RowMajor).render(&spec);
        let (reversed, _) = fractal
            .with_scan_order(ScanOrder::ReversedRowMajor)
            .render(&spec);
        assert_eq!(forward, reversed);

        let expected = [
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, -1.0),
        ];
        assert_eq!(registry.len(), 4);
        for (root, expected) in registry.roots().iter().zip(expected.iter()) {
            more_asserts::assert_lt!((root - expected).norm(), 1e-3);
        }
    }
}
