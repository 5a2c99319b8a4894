use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::{
    color_map::{Color, Palette, BACKGROUND_COLOR},
    error::FractalError,
    image_utils::{generate_image_parallel, ImageSpecification, PixelGrid},
};

use super::{
    mandelbrot::{ConvergenceParams, Mandelbrot, MandelbrotParams},
    polynomial::Polynomial,
    polynomial_newton::{default_polynomial_convergence, PolynomialNewton, PolynomialNewtonParams},
    quartic_newton::{QuarticNewton, QuarticNewtonParams},
    roots_of_unity::{default_roots_of_unity_convergence, RootsOfUnityNewton, RootsOfUnityParams},
};

/**
 * A point-to-color function that only reads its own state, so the pixels of an
 * image can be colored in any order and from any number of threads.
 */
pub trait PointColor: Sync {
    fn color(&self, point: Complex64) -> Color;
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum FractalParams {
    Mandelbrot(Box<MandelbrotParams>),
    QuarticNewton(Box<QuarticNewtonParams>),
    RootsOfUnity(Box<RootsOfUnityParams>),
    PolynomialNewton(Box<PolynomialNewtonParams>),
}

impl FractalParams {
    pub fn image_specification(&self) -> &ImageSpecification {
        match self {
            FractalParams::Mandelbrot(inner) => &inner.image_specification,
            FractalParams::QuarticNewton(inner) => &inner.image_specification,
            FractalParams::RootsOfUnity(inner) => &inner.image_specification,
            FractalParams::PolynomialNewton(inner) => &inner.image_specification,
        }
    }

    /// Validates the parameters and builds the color function they describe.
    pub fn color_function(&self) -> Result<ColorFunction, FractalError> {
        self.image_specification().validate()?;
        Ok(match self {
            FractalParams::Mandelbrot(inner) => {
                ColorFunction::Mandelbrot(Mandelbrot::new(inner.convergence_params.clone()))
            }
            FractalParams::QuarticNewton(inner) => ColorFunction::QuarticNewton(
                QuarticNewton::new(inner.convergence_params, inner.palette.clone()),
            ),
            FractalParams::RootsOfUnity(inner) => ColorFunction::RootsOfUnity(
                RootsOfUnityNewton::new(
                    inner.degree,
                    inner.convergence_params,
                    inner.palette.clone(),
                )?,
            ),
            FractalParams::PolynomialNewton(inner) => {
                ColorFunction::PolynomialNewton(PolynomialNewton::from_params(inner)?)
            }
        })
    }
}

/**
 * One of the four point-to-color strategies. The first three are pure; the
 * polynomial Newton fractal numbers its roots as it discovers them and so has
 * to be rendered as a whole image at a time.
 */
#[derive(Debug, Clone)]
pub enum ColorFunction {
    Mandelbrot(Mandelbrot),
    QuarticNewton(QuarticNewton),
    RootsOfUnity(RootsOfUnityNewton),
    PolynomialNewton(PolynomialNewton),
}

/// Escape-time Mandelbrot set with the default 200-iteration budget.
pub fn mandelbrot() -> ColorFunction {
    ColorFunction::Mandelbrot(Mandelbrot::new(ConvergenceParams::default()))
}

/// Basins of `z^4 - 1`.
pub fn quartic_newton() -> ColorFunction {
    ColorFunction::QuarticNewton(QuarticNewton::default())
}

/// Basins of `z^n - 1`; `n` must be at least one.
pub fn roots_of_unity_newton(n: i64) -> Result<ColorFunction, FractalError> {
    Ok(ColorFunction::RootsOfUnity(RootsOfUnityNewton::new(
        n,
        default_roots_of_unity_convergence(),
        Palette::default(),
    )?))
}

/// Basins of `a0 + a1*z + ... + an*z^n`; at least two coefficients are required.
pub fn polynomial_newton(coefficients: &[i64]) -> Result<ColorFunction, FractalError> {
    Ok(ColorFunction::PolynomialNewton(PolynomialNewton::new(
        Polynomial::new(coefficients.to_vec())?,
        default_polynomial_convergence(),
        Palette::default(),
    )?))
}

/// A rendered image, plus the roots its render discovered (if it discovers any).
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub pixels: PixelGrid<Color>,
    pub discovered_roots: Vec<Complex64>,
}

fn render_pure<F: PointColor>(spec: &ImageSpecification, color_function: &F) -> RenderedImage {
    RenderedImage {
        pixels: generate_image_parallel(spec, BACKGROUND_COLOR, |z| color_function.color(z)),
        discovered_roots: Vec::new(),
    }
}

impl ColorFunction {
    /// Short name used for output directories and log messages.
    pub fn name(&self) -> String {
        match self {
            ColorFunction::Mandelbrot(_) => "mandelbrot".to_owned(),
            ColorFunction::QuarticNewton(_) => "quartic_newton".to_owned(),
            ColorFunction::RootsOfUnity(inner) => format!("unity_{}", inner.degree()),
            ColorFunction::PolynomialNewton(_) => "newton".to_owned(),
        }
    }

    pub fn render(&self, spec: &ImageSpecification) -> RenderedImage {
        log::debug!(
            "Rendering {} at {}x{}",
            self.name(),
            spec.width(),
            spec.height()
        );
        match self {
            ColorFunction::Mandelbrot(inner) => render_pure(spec, inner),
            ColorFunction::QuarticNewton(inner) => render_pure(spec, inner),
            ColorFunction::RootsOfUnity(inner) => render_pure(spec, inner),
            ColorFunction::PolynomialNewton(inner) => {
                let (pixels, registry) = inner.render(spec);
                log::info!(
                    "Discovered {} roots of {}: {:?}",
                    registry.len(),
                    inner.polynomial(),
                    registry.roots()
                );
                RenderedImage {
                    pixels,
                    discovered_roots: registry.into_roots(),
                }
            }
        }
    }
}

/// Render `color_function` over the pixel grid described by `spec`.
pub fn render(spec: &ImageSpecification, color_function: &ColorFunction) -> PixelGrid<Color> {
    color_function.render(spec).pixels
}
