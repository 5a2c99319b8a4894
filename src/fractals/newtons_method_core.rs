// Common library funcions for fractals that are backed by Newton's method,
// such as the roots of unity fractal.

#[cfg(test)]
use nalgebra::Matrix2;
use num::complex::Complex64;
use serde::{Deserialize, Serialize};

/**
 * Iteration budget and the two convergence tolerances of the Newton fractals.
 * `root_tolerance` is the distance at which a point counts as sitting on a
 * root; `step_tolerance` is the step length below which an iteration counts as
 * having stopped moving. Fractals with precomputed roots only use the former.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NewtonConvergenceParams {
    pub max_iter_count: u32,
    pub root_tolerance: f64,
    pub step_tolerance: f64,
}

pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Result of a Newton iteration that landed on a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootConvergence {
    pub root_index: usize,
    /// Steps taken before the one that converged.
    pub iter_count: u32,
}

/// A complex-valued function with its derivative (slope).
pub trait ComplexFunctionWithSlope {
    /// f(z)
    fn value(&self, z: Complex64) -> Complex64;

    /// f'(z)
    fn slope(&self, z: Complex64) -> Complex64;
}

/// Perform one Newton–Raphson step:
/// y = z - f(z) / f'(z)
///
/// Returns `None` when the step is undefined: a zero slope, or a quotient that
/// has overflowed or turned into NaN. Callers treat that as "this point does
/// not converge" rather than letting the non-finite value keep iterating.
#[inline]
pub fn newton_raphson_step<F>(z: Complex64, function: &F) -> Option<Complex64>
where
    F: ComplexFunctionWithSlope + ?Sized,
{
    let slope = function.slope(z);
    if slope.re == 0.0 && slope.im == 0.0 {
        return None;
    }
    let q = function.value(z) / slope;
    if !q.is_finite() {
        return None;
    }
    Some(z - q)
}

/**
 * Iterate Newton's method from `z` until it lands within `root_tolerance` of one
 * of the known `roots`. The roots are checked in order after every step.
 */
pub fn converge_to_known_root<F>(
    mut z: Complex64,
    function: &F,
    roots: &[Complex64],
    params: &NewtonConvergenceParams,
) -> Option<RootConvergence>
where
    F: ComplexFunctionWithSlope + ?Sized,
{
    for iter_count in 0..params.max_iter_count {
        z = newton_raphson_step(z, function)?;
        if let Some(root_index) = roots
            .iter()
            .position(|root| (z - root).norm() < params.root_tolerance)
        {
            return Some(RootConvergence {
                root_index,
                iter_count,
            });
        }
    }
    None
}

/// Real (left-regular) representation of a complex scalar as a 2×2 real matrix.
///
/// Maps s = a + i b to the real-linear map x ↦ s·x on C ≅ R^2:
///     [ a  -b ]
///     [ b   a ]
#[inline]
#[cfg(test)]
fn left_multiply_matrix(s: Complex64) -> Matrix2<f64> {
    Matrix2::new(s.re, -s.im, s.im, s.re)
}

#[cfg(test)]
pub fn assert_consistent_value_and_slope<F: ComplexFunctionWithSlope>(
    function: &F,
    z0: Complex64,
    abs_tol: f64,
    rel_tol: f64,
) {
    // Scaled step size for the finite difference operation
    let scale = (z0.norm() + 1.0).sqrt();
    let h = 1e-7 / scale;

    // central finite differences in x and y
    let dfdx = {
        let f_xp = function.value(z0 + Complex64::new(h, 0.0));
        let f_xm = function.value(z0 - Complex64::new(h, 0.0));
        (f_xp - f_xm) * (0.5 / h)
    };
    let dfdy = {
        let f_yp = function.value(z0 + Complex64::new(0.0, h));
        let f_ym = function.value(z0 - Complex64::new(0.0, h));
        (f_yp - f_ym) * (0.5 / h)
    };

    // J_num = [[∂u/∂x, ∂u/∂y],
    //          [∂v/∂x, ∂v/∂y]]
    let finite_difference_slope = Matrix2::new(dfdx.re, dfdy.re, dfdx.im, dfdy.im);

    // J_ana = φ(f'(z0))
    let analytic_slope = left_multiply_matrix(function.slope(z0));

    // nalgebra's `.norm()` on matrices is the Frobenius norm (Euclidean of all entries)
    let error_norm = (finite_difference_slope - analytic_slope).norm();
    let reference_scale = analytic_slope.norm().max(1.0);

    assert!(
        error_norm <= abs_tol + rel_tol * reference_scale,
        "Derivative check failed at z0={z0:?}\n\
         numerical J = {finite_difference_slope}\n\
         analytic  J = {analytic_slope}\n\
         err_frob   = {error_norm:e},  bound = {}",
        abs_tol + rel_tol * reference_scale
    );
}

/// Sample points used by the derivative checks of every Newton fractal.
#[cfg(test)]
pub const SLOPE_CHECK_POINTS: [Complex64; 4] = [
    Complex64::new(0.2, 0.8),
    Complex64::new(-1.3, 0.4),
    Complex64::new(2.0, -1.0),
    Complex64::new(0.05, -0.6),
];
