use num::complex::Complex64;
use ordered_float::OrderedFloat;
use std::f64::consts::TAU;

/**
 * Append-only list of the roots discovered while rendering one image. The
 * insertion index of a root is the palette index of its basin, so the order in
 * which pixels are visited decides which basin gets which color.
 *
 * A registry belongs to exactly one render: it is created empty when the
 * render starts and dropped (or snapshotted) when it ends.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootRegistry {
    roots: Vec<Complex64>,
}

impl RootRegistry {
    pub fn new() -> RootRegistry {
        RootRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[Complex64] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Complex64> {
        self.roots
    }

    /// Index of the first known root within `tolerance` of `candidate`.
    pub fn find(&self, candidate: Complex64, tolerance: f64) -> Option<usize> {
        self.roots
            .iter()
            .position(|root| (candidate - root).norm() < tolerance)
    }

    /// Index of the first known root within `tolerance` of `candidate`,
    /// appending `candidate` as a new root if none is close enough.
    pub fn find_or_insert(&mut self, candidate: Complex64, tolerance: f64) -> usize {
        if let Some(index) = self.find(candidate, tolerance) {
            return index;
        }
        self.roots.push(candidate);
        self.roots.len() - 1
    }

    /**
     * Build a registry whose content and order do not depend on the order in
     * which `points` were produced: the points are deduplicated in order of
     * (magnitude, angle), and the surviving roots are then sorted by their angle
     * on [0, 2π), breaking ties by magnitude. Angles within `tolerance` of 2π
     * are treated as zero so that a root on the positive real axis sorts first
     * regardless of the sign of its rounding error.
     */
    pub fn canonical_from_points(points: &[Complex64], tolerance: f64) -> RootRegistry {
        let mut sorted_points = points.to_vec();
        sorted_points.sort_by_key(|z| (OrderedFloat(z.norm()), OrderedFloat(z.arg())));

        let mut registry = RootRegistry::new();
        for point in sorted_points {
            registry.find_or_insert(point, tolerance);
        }

        let canonical_angle = |z: &Complex64| {
            let angle = z.arg().rem_euclid(TAU);
            if TAU - angle < tolerance {
                0.0
            } else {
                angle
            }
        };
        registry
            .roots
            .sort_by_key(|z| (OrderedFloat(canonical_angle(z)), OrderedFloat(z.norm())));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-4;

    #[test]
    fn test_find_or_insert_appends_new_roots() {
        let mut registry = RootRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.find_or_insert(Complex64::new(1.0, 0.0), TOL), 0);
        assert_eq!(registry.find_or_insert(Complex64::new(0.0, 1.0), TOL), 1);
        assert_eq!(registry.find_or_insert(Complex64::new(-1.0, 0.0), TOL), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_find_or_insert_matches_within_tolerance() {
        let mut registry = RootRegistry::new();
        registry.find_or_insert(Complex64::new(1.0, 0.0), TOL);
        registry.find_or_insert(Complex64::new(0.0, 1.0), TOL);

        assert_eq!(registry.find_or_insert(Complex64::new(1.0 + 5e-5, -5e-5), TOL), 0);
        assert_eq!(registry.find_or_insert(Complex64::new(3e-5, 1.0), TOL), 1);
        assert_eq!(registry.len(), 2);

        // Just outside the tolerance is a new root.
        assert_eq!(registry.find_or_insert(Complex64::new(1.0 + 2e-4, 0.0), TOL), 2);
        assert_eq!(registry.roots()[0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_first_match_wins() {
        // Two entries within tolerance of the query: the earlier one is returned.
        let mut registry = RootRegistry::new();
        registry.find_or_insert(Complex64::new(0.0, 0.0), TOL);
        registry.find_or_insert(Complex64::new(1.5e-4, 0.0), TOL);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find(Complex64::new(0.75e-4, 0.0), TOL), Some(0));
        assert_eq!(registry.find(Complex64::new(5.0, 0.0), TOL), None);
    }

    #[test]
    fn test_canonical_registry_ignores_point_order() {
        let roots = [
            Complex64::new(0.0, -1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(1.0, -1e-12),
            Complex64::new(0.0, 1.0),
        ];
        let mut points = Vec::new();
        for (k, root) in roots.iter().enumerate() {
            for j in 0..5 {
                let jitter = 1e-6 * ((j + k) as f64);
                points.push(root + Complex64::new(jitter, -jitter));
            }
        }

        let forward = RootRegistry::canonical_from_points(&points, TOL);
        points.reverse();
        let backward = RootRegistry::canonical_from_points(&points, TOL);

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 4);
        let expected = [
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, -1.0),
        ];
        for (root, expected) in forward.roots().iter().zip(expected.iter()) {
            more_asserts::assert_lt!((root - expected).norm(), 1e-5);
        }
    }
}
