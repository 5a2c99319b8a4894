use num::complex::Complex64;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{
    color_map::{Color, BACKGROUND_COLOR},
    error::FractalError,
};

/**
 * Fully specifies the image resolution and the rectangle of the complex plane
 * that it covers. Pixel `(0, 0)` sits at `(real_range[0], imag_range[0])`, and
 * the far edges `real_range[1]` and `imag_range[1]` lie one pixel beyond the
 * last column and row.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageSpecification {
    pub resolution: nalgebra::Vector2<u32>,
    pub real_range: [f64; 2],
    pub imag_range: [f64; 2],
}

impl Default for ImageSpecification {
    fn default() -> Self {
        ImageSpecification {
            resolution: nalgebra::Vector2::new(1024, 1024),
            real_range: [-2.0, 2.0],
            imag_range: [-2.0, 2.0],
        }
    }
}

impl ImageSpecification {
    pub fn new(width: u32, height: u32, real_range: [f64; 2], imag_range: [f64; 2]) -> Self {
        ImageSpecification {
            resolution: nalgebra::Vector2::new(width, height),
            real_range,
            imag_range,
        }
    }

    pub fn width(&self) -> u32 {
        self.resolution[0]
    }

    pub fn height(&self) -> u32 {
        self.resolution[1]
    }

    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    /// The encoders downstream cannot write an image with no pixels.
    pub fn validate(&self) -> Result<(), FractalError> {
        if self.width() == 0 || self.height() == 0 {
            return Err(FractalError::EmptyImage);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
/**
 * Used to map from image space into the complex plane along one axis.
 */
pub struct LinearPixelMap {
    offset: f64,
    slope: f64,
}

impl LinearPixelMap {
    /**
     * @param n: number of pixels spanned by [x0,x1)
     * @param x0: output of the map at 0
     * @param x1: output of the map at n
     */
    pub fn new(n: u32, x0: f64, x1: f64) -> LinearPixelMap {
        more_asserts::assert_gt!(n, 0);
        LinearPixelMap {
            offset: x0,
            slope: (x1 - x0) / (n as f64),
        }
    }

    // Map from pixel (integer) to point (float)
    pub fn map(&self, index: u32) -> f64 {
        self.offset + self.slope * (index as f64)
    }
}

#[derive(Clone, Debug)]
pub struct PixelMapper {
    real: LinearPixelMap,
    imag: LinearPixelMap,
}

impl PixelMapper {
    pub fn new(image_specification: &ImageSpecification) -> PixelMapper {
        PixelMapper {
            real: LinearPixelMap::new(
                image_specification.width(),
                image_specification.real_range[0],
                image_specification.real_range[1],
            ),
            imag: LinearPixelMap::new(
                image_specification.height(),
                image_specification.imag_range[0],
                image_specification.imag_range[1],
            ),
        }
    }

    pub fn map(&self, pixel: (u32, u32)) -> Complex64 {
        Complex64::new(self.real.map(pixel.0), self.imag.map(pixel.1))
    }
}

/**
 * Order in which a sequential render visits the pixels. Only renders that carry
 * state from one pixel to the next (the root registry of the polynomial Newton
 * fractal) can observe the difference.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Rows top to bottom, each row left to right.
    #[default]
    RowMajor,
    /// The exact reverse of `RowMajor`.
    ReversedRowMajor,
}

impl ScanOrder {
    pub fn pixels(self, width: u32, height: u32) -> Box<dyn Iterator<Item = (u32, u32)>> {
        let forward = (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)));
        match self {
            ScanOrder::RowMajor => Box::new(forward),
            ScanOrder::ReversedRowMajor => Box::new(
                (0..height)
                    .rev()
                    .flat_map(move |y| (0..width).rev().map(move |x| (x, y))),
            ),
        }
    }
}

/**
 * Row-major buffer of pixel values, indexed `[y][x]`.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid<T = Color> {
    rows: Vec<Vec<T>>,
    width: u32,
    height: u32,
}

impl<T: Clone> PixelGrid<T> {
    pub fn new(value: T, resolution: &nalgebra::Vector2<u32>) -> PixelGrid<T> {
        PixelGrid {
            rows: vec![vec![value; resolution[0] as usize]; resolution[1] as usize],
            width: resolution[0],
            height: resolution[1],
        }
    }
}

impl<T> PixelGrid<T> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> &T {
        &self.rows[y as usize][x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        self.rows[y as usize][x as usize] = value;
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().flatten()
    }

    /// Apply `mapping` to every cell, in parallel over rows.
    pub fn par_map<U, F>(&self, mapping: F) -> PixelGrid<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync,
    {
        use rayon::iter::IntoParallelRefIterator;
        PixelGrid {
            rows: self
                .rows
                .par_iter()
                .map(|row| row.iter().map(&mapping).collect())
                .collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl PixelGrid<Color> {
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| *self.get(x, y))
    }

    /// Raw RGBA bytes in row-major order.
    pub fn as_raw_bytes(&self) -> Vec<u8> {
        self.iter().flat_map(|pixel| pixel.0).collect()
    }
}

/**
 * Visit every pixel exactly once in `scan_order`, handing its complex coordinate
 * to `pixel_renderer`. The renderer may carry state between calls, so this is
 * strictly sequential.
 */
pub fn generate_image_sequential<T, F>(
    spec: &ImageSpecification,
    scan_order: ScanOrder,
    initial_value: T,
    mut pixel_renderer: F,
) -> PixelGrid<T>
where
    T: Clone,
    F: FnMut(Complex64) -> T,
{
    let mut grid = PixelGrid::new(initial_value, &spec.resolution);
    if spec.pixel_count() == 0 {
        return grid;
    }
    let pixel_mapper = PixelMapper::new(spec);
    for pixel in scan_order.pixels(spec.width(), spec.height()) {
        let value = pixel_renderer(pixel_mapper.map(pixel));
        grid.set(pixel.0, pixel.1, value);
    }
    grid
}

/**
 * Parallel version of the above function, for pixel renderers that only read
 * shared state. Work is split across rows.
 */
pub fn generate_image_parallel<T, F>(
    spec: &ImageSpecification,
    initial_value: T,
    pixel_renderer: F,
) -> PixelGrid<T>
where
    T: Clone + Send + Sync,
    F: Fn(Complex64) -> T + Sync,
{
    let mut grid = PixelGrid::new(initial_value, &spec.resolution);
    if spec.pixel_count() == 0 {
        return grid;
    }
    let pixel_mapper = PixelMapper::new(spec);
    grid.rows.par_iter_mut().enumerate().for_each(|(y, row)| {
        row.iter_mut().enumerate().for_each(|(x, elem)| {
            *elem = pixel_renderer(pixel_mapper.map((x as u32, y as u32)));
        });
    });
    grid
}

pub fn background_grid(spec: &ImageSpecification) -> PixelGrid<Color> {
    PixelGrid::new(BACKGROUND_COLOR, &spec.resolution)
}

/// Encode the grid as a PNG (format deduced from the file extension).
pub fn write_image_to_file(grid: &PixelGrid<Color>, filename: &Path) -> Result<(), FractalError> {
    grid.to_image().save(filename)?;
    log::info!("Wrote image file to: {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_pixel_map_domain_bounds() {
        let n = 7;
        let x0 = 1.23;
        let x1 = 56.2;

        let pixel_map = LinearPixelMap::new(n, x0, x1);

        let tol = 1e-9;
        assert_relative_eq!(pixel_map.map(0), x0, epsilon = tol);
        assert_relative_eq!(pixel_map.map(n), x1, epsilon = tol);
    }

    #[test]
    fn test_linear_pixel_map_neg() {
        let pixel_map = LinearPixelMap::new(4, 1.0, -1.0);
        let tol = 1e-12;
        assert_relative_eq!(pixel_map.map(1), 0.5, epsilon = tol);
        assert_relative_eq!(pixel_map.map(2), 0.0, epsilon = tol);
        assert_relative_eq!(pixel_map.map(3), -0.5, epsilon = tol);
    }

    #[test]
    fn test_linear_pixel_map_matches_lin_space() {
        let n = 11;
        let pixel_map = LinearPixelMap::new(n, -2.0, 2.0);
        for (index, expected) in iter_num_tools::lin_space(-2.0..2.0, n as usize).enumerate() {
            assert_relative_eq!(pixel_map.map(index as u32), expected, epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn test_linear_pixel_map_empty() {
        LinearPixelMap::new(0, 0.0, 1.0);
    }

    #[test]
    fn test_pixel_mapper_default_domain() {
        let spec = ImageSpecification::new(8, 4, [-2.0, 2.0], [-2.0, 2.0]);
        let mapper = PixelMapper::new(&spec);
        assert_eq!(mapper.map((0, 0)), Complex64::new(-2.0, -2.0));
        assert_eq!(mapper.map((4, 2)), Complex64::new(0.0, 0.0));
        assert_eq!(mapper.map((7, 3)), Complex64::new(1.5, 1.0));
    }

    #[test]
    fn test_scan_order_visits_every_pixel_once() {
        let forward: Vec<_> = ScanOrder::RowMajor.pixels(3, 2).collect();
        assert_eq!(forward, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);

        let mut reversed: Vec<_> = ScanOrder::ReversedRowMajor.pixels(3, 2).collect();
        reversed.reverse();
        assert_eq!(reversed, forward);

        assert_eq!(ScanOrder::RowMajor.pixels(0, 5).count(), 0);
    }

    #[test]
    fn test_sequential_render_follows_scan_order() {
        let spec = ImageSpecification::new(4, 3, [0.0, 4.0], [0.0, 3.0]);
        for order in [ScanOrder::RowMajor, ScanOrder::ReversedRowMajor] {
            let mut visited = Vec::new();
            let grid = generate_image_sequential(&spec, order, 0usize, |z| {
                visited.push(z);
                visited.len()
            });
            let expected: Vec<_> = order.pixels(4, 3).collect();
            for (count, (x, y)) in expected.iter().enumerate() {
                assert_eq!(*grid.get(*x, *y), count + 1);
                assert_eq!(visited[count], Complex64::new(*x as f64, *y as f64));
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let spec = ImageSpecification::new(13, 7, [-1.0, 3.0], [0.5, -0.5]);
        let renderer = |z: Complex64| (z.re * 1000.0) as i64 + (z.im * 10.0) as i64;
        let sequential = generate_image_sequential(&spec, ScanOrder::RowMajor, 0, renderer);
        let parallel = generate_image_parallel(&spec, 0, renderer);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_pixel_grid_to_image() {
        let spec = ImageSpecification::new(2, 3, [0.0, 1.0], [0.0, 1.0]);
        let mut grid = background_grid(&spec);
        grid.set(1, 2, image::Rgba([10, 20, 30, 255]));
        let image = grid.to_image();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(*image.get_pixel(1, 2), image::Rgba([10, 20, 30, 255]));
        assert_eq!(*image.get_pixel(0, 0), BACKGROUND_COLOR);
        assert_eq!(grid.as_raw_bytes().len(), 2 * 3 * 4);
    }

    #[test]
    fn test_empty_specification_is_rejected() {
        let spec = ImageSpecification::new(0, 3, [0.0, 1.0], [0.0, 1.0]);
        assert!(matches!(spec.validate(), Err(FractalError::EmptyImage)));
        assert!(ImageSpecification::default().validate().is_ok());
        assert_eq!(
            generate_image_parallel(&spec, 0u8, |_| 1u8).iter().count(),
            0
        );
    }
}
