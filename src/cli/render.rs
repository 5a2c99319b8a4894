use std::io::Write;

use crate::core::{
    error::FractalError,
    file_io::{
        build_output_path_with_date_time, maybe_date_time_string, serialize_to_json, FilePrefix,
    },
    image_utils::{write_image_to_file, ImageSpecification},
    stopwatch::Stopwatch,
};
use crate::fractals::{
    common::{FractalParams, RenderedImage},
    mandelbrot::MandelbrotParams,
    polynomial::Polynomial,
    polynomial_newton::{default_polynomial_convergence, PolynomialNewtonParams},
    quartic_newton::QuarticNewtonParams,
    roots_of_unity::{default_roots_of_unity_convergence, parse_degree, RootsOfUnityParams},
};

pub fn build_file_prefix(
    project: &str,
    base_name: &str,
    date_time_out: bool,
) -> Result<FilePrefix, FractalError> {
    Ok(FilePrefix {
        directory_path: build_output_path_with_date_time(
            project,
            base_name,
            &maybe_date_time_string(date_time_out),
        )?,
        file_base: base_name.to_owned(),
    })
}

pub fn mandelbrot_params() -> FractalParams {
    FractalParams::Mandelbrot(Box::<MandelbrotParams>::default())
}

/// Fixed quartic basins without a degree, otherwise the roots of unity of that degree.
pub fn unity_params(degree: Option<&str>) -> Result<FractalParams, FractalError> {
    match degree {
        None => Ok(FractalParams::QuarticNewton(
            Box::<QuarticNewtonParams>::default(),
        )),
        Some(text) => Ok(FractalParams::RootsOfUnity(Box::new(RootsOfUnityParams {
            image_specification: ImageSpecification::default(),
            degree: parse_degree(text)?,
            convergence_params: default_roots_of_unity_convergence(),
            palette: Default::default(),
        }))),
    }
}

pub fn newton_params(coefficients: &str) -> Result<FractalParams, FractalError> {
    let polynomial: Polynomial = coefficients.parse()?;
    Ok(FractalParams::PolynomialNewton(Box::new(
        PolynomialNewtonParams {
            image_specification: ImageSpecification::default(),
            coefficients: polynomial,
            convergence_params: default_polynomial_convergence(),
            palette: Default::default(),
            scan_order: Default::default(),
            root_ordering: Default::default(),
        },
    )))
}

/// File base name for a render that was requested without a parameter file.
pub fn default_base_name(params: &FractalParams) -> String {
    match params {
        FractalParams::Mandelbrot(_) => "mandelbrot".to_owned(),
        FractalParams::QuarticNewton(_) => "unity".to_owned(),
        FractalParams::RootsOfUnity(inner) => format!("unity_{}", inner.degree),
        FractalParams::PolynomialNewton(inner) => {
            let coefficients: Vec<String> = inner
                .coefficients
                .coefficients()
                .iter()
                .map(|a| a.to_string())
                .collect();
            format!("newton_{}", coefficients.join("_"))
        }
    }
}

/**
 * Render the fractal and write `<base>.png`, the parameters as `<base>.json`,
 * and `<base>_diagnostics.txt` with timing and the discovered roots.
 */
pub fn render_fractal(
    params: &FractalParams,
    file_prefix: FilePrefix,
) -> Result<RenderedImage, FractalError> {
    let mut stopwatch = Stopwatch::new("Render Stopwatch".to_owned());

    let color_function = params.color_function()?;
    serialize_to_json(file_prefix.with_suffix(".json"), params)?;
    stopwatch.record_split("basic setup".to_owned());

    let rendered = color_function.render(params.image_specification());
    stopwatch.record_split(format!("render {}", color_function.name()));

    write_image_to_file(&rendered.pixels, &file_prefix.with_suffix(".png"))?;
    stopwatch.record_split("write PNG".to_owned());

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;
    if !rendered.discovered_roots.is_empty() {
        writeln!(diagnostics_file, "Discovered roots (palette order):")?;
        for (index, root) in rendered.discovered_roots.iter().enumerate() {
            writeln!(diagnostics_file, "  {}: {}", index, root)?;
        }
    }
    log::info!(
        "Rendered {} in {:?}",
        color_function.name(),
        stopwatch.total_elapsed()
    );

    Ok(rendered)
}
