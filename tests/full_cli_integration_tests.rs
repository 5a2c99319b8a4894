use plane_fractals::{
    cli::render::{build_file_prefix, render_fractal},
    fractals::common::FractalParams,
};

fn render_parameter_file(name: &str) -> (std::path::PathBuf, String) {
    let content = std::fs::read_to_string(format!("params/test/{}.json", name))
        .expect("failed to read parameter file");
    let params: FractalParams = serde_json::from_str(&content).expect("failed to parse");
    let file_prefix = build_file_prefix("integration_test", name, false).unwrap();
    render_fractal(&params, file_prefix.clone()).unwrap();
    (file_prefix.directory_path, file_prefix.file_base)
}

fn check_outputs(name: &str, width: u32, height: u32) {
    let (directory, base) = render_parameter_file(name);
    let image = image::open(directory.join(format!("{}.png", base)))
        .expect("failed to decode PNG")
        .to_rgba8();
    assert_eq!(image.dimensions(), (width, height));
    assert!(directory.join(format!("{}.json", base)).exists());
    assert!(directory.join(format!("{}_diagnostics.txt", base)).exists());
}

#[test]
fn test_tiny_mandelbrot_render() {
    check_outputs("tiny_mandelbrot", 20, 12);
}

#[test]
fn test_tiny_unity_render() {
    check_outputs("tiny_unity", 16, 16);
}

#[test]
fn test_tiny_newton_render_lists_roots() {
    check_outputs("tiny_newton", 24, 16);
    let diagnostics =
        std::fs::read_to_string("out/integration_test/tiny_newton/tiny_newton_diagnostics.txt")
            .unwrap();
    assert!(diagnostics.contains("Discovered roots"));

    let written =
        std::fs::read_to_string("out/integration_test/tiny_newton/tiny_newton.json").unwrap();
    let params: FractalParams = serde_json::from_str(&written).unwrap();
    assert_eq!(params.image_specification().width(), 24);
}
