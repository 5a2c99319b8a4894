use clap::Parser;
use plane_fractals::{
    cli::{
        args::{CommandsEnum, FractalRendererArgs},
        render::{
            build_file_prefix, default_base_name, mandelbrot_params, newton_params,
            render_fractal, unity_params,
        },
    },
    core::{error::FractalError, file_io::extract_base_name},
    fractals::common::FractalParams,
};

/// Renders a fractal requested directly on the command line, with no parameter file.
fn render_in_project(
    project: &str,
    params: FractalParams,
    date_time_out: bool,
) -> Result<(), FractalError> {
    let base_name = default_base_name(&params);
    render_fractal(&params, build_file_prefix(project, &base_name, date_time_out)?)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: FractalRendererArgs = FractalRendererArgs::parse();

    match &args.command {
        Some(CommandsEnum::Render(params)) => {
            let fractal_params: FractalParams =
                serde_json::from_str(&std::fs::read_to_string(&params.params_path)?)?;
            let file_prefix = build_file_prefix(
                "render",
                extract_base_name(&params.params_path),
                params.date_time_out,
            )?;
            render_fractal(&fractal_params, file_prefix)?;
        }

        Some(CommandsEnum::Mandelbrot(output)) => {
            render_in_project("mandelbrot", mandelbrot_params(), output.date_time_out)?;
        }

        Some(CommandsEnum::Unity(unity)) => {
            let params = unity_params(unity.degree.as_deref())?;
            render_in_project("unity", params, unity.output.date_time_out)?;
        }

        Some(CommandsEnum::Newton(newton)) => {
            let params = newton_params(&newton.coefs)?;
            render_in_project("newton", params, newton.output.date_time_out)?;
        }

        None => {
            log::warn!("No command specified; run with --help to list them.");
        }
    }
    Ok(())
}
