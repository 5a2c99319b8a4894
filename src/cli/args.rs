use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct FractalRendererArgs {
    #[command(subcommand)]
    pub command: Option<CommandsEnum>,
}

#[derive(Debug, Subcommand)]
pub enum CommandsEnum {
    /// Render the fractal described by a JSON parameter file.
    Render(ParameterFilePath),
    /// Escape-time Mandelbrot set over [-2, 2] x [-2, 2].
    Mandelbrot(OutputOptions),
    /// Newton basins of z^n - 1, or of z^4 - 1 when no degree is given.
    Unity(UnityArgs),
    /// Newton basins of an integer polynomial.
    Newton(NewtonArgs),
}

#[derive(Debug, Args)]
pub struct ParameterFilePath {
    pub params_path: String,

    #[clap(long, short)]
    pub date_time_out: bool,
}

#[derive(Debug, Args, Default)]
pub struct OutputOptions {
    /// Write into a date-time stamped sub-directory.
    #[clap(long, short)]
    pub date_time_out: bool,
}

#[derive(Debug, Args)]
pub struct UnityArgs {
    pub degree: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Debug, Args)]
pub struct NewtonArgs {
    /// Space-separated coefficients "a0 a1 ... an" of a0 + a1*z + ... + an*z^n,
    /// for example "-1 0 0 0 0 1" or "2 -2 0 1".
    #[arg(allow_hyphen_values = true)]
    pub coefs: String,

    #[command(flatten)]
    pub output: OutputOptions,
}
