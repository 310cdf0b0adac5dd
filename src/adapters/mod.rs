#[cfg(feature = "cli")]
pub mod cli;
pub mod teos10;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, parse_inputs};
    use crate::speciation::system::speciate;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (inp, ass) = parse_inputs(&args)?;

    let out = speciate(&inp, &ass)?;

    crate::adapters::cli::print_output(&out, &args)?;

    Ok(())
}
