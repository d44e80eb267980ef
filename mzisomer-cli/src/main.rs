use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mzisomer_cli::{MZIsomerError, MZIsomerSolver};

fn configure_log(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, MZIsomerError> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let handle = fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(handle);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(writer)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(tracing::Level::DEBUG.into())
                        .from_env_lossy(),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(io::stderr)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(tracing::Level::INFO.into())
                        .from_env_lossy(),
                ),
        )
        .with(file_layer);
    subscriber.init();
    Ok(guard)
}

fn main() -> Result<(), MZIsomerError> {
    let args = MZIsomerSolver::parse();

    let mut config = Figment::new().merge(Serialized::defaults(&args));
    config = match args.config_file.as_ref() {
        Some(path) => config.merge(Toml::file_exact(path)),
        None => config.merge(Toml::file("mzisomer.toml")),
    };
    config = config.merge(Env::prefixed("MZISOMER_"));
    let solver: MZIsomerSolver = config.extract()?;

    let _guard = configure_log(solver.log_file.as_deref())?;
    solver.main()
}
