mod settings;   // typed configuration loaded from `config/default.toml`
mod simulation; // drives each drivetrain model and logs its outputs

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use settings::DEFAULT_CONFIG_PATH;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    info!("Axle robotics simulation starting with {}", path);

    let settings = settings::load_settings(&path)
        .with_context(|| format!("could not load configuration from {path}"))?;

    if let Err(e) = simulation::run(&settings) {
        error!("Simulation failed: {:?}", e);
        return Err(e);
    }
    Ok(())
}
