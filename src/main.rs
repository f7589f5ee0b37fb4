use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter
};

use fouriercoef::configuration::Configuration;
use fouriercoef::server::server::Server;

#[derive(Parser)]
#[command(name = "fouriercoef")]
#[command(version, about = "Serve Fourier series coefficients over HTTP")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "FOURIER_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut configuration = match &cli.config {
        Some(path) => Configuration::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Configuration::default()
    };
    if let Some(port) = cli.port {
        configuration = configuration.with_port(port);
    }

    let server = Server::new(&configuration).context("building server")?;
    server.serve().await?;
    Ok(())
}
