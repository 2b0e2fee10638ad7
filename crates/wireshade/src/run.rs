use anyhow::{Context, Result};
use renderer::{PipelineSources, Renderer, RendererConfig};
use shaderfetch::{FetchConfig, SourceClient, SourceHandle};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    let fetch_config = FetchConfig::new(cli.base_url.as_deref())?;
    let client = SourceClient::new(fetch_config).context("failed to build shader source client")?;
    let vertex = SourceHandle::from_input(&cli.vertex);
    let fragment = SourceHandle::from_input(&cli.fragment);
    tracing::info!(vertex = %vertex, fragment = %fragment, "starting wireshade");

    let mut renderer = Renderer::new(RendererConfig {
        title: cli.title,
        surface_size: cli.size,
    });
    renderer.run(move || {
        let pair = client.fetch_pair(&vertex, &fragment)?;
        Ok(PipelineSources {
            vertex: pair.vertex,
            fragment: pair.fragment,
        })
    })
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
