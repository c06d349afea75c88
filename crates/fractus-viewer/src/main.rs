mod app;
mod config;

use anyhow::Result;
use clap::Parser;

use fractus_engine::logging::init_logging;
use fractus_engine::window::Runtime;

use crate::app::ViewerApp;
use crate::config::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logging());

    let config = cli.into_config()?;
    log::info!(
        "starting '{}' ({}x{})",
        config.runtime.title,
        config.runtime.initial_size.width,
        config.runtime.initial_size.height
    );

    let runtime = config.runtime.clone();
    let gpu = config.gpu.clone();
    Runtime::run(runtime, gpu, ViewerApp::new(config))
}
