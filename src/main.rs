use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use std::path::Path;

fn init_logger(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file {}", path.display()))?;
        // Keep log lines out of the alternate screen.
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("initialize logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let cfg = depth_gallery::config::Config::parse();
    init_logger(cfg.log_file.as_deref())?;
    depth_gallery::app::run(cfg)
}
