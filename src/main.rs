//! Toucan - a static site build pipeline over a typed content graph.

use anyhow::{Result, bail};
use clap::Parser;
use std::{path::Path, process::ExitCode};
use toucan::{
    build::{build_site, check},
    cli::Cli,
    config::SiteConfig,
    error::{BuildError, ConfigError, UserFacing, diagnostic_tree},
    log, logger,
    render::{EngineRegistry, PassThrough},
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::set_quiet(cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    if cli.is_check() {
        let report = check(&config)?;
        log!("check"; "{} contents, {} warnings", report.contents, report.warnings.len());
    } else {
        build_site(&config, &EngineRegistry::default(), &PassThrough)?;
    }
    Ok(())
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);
    if !config_path.exists() {
        bail!("Config file `{}` not found.", config_path.display());
    }

    let mut config = SiteConfig::from_path(&config_path)?;
    config.update_with_cli(cli);
    config.validate()?;
    Ok(config)
}

fn report_error(err: &anyhow::Error) {
    if let Some(build) = err.downcast_ref::<BuildError>() {
        log!("error"; "{}", diagnostic_tree(build).trim_end());
        eprintln!("{}", build.user_message());
    } else if let Some(config) = err.downcast_ref::<ConfigError>() {
        log!("error"; "{}", diagnostic_tree(config).trim_end());
        eprintln!("{}", config.user_message());
    } else {
        log!("error"; "{:#}", err);
    }
}
