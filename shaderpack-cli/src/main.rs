mod cli;
mod commands;
mod config;
mod detect;
mod embed;
mod header;
mod manifest;
mod state;
mod toolchain;

#[cfg(test)]
mod testutil;

use std::process::ExitCode;

use clap::Parser;

use config::PackagerConfig;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let config = PackagerConfig::from_cli(&cli);

    if let Some(query) = cli.query.as_deref() {
        return commands::query::run(query, &config.manifest());
    }

    if cli.check_tools {
        return commands::check::run(&config).await;
    }

    log::debug!("packaging the {} shader variant", config.variant.label());
    match commands::generate::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
