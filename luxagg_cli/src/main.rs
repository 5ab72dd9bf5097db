mod cli;
mod commands;
mod error_fmt;
mod report;

use clap::Parser;
use eyre::WrapErr;
use luxagg_config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{Stage, exit_code_for_error, format_error_json, humanize};

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))
                .wrap_err(Stage::Config)?;
            luxagg_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", p.display()))
                .wrap_err(Stage::Config)?
        }
        None => Config::default(),
    };
    cfg.validate().wrap_err(Stage::Config)?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, cfg: &Config) -> eyre::Result<()> {
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid log level {level:?}"))
            .wrap_err(Stage::Config)?,
    };

    // Console logs go to stderr; stdout carries reports only.
    let (json_layer, pretty_layer) = if cli.json {
        (
            Some(fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    };

    let file_layer = match cfg.logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))
                .wrap_err(Stage::Config)?;
            let appender = match cfg.logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli, &cfg)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match &cli.cmd {
        Commands::Run {
            cycles,
            tick_ms,
            replay,
        } => {
            let opts = commands::RunOpts {
                cycles: *cycles,
                tick_ms: *tick_ms,
                replay: replay.as_deref(),
                json: cli.json,
            };
            commands::run(&cfg, &opts)?;
        }
        Commands::Analyze { csv } => {
            commands::analyze(&cfg, csv, cli.json)?;
        }
        Commands::SelfCheck => {
            let reading = commands::self_check(&cfg)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "status": "ok", "reading": reading })
                );
            } else {
                println!("self-check ok: reading = {reading:.2}");
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error report handler: {e}");
    }

    if let Err(err) = real_main(&cli) {
        tracing::debug!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}
