//! glossary-updater
//!
//! Merges glossary terms from local CSV, JSON and YAML files into an
//! analysis configuration managed through a remote REST API.

use anyhow::Result;
use clap::Parser;
use glossary_updater::api::HttpApiClient;
use glossary_updater::cli::info::InfoArgs;
use glossary_updater::cli::update::UpdateArgs;
use glossary_updater::cli::{Cli, Command};
use glossary_updater::config::{AppConfig, ConfigLoader, ENV_CONFIG_PATH};
use glossary_updater::engine::Engine;
use glossary_updater::error::EngineError;
use glossary_updater::logging::{self, LogSink};
use glossary_updater::report::{ErrorRecord, InfoRecord, OutputFormat, Render};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(&LogSink::parse(&cli.log), logging::level(cli.verbose, cli.quiet))?;

    // If explicit config path given, set it as env var for ConfigLoader to pick up
    // SAFETY: This is safe at program startup before any other threads are spawned
    if let Some(config_path) = &cli.config_file {
        unsafe {
            std::env::set_var(ENV_CONFIG_PATH, config_path);
        }
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let err = EngineError::Config(format!("{e:#}"));
            return Ok(fail(&cli.command, &err, OutputFormat::default()));
        }
    };
    if let Err(err) = cli.preflight(&config) {
        return Ok(fail(&cli.command, &err, config.output.format));
    }

    let engine = match HttpApiClient::new(&config.api) {
        Ok(client) => Engine::new(client, config.reserved_guard()),
        Err(e) => {
            let err = EngineError::Config(e.to_string());
            return Ok(fail(&cli.command, &err, config.output.format));
        }
    };

    let code = match cli.command {
        Command::Update(ref args) => run_update(&engine, &config, args).await,
        Command::Info(ref args) => run_info(&engine, &config, args).await,
        Command::Check => run_check(&engine).await,
    };
    Ok(code)
}

/// Load tiered config, then apply CLI flags.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let loader = ConfigLoader::load()?;
    for source in loader.sources() {
        info!(path = %source.display(), "Using config file");
    }
    let mut config = loader.into_config();
    cli.apply_overrides(&mut config);
    Ok(config)
}

async fn run_update(engine: &Engine<HttpApiClient>, config: &AppConfig, args: &UpdateArgs) -> ExitCode {
    let format = args.format.unwrap_or(config.output.format);

    let request = match args.to_request(config.backup.dir.as_ref()) {
        Ok(request) => request,
        Err(e) => return report_error(&EngineError::from(e), &args.config_id, args.inputs(), format),
    };

    match engine.update(&request).await {
        Ok(record) => {
            println!("{}", record.render(format));
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e, &args.config_id, args.inputs(), format),
    }
}

async fn run_info(engine: &Engine<HttpApiClient>, config: &AppConfig, args: &InfoArgs) -> ExitCode {
    let format = args.format.unwrap_or(config.output.format);

    match engine.configuration_info(&args.config_id).await {
        Ok(summary) => {
            let record = InfoRecord {
                config_id: args.config_id.clone(),
                summary,
            };
            println!("{}", record.render(format));
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e, &args.config_id, Vec::new(), format),
    }
}

async fn run_check(engine: &Engine<HttpApiClient>) -> ExitCode {
    match engine.test_connection().await {
        Ok(()) => {
            println!("Connection OK: {}", engine.api().base_url());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Connection check failed");
            eprintln!("Connection failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Report a failure that happened before a command could run.
fn fail(command: &Command, err: &EngineError, default_format: OutputFormat) -> ExitCode {
    match command {
        Command::Update(args) => report_error(
            err,
            &args.config_id,
            args.inputs(),
            args.format.unwrap_or(default_format),
        ),
        Command::Info(args) => {
            report_error(err, &args.config_id, Vec::new(), args.format.unwrap_or(default_format))
        }
        Command::Check => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &EngineError, config_id: &str, inputs: Vec<String>, format: OutputFormat) -> ExitCode {
    let record = ErrorRecord::new(err, config_id, inputs);
    println!("{}", record.render(format));
    ExitCode::FAILURE
}
