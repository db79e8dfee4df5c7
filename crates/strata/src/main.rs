mod cli;
mod demo;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use strata_core::config::KernelConfig;
use strata_core::event::KernelPhaseChangedEvent;
use strata_core::kernel::constants;
use strata_core::kernel::error::Result as KernelResult;
use strata_core::kernel::Kernel;
use strata_core::router::{MemoryRouter, RouteGenerationProps, Router, RouterBundle};
use strata_logging::{LoggingBundle, LoggingConfig};

use crate::cli::{CliArgs, Commands};
use crate::demo::DemoBundle;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> KernelResult<()> {
    let config = load_config(args.config.as_deref()).await?;
    let kernel = build_kernel(config, args.log_level).await?;
    let command = args.command.unwrap_or(Commands::Routes);

    if matches!(command, Commands::Phases) {
        kernel
            .events()
            .add_sync_listener(|e: &KernelPhaseChangedEvent| {
                println!("{} -> {}", e.from, e.to);
                Ok(())
            })
            .await;
    }
    kernel.init().await?;

    // Bundles get their shutdown hooks even when the command fails
    let outcome = run_command(&kernel, command).await;
    log::debug!("Command finished, shutting down kernel");
    let shutdown = kernel.shutdown().await;
    outcome.and(shutdown)
}

async fn run_command(kernel: &Kernel, command: Commands) -> KernelResult<()> {
    match command {
        Commands::Routes => {
            let router = kernel.container().resolve::<MemoryRouter>().await?;
            for route in router.routes() {
                println!("{}\t{}", route.name.as_deref().unwrap_or(""), route.path);
            }
        }
        Commands::Render { key, params, query } => {
            let router = kernel.container().resolve::<MemoryRouter>().await?;
            let mut options = RouteGenerationProps::new().with_params();
            for (name, value) in params {
                options = options.param(name, value);
            }
            for (name, value) in query {
                options = options.query(name, value);
            }
            println!("{}", router.go_to(&key, &options)?);
        }
        Commands::Phases => {}
    }
    Ok(())
}

/// `--config`/`STRATA_CONFIG` if given, else the default file when present.
async fn load_config(path: Option<&Path>) -> KernelResult<KernelConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(constants::DEFAULT_CONFIG_FILE);
            if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                return Ok(KernelConfig::default());
            }
            default
        }
    };
    Ok(KernelConfig::from_path(&path).await?)
}

async fn build_kernel(config: KernelConfig, log_level: Option<String>) -> KernelResult<Kernel> {
    // Quiet by default; the config file and --log-level override this
    let logging = Arc::new(LoggingBundle::with_config(LoggingConfig {
        level: "warn".to_string(),
        ..LoggingConfig::default()
    }));

    let mut builder = Kernel::builder().config(config);
    builder = match log_level {
        Some(level) => builder.bundle_with_config(logging, json!({ "level": level })),
        None => builder.bundle(logging),
    };
    builder
        .bundle(Arc::new(RouterBundle::new()))
        .bundle(Arc::new(DemoBundle::new()))
        .build()
        .await
}
