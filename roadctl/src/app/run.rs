//! Application entry: settings, logging, registry and command dispatch

use std::path::PathBuf;

use colored::Colorize;
use tracing::debug;

use crate::app::cli::{usage, CliCommand};
use crate::deploy::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::errors::RoadError;
use crate::filesys::file::File;
use crate::logs::{init_logging, LogOptions};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{Settings, SETTINGS_PATH_ENV};
use crate::targets::registry::TargetRegistry;
use crate::utils::version_info;

/// Run roadctl with the given arguments (program name excluded).
///
/// Returns the process exit code.
pub async fn run(args: Vec<String>) -> i32 {
    let command = CliCommand::parse(&args);

    if command == CliCommand::Version {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
        }
        return 0;
    }

    let layout = StorageLayout::default();
    let settings = match load_settings(&layout).await {
        Ok(settings) => settings,
        Err(e) => return fail(&e),
    };

    if let Err(e) = init_logging(LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.json_logs,
    }) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let registry = match load_registry(&settings, &layout).await {
        Ok(registry) => registry,
        Err(e) => return fail(&e),
    };

    match command {
        CliCommand::Usage => {
            print!("{}", usage(&registry));
            0
        }
        CliCommand::Invalid { reason } => {
            eprintln!("{} {}", "error:".red().bold(), reason);
            print!("{}", usage(&registry));
            1
        }
        CliCommand::Deploy { target } => {
            let options = OrchestratorOptions::from_settings(&settings, layout);
            let orchestrator = Orchestrator::new(registry, options);
            match orchestrator.deploy(&target).await {
                Ok(report) => {
                    println!(
                        "{} {} deployed ({})",
                        "✓".green().bold(),
                        report.target.bold(),
                        report.dns.fqdn
                    );
                    0
                }
                Err(e) => fail(&e),
            }
        }
        CliCommand::Version => 0,
    }
}

async fn load_settings(layout: &StorageLayout) -> Result<Settings, RoadError> {
    let file = match std::env::var_os(SETTINGS_PATH_ENV) {
        Some(path) => File::new(layout.resolve(PathBuf::from(path))),
        None => layout.settings_file(),
    };
    Settings::load(&file).await
}

async fn load_registry(
    settings: &Settings,
    layout: &StorageLayout,
) -> Result<TargetRegistry, RoadError> {
    let mut registry = TargetRegistry::builtin();
    if let Some(targets_file) = &settings.targets_file {
        registry
            .extend_from_file(&File::new(layout.resolve(targets_file)))
            .await?;
    }
    debug!("{} targets available", registry.len());
    Ok(registry)
}

fn fail(e: &RoadError) -> i32 {
    eprintln!("{} {}", "error:".red().bold(), e);
    e.exit_code()
}
