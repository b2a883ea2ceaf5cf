//! Featurekit bootstrap CLI
//!
//! Loads a JSON manifest of features, registers them in order and prints
//! the resulting health report. Exits non-zero when any registration or
//! unregistration fails.
//!
//! Usage: featurekit <manifest.json> [--unregister <id>]...
//!
//! Environment:
//! - FEATUREKIT_ENV: development | test | production
//! - RUST_LOG: log filter (default: info)

use featurekit_core::{FeatureManifest, RegistryConfig};
use featurekit_plugin::{FeatureManager, PluginRegistry};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "featurekit <manifest.json> [--unregister <id>]...";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\nusage: {usage}", usage = USAGE)]
    Usage(String),

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest '{}': {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, PartialEq)]
struct Args {
    manifest: PathBuf,
    unregister: Vec<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, CliError> {
    let mut manifest = None;
    let mut unregister = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--unregister" => match iter.next() {
                Some(id) => unregister.push(id),
                None => return Err(CliError::Usage("--unregister needs a feature id".to_string())),
            },
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option '{}'", flag)));
            }
            _ if manifest.is_some() => {
                return Err(CliError::Usage(format!("unexpected argument '{}'", arg)));
            }
            _ => manifest = Some(PathBuf::from(arg)),
        }
    }

    let manifest = manifest.ok_or_else(|| CliError::Usage("missing manifest path".to_string()))?;
    Ok(Args { manifest, unregister })
}

fn load_manifest(path: &Path) -> Result<Vec<FeatureManifest>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Register every manifest entry, then apply unregisters.
/// Returns the manager and whether every registration and unregistration
/// succeeded.
fn bootstrap(
    config: RegistryConfig,
    manifests: Vec<FeatureManifest>,
    unregister: &[String],
) -> (FeatureManager<PluginRegistry<()>>, bool) {
    let mut manager = FeatureManager::new(PluginRegistry::with_config(config));
    let mut ok = true;

    for manifest in manifests {
        ok &= manager.register_plugin(manifest.into_definition(()));
    }
    for id in unregister {
        ok &= manager.unregister_plugin(id);
    }

    (manager, ok)
}

fn run() -> Result<bool, CliError> {
    let args = parse_args(env::args().skip(1))?;
    let manifests = load_manifest(&args.manifest)?;
    tracing::info!(path = %args.manifest.display(), features = manifests.len(), "loaded manifest");

    let (manager, ok) = bootstrap(RegistryConfig::from_env(), manifests, &args.unregister);
    manager.log_status();

    let report = manager.health_report();
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("failed to serialize health report: {}", e),
    }
    Ok(ok)
}

fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
