//! `confmig` binary

mod cli;

use anyhow::Context;
use cli::Invocation;
use confmig_core::{ConsoleLog, Migrator};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter
const LOG_ENV: &str = "CONFMIG_LOG";

#[tokio::main]
async fn main() {
    let matches = cli::command().get_matches();
    let Some(invocation) = Invocation::from_matches(&matches) else {
        std::process::exit(2);
    };

    match run(&invocation).await {
        Ok(true) => std::process::exit(0),
        // Already reported on the error channel
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(invocation: &Invocation) -> anyhow::Result<bool> {
    setup_logging(invocation.json_logs)?;

    let registry = invocation.registry();
    let log = ConsoleLog::new(invocation.config.log_prefix());
    tracing::debug!(
        name = %invocation.config.name,
        root = %invocation.config.root.display(),
        steps = registry.len(),
        "starting migrate"
    );

    let migrator = Migrator::new(&invocation.config, &registry, &log);
    match migrator.migrate(&invocation.args).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "migrate finished");
            Ok(true)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "migrate rejected");
            Ok(false)
        }
    }
}

/// Install the diagnostics subscriber on stderr, filtered by `CONFMIG_LOG`
fn setup_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to install tracing subscriber")
}
