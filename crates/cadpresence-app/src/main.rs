//! cadpresence: runs the presence add-in against a console host.
//!
//! The console stands in for the CAD application: it owns the active
//! document, fires document/closing notifications and exposes the add-in's
//! start command. Presence goes to the locally running Discord client.

mod cli;
mod console;
mod console_host;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cadpresence_config::PresenceConfig;
use cadpresence_core::{Host, HostEvent, PresenceAddIn, UpdaterSettings, START_COMMAND_ID};
use cadpresence_ipc::DiscordConnector;

use crate::console::{ConsoleCommand, HELP};
use crate::console_host::ConsoleHost;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

const LOG_TARGETS: [&str; 5] = [
    "cadpresence",
    "cadpresence_common",
    "cadpresence_config",
    "cadpresence_core",
    "cadpresence_ipc",
];

fn init_logging(level: &str) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        for target in LOG_TARGETS {
            match format!("{target}={level}").parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("invalid log level '{level}': {e}"),
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    runtime.block_on(run(args));
    // The stdin reader sits on a blocking thread that never returns by itself.
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
}

async fn run(args: cli::Args) {
    // Logging is not up yet; keep the error and report it below.
    let loaded = cadpresence_config::load_config(args.config.as_deref());
    let config_level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(
        args.log_level
            .as_deref()
            .unwrap_or_else(|| config_level.as_str()),
    );

    tracing::info!("cadpresence v{} starting", env!("CARGO_PKG_VERSION"));
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("config load failed, using defaults: {e}");
        PresenceConfig::default()
    });

    let settings = UpdaterSettings::from(&config);
    let host = Arc::new(ConsoleHost::new());
    let connector = Arc::new(DiscordConnector::new(Duration::from_millis(u64::from(
        config.discord.io_timeout_ms,
    ))));
    let addin = PresenceAddIn::new(host.clone(), connector, settings);

    addin.run();
    if args.autostart {
        if let Err(e) = host.activate_command(START_COMMAND_ID) {
            host.show_message(&e.to_string());
        }
    }
    host.show_message(HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        match ConsoleCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Open(name))) => host.open_document(&name),
            Ok(Some(ConsoleCommand::Close)) => host.close_document(),
            Ok(Some(ConsoleCommand::Start)) => {
                if let Err(e) = host.activate_command(START_COMMAND_ID) {
                    host.show_message(&e.to_string());
                }
            }
            Ok(Some(ConsoleCommand::Status)) => {
                let running = addin.updater().is_running().await;
                let status = addin.updater().build_status();
                host.show_message(&format!(
                    "running: {running}, handlers: {}, details: {}, state: {}",
                    host.subscription_count(),
                    status.details,
                    status.state
                ));
            }
            Ok(Some(ConsoleCommand::Help)) => host.show_message(HELP),
            Ok(Some(ConsoleCommand::Quit)) => break,
            Err(e) => host.show_message(&e),
        }
    }

    host.emit(HostEvent::ApplicationClosing);
    addin.stop().await;
    tracing::info!("shutdown complete");
}
