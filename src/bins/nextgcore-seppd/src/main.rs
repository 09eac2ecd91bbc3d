//! NextGCore SEPP (Security Edge Protection Proxy)
//!
//! Daemon entry point: loads the configuration, builds the SEPP context and
//! dispatches events until interrupted.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use nextgcore_seppd::{pool_sizes, sepp_state_operational, SeppContext, SeppEvent};
use ogs_app::{OgsGlobalConf, OgsYamlDocument};
use ogs_sbi::{NfType, SbiContext};

/// NextGCore SEPP - Security Edge Protection Proxy
#[derive(Parser, Debug)]
#[command(name = "nextgcore-seppd")]
#[command(author = "NextGCore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "5G Core Security Edge Protection Proxy", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, default_value = "/etc/nextgcore/sepp.yaml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'e', long, default_value = "info")]
    log_level: String,

    /// Disable color output
    #[arg(short = 'm', long)]
    no_color: bool,

    /// Maximum number of peer SEPP nodes (default: global.max.peer)
    #[arg(long)]
    max_node: Option<usize>,

    /// Maximum number of associations (default: global.max.ue * 8)
    #[arg(long)]
    max_assoc: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    log::info!("NextGCore SEPP v{} starting...", env!("CARGO_PKG_VERSION"));

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    let document = load_document(&args.config)?;

    let global = OgsGlobalConf::from_document(&document)
        .context("Failed to parse global configuration")?;
    let (default_node, default_assoc) = pool_sizes(&global);
    let max_node = args.max_node.unwrap_or(default_node);
    let max_assoc = args.max_assoc.unwrap_or(default_assoc);

    let mut sbi = SbiContext::new(NfType::Sepp);
    sbi.parse_config(&document, "sepp")
        .context("Failed to parse SBI configuration")?;

    let mut ctx = SeppContext::new();
    ctx.init(max_node, max_assoc);

    if let Err(e) = ctx.parse_config(&document, &mut sbi) {
        ctx.fini(&mut sbi);
        return Err(e).context("Failed to parse SEPP configuration");
    }
    ctx.start();

    log::info!("NextGCore SEPP ready ({} peer(s))", ctx.node_count());

    // Inbound events are produced by the SBI transport
    let (_event_tx, event_rx) = mpsc::channel::<SeppEvent>();
    run_event_loop(&mut ctx, &sbi, &event_rx, &shutdown);

    log::info!("Shutting down...");
    ctx.fini(&mut sbi);

    log::info!("NextGCore SEPP stopped");
    Ok(())
}

/// Initialize logging based on command line arguments
fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    builder.filter_level(level);
    builder.format_timestamp_millis();

    if args.no_color {
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder.init();
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    Ok(())
}

/// Read the configuration file; a missing file means built-in defaults
fn load_document(path: &str) -> Result<OgsYamlDocument> {
    if !Path::new(path).exists() {
        log::warn!("Configuration file not found: {}", path);
        return Ok(OgsYamlDocument::empty());
    }

    log::info!("Loading configuration from {}", path);
    OgsYamlDocument::from_file(path).with_context(|| format!("Failed to load {}", path))
}

/// Main event loop
fn run_event_loop(
    ctx: &mut SeppContext,
    sbi: &SbiContext,
    events: &Receiver<SeppEvent>,
    shutdown: &AtomicBool,
) {
    log::debug!("Entering main event loop");

    while !shutdown.load(Ordering::SeqCst) {
        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if let Some(reply) = sepp_state_operational(ctx, sbi, event) {
                    log::debug!("[{}] reply {}", reply.stream, reply.status);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("Exiting main event loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::parse_from(["nextgcore-seppd"]);
        assert_eq!(args.config, "/etc/nextgcore/sepp.yaml");
        assert_eq!(args.log_level, "info");
        assert!(!args.no_color);
        assert_eq!(args.max_node, None);
        assert_eq!(args.max_assoc, None);
    }

    #[test]
    fn test_args_custom() {
        let args = Args::parse_from([
            "nextgcore-seppd",
            "-c",
            "/custom/sepp.yaml",
            "-e",
            "debug",
            "-m",
            "--max-node",
            "32",
            "--max-assoc",
            "16384",
        ]);
        assert_eq!(args.config, "/custom/sepp.yaml");
        assert_eq!(args.log_level, "debug");
        assert!(args.no_color);
        assert_eq!(args.max_node, Some(32));
        assert_eq!(args.max_assoc, Some(16384));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let document = load_document("/nonexistent/sepp.yaml").unwrap();
        let global = OgsGlobalConf::from_document(&document).unwrap();
        assert_eq!(pool_sizes(&global), (64, 8192));
    }

    #[test]
    fn test_event_loop_stops_when_transport_closes() {
        let mut sbi = SbiContext::new(NfType::Sepp);
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        ctx.parse_config(&OgsYamlDocument::empty(), &mut sbi).unwrap();
        ctx.start();

        let (tx, rx) = mpsc::channel();
        drop(tx);
        run_event_loop(&mut ctx, &sbi, &rx, &AtomicBool::new(false));
        ctx.fini(&mut sbi);
    }
}
