//! # Saorsa Ripple Demo
//!
//! Virtual-time ripple session runner.

use clap::Parser;
use ripple_demo::{CliArgs, Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing.
///
/// Set `RUST_LOG_FORMAT=json` (or pass `--json-logs`) for JSON output.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ripple_core=debug,ripple_demo=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if json || std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.json_logs);

    tracing::info!("Starting Saorsa Ripple Demo v{}", ripple_core::VERSION);

    let config = SimulationConfig::from(args);
    tracing::info!(
        "Host {}x{}, {} press(es) every {}ms held {}ms{}",
        config.width,
        config.height,
        config.clicks,
        config.interval_ms,
        config.hold_ms,
        if config.touch { " (touch)" } else { "" }
    );
    if let Some(ref path) = config.config_path {
        tracing::info!("Ripple options file: {}", path.display());
    }

    let report = Simulation::new(config)?.run()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(tree) = &report.tree {
        println!("{tree}");
    }
    Ok(())
}
