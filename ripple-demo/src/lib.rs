//! # Saorsa Ripple Demo
//!
//! Runs a scripted press/release session against the in-memory document on a
//! virtual clock and reports what the ripple lifecycle did.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ripple-demo -- --clicks 5 --interval 80 --hold 250
//! ```
//!
//! ## With a config file and touch input:
//!
//! ```bash
//! cargo run -p ripple-demo -- --config ripple.json --touch --dump-tree
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `SimulationConfig` - Session script plus the ripple option layers
//! - `Simulation` - Drives frames, releases and transition ends on a manual clock

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod simulation;

pub use simulation::{Simulation, SimulationReport, FRAME_MS};

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ripple_core::{ContainerStrategy, RipplePatch};

/// Command-line arguments for ripple-demo.
#[derive(Debug, Clone, Parser)]
#[command(name = "ripple-demo")]
#[command(about = "Saorsa Ripple virtual-time session runner")]
#[command(version)]
pub struct CliArgs {
    /// JSON file with ripple options (camelCase keys)
    #[arg(long, env = "RIPPLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ripple duration in milliseconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Ripple background color
    #[arg(long)]
    pub color: Option<String>,

    /// Fade out on a timer instead of waiting for the release
    #[arg(long)]
    pub auto_cancel: bool,

    /// Report touch support, forcing timer-based fades
    #[arg(long)]
    pub touch: bool,

    /// Number of presses
    #[arg(long, default_value = "3")]
    pub clicks: u32,

    /// Milliseconds between presses
    #[arg(long, default_value = "120")]
    pub interval: f64,

    /// Milliseconds each press is held before release
    #[arg(long, default_value = "300")]
    pub hold: f64,

    /// Host width in pixels
    #[arg(long, default_value = "200")]
    pub width: f64,

    /// Host height in pixels
    #[arg(long, default_value = "48")]
    pub height: f64,

    /// Clip on the host instead of a container element
    #[arg(long)]
    pub legacy_host_clip: bool,

    /// Emit JSON logs
    #[arg(long, env = "RIPPLE_JSON_LOGS")]
    pub json_logs: bool,

    /// Print the final document tree as JSON
    #[arg(long)]
    pub dump_tree: bool,
}

/// A scripted ripple session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Options file, applied below the command-line overrides.
    pub config_path: Option<PathBuf>,
    /// Options set on the command line.
    pub overrides: RipplePatch,
    /// Number of presses.
    pub clicks: u32,
    /// Milliseconds between presses.
    pub interval_ms: f64,
    /// Milliseconds each press is held.
    pub hold_ms: f64,
    /// Host width in pixels.
    pub width: f64,
    /// Host height in pixels.
    pub height: f64,
    /// Whether the document reports touch support.
    pub touch: bool,
    /// How ripples are clipped.
    pub strategy: ContainerStrategy,
    /// Whether to keep a JSON dump of the final tree.
    pub dump_tree: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationConfig {
    /// Create a session with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: None,
            overrides: RipplePatch::new(),
            clicks: 3,
            interval_ms: 120.0,
            hold_ms: 300.0,
            width: 200.0,
            height: 48.0,
            touch: false,
            strategy: ContainerStrategy::Container,
            dump_tree: false,
        }
    }

    /// Resolve the ripple options: the file (if any), then the overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the options file cannot be read or parsed.
    pub fn ripple_patch(&self) -> anyhow::Result<RipplePatch> {
        let base = match &self.config_path {
            Some(path) => load_patch(path)?,
            None => RipplePatch::new(),
        };
        Ok(base.merge(&self.overrides))
    }
}

impl From<CliArgs> for SimulationConfig {
    fn from(args: CliArgs) -> Self {
        let overrides = RipplePatch {
            duration: args.duration,
            color: args.color,
            cancel_automatically: args.auto_cancel.then_some(true),
            ..RipplePatch::new()
        };
        Self {
            config_path: args.config,
            overrides,
            clicks: args.clicks,
            interval_ms: args.interval,
            hold_ms: args.hold,
            width: args.width,
            height: args.height,
            touch: args.touch,
            strategy: if args.legacy_host_clip {
                ContainerStrategy::HostClip
            } else {
                ContainerStrategy::Container
            },
            dump_tree: args.dump_tree,
        }
    }
}

/// Load ripple options from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid options
/// object.
pub fn load_patch(path: &Path) -> anyhow::Result<RipplePatch> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ripple options from {}", path.display()))?;
    let patch = RipplePatch::from_json(&json)
        .with_context(|| format!("Invalid ripple options in {}", path.display()))?;
    tracing::debug!("Loaded ripple options from {}", path.display());
    Ok(patch)
}
