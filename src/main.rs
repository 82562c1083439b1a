//! hexview - Entry Point

use clap::Parser;
use hexview::cache::ThreadExecutor;
use hexview::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    KeyBindings,
};
use hexview::model::ViewerEvent;
use hexview::source::FileSource;
use hexview::view::{ColorConfig, GridStyles};
use hexview::viewer::HexViewer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// hexview - scroll through files of any size as a hex grid
#[derive(Parser, Debug)]
#[command(name = "hexview")]
#[command(version)]
#[command(about = "Terminal hex viewer that loads only the bytes on screen")]
pub struct Args {
    /// File to view
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fixed number of bytes per row (default: fit the terminal width)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub bytes_per_row: Option<u32>,

    /// Hide the ASCII column
    #[arg(long)]
    pub no_ascii: bool,

    /// Bytes read per chunk
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file);
        let with_env = apply_env_overrides(merged);
        apply_cli_overrides(with_env, args.bytes_per_row, args.no_ascii, args.chunk_size)
    };

    hexview::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let source = FileSource::open(&args.file)?;
    info!(path = %source.path().display(), "Opened file");

    let mut viewer = HexViewer::new(
        Arc::new(source),
        Box::new(ThreadExecutor::default()),
        config.viewer_config(),
    );
    viewer.subscribe(|event: &ViewerEvent| {
        if let ViewerEvent::LoadFailed { message } = event {
            warn!(%message, "Load failed");
        }
    });

    let colors = if args.no_color {
        ColorConfig::new(false)
    } else {
        ColorConfig::from_env()
    };

    hexview::view::run(
        viewer,
        KeyBindings::default(),
        GridStyles::with_color_config(colors),
    )?;

    Ok(())
}
