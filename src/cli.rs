// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "glass-sketch")]
#[command(about = "Transmissive-material model sketch", long_about = None)]
pub struct Cli {
    /// Initial canvas width in logical pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial canvas height in logical pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Present frames without waiting for vsync
    #[arg(long = "no-vsync", default_value = "false")]
    pub no_vsync: bool,

    /// Hide the control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON parameter preset to start from
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Directory holding the sketch assets
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,
}
