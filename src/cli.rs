// CLI definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ipac-monitor")]
#[command(author, version, about = "Ultimarc I-PAC input diagnostic monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// USB vendor id to match (hex like 0xd209, or decimal)
    #[arg(long, global = true, default_value = "0xd209", value_parser = parse_u16_id)]
    pub vendor_id: u16,

    /// Per-read poll timeout in milliseconds
    #[arg(long, global = true, default_value_t = 100)]
    pub timeout_ms: u64,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List matching HID interfaces
    #[command(visible_alias = "ls")]
    List,

    /// Monitor one interface directly via HID (keyboard interface preferred)
    #[command(visible_alias = "h")]
    Hid {
        /// Narrow the match to one product id (hex or decimal)
        #[arg(long, value_parser = parse_u16_id)]
        product_id: Option<u16>,
    },

    /// Monitor every matching interface concurrently (raw passthrough)
    #[command(visible_alias = "r")]
    Raw {
        /// Also open the keyboard interface (the OS may block it)
        #[arg(long)]
        include_keyboard: bool,
    },

    /// Monitor the raw terminal byte stream (Ctrl+C quits)
    #[command(visible_alias = "t")]
    Term,

    /// Monitor system-level keyboard events (evdev tap)
    #[cfg(target_os = "linux")]
    Tap,
}

/// Parse a 16-bit id given as `0x`-prefixed hex or decimal
fn parse_u16_id(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid id '{s}': {e}"))
}
