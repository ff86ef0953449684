//! Command handlers for the CLI application.
//!
//! - `monitor`: HID monitors (single-interface `hid`, fan-out `raw`)
//! - `term`: raw terminal byte monitor
//! - `tap`: system-level keyboard tap (Linux)
//! - `utility`: interface listing

pub mod monitor;
pub mod term;
pub mod utility;

#[cfg(target_os = "linux")]
pub mod tap;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ipac_hid::MonitorError;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Set up a Ctrl-C handler that flips the returned shutdown flag.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .ok();

    shutdown
}

/// Title banner in the style of the monitor's startup output
pub fn banner(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(40));
}

/// One-line cause, plus the permission to grant when that's the cause.
pub fn report_failure(e: &MonitorError) {
    eprintln!("ERROR: {e}");
    if let Some(hint) = e.permission_hint() {
        eprintln!("{hint}");
    }
}
