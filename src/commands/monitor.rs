//! Direct HID monitor commands: single-interface `hid` and fan-out `raw`.

use std::sync::Arc;
use std::time::Duration;

use ipac_hid::{DeviceCatalog, EventSink, InterfaceClass, InterfaceInfo, Session};
use tracing::debug;

use super::{banner, report_failure, setup_interrupt_handler, CommandResult};

/// Monitor the primary interface (keyboard preferred), decoding per its
/// classification.
pub fn hid(vendor_id: u16, product_id: Option<u16>, timeout: Duration) -> CommandResult {
    banner("I-PAC Direct HID Monitor");

    let catalog = DeviceCatalog::new(vendor_id)?;
    let mut interfaces = catalog.interfaces();
    if let Some(pid) = product_id {
        interfaces.retain(|info| info.product_id == pid);
    }
    if interfaces.is_empty() {
        eprintln!("ERROR: no HID interfaces matching vendor id 0x{vendor_id:04x}");
        return Ok(());
    }

    println!("Found {} HID interface(s):", interfaces.len());
    for info in &interfaces {
        print_interface(info);
    }

    let Some(target) = DeviceCatalog::select_primary(&interfaces) else {
        return Ok(());
    };
    if target.class() != InterfaceClass::Keyboard {
        println!("\nNo keyboard interface found, trying the first interface...");
    }
    println!(
        "\nOpening: {} (usage_page={}, usage={})",
        target.product.as_deref().unwrap_or("<unknown>"),
        target.usage_page,
        target.usage
    );

    let source = match catalog.open(target) {
        Ok(source) => source,
        Err(e) => {
            // Single-interface mode: an open failure ends the run.
            report_failure(&e);
            return Ok(());
        }
    };

    println!("Press buttons on the controller. Ctrl+C to quit.\n");
    debug!("monitoring {} with timeout {timeout:?}", target.label());

    let shutdown = setup_interrupt_handler();
    let sink = Arc::new(EventSink::stdout());
    let session = Session::new(None, target.class(), Box::new(source));
    ipac_hid::run_sessions(vec![session], &sink, &shutdown, timeout);

    println!("\nDone.");
    Ok(())
}

/// Monitor every matching interface concurrently. The keyboard interface
/// stays closed unless opted in, since the OS may refuse to open it.
pub fn raw(vendor_id: u16, include_keyboard: bool, timeout: Duration) -> CommandResult {
    banner("I-PAC Raw HID Monitor");
    println!("Press buttons on the controller. Ctrl+C to quit.\n");

    let catalog = DeviceCatalog::new(vendor_id)?;
    let interfaces = catalog.interfaces();
    if interfaces.is_empty() {
        eprintln!("ERROR: no HID interfaces matching vendor id 0x{vendor_id:04x}");
        return Ok(());
    }

    let sink = Arc::new(EventSink::stdout());
    let mut sessions = Vec::new();
    for info in &interfaces {
        let label = info.label();
        if info.class() == InterfaceClass::Keyboard && !include_keyboard {
            sink.line(&format!(
                "[{label}] Skipped (keyboard interface; pass --include-keyboard to open it)"
            ));
            continue;
        }
        match catalog.open(info) {
            Ok(source) => {
                sink.line(&format!("[{label}] Listening..."));
                sessions.push(Session::new(Some(label), info.class(), Box::new(source)));
            }
            Err(e) => {
                // Fatal for this interface only; siblings still run.
                sink.line(&format!("[{label}] Error: {e}"));
                if let Some(hint) = e.permission_hint() {
                    sink.line(hint);
                }
            }
        }
    }

    if sessions.is_empty() {
        eprintln!("No interfaces could be opened.");
        return Ok(());
    }
    debug!("monitoring {} interface(s)", sessions.len());

    let shutdown = setup_interrupt_handler();
    ipac_hid::run_sessions(sessions, &sink, &shutdown, timeout);

    println!("\nDone.");
    Ok(())
}

fn print_interface(info: &InterfaceInfo) {
    println!(
        "  - {} (usage_page={}, usage={})",
        info.product.as_deref().unwrap_or("<unknown>"),
        info.usage_page,
        info.usage
    );
    println!("    path: {}", info.path.to_string_lossy());
}
