//! Raw terminal byte monitor.
//!
//! The simplest layer to tap: every byte the terminal delivers is treated
//! as a one-byte raw report and run through the standard pipeline, so a
//! held key's autorepeat collapses to one line per distinct byte. The
//! 0x03 interrupt byte ends the stream.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use ipac_hid::{DecodedEvent, EventSink, InterfaceClass, Session, TerminalSource};

use super::{banner, report_failure, CommandResult};

pub fn run() -> CommandResult {
    banner("I-PAC Input Monitor");
    println!("Press buttons on your controller.");
    println!("Press Ctrl+C to quit.\n");

    let source = match TerminalSource::new() {
        Ok(source) => source,
        Err(e) => {
            report_failure(&e);
            return Ok(());
        }
    };

    // Raw mode delivers Ctrl+C as the 0x03 byte, so the source closes the
    // stream itself; no interrupt handler is installed here.
    let sink = Arc::new(
        EventSink::stdout()
            .with_newline("\r\n")
            .with_formatter(format_byte_line),
    );
    let shutdown = Arc::new(AtomicBool::new(false));
    let session = Session::new(None, InterfaceClass::Vendor, Box::new(source));
    ipac_hid::run_sessions(vec![session], &sink, &shutdown, Duration::from_millis(100));

    println!("\nDone.");
    Ok(())
}

/// Per-byte line: printable character, decimal and hex.
fn format_byte_line(label: Option<&str>, event: &DecodedEvent) -> String {
    if let DecodedEvent::Raw(bytes) = event {
        if let [byte] = bytes.as_slice() {
            let display = if (0x20..=0x7e).contains(byte) {
                (*byte as char).to_string()
            } else {
                "(non-printable)".to_string()
            };
            return format!("Char: {display:<16}  Dec: {byte:>3}  Hex: 0x{byte:02x}");
        }
    }
    ipac_hid::format_event(label, event)
}
