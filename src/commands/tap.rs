//! System-level keyboard tap monitor (Linux evdev).

use std::sync::Arc;
use std::time::Duration;

use ipac_hid::{EventSink, InterfaceClass, Session, TapSource};

use super::{banner, report_failure, setup_interrupt_handler, CommandResult};

pub fn run(timeout: Duration) -> CommandResult {
    banner("I-PAC Input Monitor (evdev tap)");
    println!("Press buttons on your controller. Ctrl+C to quit.");
    println!();
    println!("NOTE: If nothing appears, add your user to the 'input'");
    println!("group or run with elevated privileges.");
    println!();

    let taps = match TapSource::open_all() {
        Ok(taps) => taps,
        Err(e) => {
            report_failure(&e);
            return Ok(());
        }
    };

    let sink = Arc::new(EventSink::stdout());
    let mut sessions = Vec::new();
    for (label, tap) in taps {
        sink.line(&format!("[{label}] Listening..."));
        sessions.push(Session::new(
            Some(label),
            InterfaceClass::Keyboard,
            Box::new(tap),
        ));
    }

    let shutdown = setup_interrupt_handler();
    ipac_hid::run_sessions(sessions, &sink, &shutdown, timeout);

    println!("\nDone.");
    Ok(())
}
