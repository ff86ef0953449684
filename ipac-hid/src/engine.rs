//! Fan-in dispatcher: one read loop per monitored interface
//!
//! Each session runs on its own thread with a bounded per-read timeout so
//! it stays responsive to shutdown between reads. Sessions share nothing
//! but the sink; duplicate-suppression state is owned by its session. A
//! read error ends only the owning session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::catalog::InterfaceClass;
use crate::report::{decode, Admission, ChangeDetector};
use crate::sink::EventSink;
use crate::source::{ReadOutcome, ReportSource};

/// One monitored interface: its label, decode policy and report source.
pub struct Session {
    pub label: Option<String>,
    pub class: InterfaceClass,
    pub source: Box<dyn ReportSource + Send>,
}

impl Session {
    pub fn new(
        label: Option<String>,
        class: InterfaceClass,
        source: Box<dyn ReportSource + Send>,
    ) -> Self {
        Self {
            label,
            class,
            source,
        }
    }
}

/// Run every session to completion, one thread each, emitting to `sink`.
///
/// Returns once all sessions have ended. Setting `shutdown` makes each
/// loop exit after its current read; events from one session are never
/// reordered relative to each other, while cross-session order within a
/// polling window is unspecified.
pub fn run_sessions(
    sessions: Vec<Session>,
    sink: &Arc<EventSink>,
    shutdown: &Arc<AtomicBool>,
    timeout: Duration,
) {
    let mut handles = Vec::with_capacity(sessions.len());
    for (index, session) in sessions.into_iter().enumerate() {
        let sink = Arc::clone(sink);
        let shutdown = Arc::clone(shutdown);
        let handle = thread::Builder::new()
            .name(format!("ipac-session-{index}"))
            .spawn(move || run_session(session, sink, shutdown, timeout))
            .expect("Failed to spawn session thread");
        handles.push(handle);
    }
    for handle in handles {
        let _ = handle.join();
    }
}

fn run_session(
    mut session: Session,
    sink: Arc<EventSink>,
    shutdown: Arc<AtomicBool>,
    timeout: Duration,
) {
    let mut detector = ChangeDetector::new();
    let label = session.label.as_deref().unwrap_or("-").to_string();
    debug!("session {label} started");

    while !shutdown.load(Ordering::Relaxed) {
        match session.source.read(timeout) {
            Ok(ReadOutcome::Report(report)) => {
                if detector.admit(&report) == Admission::Changed {
                    let event = decode(&report, session.class);
                    sink.emit(session.label.as_deref(), &event);
                }
            }
            Ok(ReadOutcome::Empty) => {}
            Ok(ReadOutcome::Closed) => {
                debug!("session {label} closed its stream");
                break;
            }
            Err(e) => {
                let message = match session.label.as_deref() {
                    Some(l) => format!("[{l}] Error: {e}"),
                    None => format!("Error: {e}"),
                };
                sink.line(&message);
                break;
            }
        }
    }

    debug!("session {label} exiting");
}
