//! HID report monitoring engine for Ultimarc I-PAC arcade controllers
//!
//! This crate turns opaque fixed-size report buffers, delivered
//! asynchronously from one or many device interfaces, into a stable,
//! deduplicated, human-meaningful event stream:
//!
//! - [`catalog`]: enumerate and classify the controller's HID interfaces
//! - [`source`]: bounded-timeout read primitives over one input stream
//!   (direct HID reports, raw terminal bytes)
//! - [`report`]: pure boot-keyboard decoding plus per-session duplicate
//!   suppression
//! - [`engine`]: one read loop per interface, fanned into a single sink
//! - [`sink`]: serialized line output
//!
//! On Linux, [`tap`] adds a system-level keyboard event tap behind the
//! same source interface.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod report;
pub mod sink;
pub mod source;

#[cfg(target_os = "linux")]
pub mod tap;

pub use catalog::{DeviceCatalog, InterfaceClass, InterfaceInfo, ULTIMARC_VENDOR_ID};
pub use engine::{run_sessions, Session};
pub use error::MonitorError;
pub use report::{
    decode, Admission, ChangeDetector, DecodedEvent, Modifiers, RawReport, MAX_REPORT_LEN,
};
pub use sink::{format_event, hex_dump, EventSink};
pub use source::{HidSource, ReadOutcome, ReportSource, TerminalSource};

#[cfg(target_os = "linux")]
pub use tap::TapSource;
