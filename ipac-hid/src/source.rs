//! Report sources: bounded-timeout reads over one opened input stream
//!
//! Every monitored interface is serviced through the same `read`-shaped
//! interface regardless of which layer of the input stack it taps. A read
//! yields a report, times out empty, or signals an orderly end of stream;
//! anything else is an error that ends the owning session.

use std::io::{self, Read};
use std::time::Duration;

use hidapi::HidDevice;

use crate::error::MonitorError;
use crate::report::{RawReport, MAX_REPORT_LEN};

/// One read result.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A report arrived within the timeout.
    Report(RawReport),
    /// Nothing arrived within the timeout; callers loop again.
    Empty,
    /// The stream ended cleanly; the session exits without error.
    Closed,
}

/// A blocking-with-timeout read primitive over one input stream.
pub trait ReportSource {
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, MonitorError>;
}

/// Direct HID report reads over one opened interface handle.
pub struct HidSource {
    device: HidDevice,
}

impl HidSource {
    pub fn new(device: HidDevice) -> Self {
        Self { device }
    }
}

impl ReportSource for HidSource {
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, MonitorError> {
        let mut buf = [0u8; MAX_REPORT_LEN];
        match self.device.read_timeout(&mut buf, timeout.as_millis() as i32) {
            Ok(0) => Ok(ReadOutcome::Empty),
            Ok(len) => Ok(ReadOutcome::Report(RawReport::from_slice(&buf[..len]))),
            Err(e) => Err(e.into()),
        }
    }
}

/// The conventional interrupt byte; ends the terminal stream
const ETX: u8 = 0x03;

/// Raw terminal byte stream: each received byte is a one-byte report.
///
/// Switches the terminal to raw mode for its lifetime. Reads block until
/// the next byte rather than honoring the poll timeout; raw mode delivers
/// Ctrl+C as the 0x03 byte, which closes the stream.
pub struct TerminalSource {
    stdin: io::Stdin,
}

impl TerminalSource {
    pub fn new() -> Result<Self, MonitorError> {
        crossterm::terminal::enable_raw_mode().map_err(MonitorError::Terminal)?;
        Ok(Self { stdin: io::stdin() })
    }
}

impl ReportSource for TerminalSource {
    fn read(&mut self, _timeout: Duration) -> Result<ReadOutcome, MonitorError> {
        let mut byte = [0u8; 1];
        match self.stdin.read(&mut byte) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(_) if byte[0] == ETX => Ok(ReadOutcome::Closed),
            Ok(_) => Ok(ReadOutcome::Report(RawReport::from_slice(&byte))),
            Err(e) => Err(MonitorError::Terminal(e)),
        }
    }
}

impl Drop for TerminalSource {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
