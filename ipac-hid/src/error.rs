//! Monitor error types

use thiserror::Error;

/// Errors that can occur while enumerating, opening or reading interfaces
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("HID enumeration failed: {0}")]
    Enumeration(String),

    #[error("No matching device: {0}")]
    NoDevice(String),

    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

#[cfg(target_os = "macos")]
const PERMISSION_HINT: &str =
    "Grant Input Monitoring permission to your terminal: System Settings > Privacy & Security > Input Monitoring";
#[cfg(not(target_os = "macos"))]
const PERMISSION_HINT: &str =
    "Add your user to the 'input' group or install a udev rule for the device, then replug it";

impl MonitorError {
    /// Which OS-level setting to change, when this error is a permission denial.
    pub fn permission_hint(&self) -> Option<&'static str> {
        matches!(self, MonitorError::PermissionDenied(_)).then_some(PERMISSION_HINT)
    }
}

pub(crate) fn is_permission_denied(message: &str) -> bool {
    message.contains("Permission denied")
        || message.contains("EPERM")
        || message.contains("not permitted")
}

impl From<hidapi::HidError> for MonitorError {
    fn from(e: hidapi::HidError) -> Self {
        let message = e.to_string();
        if is_permission_denied(&message) {
            MonitorError::PermissionDenied(message)
        } else {
            MonitorError::Read(message)
        }
    }
}
