//! Device discovery for I-PAC HID interfaces
//!
//! The controller exposes several HID interfaces behind one vendor id. The
//! catalog lists them, classifies each by its usage-page/usage pair, and
//! opens read handles. Classification is the single source of truth for
//! which decode path a session uses.

use std::ffi::CString;
use std::fmt;

use hidapi::HidApi;
use tracing::debug;

use crate::error::{is_permission_denied, MonitorError};
use crate::source::HidSource;

/// USB vendor id for Ultimarc controllers (I-PAC family)
pub const ULTIMARC_VENDOR_ID: u16 = 0xD209;

/// Generic desktop usage page
const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;
/// Keyboard usage within the generic desktop page
const USAGE_KEYBOARD: u16 = 0x06;

/// Report-layout policy tag for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceClass {
    /// Boot-keyboard reports (usage page 1, usage 6)
    Keyboard,
    /// Anything else: raw passthrough
    Vendor,
}

impl InterfaceClass {
    pub fn classify(usage_page: u16, usage: u16) -> Self {
        if usage_page == USAGE_PAGE_GENERIC_DESKTOP && usage == USAGE_KEYBOARD {
            InterfaceClass::Keyboard
        } else {
            InterfaceClass::Vendor
        }
    }
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceClass::Keyboard => f.pad("keyboard"),
            InterfaceClass::Vendor => f.pad("vendor"),
        }
    }
}

/// One enumerated HID interface endpoint.
///
/// Read once at startup and kept immutable; sources borrow the path to
/// open a handle.
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_number: i32,
    pub usage_page: u16,
    pub usage: u16,
    pub product: Option<String>,
    /// Opaque open-handle path for `HidApi::open_path`
    pub path: CString,
}

impl InterfaceInfo {
    pub fn class(&self) -> InterfaceClass {
        InterfaceClass::classify(self.usage_page, self.usage)
    }

    /// Short per-interface label for fan-out output lines.
    pub fn label(&self) -> String {
        format!(
            "iface{}/up{}/u{}",
            self.interface_number, self.usage_page, self.usage
        )
    }
}

/// Lists and opens interfaces for one vendor id.
pub struct DeviceCatalog {
    api: HidApi,
    vendor_id: u16,
}

impl DeviceCatalog {
    /// Initialize the platform HID subsystem.
    ///
    /// Fails with [`MonitorError::Enumeration`] if the platform listing
    /// itself is unavailable; an empty interface list later is not an error.
    pub fn new(vendor_id: u16) -> Result<Self, MonitorError> {
        let api = HidApi::new().map_err(|e| MonitorError::Enumeration(e.to_string()))?;
        Ok(Self { api, vendor_id })
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// Every visible HID interface whose vendor id matches, in enumeration
    /// order.
    pub fn interfaces(&self) -> Vec<InterfaceInfo> {
        let mut found = Vec::new();
        for device_info in self.api.device_list() {
            if device_info.vendor_id() != self.vendor_id {
                continue;
            }
            let info = InterfaceInfo {
                vendor_id: device_info.vendor_id(),
                product_id: device_info.product_id(),
                interface_number: device_info.interface_number(),
                usage_page: device_info.usage_page(),
                usage: device_info.usage(),
                product: device_info.product_string().map(|s| s.to_string()),
                path: device_info.path().to_owned(),
            };
            debug!(
                "found interface: VID={:04x} PID={:04x} {} class={}",
                info.vendor_id,
                info.product_id,
                info.label(),
                info.class()
            );
            found.push(info);
        }
        debug!("{} matching interface(s)", found.len());
        found
    }

    /// Tie-break for single-interface monitors: the first keyboard-classified
    /// interface, else the first in enumeration order.
    pub fn select_primary(interfaces: &[InterfaceInfo]) -> Option<&InterfaceInfo> {
        interfaces
            .iter()
            .find(|info| info.class() == InterfaceClass::Keyboard)
            .or_else(|| interfaces.first())
    }

    /// Acquire exclusive read access to one interface.
    pub fn open(&self, info: &InterfaceInfo) -> Result<HidSource, MonitorError> {
        match self.api.open_path(&info.path) {
            Ok(device) => Ok(HidSource::new(device)),
            Err(e) => {
                let message = e.to_string();
                if is_permission_denied(&message) {
                    Err(MonitorError::PermissionDenied(message))
                } else {
                    Err(MonitorError::Open {
                        path: info.path.to_string_lossy().into_owned(),
                        message,
                    })
                }
            }
        }
    }
}
