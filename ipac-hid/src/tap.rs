//! System-level keyboard tap via evdev
//!
//! Alternate report source for the layer above the device: instead of
//! reading HID reports off an interface, it watches kernel key events and
//! mirrors the held-key set into boot-keyboard report form on every event.
//! The synthesized reports feed the standard decode/dedup/sink pipeline;
//! key repeats synthesize an unchanged report and are suppressed there.

use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use evdev::{Device, InputEventKind, Key};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use tracing::{debug, warn};

use crate::error::MonitorError;
use crate::report::RawReport;
use crate::source::{ReadOutcome, ReportSource};

/// Sleep between polls of a quiet device
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Evdev modifier keys mapped onto the boot-report modifier bitmask
const MODIFIER_KEYS: [(Key, u8); 8] = [
    (Key::KEY_LEFTCTRL, 0x01),
    (Key::KEY_LEFTSHIFT, 0x02),
    (Key::KEY_LEFTALT, 0x04),
    (Key::KEY_LEFTMETA, 0x08),
    (Key::KEY_RIGHTCTRL, 0x10),
    (Key::KEY_RIGHTSHIFT, 0x20),
    (Key::KEY_RIGHTALT, 0x40),
    (Key::KEY_RIGHTMETA, 0x80),
];

fn modifier_bit(code: u16) -> Option<u8> {
    MODIFIER_KEYS
        .iter()
        .find(|(key, _)| key.code() == code)
        .map(|&(_, bit)| bit)
}

/// Held-key state mirrored into boot-keyboard report form.
#[derive(Debug, Default)]
struct TapState {
    modifiers: u8,
    held: Vec<u16>,
}

impl TapState {
    fn apply(&mut self, code: u16, value: i32) {
        // value: 0 = release, 1 = press, 2 = autorepeat
        let pressed = value != 0;
        if let Some(bit) = modifier_bit(code) {
            if pressed {
                self.modifiers |= bit;
            } else {
                self.modifiers &= !bit;
            }
            return;
        }
        if code > u8::MAX as u16 {
            // BTN_* ranges, not keyboard codes
            return;
        }
        if pressed {
            if !self.held.contains(&code) {
                self.held.push(code);
            }
        } else {
            self.held.retain(|&held| held != code);
        }
    }

    /// Boot-keyboard shaped report: modifier byte, reserved byte, up to six
    /// held key codes in press order.
    fn synthesize(&self) -> RawReport {
        let mut bytes = [0u8; 8];
        bytes[0] = self.modifiers;
        for (slot, &code) in bytes[2..].iter_mut().zip(self.held.iter()) {
            *slot = code as u8;
        }
        RawReport::from_slice(&bytes)
    }
}

/// One tapped keyboard device.
pub struct TapSource {
    device: Device,
    state: TapState,
}

impl TapSource {
    /// Open every readable keyboard device under /dev/input.
    ///
    /// Returns one labelled source per device. Devices the process cannot
    /// read are skipped; if none remain the error names the permission to
    /// grant.
    pub fn open_all() -> Result<Vec<(String, TapSource)>, MonitorError> {
        let mut sources = Vec::new();
        for (path, device) in evdev::enumerate() {
            let is_keyboard = device
                .supported_keys()
                .is_some_and(|keys| keys.contains(Key::KEY_A));
            if !is_keyboard {
                continue;
            }
            let label = device.name().unwrap_or("keyboard").to_string();
            match TapSource::from_device(&path, device) {
                Ok(source) => {
                    debug!("tapping {label} ({})", path.display());
                    sources.push((label, source));
                }
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        if sources.is_empty() {
            return Err(if input_event_node_count() > 0 {
                MonitorError::PermissionDenied(
                    "cannot read any keyboard device under /dev/input".into(),
                )
            } else {
                MonitorError::NoDevice("no input event devices under /dev/input".into())
            });
        }
        Ok(sources)
    }

    fn from_device(path: &Path, device: Device) -> Result<Self, MonitorError> {
        let fd = device.as_raw_fd();
        let open_error = |e: nix::Error| MonitorError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(open_error)?;
        let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
        fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(open_error)?;
        Ok(Self {
            device,
            state: TapState::default(),
        })
    }
}

impl ReportSource for TapSource {
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, MonitorError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.device.fetch_events() {
                Ok(events) => {
                    let mut saw_key = false;
                    for event in events {
                        if let InputEventKind::Key(key) = event.kind() {
                            self.state.apply(key.code(), event.value());
                            saw_key = true;
                        }
                    }
                    if saw_key {
                        return Ok(ReadOutcome::Report(self.state.synthesize()));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Ok(ReadOutcome::Empty);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(MonitorError::Read(e.to_string())),
            }
        }
    }
}

fn input_event_node_count() -> usize {
    std::fs::read_dir("/dev/input")
        .map(|entries| {
            entries
                .flatten()
                .filter(|entry| entry.file_name().to_string_lossy().starts_with("event"))
                .count()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_round_trip_through_report_form() {
        let mut state = TapState::default();
        state.apply(Key::KEY_LEFTCTRL.code(), 1);
        state.apply(Key::KEY_A.code(), 1);
        let report = state.synthesize();
        assert_eq!(report.as_bytes()[0], 0x01);
        assert_eq!(report.as_bytes()[1], 0x00);
        assert_eq!(report.as_bytes()[2], Key::KEY_A.code() as u8);

        state.apply(Key::KEY_A.code(), 0);
        state.apply(Key::KEY_LEFTCTRL.code(), 0);
        assert!(state.synthesize().is_all_zero());
    }

    #[test]
    fn autorepeat_leaves_report_unchanged() {
        let mut state = TapState::default();
        state.apply(Key::KEY_A.code(), 1);
        let before = state.synthesize();
        state.apply(Key::KEY_A.code(), 2);
        assert_eq!(state.synthesize(), before);
    }

    #[test]
    fn all_eight_modifiers_map_to_their_bits() {
        let mut state = TapState::default();
        for (key, _) in MODIFIER_KEYS {
            state.apply(key.code(), 1);
        }
        let report = state.synthesize();
        assert_eq!(report.as_bytes()[0], 0xff);
        // Modifiers never occupy keycode slots
        assert!(report.as_bytes()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn held_keys_cap_at_six_slots_in_press_order() {
        let mut state = TapState::default();
        let keys = [
            Key::KEY_A,
            Key::KEY_B,
            Key::KEY_C,
            Key::KEY_D,
            Key::KEY_E,
            Key::KEY_F,
            Key::KEY_G,
        ];
        for key in keys {
            state.apply(key.code(), 1);
        }
        let report = state.synthesize();
        let slots: Vec<u8> = report.as_bytes()[2..].to_vec();
        let expected: Vec<u8> = keys[..6].iter().map(|k| k.code() as u8).collect();
        assert_eq!(slots, expected);
    }

    #[test]
    fn button_range_codes_are_ignored() {
        let mut state = TapState::default();
        state.apply(Key::BTN_LEFT.code(), 1);
        assert!(state.synthesize().is_all_zero());
    }
}
