//! Boot-keyboard report decoding and per-interface change detection
//!
//! The decode path is pure: raw bytes plus an interface classification in,
//! a structured event out. All statefulness (duplicate suppression) lives
//! in [`ChangeDetector`], one per interface session.

use std::fmt;

use crate::catalog::InterfaceClass;

/// Largest report any interface delivers per read
pub const MAX_REPORT_LEN: usize = 64;

/// One raw HID report as delivered by a single read call.
#[derive(Clone, Copy)]
pub struct RawReport {
    buf: [u8; MAX_REPORT_LEN],
    len: usize,
}

impl RawReport {
    /// Build a report from read bytes, truncating past [`MAX_REPORT_LEN`].
    pub fn from_slice(data: &[u8]) -> Self {
        let len = data.len().min(MAX_REPORT_LEN);
        let mut buf = [0u8; MAX_REPORT_LEN];
        buf[..len].copy_from_slice(&data[..len]);
        Self { buf, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_all_zero(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }
}

impl PartialEq for RawReport {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for RawReport {}

impl fmt::Debug for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawReport({:02x?})", self.as_bytes())
    }
}

/// Boot-report modifier bitmask (byte 0 of a keyboard report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

/// Bit-to-name table from the USB boot keyboard report layout
const MODIFIER_TABLE: [(u8, &str); 8] = [
    (0x01, "L-Ctrl"),
    (0x02, "L-Shift"),
    (0x04, "L-Alt"),
    (0x08, "L-Super"),
    (0x10, "R-Ctrl"),
    (0x20, "R-Shift"),
    (0x40, "R-Alt"),
    (0x80, "R-Super"),
];

impl Modifiers {
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active modifier names in bit order.
    pub fn names(self) -> Vec<&'static str> {
        MODIFIER_TABLE
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|&(_, name)| name)
            .collect()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.pad("none")
        } else {
            f.pad(&self.names().join("+"))
        }
    }
}

/// Result of interpreting one raw report under an interface's layout policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Boot-keyboard report: modifier set plus active keycodes in read order.
    ///
    /// `released` is true exactly when every byte of the source report was
    /// zero; modifiers and keycodes are then both empty.
    Keyboard {
        modifiers: Modifiers,
        keycodes: Vec<u8>,
        released: bool,
        raw: Vec<u8>,
    },
    /// Unmodified payload from an interface with no keyboard layout.
    Raw(Vec<u8>),
}

/// Interpret a raw report. Pure: no I/O, no state.
///
/// Keyboard layout: byte 0 is the modifier bitmask, byte 1 is reserved,
/// every non-zero byte from offset 2 on is an active keycode. Duplicate
/// keycodes within one report are kept; zero slots are dropped.
pub fn decode(report: &RawReport, class: InterfaceClass) -> DecodedEvent {
    let bytes = report.as_bytes();
    match class {
        InterfaceClass::Vendor => DecodedEvent::Raw(bytes.to_vec()),
        InterfaceClass::Keyboard => {
            if report.is_all_zero() {
                return DecodedEvent::Keyboard {
                    modifiers: Modifiers::default(),
                    keycodes: Vec::new(),
                    released: true,
                    raw: bytes.to_vec(),
                };
            }
            let modifiers = Modifiers::from_bits(bytes.first().copied().unwrap_or(0));
            let keycodes = bytes
                .get(2..)
                .unwrap_or(&[])
                .iter()
                .copied()
                .filter(|&b| b != 0)
                .collect();
            DecodedEvent::Keyboard {
                modifiers,
                keycodes,
                released: false,
                raw: bytes.to_vec(),
            }
        }
    }
}

/// Verdict from [`ChangeDetector::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Differs from the previous report on this session (or is the first).
    Changed,
    /// Byte-identical to the previous report; suppress it.
    Duplicate,
}

/// Per-session duplicate suppression.
///
/// HID devices repeat the current report at the polling interval while a
/// key is held; only edge transitions are worth emitting. Comparison is
/// over the literal filled buffer, trailing padding included, with no
/// normalization. This is not a debounce: two different reports in
/// immediate succession are both admitted.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<RawReport>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a freshly read report, updating the stored state on `Changed`.
    pub fn admit(&mut self, report: &RawReport) -> Admission {
        if self.last.as_ref() == Some(report) {
            Admission::Duplicate
        } else {
            self.last = Some(*report);
            Admission::Changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard(bytes: &[u8]) -> DecodedEvent {
        decode(&RawReport::from_slice(bytes), InterfaceClass::Keyboard)
    }

    #[test]
    fn all_zero_reports_decode_as_released() {
        for len in [1usize, 8, 64] {
            let event = keyboard(&vec![0u8; len]);
            match event {
                DecodedEvent::Keyboard {
                    modifiers,
                    keycodes,
                    released,
                    ..
                } => {
                    assert!(released, "len {len}");
                    assert!(modifiers.is_empty());
                    assert!(keycodes.is_empty());
                }
                other => panic!("expected keyboard event, got {other:?}"),
            }
        }
    }

    #[test]
    fn ctrl_plus_keycode() {
        let event = keyboard(&[0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
        match event {
            DecodedEvent::Keyboard {
                modifiers,
                keycodes,
                released,
                ..
            } => {
                assert!(!released);
                assert_eq!(modifiers.names(), vec!["L-Ctrl"]);
                assert_eq!(keycodes, vec![0x04]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keycode_order_preserved_and_zeros_dropped() {
        let event = keyboard(&[0x00, 0x00, 0x04, 0x00, 0x05, 0x00, 0x00, 0x04]);
        match event {
            DecodedEvent::Keyboard { keycodes, .. } => {
                assert_eq!(keycodes, vec![0x04, 0x05, 0x04]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn modifier_bit_0x80_is_right_super() {
        let event = keyboard(&[0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        match event {
            DecodedEvent::Keyboard {
                modifiers,
                keycodes,
                released,
                ..
            } => {
                assert!(!released);
                assert_eq!(modifiers.to_string(), "R-Super");
                assert!(keycodes.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn all_modifier_bits_render_in_table_order() {
        assert_eq!(
            Modifiers::from_bits(0xff).to_string(),
            "L-Ctrl+L-Shift+L-Alt+L-Super+R-Ctrl+R-Shift+R-Alt+R-Super"
        );
        assert_eq!(Modifiers::default().to_string(), "none");
    }

    #[test]
    fn vendor_class_passes_bytes_through() {
        let event = decode(
            &RawReport::from_slice(&[0xde, 0xad, 0x00, 0xbe]),
            InterfaceClass::Vendor,
        );
        assert_eq!(event, DecodedEvent::Raw(vec![0xde, 0xad, 0x00, 0xbe]));
    }

    #[test]
    fn first_report_is_always_changed() {
        let mut detector = ChangeDetector::new();
        let zero = RawReport::from_slice(&[0u8; 8]);
        assert_eq!(detector.admit(&zero), Admission::Changed);
    }

    #[test]
    fn duplicate_leaves_stored_state_untouched() {
        let mut detector = ChangeDetector::new();
        let a = RawReport::from_slice(&[0, 0, 4, 0, 0, 0, 0, 0]);
        let b = RawReport::from_slice(&[0, 0, 5, 0, 0, 0, 0, 0]);
        assert_eq!(detector.admit(&a), Admission::Changed);
        assert_eq!(detector.admit(&a), Admission::Duplicate);
        assert_eq!(detector.admit(&a), Admission::Duplicate);
        assert_eq!(detector.admit(&b), Admission::Changed);
        assert_eq!(detector.admit(&a), Admission::Changed);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let report = RawReport::from_slice(&[0, 0, 4, 0, 0, 0, 0, 0]);
        let mut a = ChangeDetector::new();
        let mut b = ChangeDetector::new();
        assert_eq!(a.admit(&report), Admission::Changed);
        assert_eq!(b.admit(&report), Admission::Changed);
    }

    #[test]
    fn reports_differing_only_in_reserved_byte_are_distinct() {
        let mut detector = ChangeDetector::new();
        let a = RawReport::from_slice(&[0, 0, 4, 0, 0, 0, 0, 0]);
        let b = RawReport::from_slice(&[0, 1, 4, 0, 0, 0, 0, 0]);
        assert_eq!(detector.admit(&a), Admission::Changed);
        assert_eq!(detector.admit(&b), Admission::Changed);
    }

    #[test]
    fn reports_of_different_length_are_distinct() {
        let mut detector = ChangeDetector::new();
        assert_eq!(
            detector.admit(&RawReport::from_slice(&[0u8; 8])),
            Admission::Changed
        );
        assert_eq!(
            detector.admit(&RawReport::from_slice(&[0u8; 4])),
            Admission::Changed
        );
    }
}
