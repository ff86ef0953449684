//! Output sink: one formatted line per decoded event
//!
//! All sessions emit through one sink; a single exclusive-write critical
//! section per line keeps concurrent sessions from interleaving mid-line.

use std::io::{self, Write};

use parking_lot::Mutex;

use crate::report::DecodedEvent;

type LineFormatter = Box<dyn Fn(Option<&str>, &DecodedEvent) -> String + Send + Sync>;

/// Serializes event lines from concurrent sessions onto one writer.
pub struct EventSink {
    out: Mutex<Box<dyn Write + Send>>,
    newline: &'static str,
    formatter: LineFormatter,
}

impl EventSink {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            newline: "\n",
            formatter: Box::new(format_event),
        }
    }

    /// Line terminator override; raw-mode terminals need `"\r\n"`.
    pub fn with_newline(mut self, newline: &'static str) -> Self {
        self.newline = newline;
        self
    }

    /// Replace the default event formatter.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(Option<&str>, &DecodedEvent) -> String + Send + Sync + 'static,
    {
        self.formatter = Box::new(formatter);
        self
    }

    /// Format and write one event line.
    pub fn emit(&self, label: Option<&str>, event: &DecodedEvent) {
        self.line(&(self.formatter)(label, event));
    }

    /// Write one preformatted line, serialized against concurrent emitters.
    pub fn line(&self, line: &str) {
        let mut out = self.out.lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.write_all(self.newline.as_bytes());
        let _ = out.flush();
    }
}

/// Space-separated lowercase hex dump.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Default line layout.
///
/// Keyboard events: modifier names joined by `+` (or `none`), active
/// keycodes as `0x`-prefixed hex joined by `, ` (or `none`), and the raw
/// bytes as a hex dump. An all-zero report prints as `(released)`. Raw
/// events print the hex dump alone. A label, when given, prefixes the line.
pub fn format_event(label: Option<&str>, event: &DecodedEvent) -> String {
    let prefix = label.map(|l| format!("[{l}] ")).unwrap_or_default();
    match event {
        DecodedEvent::Keyboard { released: true, .. } => format!("{prefix}(released)"),
        DecodedEvent::Keyboard {
            modifiers,
            keycodes,
            raw,
            ..
        } => {
            let keys = if keycodes.is_empty() {
                "none".to_string()
            } else {
                keycodes
                    .iter()
                    .map(|k| format!("0x{k:02x}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "{prefix}Modifier: {modifiers:<20}  Keys: {keys:<20}  Raw: [{}]",
                hex_dump(raw)
            )
        }
        DecodedEvent::Raw(bytes) => format!("{prefix}Data: [{}]", hex_dump(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InterfaceClass;
    use crate::report::{decode, RawReport};

    fn keyboard_event(bytes: &[u8]) -> DecodedEvent {
        decode(&RawReport::from_slice(bytes), InterfaceClass::Keyboard)
    }

    #[test]
    fn released_report_formats_as_released() {
        let event = keyboard_event(&[0u8; 8]);
        assert_eq!(format_event(None, &event), "(released)");
        assert_eq!(format_event(Some("a"), &event), "[a] (released)");
    }

    #[test]
    fn keyboard_line_carries_all_three_fields_in_order() {
        let event = keyboard_event(&[0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let line = format_event(None, &event);
        assert!(line.starts_with("Modifier: L-Ctrl"));
        assert!(line.contains("Keys: 0x04"));
        assert!(line.ends_with("Raw: [01 00 04 00 00 00 00 00]"));
        let keys_at = line.find("Keys:").unwrap();
        assert!(line.find("Modifier:").unwrap() < keys_at);
        assert!(keys_at < line.find("Raw:").unwrap());
    }

    #[test]
    fn keycodes_join_with_comma() {
        let event = keyboard_event(&[0x00, 0x00, 0x04, 0x05, 0x00, 0x00, 0x00, 0x00]);
        assert!(format_event(None, &event).contains("Keys: 0x04, 0x05"));
    }

    #[test]
    fn raw_line_is_labelled_hex() {
        let event = DecodedEvent::Raw(vec![0xde, 0xad, 0x00]);
        assert_eq!(
            format_event(Some("iface1/up65280/u1"), &event),
            "[iface1/up65280/u1] Data: [de ad 00]"
        );
    }

    #[test]
    fn hex_dump_is_lowercase_and_space_separated() {
        assert_eq!(hex_dump(&[0x00, 0xAB, 0x7F]), "00 ab 7f");
        assert_eq!(hex_dump(&[]), "");
    }
}
