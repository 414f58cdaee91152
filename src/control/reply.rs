//! Control protocol reply and event parsing
//!
//! Replies are CRLF-terminated lines of the form `<3-digit code><sep><text>`
//! where the separator is `-` for continuation lines, `+` for the start of a
//! data block, and a space for the final line. Asynchronous notifications
//! carry code 650.

use crate::error::ControlError;

/// Status code carried by asynchronous event notifications
pub const EVENT_CODE: u16 = 650;

/// A parsed reply from the control port. Transient; not persisted.
#[derive(Debug, Clone)]
pub struct ControlReply {
    /// Status code of the final reply line
    pub status: u16,
    /// Payload of each reply line, codes stripped
    pub lines: Vec<String>,
    /// The reply as received, for surfacing daemon messages verbatim
    pub raw: String,
}

impl ControlReply {
    /// Whether the daemon accepted the command
    pub fn is_ok(&self) -> bool {
        self.status == 250
    }

    /// Full reply text as received
    pub fn text(&self) -> &str {
        &self.raw
    }
}

/// Split a reply line into (code, separator, payload).
///
/// Fails with `ControlError::Protocol` on anything that does not match the
/// `<3-digit code><SP|-|+>` grammar.
pub(crate) fn parse_status_line(line: &str) -> Result<(u16, char, &str), ControlError> {
    if line.len() < 4 {
        return Err(malformed(line));
    }
    let code: u16 = line
        .get(..3)
        .ok_or_else(|| malformed(line))?
        .parse()
        .map_err(|_| malformed(line))?;
    let sep = line.as_bytes()[3] as char;
    if !matches!(sep, ' ' | '-' | '+') {
        return Err(malformed(line));
    }
    Ok((code, sep, line.get(4..).unwrap_or("")))
}

fn malformed(line: &str) -> ControlError {
    ControlError::Protocol(line.to_string())
}

/// A circuit-status notification: `650 CIRC <id> <status> ...`.
/// Not persisted beyond the wait loop that consumes it.
#[derive(Debug, Clone)]
pub struct CircuitEvent {
    pub circuit_id: String,
    pub status: String,
    /// Remaining tokens (circuit path, build flags)
    pub details: String,
}

impl CircuitEvent {
    /// Parse a raw line as a circuit event. Returns `None` for replies,
    /// non-CIRC events, and anything else that does not match.
    pub fn parse(line: &str) -> Option<Self> {
        let (code, _, payload) = parse_status_line(line).ok()?;
        if code != EVENT_CODE {
            return None;
        }
        let mut parts = payload.split_whitespace();
        if parts.next()? != "CIRC" {
            return None;
        }
        let circuit_id = parts.next()?.to_string();
        let status = parts.next()?.to_string();
        let details = parts.collect::<Vec<_>>().join(" ");
        Some(Self {
            circuit_id,
            status,
            details,
        })
    }

    /// Whether the daemon reports this circuit as fully built
    pub fn is_built(&self) -> bool {
        self.status == "BUILT"
    }
}
