//! DATA-phase transparency (RFC 5321 §4.5.2).

/// End-of-data line.
pub const DATA_TERMINATOR: &[u8] = b".\r\n";

/// Encodes a message for transmission after a 354 reply.
///
/// Line endings are normalized to CRLF, a `.` at the start of any line is
/// doubled, the payload is terminated by CRLF, and the `.` end-of-data
/// line is appended. A trailing newline in `message` does not produce an
/// extra empty line.
#[must_use]
pub fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 32 + 8);

    let body = message.strip_suffix(b"\n").unwrap_or(message);
    if !message.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(DATA_TERMINATOR);
    out
}
