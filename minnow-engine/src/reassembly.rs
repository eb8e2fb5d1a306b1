//! Reconstructing complete protocol lines from an arbitrarily chunked
//! byte stream.

/// Line terminator on the wire.
const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Accumulates raw bytes and yields complete CRLF-terminated lines.
///
/// The buffer holds bytes, not decoded text: a multi-byte UTF-8 sequence
/// may arrive split across chunks, and splitting must only ever happen on
/// the terminator. Complete lines are decoded lossily on emission.
#[derive(Debug, Default)]
pub struct LineReassembler {
    buf: Vec<u8>,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly received bytes and drain every complete line, in
    /// arrival order.
    ///
    /// Lines that are empty or whitespace-only after trimming are
    /// discarded. The final fragment (possibly empty) stays buffered for
    /// the next call, so splitting a stream at arbitrary chunk boundaries
    /// yields the same line sequence as one-shot delivery.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = find_terminator(&self.buf) {
            let raw: Vec<u8> = self.buf.drain(..pos + LINE_TERMINATOR.len()).collect();
            let text = String::from_utf8_lossy(&raw[..pos]);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Bytes currently held back as an incomplete line.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len()).position(|w| w == LINE_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &[u8] =
        "PING :a\r\n:álvaro!u@h PRIVMSG #café :héllo wörld\r\n   \r\nNOTICE * :done\r\n".as_bytes();

    #[test]
    fn splits_complete_lines_and_retains_remainder() {
        let mut r = LineReassembler::new();
        let lines = r.push(b"PING :a\r\nPART #x\r\nPRIV");
        assert_eq!(lines, ["PING :a", "PART #x"]);
        assert_eq!(r.pending(), b"PRIV");

        let lines = r.push(b"MSG #x :hi\r\n");
        assert_eq!(lines, ["PRIVMSG #x :hi"]);
        assert!(r.pending().is_empty());
    }

    #[test]
    fn whitespace_only_lines_are_discarded() {
        let mut r = LineReassembler::new();
        assert!(r.push(b"\r\n   \r\n\t\r\n").is_empty());
    }

    #[test]
    fn bare_cr_is_not_a_terminator() {
        let mut r = LineReassembler::new();
        assert!(r.push(b"PING :a\r").is_empty());
        assert_eq!(r.push(b"\n"), ["PING :a"]);
    }

    #[test]
    fn chunk_boundary_invariance() {
        let expected = LineReassembler::new().push(STREAM);
        for split in 0..=STREAM.len() {
            let mut r = LineReassembler::new();
            let mut lines = r.push(&STREAM[..split]);
            lines.extend(r.push(&STREAM[split..]));
            assert_eq!(lines, expected, "split at byte {split}");
        }
    }

    #[test]
    fn byte_at_a_time_delivery_matches_one_shot() {
        let expected = LineReassembler::new().push(STREAM);
        let mut r = LineReassembler::new();
        let mut lines = Vec::new();
        for b in STREAM {
            lines.extend(r.push(&[*b]));
        }
        assert_eq!(lines, expected);
    }
}
