//! Newline-delimited record framing over a chunked byte stream.
//!
//! Transport chunks carry no alignment guarantees: a record may arrive split
//! across several chunks, several records may share one, and a multi-byte
//! character may straddle a boundary. Bytes are buffered until a full line
//! is available and only then decoded.

/// Longest line accepted before the stream is considered broken.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// A line grew past the framer's limit without a terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record exceeds {limit} bytes without a line break")]
pub struct LineTooLong {
    pub limit: usize,
}

/// Splits a byte stream into lines.
#[derive(Debug)]
pub struct NdjsonFramer {
    buffer: Vec<u8>,
    max_line: usize,
}

impl Default for NdjsonFramer {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl NdjsonFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line,
        }
    }

    /// Append a transport chunk.
    ///
    /// Fails once the unterminated tail of the buffer is longer than the
    /// line limit; complete lines waiting to be taken do not count.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), LineTooLong> {
        self.buffer.extend_from_slice(chunk);
        let tail_start = self
            .buffer
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        if self.buffer.len() - tail_start > self.max_line {
            return Err(LineTooLong {
                limit: self.max_line,
            });
        }
        Ok(())
    }

    /// The next complete line, without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(decode(&line[..end]))
    }

    /// The trailing unterminated line, if the stream ended without a newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(decode(&rest))
    }
}

fn decode(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(framer: &mut NdjsonFramer) -> Vec<String> {
        std::iter::from_fn(|| framer.next_line()).collect()
    }

    #[test]
    fn splits_multiple_records_in_one_chunk() {
        let mut framer = NdjsonFramer::new();
        framer.push(b"{\"a\":1}\n{\"b\":2}\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn reassembles_record_split_across_chunks() {
        let mut framer = NdjsonFramer::new();
        framer.push(b"{\"respo").unwrap();
        assert!(framer.next_line().is_none());
        framer.push(b"nse\":\"x\"}\n{\"do").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"response\":\"x\"}"]);
        framer.push(b"ne\":true}").unwrap();
        assert_eq!(framer.finish().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn strips_crlf_and_keeps_blank_lines() {
        let mut framer = NdjsonFramer::new();
        framer.push(b"one\r\n\r\ntwo\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["one", "", "two"]);
    }

    #[test]
    fn multibyte_character_across_chunks() {
        let text = "{\"response\":\"ñ\"}\n".as_bytes();
        let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut framer = NdjsonFramer::new();
        framer.push(&text[..split]).unwrap();
        framer.push(&text[split..]).unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"response\":\"ñ\"}"]);
    }

    #[test]
    fn runaway_line_is_refused() {
        let mut framer = NdjsonFramer::with_max_line(8);
        framer.push(b"short\n").unwrap();
        assert_eq!(framer.push(b"123456789"), Err(LineTooLong { limit: 8 }));
    }

    #[test]
    fn complete_lines_do_not_count_against_the_limit() {
        let mut framer = NdjsonFramer::with_max_line(8);
        framer.push(b"0123456789abcdef\n0123").unwrap();
        assert_eq!(drain(&mut framer), vec!["0123456789abcdef"]);
        framer.push(b"4567").unwrap();
        assert_eq!(framer.finish().as_deref(), Some("01234567"));
    }
}
