//! Line offset index: byte positions of every line start in a file.
//!
//! The index is built with a single forward scan and is immutable afterwards.
//! For an `N`-line file it holds `N + 1` strictly increasing offsets, the last
//! one being the file length. Raw offsets never leave this crate; callers
//! address lines by number and receive [`LineSpan`] values whose accessors
//! are bounds-checked.

use std::io::{self, Read};

use tracing::debug;

/// Size of the read buffer used while scanning for terminators.
const SCAN_BUFFER_SIZE: usize = 64 * 1024;

/// UTF-8 byte order mark, stripped from the first line when present.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Byte range `[start, end)` of one or more whole lines, terminators included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSpan {
    start: u64,
    end: u64,
}

impl LineSpan {
    /// First byte of the span, as a file offset.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last byte of the span, as a file offset.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrow the span's bytes out of `bytes`, which must begin at file
    /// offset `base`. Returns `None` if the span falls outside the buffer.
    pub fn slice<'a>(&self, bytes: &'a [u8], base: u64) -> Option<&'a [u8]> {
        let from = usize::try_from(self.start.checked_sub(base)?).ok()?;
        let to = usize::try_from(self.end.checked_sub(base)?).ok()?;
        bytes.get(from..to)
    }
}

/// Offsets of every line start plus the end-of-file sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineOffsetIndex {
    offsets: Vec<u64>,
}

impl LineOffsetIndex {
    /// Scan `reader` once and record the offset following every `\n`.
    ///
    /// A `\r` preceding the `\n` stays part of the line and is trimmed on
    /// decode. If the input does not end with a terminator, its length is
    /// appended as the final sentinel.
    pub fn scan<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut offsets = vec![0u64];
        let mut buf = vec![0u8; SCAN_BUFFER_SIZE];
        let mut position: u64 = 0;

        loop {
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for (i, byte) in buf[..read].iter().enumerate() {
                if *byte == b'\n' {
                    offsets.push(position + i as u64 + 1);
                }
            }
            position += read as u64;
        }

        if position > 0 && offsets.last().copied() != Some(position) {
            offsets.push(position);
        }

        debug!(lines = offsets.len() - 1, bytes = position, "line offset index built");
        Ok(Self { offsets })
    }

    /// Build an index over an in-memory buffer (such as a mapped view).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        // Reading from a slice cannot fail.
        Self::scan(bytes).unwrap_or_else(|_| Self { offsets: vec![0] })
    }

    /// Number of lines covered by the index.
    pub fn line_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total bytes covered by the index.
    pub fn byte_len(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Span of a single line, or `None` past the end.
    pub fn span(&self, line: usize) -> Option<LineSpan> {
        self.range_span(line, 1)
    }

    /// Span covering `count` lines starting at `first`, or `None` if any of
    /// them is past the end or `count` is zero.
    pub fn range_span(&self, first: usize, count: usize) -> Option<LineSpan> {
        if count == 0 {
            return None;
        }
        let last = first.checked_add(count)?;
        let start = *self.offsets.get(first)?;
        let end = *self.offsets.get(last)?;
        Some(LineSpan { start, end })
    }
}

/// Strip the line terminator (`\n` or `\r\n`) from a raw line.
pub(crate) fn trim_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Decode a raw line as UTF-8 text, dropping its terminator. The first line
/// of a file also loses a leading byte order mark.
pub(crate) fn decode_line(raw: &[u8], first_line: bool) -> String {
    let mut content = trim_terminator(raw);
    if first_line {
        content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    }
    String::from_utf8_lossy(content).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_lines() {
        let index = LineOffsetIndex::from_bytes(b"");
        assert_eq!(index.line_count(), 0);
        assert_eq!(index.byte_len(), 0);
        assert!(index.span(0).is_none());
    }

    #[test]
    fn terminated_lines() {
        let index = LineOffsetIndex::from_bytes(b"a\nbb\nccc\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.offsets, vec![0, 2, 5, 9]);
    }

    #[test]
    fn unterminated_last_line_gets_sentinel() {
        let index = LineOffsetIndex::from_bytes(b"a\nbb");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.offsets, vec![0, 2, 4]);
    }

    #[test]
    fn crlf_terminators() {
        let data = b"one\r\ntwo\r\n";
        let index = LineOffsetIndex::from_bytes(data);
        assert_eq!(index.line_count(), 2);

        let span = index.span(1).unwrap();
        let raw = span.slice(data, 0).unwrap();
        assert_eq!(decode_line(raw, false), "two");
    }

    #[test]
    fn offsets_strictly_increase() {
        let index = LineOffsetIndex::from_bytes(b"\n\n\nx\n\ny");
        assert!(index.offsets.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(index.line_count(), 6);
    }

    #[test]
    fn scan_across_buffer_boundary() {
        let mut data = vec![b'x'; SCAN_BUFFER_SIZE - 1];
        data.push(b'\n');
        data.extend_from_slice(b"tail\n");
        let index = LineOffsetIndex::scan(&data[..]).unwrap();
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.span(1).unwrap().len(), 5);
    }

    #[test]
    fn range_span_covers_consecutive_lines() {
        let data = b"a\nb\nc\nd\n";
        let index = LineOffsetIndex::from_bytes(data);
        let span = index.range_span(1, 2).unwrap();
        assert_eq!(span.slice(data, 0).unwrap(), b"b\nc\n");
        assert!(index.range_span(3, 2).is_none());
        assert!(index.range_span(0, 0).is_none());
    }

    #[test]
    fn slice_respects_base_offset() {
        let data = b"a\nb\nc\n";
        let index = LineOffsetIndex::from_bytes(data);
        let window = &data[2..];
        let span = index.span(2).unwrap();
        assert_eq!(span.slice(window, 2).unwrap(), b"c\n");
        // Span before the buffer start is rejected.
        assert!(index.span(0).unwrap().slice(window, 2).is_none());
    }

    #[test]
    fn bom_stripped_from_first_line_only() {
        assert_eq!(decode_line(b"\xEF\xBB\xBFhead\n", true), "head");
        assert_eq!(decode_line(b"\xEF\xBB\xBFbody\n", false), "\u{FEFF}body");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(decode_line(b"ok\xFF\n", false), "ok\u{FFFD}");
    }
}
