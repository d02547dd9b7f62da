//! Refillable input buffer.
//!
//! Holds the unconsumed input from the start of the current token onward.
//! Bytes before the cursor are discarded lazily, when at least half of the
//! buffer is consumed, so compaction cost stays linear in the input.

use std::io;

use crate::input::InputSource;

#[derive(Clone, Debug, Default)]
pub(crate) struct InputBuffer {
    data: Vec<u8>,
    /// Start of the current token.
    pos: usize,
    /// Stream offset of `data[0]`.
    offset: u64,
}

impl InputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        InputBuffer {
            data: Vec::with_capacity(capacity),
            pos: 0,
            offset: 0,
        }
    }

    /// Bytes from the cursor to the end of buffered input.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Stream offset of the cursor.
    pub fn position(&self) -> u64 {
        self.offset + self.pos as u64
    }

    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.data.len() - self.pos, "advance past buffered input");
        self.pos = (self.pos + n).min(self.data.len());
    }

    /// Drop consumed bytes once they make up half the buffer.
    pub fn compact(&mut self) {
        if self.pos > 0 && self.pos * 2 >= self.data.len() {
            self.data.drain(..self.pos);
            self.offset += self.pos as u64;
            self.pos = 0;
        }
    }

    /// Append up to `chunk` bytes from `source`. Interrupted reads retry.
    pub fn fill<S: InputSource + ?Sized>(&mut self, source: &mut S, chunk: usize) -> io::Result<usize> {
        let old = self.data.len();
        self.data.resize(old + chunk, 0);
        let result = loop {
            match source.refill(&mut self.data[old..]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        let n = *result.as_ref().unwrap_or(&0);
        self.data.truncate(old + n.min(chunk));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;
    use pretty_assertions::assert_eq;

    #[test]
    fn fill_advance_compact() {
        let mut input = SliceInput::from("abcdef");
        let mut buf = InputBuffer::with_capacity(4);
        assert_eq!(buf.fill(&mut input, 4).unwrap(), 4);
        assert_eq!(buf.pending(), b"abcd");
        buf.advance(1);
        buf.compact();
        // a quarter consumed: kept
        assert_eq!(buf.pending(), b"bcd");
        assert_eq!(buf.data.len(), 4);
        buf.advance(1);
        buf.compact();
        assert_eq!(buf.data.len(), 2);
        assert_eq!(buf.position(), 2);
        assert_eq!(buf.fill(&mut input, 4).unwrap(), 2);
        assert_eq!(buf.pending(), b"cdef");
        assert_eq!(buf.fill(&mut input, 4).unwrap(), 0);
    }

    #[test]
    fn failed_fill_keeps_buffer() {
        struct Broken;
        impl InputSource for Broken {
            fn refill(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::ErrorKind::WouldBlock.into())
            }
        }
        let mut buf = InputBuffer::default();
        let err = buf.fill(&mut Broken, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert!(buf.pending().is_empty());
    }
}
