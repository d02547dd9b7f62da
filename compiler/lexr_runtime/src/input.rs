//! Input sources.
//!
//! The scanner pulls bytes through [`InputSource::refill`], which follows
//! `std::io::Read`: `Ok(0)` is end of input, `ErrorKind::WouldBlock` means
//! "not yet", anything else aborts the scan. At end of input the scanner
//! asks [`InputSource::wrap`] whether another stream follows.

use std::collections::VecDeque;
use std::io::{self, Read};

/// Answer of [`InputSource::wrap`] at end of input.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Wrap {
    /// More input is available; keep scanning in the same state.
    Continue,
    /// Scanning is finished.
    #[default]
    Stop,
}

pub trait InputSource {
    /// Fill the front of `buf`, returning the number of bytes written.
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Called when `refill` has returned `Ok(0)`.
    fn wrap(&mut self) -> Wrap {
        Wrap::Stop
    }
}

impl<S: InputSource + ?Sized> InputSource for &mut S {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).refill(buf)
    }

    fn wrap(&mut self) -> Wrap {
        (**self).wrap()
    }
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).refill(buf)
    }

    fn wrap(&mut self) -> Wrap {
        (**self).wrap()
    }
}

/// In-memory input.
#[derive(Clone, Debug)]
pub struct SliceInput<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceInput { data, pos: 0 }
    }
}

impl<'a> From<&'a str> for SliceInput<'a> {
    fn from(text: &'a str) -> Self {
        SliceInput::new(text.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for SliceInput<'a> {
    fn from(data: &'a [u8]) -> Self {
        SliceInput::new(data)
    }
}

impl InputSource for SliceInput<'_> {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Any `std::io::Read` (files, stdin, sockets).
#[derive(Debug)]
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: Read> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        ReaderInput { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> InputSource for ReaderInput<R> {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Several sources scanned back to back, like a `yywrap` that opens the
/// next file. Tokens never span two sources.
#[derive(Debug)]
pub struct ChainInput<S> {
    sources: VecDeque<S>,
}

impl<S: InputSource> ChainInput<S> {
    pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
        ChainInput {
            sources: sources.into_iter().collect(),
        }
    }

    /// Queue another source after the current ones.
    pub fn push(&mut self, source: S) {
        self.sources.push_back(source);
    }

    /// Sources not yet exhausted, the current one included.
    pub fn remaining(&self) -> usize {
        self.sources.len()
    }
}

impl<S: InputSource> InputSource for ChainInput<S> {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.sources.front_mut() {
            Some(source) => source.refill(buf),
            None => Ok(0),
        }
    }

    fn wrap(&mut self) -> Wrap {
        // The current source may itself continue (nested chains).
        if let Some(source) = self.sources.front_mut() {
            if source.wrap() == Wrap::Continue {
                return Wrap::Continue;
            }
        }
        self.sources.pop_front();
        if self.sources.is_empty() {
            Wrap::Stop
        } else {
            Wrap::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(source: &mut impl InputSource, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0; chunk];
        loop {
            let n = source.refill(&mut buf).unwrap();
            if n == 0 {
                if source.wrap() == Wrap::Continue {
                    continue;
                }
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn slice_in_chunks() {
        let mut input = SliceInput::from("hello world");
        assert_eq!(drain(&mut input, 3), b"hello world");
        assert_eq!(input.wrap(), Wrap::Stop);
    }

    #[test]
    fn reader_input() {
        let mut input = ReaderInput::new(io::Cursor::new(b"abc".to_vec()));
        assert_eq!(drain(&mut input, 2), b"abc");
    }

    #[test]
    fn chain_continues_until_the_last_source() {
        let mut chain = ChainInput::new([SliceInput::from("ab"), SliceInput::from(""), SliceInput::from("cd")]);
        assert_eq!(chain.remaining(), 3);
        assert_eq!(drain(&mut chain, 8), b"abcd");
        assert_eq!(chain.remaining(), 0);
        assert_eq!(chain.wrap(), Wrap::Stop);
    }
}
