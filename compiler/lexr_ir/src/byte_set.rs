//! 256-bit byte sets used as transition labels.
//!
//! Every character class, literal byte and `.` compiles to a `ByteSet`.
//! The automaton builder partitions the byte alphabet into equivalence
//! classes from the sets it sees, so sets only need cheap membership,
//! union and complement.

use std::fmt;

/// A set of bytes, stored as four 64-bit words.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub const EMPTY: ByteSet = ByteSet { bits: [0; 4] };
    pub const FULL: ByteSet = ByteSet {
        bits: [u64::MAX; 4],
    };

    /// Set containing a single byte.
    #[inline]
    pub fn single(byte: u8) -> Self {
        let mut set = Self::EMPTY;
        set.insert(byte);
        set
    }

    /// Set containing `lo..=hi`. Empty when `lo > hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::EMPTY;
        set.insert_range(lo, hi);
        set
    }

    /// Every byte except `\n`, the meaning of `.`.
    pub fn any_but_newline() -> Self {
        let mut set = Self::FULL;
        set.remove(b'\n');
        set
    }

    #[inline]
    pub fn insert(&mut self, byte: u8) {
        self.bits[usize::from(byte >> 6)] |= 1u64 << (byte & 63);
    }

    #[inline]
    pub fn remove(&mut self, byte: u8) {
        self.bits[usize::from(byte >> 6)] &= !(1u64 << (byte & 63));
    }

    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        if lo > hi {
            return;
        }
        for byte in lo..=hi {
            self.insert(byte);
        }
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.bits[usize::from(byte >> 6)] & (1u64 << (byte & 63)) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == [0; 4]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[must_use]
    pub fn union(&self, other: &ByteSet) -> ByteSet {
        let mut bits = self.bits;
        for (word, o) in bits.iter_mut().zip(other.bits) {
            *word |= o;
        }
        ByteSet { bits }
    }

    #[must_use]
    pub fn intersection(&self, other: &ByteSet) -> ByteSet {
        let mut bits = self.bits;
        for (word, o) in bits.iter_mut().zip(other.bits) {
            *word &= o;
        }
        ByteSet { bits }
    }

    #[must_use]
    pub fn complement(&self) -> ByteSet {
        let mut bits = self.bits;
        for word in &mut bits {
            *word = !*word;
        }
        ByteSet { bits }
    }

    /// Add the other ASCII case of every letter already in the set.
    #[must_use]
    pub fn fold_ascii_case(&self) -> ByteSet {
        let mut folded = *self;
        for byte in self.iter() {
            if byte.is_ascii_alphabetic() {
                folded.insert(byte ^ 0x20);
            }
        }
        folded
    }

    /// Iterate the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&b| self.contains(b))
    }

    /// Iterate maximal `lo..=hi` runs in ascending order.
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        let mut out = Vec::new();
        let mut run: Option<(u8, u8)> = None;
        for byte in self.iter() {
            run = match run {
                Some((lo, hi)) if hi.checked_add(1) == Some(byte) => Some((lo, byte)),
                Some(done) => {
                    out.push(done);
                    Some((byte, byte))
                }
                None => Some((byte, byte)),
            };
        }
        out.extend(run);
        out
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::EMPTY;
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}

fn fmt_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\n' => write!(f, "\\n"),
        b'\t' => write!(f, "\\t"),
        b'\\' | b']' | b'-' | b'^' => write!(f, "\\{}", byte as char),
        0x21..=0x7e => write!(f, "{}", byte as char),
        _ => write!(f, "\\x{byte:02x}"),
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (lo, hi) in self.ranges() {
            fmt_byte(f, lo)?;
            if hi > lo {
                write!(f, "-")?;
                fmt_byte(f, hi)?;
            }
        }
        write!(f, "]")
    }
}
