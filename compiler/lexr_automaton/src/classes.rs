//! Byte equivalence classes.
//!
//! Two bytes share a class when every byte set used by any rule either
//! contains both or neither. Transition tables are indexed by class, plus
//! one pseudo symbol past the last class for end of input.

use lexr_ir::ByteSet;

/// Partition of the 256 byte values into equivalence classes.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteClasses {
    /// Class of each byte. Classes are numbered by their smallest byte.
    map: Vec<u8>,
    count: usize,
}

impl ByteClasses {
    /// The coarsest partition that keeps every set a union of classes.
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a ByteSet>) -> Self {
        let mut work = [0u16; 256];
        let mut count = 1usize;
        for set in sets {
            if set.is_empty() || *set == ByteSet::FULL {
                continue;
            }
            // Bytes inside the set move to a fresh class per old class.
            let mut split: Vec<Option<u16>> = vec![None; count];
            let mut next = count as u16;
            for byte in set.iter() {
                let old = usize::from(work[usize::from(byte)]);
                let class = *split[old].get_or_insert_with(|| {
                    next += 1;
                    next - 1
                });
                work[usize::from(byte)] = class;
            }
            count = renumber(&mut work);
        }
        ByteClasses {
            map: work.iter().map(|&c| c as u8).collect(),
            count,
        }
    }

    /// Number of byte classes; also the index of the end-of-input symbol.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of transition-table columns: every class plus end of input.
    pub fn symbols(&self) -> usize {
        self.count + 1
    }

    /// Index of the end-of-input pseudo symbol.
    pub fn eoi(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn class_of(&self, byte: u8) -> usize {
        usize::from(self.map[usize::from(byte)])
    }

    /// Smallest byte of each class, in class order.
    pub fn representatives(&self) -> Vec<u8> {
        let mut reps = Vec::with_capacity(self.count);
        for byte in 0..=255u8 {
            if self.class_of(byte) == reps.len() {
                reps.push(byte);
            }
        }
        reps
    }

    /// Every byte of `class`.
    pub fn members(&self, class: usize) -> ByteSet {
        (0..=255u8).filter(|&b| self.class_of(b) == class).collect()
    }
}

/// Renumber classes by first occurrence; returns the class count.
fn renumber(map: &mut [u16; 256]) -> usize {
    let mut seen = [None::<u16>; 512];
    let mut count = 0u16;
    for slot in map.iter_mut() {
        let id = *seen[usize::from(*slot)].get_or_insert_with(|| {
            count += 1;
            count - 1
        });
        *slot = id;
    }
    usize::from(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_sets_is_one_class() {
        let classes = ByteClasses::from_sets(std::iter::empty());
        assert_eq!(classes.len(), 1);
        assert_eq!(classes.eoi(), 1);
        assert_eq!(classes.representatives(), vec![0]);
    }

    #[test]
    fn digits_and_letters_split_the_alphabet() {
        let sets = [ByteSet::range(b'0', b'9'), ByteSet::range(b'a', b'z')];
        let classes = ByteClasses::from_sets(&sets);
        assert_eq!(classes.len(), 3);
        assert_eq!(classes.class_of(b'0'), classes.class_of(b'9'));
        assert_eq!(classes.class_of(b'a'), classes.class_of(b'q'));
        assert_ne!(classes.class_of(b'0'), classes.class_of(b'a'));
        assert_eq!(classes.class_of(b' '), classes.class_of(b'~'));
        assert_eq!(classes.members(classes.class_of(b'5')), sets[0]);
    }

    #[test]
    fn overlapping_sets_refine() {
        let sets = [
            ByteSet::range(b'a', b'z'),
            ByteSet::single(b'x'),
            ByteSet::any_but_newline(),
        ];
        let classes = ByteClasses::from_sets(&sets);
        // {\n}, {x}, [a-wyz], everything else
        assert_eq!(classes.len(), 4);
        let x = classes.class_of(b'x');
        assert_eq!(classes.members(x), ByteSet::single(b'x'));
        assert_ne!(classes.class_of(b'\n'), classes.class_of(b'!'));
    }

    #[test]
    fn numbering_is_by_smallest_byte() {
        let classes = ByteClasses::from_sets(&[ByteSet::single(b'\n')]);
        assert_eq!(classes.class_of(0), 0);
        assert_eq!(classes.class_of(b'\n'), 1);
        assert_eq!(classes.class_of(b'z'), 0);
        assert_eq!(classes.representatives(), vec![0, b'\n']);
    }
}
