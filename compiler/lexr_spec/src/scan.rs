//! Low-level text scanning shared by the header and rules readers.

/// One physical line: start offset, text without the line terminator, and
/// the offset where the next line starts.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Line<'s> {
    pub start: usize,
    pub text: &'s str,
    pub next: usize,
}

pub(crate) fn split_lines(src: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start < src.len() {
        let (end, next) = match memchr::memchr(b'\n', &src.as_bytes()[start..]) {
            Some(i) => (start + i, start + i + 1),
            None => (src.len(), src.len()),
        };
        let text = src[start..end].strip_suffix('\r').unwrap_or(&src[start..end]);
        lines.push(Line { start, text, next });
        start = next;
    }
    lines
}

/// Split a rule line into its pattern and the remainder.
///
/// The pattern ends at the first whitespace outside quotes and brackets.
pub(crate) fn split_pattern(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut in_quote = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                in_quote = !in_quote;
                i += 1;
            }
            b'[' if !in_quote => i = skip_class(bytes, i),
            b if b.is_ascii_whitespace() && !in_quote => break,
            _ => i += 1,
        }
    }
    let i = i.min(bytes.len());
    (&text[..i], &text[i..])
}

/// Index just past the `]` closing the class opened at `open`.
fn skip_class(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 1;
    if bytes.get(i) == Some(&b'^') {
        i += 1;
    }
    if bytes.get(i) == Some(&b']') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' if bytes.get(i + 1) == Some(&b':') => {
                i = find(bytes, i + 2, b":]").map_or(i + 1, |end| end + 2);
            }
            b']' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Offset just past the `}` matching the `{` at `open`.
///
/// Braces inside string and character literals and inside comments do not
/// count. Returns `None` when the block is not closed before `limit`.
pub(crate) fn scan_braced(src: &str, open: usize, limit: usize) -> Option<usize> {
    #[derive(Copy, Clone, PartialEq)]
    enum State {
        Code,
        Quoted(u8),
        LineComment,
        BlockComment,
    }

    let bytes = &src.as_bytes()[..limit.min(src.len())];
    let mut depth = 0u32;
    let mut state = State::Code;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Code => match b {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                b'"' | b'\'' => state = State::Quoted(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => state = State::LineComment,
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                _ => {}
            },
            State::Quoted(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q || b == b'\n' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }
    None
}

/// Byte offset of `inner` within `outer`; `inner` must be a subslice.
pub(crate) fn offset_in(outer: &str, inner: &str) -> usize {
    (inner.as_ptr() as usize).saturating_sub(outer.as_ptr() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pattern_ends_at_unquoted_whitespace() {
        assert_eq!(split_pattern("[a-z]+ { word(); }"), ("[a-z]+", " { word(); }"));
        assert_eq!(split_pattern("\"a b\"\tx"), ("\"a b\"", "\tx"));
        assert_eq!(split_pattern("[ \\t]+ ;"), ("[ \\t]+", " ;"));
        assert_eq!(split_pattern("\\ x y"), ("\\ x", " y"));
        assert_eq!(split_pattern("[[:space:] ]+ x"), ("[[:space:] ]+", " x"));
        assert_eq!(split_pattern("[] ] x"), ("[] ]", " x"));
        assert_eq!(split_pattern("abc"), ("abc", ""));
    }

    #[test]
    fn braces_in_strings_and_comments_are_ignored() {
        let src = "{ s = \"}\"; c = '}'; /* } */ // }\n x(); }";
        assert_eq!(scan_braced(src, 0, src.len()), Some(src.len()));
        let nested = "{ if (x) { y(); } } tail";
        assert_eq!(scan_braced(nested, 0, nested.len()), Some(19));
        assert_eq!(scan_braced("{ open", 0, 6), None);
    }

    #[test]
    fn lines_track_offsets() {
        let lines = split_lines("a\r\nbc\n\nd");
        let texts: Vec<_> = lines.iter().map(|l| (l.start, l.text, l.next)).collect();
        assert_eq!(texts, vec![(0, "a", 3), (3, "bc", 6), (6, "", 7), (7, "d", 8)]);
    }
}
