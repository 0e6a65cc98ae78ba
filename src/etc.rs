//! Useful functions with designated modules.

use std::ops::ControlFlow;

/// Returns the byte offset in `buf` corresponding to the `pos`-th character, which is
/// guaranteed to be aligned to a UTF-8 code point boundary in `buf`.
///
/// If `buf` contains less than `pos` characters, then `buf.len()` is returned.
pub fn pos_to_offset(buf: &str, pos: usize) -> usize {
    buf.chars()
        .take(pos)
        .fold(0, |offset, c| offset + c.len_utf8())
}

/// Returns the `pos`-th character in `buf` corresponding to the byte `offset`.
///
/// If `buf` contains less than `offset` bytes, then the value returned is equal to
/// `buf.chars().count()`.
pub fn offset_to_pos(buf: &str, offset: usize) -> usize {
    let result = buf.chars().try_fold((0, 0), |(ofs, pos), c| {
        if ofs < offset {
            ControlFlow::Continue((ofs + c.len_utf8(), pos + 1))
        } else {
            ControlFlow::Break((ofs, pos))
        }
    });
    match result {
        ControlFlow::Break((_, pos)) => pos,
        ControlFlow::Continue((_, pos)) => pos,
    }
}

/// Returns the text between the start of the line containing character `pos` and
/// `pos` itself, or `None` if `pos` lies beyond the end of `buf`.
pub fn line_prefix(buf: &str, pos: usize) -> Option<&str> {
    if pos > buf.chars().count() {
        None
    } else {
        let end = pos_to_offset(buf, pos);
        let start = buf[..end].rfind('\n').map(|i| i + 1).unwrap_or(0);
        Some(&buf[start..end])
    }
}

/// Returns the character immediately preceding byte `offset` in `buf`.
pub fn char_before(buf: &str, offset: usize) -> Option<char> {
    buf.get(..offset).and_then(|s| s.chars().next_back())
}

/// Returns the character starting at byte `offset` in `buf`.
pub fn char_at(buf: &str, offset: usize) -> Option<char> {
    buf.get(offset..).and_then(|s| s.chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_and_positions() {
        let buf = "a😀b";
        assert_eq!(pos_to_offset(buf, 2), 5);
        assert_eq!(offset_to_pos(buf, 5), 2);
        assert_eq!(pos_to_offset(buf, 10), buf.len());
        assert_eq!(offset_to_pos(buf, 100), 3);
    }

    #[test]
    fn prefix_of_line() {
        let buf = "<ul>\n  <li>x";
        assert_eq!(line_prefix(buf, 12), Some("  <li>x"));
        assert_eq!(line_prefix(buf, 11), Some("  <li>"));
        assert_eq!(line_prefix(buf, 4), Some("<ul>"));
        assert_eq!(line_prefix(buf, 5), Some(""));
        assert_eq!(line_prefix(buf, 13), None);
    }

    #[test]
    fn neighbors() {
        let buf = "\"42\"";
        assert_eq!(char_before(buf, 1), Some('"'));
        assert_eq!(char_before(buf, 0), None);
        assert_eq!(char_at(buf, 3), Some('"'));
        assert_eq!(char_at(buf, 4), None);
    }
}
