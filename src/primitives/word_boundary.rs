//! Word boundary detection: whole-word match filtering and word
//! start/end expansion for double-click selection.

/// Word characters are letters, digits, and underscore.
#[inline]
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True when the match `[start, end)` is not a substring of a larger
/// identifier: the characters immediately before and after the match,
/// when present, are not word characters.
///
/// `start` and `end` must lie on char boundaries (match offsets always
/// do).
pub fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    debug_assert!(start <= end && end <= text.len());
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |ch| !is_word_char(ch));
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |ch| !is_word_char(ch));
    before_ok && after_ok
}

/// Offset of the start of the run of uniformly-classed characters
/// containing `offset`. The class (word vs non-word) is anchored on the
/// character at `offset`, or the one before it when `offset` is at the
/// end of the text.
pub fn word_start_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    let anchor = text[offset..]
        .chars()
        .next()
        .or_else(|| text[..offset].chars().next_back());
    let Some(anchor) = anchor else {
        return 0;
    };
    let class = is_word_char(anchor);
    let mut start = offset;
    for ch in text[..offset].chars().rev() {
        if is_word_char(ch) != class {
            break;
        }
        start -= ch.len_utf8();
    }
    start
}

/// Offset one past the end of the run of uniformly-classed characters
/// containing `offset`. Anchoring matches [`word_start_at`].
pub fn word_end_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    let anchor = text[offset..]
        .chars()
        .next()
        .or_else(|| text[..offset].chars().next_back());
    let Some(anchor) = anchor else {
        return offset;
    };
    let class = is_word_char(anchor);
    let mut end = offset;
    for ch in text[offset..].chars() {
        if is_word_char(ch) != class {
            break;
        }
        end += ch.len_utf8();
    }
    end
}
