//! Non-overlapping substring bookkeeping shared by the substring scorers.
//!
//! Matching works on characters, not bytes; indices and lengths in this
//! module are character positions.

/// Mark `length` characters as used starting at `begin`.
pub fn mark_used(used: &mut [bool], begin: usize, length: usize) {
    for slot in used.iter_mut().skip(begin).take(length) {
        *slot = true;
    }
}

/// Find the first occurrence of `needle` in `haystack` that does not touch
/// any already-used character.
pub fn find_match(needle: &[char], haystack: &[char], used: &[bool]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    let mut start = 0;
    while start + needle.len() <= haystack.len() {
        let Some(offset) = find_from(haystack, needle, start) else {
            return None;
        };
        if used[offset..offset + needle.len()].iter().all(|u| !u) {
            return Some(offset);
        }
        start = offset + 1;
    }
    None
}

fn find_from(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    (start..=haystack.len().saturating_sub(needle.len()))
        .find(|&i| haystack[i..i + needle.len()] == *needle)
}

pub fn chars_of(value: &str) -> Vec<char> {
    value.chars().collect()
}
