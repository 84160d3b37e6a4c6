use memchr::memmem;
use std::ops::Range;

/// Case-fold one char. Final sigma folds like any other sigma, so text
/// lowercased as a whole string still matches text folded char by char.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    ch.to_lowercase().map(|c| if c == 'ς' { 'σ' } else { c })
}

fn fold(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

/// Lowercased copy of a text that remembers where every byte came from.
///
/// Lowercasing can change byte lengths outside ASCII, so matches found in
/// the folded text are mapped back to char-aligned ranges in the original.
struct FoldedText<'a> {
    original: &'a str,
    lowered: String,
    /// Original byte offset of the char that produced each lowered byte.
    /// `None` when the text is ASCII and offsets are identical.
    origin: Option<Vec<usize>>,
}

impl<'a> FoldedText<'a> {
    fn new(original: &'a str) -> Self {
        if original.is_ascii() {
            return Self {
                original,
                lowered: original.to_ascii_lowercase(),
                origin: None,
            };
        }

        let mut lowered = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        let mut buf = [0u8; 4];

        for (pos, ch) in original.char_indices() {
            for lower in fold_char(ch) {
                let encoded = lower.encode_utf8(&mut buf);
                lowered.push_str(encoded);
                origin.extend(std::iter::repeat_n(pos, encoded.len()));
            }
        }

        Self {
            original,
            lowered,
            origin: Some(origin),
        }
    }

    /// Map a non-empty range of the lowered text back onto the original
    fn original_range(&self, start: usize, end: usize) -> Range<usize> {
        match &self.origin {
            None => start..end,
            Some(origin) => {
                let first = origin[start];
                let last = origin[end - 1];
                let last_len = self.original[last..].chars().next().map_or(0, char::len_utf8);
                first..last + last_len
            }
        }
    }
}

/// Find every case-insensitive literal occurrence of `needle` in `haystack`.
///
/// Returns ascending, non-overlapping byte ranges into `haystack`, each on
/// char boundaries. Matching is leftmost-first, like a global replace. An
/// empty needle finds nothing.
pub fn find_matches(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let needle = fold(needle);
    if needle.is_empty() || haystack.is_empty() {
        return Vec::new();
    }

    let folded = FoldedText::new(haystack);
    let mut ranges: Vec<Range<usize>> = Vec::new();

    for start in memmem::find_iter(folded.lowered.as_bytes(), needle.as_bytes()) {
        let range = folded.original_range(start, start + needle.len());
        // Two lowered matches can land in one expanded original char
        if ranges.last().is_some_and(|prev| range.start < prev.end) {
            continue;
        }
        ranges.push(range);
    }

    ranges
}
