//! Text helpers shared by both recognizers.
//!
//! Everything in the pipeline works on UTF-8 byte offsets that sit on char
//! boundaries. This module owns the few places where that contract meets the
//! outside world:
//!
//! ```text
//! caller text ── NormalizedText::new ──> half-width text ──> recognizers
//!      ^                                         │
//!      └──── NormalizedText::to_original ────────┘ (byte offsets)
//!                     │
//!                     └── OffsetUnit::convert  (byte | char | utf-16)
//! ```
//!
//! Full-width normalisation replaces 3-byte punctuation and alphanumerics with
//! their ASCII twins, so normalised offsets drift away from the caller's. The
//! `origin` table maps every normalised byte back to where it came from.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

const FULL_WIDTH: &str = "：／．＼∕，！（）？﹡；：﹣—－【】－＋＝｛％｝１２３４５６７８９０ａｂｃｄｅｆｇｈｉ\
                          ｊｋｌｍｎｏｐｑｒｓｔｕｖｗｘｙｚＡＢＣＤＥＦＧＨＩＪＫＬＭＮＯＰＱＲＳＴＵＶＷＸＹＺ";
const HALF_WIDTH: &str = ":/.\\/,!()?*;:---[]-+={%}1234567890abcdefghi\
                          jklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

static FULL_TO_HALF: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (full, half) in FULL_WIDTH.chars().zip(HALF_WIDTH.chars()) {
        // First mapping wins for characters listed twice.
        map.entry(full).or_insert(half);
    }
    map
});

/// Half-width replacement for a full-width character, if there is one.
pub fn half_width(c: char) -> Option<char> {
    FULL_TO_HALF.get(&c).copied()
}

/// Text after full-width normalisation plus the map back to the input.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// `origin[i]` is the input byte offset of normalised byte `i`; one extra
    /// trailing entry holds the input length.
    origin: Vec<usize>,
}

impl NormalizedText {
    pub fn new(input: &str) -> Self {
        let mut text = String::with_capacity(input.len());
        let mut origin = Vec::with_capacity(input.len() + 1);
        for (pos, c) in input.char_indices() {
            let out = half_width(c).unwrap_or(c);
            text.push(out);
            origin.extend(std::iter::repeat_n(pos, out.len_utf8()));
        }
        origin.push(input.len());
        NormalizedText { text, origin }
    }

    /// Identity normalisation: the text is used as given.
    pub fn passthrough(input: &str) -> Self {
        NormalizedText { text: input.to_string(), origin: (0..=input.len()).collect() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Map a normalised byte offset back to the input.
    pub fn to_original(&self, offset: usize) -> usize {
        match self.origin.get(offset) {
            Some(&o) => o,
            None => self.origin.last().copied().unwrap_or(0),
        }
    }
}

/// Unit used for offsets handed back to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// UTF-8 byte offsets (Rust slicing).
    #[default]
    Byte,
    /// Unicode scalar values.
    Char,
    /// UTF-16 code units (JavaScript / ICU strings).
    Utf16,
}

impl OffsetUnit {
    /// Convert a byte offset into `text` to this unit.
    pub fn convert(self, text: &str, byte_offset: usize) -> usize {
        let prefix = slice(text, 0, byte_offset);
        match self {
            OffsetUnit::Byte => byte_offset,
            OffsetUnit::Char => prefix.chars().count(),
            OffsetUnit::Utf16 => prefix.encode_utf16().count(),
        }
    }
}

bitflags! {
    /// Cheap facts about an input, computed once before the recognizers run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InputTraits: u8 {
        const HAS_DIGITS     = 1 << 0;
        const HAS_FULL_WIDTH = 1 << 1;
        const HAS_LETTERS    = 1 << 2;
    }
}

impl InputTraits {
    pub fn scan(input: &str) -> Self {
        let mut traits = InputTraits::empty();
        for c in input.chars() {
            if c.is_ascii_digit() {
                traits |= InputTraits::HAS_DIGITS;
            } else if c.is_alphabetic() {
                traits |= InputTraits::HAS_LETTERS;
            }
            if half_width(c).is_some() {
                traits |= InputTraits::HAS_FULL_WIDTH;
                if half_width(c).is_some_and(|h| h.is_ascii_digit()) {
                    traits |= InputTraits::HAS_DIGITS;
                }
            }
        }
        traits
    }
}

/// `text[begin..end]`, or `""` when the range is inverted or off a boundary.
pub fn slice(text: &str, begin: usize, end: usize) -> &str {
    if end < begin {
        return "";
    }
    text.get(begin..end).unwrap_or("")
}

/// The longest prefix of `text` that fits in `max` bytes and ends on a char boundary.
pub fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}

/// `text[begin..]`, or `""` when `begin` is past the end.
pub fn tail(text: &str, begin: usize) -> &str {
    text.get(begin..).unwrap_or("")
}

pub fn count_digits(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Replace every byte of `text[begin..end]` with `A`, keeping the length.
///
/// Offsets found in the masked text stay valid in the unmasked one.
pub fn mask(text: &mut String, begin: usize, end: usize) {
    if begin >= end || end > text.len() || !text.is_char_boundary(begin) || !text.is_char_boundary(end) {
        return;
    }
    let filler = "A".repeat(end - begin);
    text.replace_range(begin..end, &filler);
}

pub fn is_open_bracket(c: char) -> bool {
    c == '(' || c == '['
}

pub fn starts_with_bracket(s: &str) -> bool {
    s.chars().next().is_some_and(is_open_bracket)
}

/// True when `s` opens with a bracket that is never closed.
pub fn has_one_bracket(s: &str) -> bool {
    if !starts_with_bracket(s) {
        return false;
    }
    let open = s.chars().filter(|&c| is_open_bracket(c)).count();
    let close = s.chars().filter(|&c| c == ')' || c == ']').count();
    open > close
}

/// Drop a leading unbalanced bracket.
pub fn strip_one_bracket(s: &str) -> &str {
    if has_one_bracket(s) { &s[1..] } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_width_table_is_aligned() {
        assert_eq!(FULL_WIDTH.chars().count(), HALF_WIDTH.chars().count());
        assert_eq!(half_width('１'), Some('1'));
        assert_eq!(half_width('（'), Some('('));
        assert_eq!(half_width('—'), Some('-'));
        assert_eq!(half_width('Ｚ'), Some('Z'));
        assert_eq!(half_width('a'), None);
    }

    #[test]
    fn normalized_offsets_map_back() {
        let input = "at ２０２４-０１-０５ ok";
        let norm = NormalizedText::new(input);
        assert_eq!(norm.as_str(), "at 2024-01-05 ok");

        let begin = norm.as_str().find('2').unwrap();
        let end = norm.as_str().find(" ok").unwrap();
        let (b, e) = (norm.to_original(begin), norm.to_original(end));
        assert_eq!(&input[b..e], "２０２４-０１-０５");
        assert_eq!(norm.to_original(norm.as_str().len()), input.len());
    }

    #[test]
    fn offset_units() {
        let text = "日付 2024";
        let byte = text.find('2').unwrap();
        assert_eq!(OffsetUnit::Byte.convert(text, byte), 7);
        assert_eq!(OffsetUnit::Char.convert(text, byte), 3);
        assert_eq!(OffsetUnit::Utf16.convert(text, byte), 3);
    }

    #[test]
    fn masking_keeps_length() {
        let mut s = String::from("call 110 now");
        mask(&mut s, 5, 8);
        assert_eq!(s, "call AAA now");
        mask(&mut s, 8, 5);
        assert_eq!(s, "call AAA now");
    }

    #[test]
    fn bracket_helpers() {
        assert!(has_one_bracket("(010 1234"));
        assert!(!has_one_bracket("(010) 1234"));
        assert_eq!(strip_one_bracket("[4008108000"), "4008108000");
        assert_eq!(strip_one_bracket("(010)1234"), "(010)1234");
    }

    #[test]
    fn input_traits() {
        assert!(InputTraits::scan("abc").contains(InputTraits::HAS_LETTERS));
        assert!(!InputTraits::scan("abc").contains(InputTraits::HAS_DIGITS));
        let t = InputTraits::scan("电话１２３");
        assert!(t.contains(InputTraits::HAS_DIGITS | InputTraits::HAS_FULL_WIDTH));
        assert_eq!(slice("abc", 2, 1), "");
    }
}
