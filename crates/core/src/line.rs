use std::ops::Range;

use crate::levenshtein;
use crate::types::{Options, SimilarityLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LineFlags(u8);

impl LineFlags {
    pub(crate) const BLANK: LineFlags = LineFlags(1);
    pub(crate) const SLOW_LEVENSHTEIN: LineFlags = LineFlags(1 << 1);
    pub(crate) const MATCHES_IGNORE_REGEX: LineFlags = LineFlags(1 << 2);
    pub(crate) const MATCHES_ALWAYS_DIFFERENT: LineFlags = LineFlags(1 << 3);

    pub(crate) fn contains(self, flag: LineFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub(crate) fn insert(&mut self, flag: LineFlags) {
        self.0 |= flag.0;
    }
}

/// One line of a file, with its trimmed form and code points cached so that
/// comparisons never re-scan the text.
#[derive(Debug, Clone)]
pub(crate) struct FileLine {
    text: String,
    chars: Vec<u32>,
    trim_bytes: Range<usize>,
    trim_chars: Range<usize>,
    flags: LineFlags,
}

impl FileLine {
    pub(crate) fn new(text: String, opts: &Options) -> Self {
        let chars: Vec<u32> = text.chars().map(|c| c as u32).collect();

        let mut start_char = 0;
        let mut start_byte = 0;
        for c in text.chars() {
            if !c.is_ascii_whitespace() {
                break;
            }
            start_char += 1;
            start_byte += c.len_utf8();
        }

        let (trim_bytes, trim_chars) = if start_char == chars.len() {
            (start_byte..start_byte, start_char..start_char)
        } else {
            let mut end_char = chars.len();
            let mut end_byte = text.len();
            for c in text.chars().rev() {
                if !c.is_ascii_whitespace() {
                    break;
                }
                end_char -= 1;
                end_byte -= c.len_utf8();
            }
            (start_byte..end_byte, start_char..end_char)
        };

        let mut flags = LineFlags::default();
        if trim_chars.is_empty() {
            flags.insert(LineFlags::BLANK);
        }
        if chars.iter().any(|&cp| cp > 0xFFFF) {
            flags.insert(LineFlags::SLOW_LEVENSHTEIN);
        }

        if opts.ignore_line_regex.is_some() || opts.always_different_line_regex.is_some() {
            let subject = if opts.ignore_whitespace {
                &text[trim_bytes.clone()]
            } else {
                text.as_str()
            };
            if let Some(regex) = &opts.ignore_line_regex
                && regex.is_match(subject)
            {
                flags.insert(LineFlags::MATCHES_IGNORE_REGEX);
            }
            if let Some(regex) = &opts.always_different_line_regex
                && regex.is_match(subject)
            {
                flags.insert(LineFlags::MATCHES_ALWAYS_DIFFERENT);
            }
        }

        Self {
            text,
            chars,
            trim_bytes,
            trim_chars,
            flags,
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn trimmed(&self) -> &str {
        &self.text[self.trim_bytes.clone()]
    }

    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    pub(crate) fn trimmed_len(&self) -> usize {
        self.trim_chars.len()
    }

    pub(crate) fn flags(&self) -> LineFlags {
        self.flags
    }

    #[cfg(test)]
    pub(crate) fn flags_mut(&mut self) -> &mut LineFlags {
        &mut self.flags
    }

    fn comparison_text(&self, opts: &Options) -> &str {
        if opts.ignore_whitespace {
            self.trimmed()
        } else {
            &self.text
        }
    }

    fn comparison_chars(&self, opts: &Options) -> &[u32] {
        if opts.ignore_whitespace {
            &self.chars[self.trim_chars.clone()]
        } else {
            &self.chars
        }
    }

    /// Whether this line takes part in similarity detection at all, as a
    /// seed or as an expansion candidate.
    pub(crate) fn accepted(&self, opts: &Options) -> bool {
        if opts.ignore_blank_lines && self.flags.contains(LineFlags::BLANK) {
            return false;
        }
        if !self.long_enough(opts) {
            return false;
        }
        !self.flags.contains(LineFlags::MATCHES_IGNORE_REGEX)
    }

    pub(crate) fn long_enough(&self, opts: &Options) -> bool {
        if opts.min_line_length == 0 {
            return true;
        }
        // Blank lines are exempt so that they can still join expansions.
        if self.flags.contains(LineFlags::BLANK) {
            return true;
        }
        let len = if opts.ignore_whitespace {
            self.trimmed_len()
        } else {
            self.len()
        };
        len >= opts.min_line_length
    }
}

/// Classifies a pair of lines as equal, similar within the edit-distance
/// bound, or different.
pub(crate) fn lines_similarity(
    line1: &FileLine,
    line2: &FileLine,
    opts: &Options,
) -> SimilarityLevel {
    if line1.flags.contains(LineFlags::MATCHES_ALWAYS_DIFFERENT)
        || line2.flags.contains(LineFlags::MATCHES_ALWAYS_DIFFERENT)
    {
        return SimilarityLevel::Different;
    }

    if line1.comparison_text(opts) == line2.comparison_text(opts) {
        return SimilarityLevel::Equal;
    }

    if edit_distance(line1, line2, opts) > opts.effective_max_edit_distance() {
        return SimilarityLevel::Different;
    }

    SimilarityLevel::Similar
}

fn edit_distance(line1: &FileLine, line2: &FileLine, opts: &Options) -> usize {
    let slow = line1.flags.contains(LineFlags::SLOW_LEVENSHTEIN)
        || line2.flags.contains(LineFlags::SLOW_LEVENSHTEIN);

    if slow {
        return levenshtein::distance_slow(
            line1.comparison_text(opts),
            line2.comparison_text(opts),
        );
    }

    levenshtein::distance(line1.comparison_chars(opts), line2.comparison_chars(opts))
}
