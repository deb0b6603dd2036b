//! The closed set of letters used by Vietnamese orthography.
//!
//! Basic Latin minus `f`, `j`, `w`, `z`, plus every precomposed letter with a
//! Vietnamese diacritic, in both cases. `q` and `x` stay in.

/// Lowercase precomposed letters. Uppercase forms are matched by folding.
const LOWER_DIACRITICS: &str = "àáảãạăắằẳẵặâấầẩẫậèéẻẽẹêếềểễệìíỉĩịòóỏõọôốồổỗộơớờởỡợùúủũụưứừửữựỳýỷỹỵđ";

/// Minimum length (in chars) of a word kept by the sampler.
pub const MIN_WORD_LEN: usize = 2;

pub fn is_vietnamese_letter(c: char) -> bool {
    match c {
        'f' | 'j' | 'w' | 'z' | 'F' | 'J' | 'W' | 'Z' => false,
        'a'..='z' | 'A'..='Z' => true,
        c if c.is_ascii() => false,
        c => {
            // Only single-char folds count, so e.g. U+0130 and the Kelvin sign stay out.
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => LOWER_DIACRITICS.contains(l),
                _ => false,
            }
        }
    }
}

/// True when every char is a Vietnamese letter and the word is long enough.
pub fn is_vietnamese_word(word: &str) -> bool {
    let mut len = 0usize;
    for c in word.chars() {
        if !is_vietnamese_letter(c) {
            return false;
        }
        len += 1;
    }
    len >= MIN_WORD_LEN
}

/// Lowercase fold of a letter already known to be in the alphabet.
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
