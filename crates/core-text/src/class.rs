//! Editor character classes.
//!
//! A word is a maximal run of graphemes sharing one class. Blanks separate
//! words, punctuation runs are words of their own, and each CJK script forms
//! its own class so a change of script starts a new word. WORDs only
//! distinguish blank from non-blank.

/// Class of a grapheme cluster, decided by its first scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Blank,
    Punct,
    Keyword,
    Han,
    Hiragana,
    Katakana,
    Hangul,
    Emoji,
}

impl CharClass {
    pub fn is_blank(self) -> bool {
        matches!(self, CharClass::Blank)
    }

    /// Class used for grouping: WORD mode folds every non-blank class together.
    pub fn grouping(self, big: bool) -> CharClass {
        if big && !self.is_blank() {
            CharClass::Keyword
        } else {
            self
        }
    }
}

pub fn classify_char(c: char) -> CharClass {
    match c {
        ' ' | '\t' | '\u{a0}' | '\u{3000}' => CharClass::Blank,
        'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => CharClass::Keyword,
        '\u{c0}'..='\u{ff}' if c != '\u{d7}' && c != '\u{f7}' => CharClass::Keyword,
        '\u{3040}'..='\u{309f}' => CharClass::Hiragana,
        '\u{30a0}'..='\u{30ff}' => CharClass::Katakana,
        '\u{ac00}'..='\u{d7a3}' | '\u{1100}'..='\u{11ff}' | '\u{3130}'..='\u{318f}' => {
            CharClass::Hangul
        }
        '\u{3007}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}'
        | '\u{20000}'..='\u{2fa1f}' => CharClass::Han,
        '\u{1f300}'..='\u{1faff}' | '\u{2600}'..='\u{27bf}' | '\u{1f000}'..='\u{1f2ff}' => {
            CharClass::Emoji
        }
        c if c.is_ascii() => CharClass::Punct,
        c if c.is_alphanumeric() => CharClass::Keyword,
        _ => CharClass::Punct,
    }
}

/// Class of a grapheme cluster; an empty string is treated as blank.
pub fn classify(g: &str) -> CharClass {
    g.chars().next().map_or(CharClass::Blank, classify_char)
}
