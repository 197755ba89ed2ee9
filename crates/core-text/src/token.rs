//! Line tokenization and cross-line token walks.
//!
//! A line splits into alternating runs of word tokens and blank tokens (two
//! word tokens may touch when their classes differ). The walkers step through
//! tokens line by line and report an empty line as a single token-less item.

use unicode_segmentation::UnicodeSegmentation;

use crate::BufferView;
use crate::CursorPosition;
use crate::class::{CharClass, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Space,
}

/// A run of graphemes within one line, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// First byte of the first grapheme.
    pub start: usize,
    /// First byte of the last grapheme (where the cursor rests on the token's end).
    pub last: usize,
    /// One past the last byte.
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn contains(&self, col: usize) -> bool {
        self.start <= col && col < self.end
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// Split a line into tokens. `big` selects WORD semantics.
pub fn tokenize(line: &str, big: bool) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut group: Option<CharClass> = None;
    for (idx, g) in line.grapheme_indices(true) {
        let class = classify(g).grouping(big);
        match tokens.last_mut() {
            Some(tok) if group == Some(class) => {
                tok.last = idx;
                tok.end = idx + g.len();
            }
            _ => {
                tokens.push(Token {
                    start: idx,
                    last: idx,
                    end: idx + g.len(),
                    kind: if class.is_blank() {
                        TokenKind::Space
                    } else {
                        TokenKind::Word
                    },
                });
                group = Some(class);
            }
        }
    }
    tokens
}

/// Index of the token covering byte `col`, if any.
pub fn index_token(tokens: &[Token], col: usize) -> Option<usize> {
    let i = tokens.partition_point(|t| t.end <= col);
    tokens.get(i).filter(|t| t.contains(col)).map(|_| i)
}

/// One step of a token walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenItem {
    pub lnum: usize,
    /// `None` for an empty line.
    pub token: Option<Token>,
    /// The walk started inside this item.
    pub cursor: bool,
    /// Last token of its line.
    pub eol: bool,
}

impl TokenItem {
    pub fn first(&self) -> usize {
        self.token.map_or(0, |t| t.start)
    }

    pub fn last(&self) -> usize {
        self.token.map_or(0, |t| t.last)
    }

    pub fn past_end(&self) -> usize {
        self.token.map_or(0, |t| t.end)
    }

    pub fn is_word(&self) -> bool {
        self.token.is_some_and(|t| t.is_word())
    }

    pub fn is_empty_line(&self) -> bool {
        self.token.is_none()
    }

    pub fn at(&self, col: usize) -> CursorPosition {
        CursorPosition::new(self.lnum, col)
    }
}

fn line_tokens<B: BufferView + ?Sized>(buffer: &B, lnum: usize, big: bool) -> Option<Vec<Token>> {
    buffer.line(lnum).map(|l| tokenize(&l, big))
}

/// Walks tokens forward from a cursor to the end of the buffer.
///
/// The first item is the token under the cursor (flagged `cursor`). A cursor
/// past the last token of its line starts the walk on the next line.
pub struct ForwardTokens<'b, B: ?Sized> {
    buffer: &'b B,
    tokens: Vec<Token>,
    index: usize,
    lnum: usize,
    lines: usize,
    big: bool,
    cursor: bool,
}

impl<'b, B: BufferView + ?Sized> ForwardTokens<'b, B> {
    pub fn new(buffer: &'b B, from: CursorPosition, big: bool) -> Self {
        let tokens = line_tokens(buffer, from.line, big).unwrap_or_default();
        let index = index_token(&tokens, from.col).unwrap_or(tokens.len());
        let cursor = index < tokens.len() || (from.col == 0 && tokens.is_empty());
        Self {
            lines: buffer.line_count(),
            buffer,
            tokens,
            index,
            lnum: from.line,
            big,
            cursor,
        }
    }

    fn emit(&mut self, cursor: bool) -> TokenItem {
        let item = TokenItem {
            lnum: self.lnum,
            token: self.tokens.get(self.index).copied(),
            cursor,
            eol: self.index + 1 >= self.tokens.len(),
        };
        self.index += 1;
        item
    }
}

impl<B: BufferView + ?Sized> Iterator for ForwardTokens<'_, B> {
    type Item = TokenItem;

    fn next(&mut self) -> Option<TokenItem> {
        let cursor = std::mem::take(&mut self.cursor);
        if self.index < self.tokens.len() {
            return Some(self.emit(cursor));
        }
        if cursor && self.tokens.is_empty() && self.index == 0 {
            return Some(self.emit(true));
        }
        if self.lnum >= self.lines {
            return None;
        }
        self.tokens = line_tokens(self.buffer, self.lnum + 1, self.big)?;
        self.lnum += 1;
        self.index = 0;
        Some(self.emit(cursor))
    }
}

/// Walks tokens backward from a cursor to the start of the buffer.
pub struct BackwardTokens<'b, B: ?Sized> {
    buffer: &'b B,
    tokens: Vec<Token>,
    /// Tokens of the current line not yet yielded.
    remaining: usize,
    lnum: usize,
    big: bool,
    cursor: bool,
    first: bool,
}

impl<'b, B: BufferView + ?Sized> BackwardTokens<'b, B> {
    pub fn new(buffer: &'b B, from: CursorPosition, big: bool) -> Self {
        let tokens = line_tokens(buffer, from.line, big).unwrap_or_default();
        let under = index_token(&tokens, from.col);
        let cursor = under.is_some() || (from.col == 0 && tokens.is_empty());
        let remaining = under.map_or(tokens.len(), |i| i + 1);
        Self {
            buffer,
            tokens,
            remaining,
            lnum: from.line,
            big,
            cursor,
            first: true,
        }
    }

    fn emit(&mut self, cursor: bool) -> TokenItem {
        let token = match self.remaining.checked_sub(1) {
            Some(i) => {
                self.remaining = i;
                self.tokens.get(i).copied()
            }
            None => None,
        };
        TokenItem {
            lnum: self.lnum,
            token,
            cursor,
            eol: token.is_none() || self.remaining + 1 == self.tokens.len(),
        }
    }
}

impl<B: BufferView + ?Sized> Iterator for BackwardTokens<'_, B> {
    type Item = TokenItem;

    fn next(&mut self) -> Option<TokenItem> {
        let cursor = std::mem::take(&mut self.cursor);
        let first = std::mem::take(&mut self.first);
        if self.remaining > 0 || (first && self.tokens.is_empty()) {
            return Some(self.emit(cursor));
        }
        if self.lnum <= 1 {
            return None;
        }
        self.tokens = line_tokens(self.buffer, self.lnum - 1, self.big)?;
        self.lnum -= 1;
        self.remaining = self.tokens.len();
        Some(self.emit(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(start: usize, last: usize, end: usize, kind: TokenKind) -> Token {
        Token {
            start,
            last,
            end,
            kind,
        }
    }

    #[test]
    fn tokenize_words_punct_and_blanks() {
        use TokenKind::*;
        assert_eq!(tokenize("", false), vec![]);
        assert_eq!(
            tokenize("foo, bar", false),
            vec![
                tok(0, 2, 3, Word),
                tok(3, 3, 4, Word),
                tok(4, 4, 5, Space),
                tok(5, 7, 8, Word),
            ]
        );
        assert_eq!(
            tokenize("foo, bar", true),
            vec![tok(0, 3, 4, Word), tok(4, 4, 5, Space), tok(5, 7, 8, Word)]
        );
    }

    #[test]
    fn tokenize_multibyte_last_points_at_grapheme_start() {
        let toks = tokenize("  漢字x", false);
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1], tok(2, 5, 8, TokenKind::Word));
        assert_eq!(toks[2], tok(8, 8, 9, TokenKind::Word));
    }

    #[test]
    fn index_token_hits_and_misses() {
        let toks = tokenize("ab  cd", false);
        assert_eq!(index_token(&toks, 0), Some(0));
        assert_eq!(index_token(&toks, 3), Some(1));
        assert_eq!(index_token(&toks, 5), Some(2));
        assert_eq!(index_token(&toks, 6), None);
        assert_eq!(index_token(&[], 0), None);
    }

    #[test]
    fn forward_walk_over_empty_lines() {
        let buf = vec!["", "", ""];
        let items: Vec<_> = ForwardTokens::new(&buf, CursorPosition::new(1, 0), false)
            .map(|i| (i.lnum, i.token.is_none(), i.cursor))
            .collect();
        assert_eq!(items, vec![(1, true, true), (2, true, false), (3, true, false)]);

        let items: Vec<_> = ForwardTokens::new(&buf, CursorPosition::new(1, 1), false)
            .map(|i| i.lnum)
            .collect();
        assert_eq!(items, vec![2, 3]);
    }

    #[test]
    fn forward_walk_flags_cursor_and_eol() {
        let buf = vec!["ab cd", "ef"];
        let items: Vec<_> = ForwardTokens::new(&buf, CursorPosition::new(1, 1), false).collect();
        assert_eq!(items.len(), 4);
        assert!(items[0].cursor);
        assert_eq!(items[0].first(), 0);
        assert!(!items[1].cursor);
        assert!(items[2].eol);
        assert_eq!((items[3].lnum, items[3].first(), items[3].eol), (2, 0, true));
    }

    #[test]
    fn backward_walk_from_middle() {
        let buf = vec!["ab", "", "cd ef"];
        let items: Vec<_> = BackwardTokens::new(&buf, CursorPosition::new(3, 4), false)
            .map(|i| (i.lnum, i.token.map(|t| t.start), i.cursor))
            .collect();
        assert_eq!(
            items,
            vec![
                (3, Some(3), true),
                (3, Some(2), false),
                (3, Some(0), false),
                (2, None, false),
                (1, Some(0), false),
            ]
        );
    }

    #[test]
    fn backward_walk_on_empty_first_line() {
        let buf = vec![""];
        let items: Vec<_> = BackwardTokens::new(&buf, CursorPosition::new(1, 0), false).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].cursor && items[0].is_empty_line());
    }
}
