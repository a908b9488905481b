//! Styled-text helpers: measurement, wrapping, truncation.
//!
//! Strings handed to the engine may carry embedded SGR escape sequences.
//! Everything here walks text through one tokenizer that separates literal
//! characters from complete `ESC[...m` sequences, so width math never counts
//! escape bytes and truncation never cuts through one.

use unicode_width::UnicodeWidthChar;

use super::Style;

/// One lexical unit of styled text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// A literal character to display.
    Char(char),
    /// The parameter text of a complete SGR sequence (between `ESC[` and `m`).
    Sgr(&'a str),
}

/// Tokenizer over styled text. Non-SGR escape sequences are consumed and
/// dropped: CSI sequences with other final bytes whole, two-byte escapes as
/// a pair. Unterminated escapes at end of input are swallowed.
pub(crate) struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset of the next unconsumed input.
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let mut iter = rest.char_indices();
            let (_, c) = iter.next()?;
            if c != '\x1b' {
                self.pos += c.len_utf8();
                return Some(Token::Char(c));
            }
            match iter.next() {
                Some((_, '[')) => {
                    let body = self.pos + 2;
                    // Parameter and intermediate bytes span 0x20-0x3f; the
                    // first byte past that range terminates the sequence.
                    let terminator = self.text[body..]
                        .char_indices()
                        .find(|&(_, fc)| !matches!(fc, '\x20'..='\x3f'));
                    match terminator {
                        Some((i, fc)) if ('\x40'..='\x7e').contains(&fc) => {
                            let params = &self.text[body..body + i];
                            self.pos = body + i + 1;
                            if fc == 'm'
                                && params.bytes().all(|b| b.is_ascii_digit() || b == b';')
                            {
                                return Some(Token::Sgr(params));
                            }
                        }
                        // Malformed sequence: resync at the offending char
                        Some((i, _)) => self.pos = body + i,
                        None => self.pos = self.text.len(),
                    }
                }
                // Two-byte escape (ESC 7, ESC =, charset selection, ...)
                Some((i, c2)) => self.pos += i + c2.len_utf8(),
                None => self.pos = self.text.len(),
            }
        }
        None
    }
}

/// Parse an SGR parameter payload (`"0;1;38;2;255;0;0"`) into `out`.
/// Empty segments decode as 0 per terminal convention; segments that do not
/// fit a `u16` are dropped.
pub(crate) fn parse_params(raw: &str, out: &mut Vec<u16>) {
    out.clear();
    for seg in raw.split(';') {
        if seg.is_empty() {
            out.push(0);
        } else if let Ok(v) = seg.parse() {
            out.push(v);
        }
    }
}

/// Wrap `text` in the escape sequence for `style` plus a trailing reset.
///
/// The default style wraps nothing and returns the text unchanged.
pub fn styled(text: &str, style: Style) -> String {
    if style.is_default() {
        return text.to_string();
    }
    let mut out = style.sgr();
    out.push_str(text);
    out.push_str("\x1b[0m");
    out
}

/// Remove every escape sequence, keeping only literal characters.
pub fn strip(text: &str) -> String {
    Tokens::new(text)
        .filter_map(|tok| match tok {
            Token::Char(c) => Some(c),
            Token::Sgr(_) => None,
        })
        .collect()
}

/// Visual width of `text` in terminal columns.
///
/// Escape sequences count zero; wide characters (CJK, fullwidth forms,
/// most emoji) count two; other control characters count zero.
pub fn visual_width(text: &str) -> usize {
    Tokens::new(text)
        .map(|tok| match tok {
            Token::Char(c) => c.width().unwrap_or(0),
            Token::Sgr(_) => 0,
        })
        .sum()
}

/// Truncate `text` to at most `max_width` visual columns.
///
/// Escape sequences in the kept prefix are preserved verbatim and are never
/// split; a wide character that would straddle the limit is cut before, so
/// the result can come up one column short. Text that already fits is
/// returned unchanged.
pub fn truncate(text: &str, max_width: usize) -> String {
    if visual_width(text) <= max_width {
        return text.to_string();
    }
    truncate_split(text, max_width).0
}

/// Truncate like [`truncate`], additionally returning the untruncated
/// remainder and the style active at the cut point.
///
/// The returned [`Style`] is what the remainder would render under, so a
/// continuation line can be re-styled with [`Style::sgr`] before appending
/// the tail.
pub fn truncate_split(text: &str, max_width: usize) -> (String, String, Style) {
    let mut tokens = Tokens::new(text);
    let mut head = String::new();
    let mut style = Style::default();
    let mut params = Vec::new();
    let mut used = 0;
    loop {
        let mark = tokens.offset();
        let Some(tok) = tokens.next() else {
            return (head, String::new(), style);
        };
        match tok {
            Token::Sgr(raw) => {
                parse_params(raw, &mut params);
                style.apply_sgr(&params);
                head.push_str("\x1b[");
                head.push_str(raw);
                head.push('m');
            }
            Token::Char(c) => {
                let w = c.width().unwrap_or(0);
                if used + w > max_width {
                    return (head, text[mark..].to_string(), style);
                }
                used += w;
                head.push(c);
            }
        }
    }
}
