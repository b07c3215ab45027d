//! # Lexing for VC files

use crate::{Error, Position, Result};

/// A token of the language. This is zero-copy.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) enum Tok<'a> {
    LPAREN,
    RPAREN,
    SYM(&'a str),
    QUOTED_STR(&'a str),
    NUM(&'a str),
    ERROR(u8),
    EOF,
}

/// Lexer for s-expressions.
pub(super) struct Lexer<'a> {
    src: &'a str,
    /// Index in `src`
    i: usize,
    /// Position in `src`
    pos: Position,
    /// Position of the start of the current token
    tok_start: Position,
    is_done: bool,
    cur_: Option<Tok<'a>>,
}

/// Can `c` appear in a symbol?
fn is_sym_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || match c {
            b'_' | b'\'' | b'.' | b'=' | b',' | b';' | b'<' | b'>' | b'!' | b'/' | b'\\'
            | b'+' | b'-' | b'|' | b'^' | b'~' | b'*' | b'&' | b'%' | b'@' | b'?' | b':'
            | b'[' | b']' | b'{' | b'}' => true,
            _ => false,
        }
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            i: 0,
            pos: Position::START,
            tok_start: Position::START,
            is_done: false,
            cur_: None,
        }
    }

    /// Position of the current token.
    pub fn cur_pos(&self) -> Position {
        self.tok_start
    }

    fn skip_rest_of_line(&mut self) {
        let bytes = self.src.as_bytes();
        while self.i < bytes.len() && bytes[self.i] != b'\n' {
            self.i += 1;
        }
    }

    fn next_(&mut self) -> Tok<'a> {
        use Tok::*;
        assert!(!self.is_done);

        let bytes = self.src.as_bytes();

        // skip whitespace and comments
        while self.i < bytes.len() {
            let c = bytes[self.i];
            if c == b'#' {
                self.skip_rest_of_line();
            } else if c == b' ' || c == b'\t' || c == b'\r' {
                self.i += 1;
                self.pos.advance(1);
            } else if c == b'\n' {
                self.pos.newline();
                self.i += 1;
            } else {
                break;
            }
        }

        self.tok_start = self.pos;
        if self.i >= bytes.len() {
            self.is_done = true;
            return EOF;
        }

        let c = bytes[self.i];
        if c == b'(' {
            self.i += 1;
            self.pos.advance(1);
            LPAREN
        } else if c == b')' {
            self.i += 1;
            self.pos.advance(1);
            RPAREN
        } else if c == b'"' {
            let mut j = self.i + 1;
            while j < bytes.len() && bytes[j] != b'"' {
                j += 1
            }
            if j >= bytes.len() {
                // unterminated string
                self.i = j;
                return ERROR(b'"');
            }
            let s = &self.src[self.i + 1..j];
            self.pos.advance(j + 1 - self.i);
            self.i = j + 1;
            QUOTED_STR(s)
        } else if is_sym_char(c) {
            let mut j = self.i + 1;
            while j < bytes.len() && is_sym_char(bytes[j]) {
                j += 1
            }
            let slice = &self.src[self.i..j];
            self.pos.advance(j - self.i);
            self.i = j;
            if slice.bytes().all(|c| c.is_ascii_digit()) {
                NUM(slice)
            } else {
                SYM(slice)
            }
        } else {
            // Error token!
            self.i += 1;
            ERROR(c)
        }
    }

    /// get next token.
    pub fn next(&mut self) -> Tok<'a> {
        let t = if self.is_done { Tok::EOF } else { self.next_() };
        self.cur_ = Some(t);
        t
    }

    /// Current token.
    pub fn cur(&mut self) -> Tok<'a> {
        if let Some(c) = self.cur_ {
            c
        } else {
            self.next()
        }
    }

    /// Expect the token `t`, and consume it; or return an error.
    ///
    /// The error message should be a position in the grammar,
    /// like "after quantifier".
    pub fn eat(&mut self, t: Tok, errmsg: &str) -> Result<()> {
        let t2 = self.cur();
        if t2 == t {
            self.next();
            Ok(())
        } else {
            Err(Error::new_parse(
                format!("expected {:?} {}, got {:?}", t, errmsg, t2),
                self.cur_pos(),
            ))
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Tok<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done {
            None
        } else {
            Some(self.next())
        }
    }
}
