/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// http://www.w3.org/TR/2014/CR-css-syntax-3-20140220/#tokenization
//
// Productions with all caps names are returned as tokens,
// productions with lowercase names are internal macros:
//
// IDENT       = ident ;
// AT_KEYWORD  = '@' , ident ;
// HASH        = '#' , name ;
// NUMBER      = num ;
// PERCENTAGE  = num , '%' ;
// DIMENSION   = num , ident ;
// URI         = "url(" , w , ( string | { urichar | nonascii | escape }- ) , w , ')' ;
// FUNCTION    = ident , '(' ;
// S           = { ' ' | '\t' | '\n' }- ;
//
// ident       = [ '-' ] , nmstart , { nmchar } ;
// name        = { nmchar }- ;
// nmstart     = '_' | letter | nonascii | escape ;
// nmchar      = '_' | letter | digit | '-' | nonascii | escape ;
// escape      = unicode | '\' , -( newline | hexd ) ;
// unicode     = '\' , ( 6 * hexd | hexd , 5 * [ hexd ] , [ w ] ) ;
// num         = [ '+' | '-' ] , ( { digit }- | { digit } , '.' , { digit }- )
//               , [ ( 'e' | 'E' ) , [ '+' | '-' ] , { digit }- ] ;
// urichar     = '!' | '#' | '$' | '%' | '&' | ? '*' through '[' ? | ? ']' through '~' ? ;
// nonascii    = ? U+00A0 through U+10FFFF ? ;

use std::fmt;
use std::io::Read;
use std::str::Chars;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ScanError;
use crate::from_bytes::ReadSource;
use crate::scanner::{CharSource, Scanner};

use self::TokenKind::*;


/// The kind of one of the pieces the CSS input is broken into.
///
/// The payload of the token (its text and, for numeric tokens, its value)
/// is available from the `Tokenizer` that produced it, or from a `Token` snapshot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// The end of the input.
    Eof,

    /// A [`<whitespace-token>`](http://dev.w3.org/csswg/css-syntax/#whitespace-token-diagram)
    ///
    /// The value is the run of spaces, tabs and newlines.
    WhiteSpace,

    /// A [`<ident-token>`](http://dev.w3.org/csswg/css-syntax/#ident-token-diagram)
    Ident,

    /// A [`<at-keyword-token>`](http://dev.w3.org/csswg/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword,

    /// A [`<string-token>`](http://dev.w3.org/csswg/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString,

    /// A `<bad-string-token>`: a string interrupted by a newline or the end of the input.
    ///
    /// The value is the text read before the interruption.
    /// This token always indicates a parse error.
    BadString,

    /// A [`<hash-token>`](http://dev.w3.org/csswg/css-syntax/#hash-token-diagram)
    ///
    /// The value does not include the `#` marker.
    Hash,

    /// A [`<number-token>`](http://dev.w3.org/csswg/css-syntax/#number-token-diagram)
    ///
    /// The value is the lexeme.
    Number,

    /// A [`<percentage-token>`](http://dev.w3.org/csswg/css-syntax/#percentage-token-diagram)
    ///
    /// The value is the lexeme of the number, without the `%` marker.
    Percentage,

    /// A [`<dimension-token>`](http://dev.w3.org/csswg/css-syntax/#dimension-token-diagram)
    ///
    /// The value is the lexeme of the number followed by the unit.
    Dimension,

    /// A [`<url-token>`](http://dev.w3.org/csswg/css-syntax/#url-token-diagram) or `url( <string-token> )`
    ///
    /// The value does not include the `url(` `)` markers or the quotes.
    Url,

    /// A `<bad-url-token>`
    ///
    /// The value is the text read before the error.
    /// This token always indicates a parse error.
    BadUrl,

    /// A [`<unicode-range-token>`](http://dev.w3.org/csswg/css-syntax/#unicode-range-token-diagram)
    ///
    /// Not produced by the `Tokenizer`: `u+0041` is read as an `Ident` followed by a `Number`.
    UnicodeRange,

    /// A `<!--` [`<CDO-token>`](http://dev.w3.org/csswg/css-syntax/#CDO-token-diagram)
    CDO,

    /// A `-->` [`<CDC-token>`](http://dev.w3.org/csswg/css-syntax/#CDC-token-diagram)
    CDC,

    /// A comment.
    ///
    /// The value does not include the `/*` `*/` markers.
    Comment,

    /// A comment interrupted by the end of the input.
    ///
    /// The value does not include the `/*` marker.
    /// This token always indicates a parse error.
    BadComment,

    /// A [`<function-token>`](http://dev.w3.org/csswg/css-syntax/#function-token-diagram)
    ///
    /// The value (name) does not include the `(` marker.
    Function,

    /// A `~=` [`<include-match-token>`](http://dev.w3.org/csswg/css-syntax/#include-match-token-diagram)
    IncludeMatch,

    /// A `|=` [`<dash-match-token>`](http://dev.w3.org/csswg/css-syntax/#dash-match-token-diagram)
    DashMatch,

    /// A `^=` [`<prefix-match-token>`](http://dev.w3.org/csswg/css-syntax/#prefix-match-token-diagram)
    PrefixMatch,

    /// A `$=` [`<suffix-match-token>`](http://dev.w3.org/csswg/css-syntax/#suffix-match-token-diagram)
    SuffixMatch,

    /// A `*=` [`<substring-match-token>`](http://dev.w3.org/csswg/css-syntax/#substring-match-token-diagram)
    SubstringMatch,

    /// A `||` [`<column-token>`](http://dev.w3.org/csswg/css-syntax/#column-token-diagram)
    Column,

    /// Any other single character, including `:`, `;`, `,`, `(`, `)`, `[`, `]`, `{` and `}`.
    Delim(char),
}


impl TokenKind {
    /// Return whether this token represents a parse error.
    ///
    /// `BadUrl`, `BadString` and `BadComment` are such tokens.
    pub fn is_parse_error(&self) -> bool {
        matches!(*self, BadUrl | BadString | BadComment)
    }

    /// The character of a `Delim` token.
    pub fn delim(&self) -> Option<char> {
        match *self {
            Delim(c) => Some(c),
            _ => None,
        }
    }

    /// Return whether this is a `Comment` or a `BadComment`.
    pub fn is_comment(&self) -> bool {
        matches!(*self, Comment | BadComment)
    }
}


/// The numeric value of `Number`, `Percentage` and `Dimension` tokens.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericValue {
    /// The lexeme had neither a fractional part nor an exponent.
    Integer(i64),
    /// The lexeme had a fractional part or an exponent,
    /// or was an integer too large for `i64`.
    Float(f64),
}

impl NumericValue {
    /// The value as a float.
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumericValue::Integer(value) => value as f64,
            NumericValue::Float(value) => value,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            NumericValue::Integer(value) => Some(value),
            NumericValue::Float(_) => None,
        }
    }
}


/// Options fixed when a `Tokenizer` is created.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TokenizerOptions {
    /// When true, `Comment` and `BadComment` tokens are never returned.
    ///
    /// Defaults to true.
    pub skip_comments: bool,
}

impl Default for TokenizerOptions {
    fn default() -> TokenizerOptions {
        TokenizerOptions { skip_comments: true }
    }
}


/// An owned snapshot of the current token of a `Tokenizer`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,

    /// The text of the token. See the `TokenKind` variants for what it contains.
    pub value: String,

    /// Set for `Number`, `Percentage` and `Dimension` tokens.
    pub numeric_value: Option<NumericValue>,

    /// The unit of a `Dimension` token.
    pub unit: Option<String>,

    /// Number of line breaks before the token. From 0.
    pub line_number: u64,

    /// Number of code points read from the input before the token. From 0.
    pub position: u64,
}

impl Token {
    /// A token that is not numeric, without position information.
    pub fn new<V: Into<String>>(kind: TokenKind, value: V) -> Token {
        Token {
            kind,
            value: value.into(),
            numeric_value: None,
            unit: None,
            line_number: 0,
            position: 0,
        }
    }
}


/// Breaks CSS input into tokens, one at a time.
///
/// The tokenizer owns a `Scanner` that preprocesses its input.
/// Each call to `next_token` reads one token and makes its payload
/// available through the `current_*` accessors until the next call.
pub struct Tokenizer<S> {
    scanner: Scanner<S>,
    options: TokenizerOptions,

    current_token: TokenKind,
    string_value: String,
    numeric_value: Option<NumericValue>,
    /// Byte offset of the unit in `string_value`, for `Dimension` tokens.
    unit_start: Option<usize>,

    line_number: u64,
    position: u64,

    has_token: bool,
    pushed_back: bool,
}


impl<'a> Tokenizer<Chars<'a>> {
    /// Tokenize `input`, skipping comments.
    #[inline]
    pub fn new(input: &'a str) -> Tokenizer<Chars<'a>> {
        Tokenizer::with_options(input, TokenizerOptions::default())
    }

    /// Tokenize `input`.
    #[inline]
    pub fn with_options(input: &'a str, options: TokenizerOptions) -> Tokenizer<Chars<'a>> {
        Tokenizer::from_source(input.chars(), options)
    }
}


impl<R: Read> Tokenizer<ReadSource<R>> {
    /// Tokenize bytes from `reader`, decoded as UTF-8 unless they start with a byte order mark.
    pub fn from_reader(reader: R, options: TokenizerOptions) -> Tokenizer<ReadSource<R>> {
        Tokenizer::from_source(ReadSource::new(reader), options)
    }
}


impl<S: CharSource> Tokenizer<S> {
    /// Tokenize the code points of `source`.
    pub fn from_source(source: S, options: TokenizerOptions) -> Tokenizer<S> {
        Tokenizer {
            scanner: Scanner::new(source),
            options,
            current_token: Eof,
            string_value: String::new(),
            numeric_value: None,
            unit_start: None,
            line_number: 0,
            position: 0,
            has_token: false,
            pushed_back: false,
        }
    }

    /// The options this tokenizer was created with.
    #[inline]
    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// Read the next token and return its kind.
    ///
    /// After the end of the input, `Eof` is returned again and again.
    pub fn next_token(&mut self) -> Result<TokenKind, ScanError> {
        if self.pushed_back {
            self.pushed_back = false;
            return Ok(self.current_token)
        }
        loop {
            let kind = self.read_token()?;
            self.current_token = kind;
            self.has_token = true;
            if kind.is_parse_error() {
                debug!(kind = ?kind, line = self.line_number, position = self.position,
                       value = %self.string_value, "recovered from malformed input");
            }
            if !(self.options.skip_comments && kind.is_comment()) {
                trace!(kind = ?kind, line = self.line_number, position = self.position, "token");
                return Ok(kind)
            }
        }
    }

    /// Push the current token back,
    /// so that the next call to `next_token` returns it again.
    ///
    /// # Panics
    ///
    /// If no token was read yet, or if the current token was already pushed back:
    /// only one token can be pushed back at a time.
    pub fn push_back(&mut self) {
        assert!(self.has_token, "push_back() called before any token was read");
        assert!(!self.pushed_back, "push_back() called twice without next_token() in between");
        self.pushed_back = true;
    }

    /// Consume whitespace, `<!--` and `-->` tokens.
    ///
    /// The first other token is pushed back.
    pub fn skip_whitespace(&mut self) -> Result<(), ScanError> {
        while let WhiteSpace | CDO | CDC = self.next_token()? {}
        self.push_back();
        Ok(())
    }

    /// The kind of the current token.
    #[inline]
    pub fn current_token(&self) -> TokenKind {
        self.current_token
    }

    /// The text of the current token.
    #[inline]
    pub fn current_string_value(&self) -> &str {
        &self.string_value
    }

    /// The value of the current `Number`, `Percentage` or `Dimension` token.
    #[inline]
    pub fn current_numeric_value(&self) -> Option<NumericValue> {
        self.numeric_value
    }

    /// The unit of the current `Dimension` token.
    #[inline]
    pub fn current_unit(&self) -> Option<&str> {
        self.unit_start.map(|start| &self.string_value[start..])
    }

    /// Number of line breaks read before the current token. From 0.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Number of code points read before the current token. From 0.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// An owned copy of the current token.
    pub fn token(&self) -> Token {
        Token {
            kind: self.current_token,
            value: self.string_value.clone(),
            numeric_value: self.numeric_value,
            unit: self.current_unit().map(str::to_owned),
            line_number: self.line_number,
            position: self.position,
        }
    }

    /// Iterate over the remaining tokens, up to but excluding `Eof`.
    pub fn tokens(&mut self) -> Tokens<S> {
        Tokens { tokenizer: self, done: false }
    }

    fn read_token(&mut self) -> Result<TokenKind, ScanError> {
        self.line_number = self.scanner.line_number();
        self.position = self.scanner.position();
        self.string_value.clear();
        self.numeric_value = None;
        self.unit_start = None;

        let c = match self.scanner.next_char()? {
            None => return Ok(Eof),
            Some(c) => c,
        };
        let kind = match c {
            ' ' | '\t' | '\n' => {
                self.string_value.push(c);
                loop {
                    match self.scanner.next_char()? {
                        Some(c @ ' ') | Some(c @ '\t') | Some(c @ '\n') => self.string_value.push(c),
                        other => {
                            self.scanner.push_back(other);
                            break
                        }
                    }
                }
                WhiteSpace
            }
            '~' => self.delim_or_match(c, '=', IncludeMatch)?,
            '^' => self.delim_or_match(c, '=', PrefixMatch)?,
            '$' => self.delim_or_match(c, '=', SuffixMatch)?,
            '*' => self.delim_or_match(c, '=', SubstringMatch)?,
            '|' => match self.scanner.next_char()? {
                Some('=') => {
                    self.string_value.push_str("|=");
                    DashMatch
                }
                Some('|') => {
                    self.string_value.push_str("||");
                    Column
                }
                other => {
                    self.scanner.push_back(other);
                    self.delim(c)
                }
            },
            '@' => {
                let mut value = String::new();
                if self.ident(&mut value)? {
                    self.string_value = value;
                    AtKeyword
                } else {
                    self.delim(c)
                }
            }
            '#' => {
                let mut value = String::new();
                if self.name(&mut value)? {
                    self.string_value = value;
                    Hash
                } else {
                    self.delim(c)
                }
            }
            '\'' | '"' => {
                let mut value = String::new();
                let kind = if self.string(c, &mut value)? { QuotedString } else { BadString };
                self.string_value = value;
                kind
            }
            '0'..='9' | '.' | '+' => {
                self.scanner.push_back(Some(c));
                match self.numeric()? {
                    Some(kind) => kind,
                    None => {
                        self.scanner.next_char()?;
                        self.delim(c)
                    }
                }
            }
            '/' => match self.scanner.next_char()? {
                Some('*') => {
                    let mut value = String::new();
                    let kind = if self.comment_after_slash_star(&mut value)? { Comment } else { BadComment };
                    self.string_value = value;
                    kind
                }
                other => {
                    self.scanner.push_back(other);
                    self.delim(c)
                }
            },
            '-' => {
                if self.lookahead("->")? {
                    self.string_value.push_str("-->");
                    CDC
                } else {
                    self.scanner.push_back(Some(c));
                    if let Some(kind) = self.numeric()? {
                        kind
                    } else if let Some(kind) = self.ident_like(false)? {
                        kind
                    } else {
                        self.scanner.next_char()?;
                        self.delim(c)
                    }
                }
            }
            '<' => {
                if self.lookahead("!--")? {
                    self.string_value.push_str("<!--");
                    CDO
                } else {
                    self.delim(c)
                }
            }
            // A unicode-range would start here too, but it is not recognized.
            'u' | 'U' => {
                self.scanner.push_back(Some(c));
                match self.ident_like(true)? {
                    Some(kind) => kind,
                    None => {
                        self.scanner.next_char()?;
                        self.delim(c)
                    }
                }
            }
            _ => {
                self.scanner.push_back(Some(c));
                match self.ident_like(false)? {
                    Some(kind) => kind,
                    None => {
                        self.scanner.next_char()?;
                        self.delim(c)
                    }
                }
            }
        };
        Ok(kind)
    }

    fn delim(&mut self, c: char) -> TokenKind {
        self.string_value.clear();
        self.string_value.push(c);
        Delim(c)
    }

    fn delim_or_match(&mut self, c: char, next: char, kind: TokenKind) -> Result<TokenKind, ScanError> {
        match self.scanner.next_char()? {
            Some(n) if n == next => {
                self.string_value.push(c);
                self.string_value.push(n);
                Ok(kind)
            }
            other => {
                self.scanner.push_back(other);
                Ok(self.delim(c))
            }
        }
    }

    /// Consume `expected` if the input continues with it, or consume nothing.
    fn lookahead(&mut self, expected: &str) -> Result<bool, ScanError> {
        let mut read: Vec<Option<char>> = Vec::with_capacity(expected.len());
        for e in expected.chars() {
            let c = self.scanner.next_char()?;
            read.push(c);
            if c != Some(e) {
                for &c in read.iter().rev() {
                    self.scanner.push_back(c)
                }
                return Ok(false)
            }
        }
        Ok(true)
    }

    /// `num`, then `'%'` or `ident`.
    fn numeric(&mut self) -> Result<Option<TokenKind>, ScanError> {
        let mut value = String::new();
        let number = match self.num(&mut value)? {
            Some(number) => number,
            None => return Ok(None),
        };
        let numeric_len = value.len();
        let kind = match self.scanner.next_char()? {
            Some('%') => Percentage,
            other => {
                self.scanner.push_back(other);
                if self.ident(&mut value)? {
                    self.unit_start = Some(numeric_len);
                    Dimension
                } else {
                    Number
                }
            }
        };
        self.string_value = value;
        self.numeric_value = Some(number);
        Ok(Some(kind))
    }

    /// `ident`, then optionally `'('`.
    ///
    /// With `allow_url`, `url(` continues with the `uri` macro.
    fn ident_like(&mut self, allow_url: bool) -> Result<Option<TokenKind>, ScanError> {
        let mut value = String::new();
        if !self.ident(&mut value)? {
            return Ok(None)
        }
        let kind = match self.scanner.next_char()? {
            Some('(') => {
                if allow_url && value.eq_ignore_ascii_case("url") {
                    value.clear();
                    if self.uri(&mut value)? { Url } else { BadUrl }
                } else {
                    Function
                }
            }
            other => {
                self.scanner.push_back(other);
                Ident
            }
        };
        self.string_value = value;
        Ok(Some(kind))
    }

    /// 'ident' macro.
    ///
    /// Like all macros, on failure it consumes nothing and leaves `buf` unchanged.
    fn ident(&mut self, buf: &mut String) -> Result<bool, ScanError> {
        let mark = buf.len();
        let first = self.scanner.next_char()?;
        if first == Some('-') {
            buf.push('-');
        } else {
            self.scanner.push_back(first);
        }
        if !self.nmchar(buf, true)? {
            if first == Some('-') {
                buf.truncate(mark);
                self.scanner.push_back(first);
            }
            return Ok(false)
        }
        while self.nmchar(buf, false)? {}
        Ok(true)
    }

    /// 'name' macro.
    fn name(&mut self, buf: &mut String) -> Result<bool, ScanError> {
        if !self.nmchar(buf, false)? {
            return Ok(false)
        }
        while self.nmchar(buf, false)? {}
        Ok(true)
    }

    /// 'nmstart' macro if `start`, 'nmchar' macro otherwise.
    fn nmchar(&mut self, buf: &mut String, start: bool) -> Result<bool, ScanError> {
        let c = self.scanner.next_char()?;
        match c {
            Some(c @ 'a'..='z') | Some(c @ 'A'..='Z') | Some(c @ '_') => {
                buf.push(c);
                Ok(true)
            }
            Some(c @ '0'..='9') | Some(c @ '-') if !start => {
                buf.push(c);
                Ok(true)
            }
            Some(c) if is_nonascii(c) => {
                buf.push(c);
                Ok(true)
            }
            Some('\\') => {
                if self.escape_after_backslash(buf)? {
                    Ok(true)
                } else {
                    self.scanner.push_back(c);
                    Ok(false)
                }
            }
            _ => {
                self.scanner.push_back(c);
                Ok(false)
            }
        }
    }

    /// 'escape' macro, after the backslash.
    ///
    /// Fails on an escaped newline or end of input,
    /// leaving the input just after the backslash.
    fn escape_after_backslash(&mut self, buf: &mut String) -> Result<bool, ScanError> {
        let c = self.scanner.next_char()?;
        match c {
            Some(h) if h.is_ascii_hexdigit() => {
                self.unicode_after_backslash(h, buf)?;
                Ok(true)
            }
            None | Some('\n') => {
                self.scanner.push_back(c);
                Ok(false)
            }
            Some(c) => {
                buf.push(c);
                Ok(true)
            }
        }
    }

    /// 'unicode' macro, after the backslash and the first hex digit.
    fn unicode_after_backslash(&mut self, first: char, buf: &mut String) -> Result<(), ScanError> {
        let mut scalar = hex_value(first);
        let mut count = 1;
        let mut c = self.scanner.next_char()?;
        while count < 6 {
            match c {
                Some(h) if h.is_ascii_hexdigit() => {
                    scalar = (scalar << 4) | hex_value(h);
                    count += 1;
                    c = self.scanner.next_char()?;
                }
                _ => break,
            }
        }
        match c {
            // A single whitespace terminates a short escape and is part of it.
            Some(' ') | Some('\t') | Some('\n') if count < 6 => {}
            _ => self.scanner.push_back(c),
        }
        buf.push(escaped_char(scalar));
        Ok(())
    }

    /// 'num' macro. Sets no token state: returns the value and appends the lexeme to `buf`.
    fn num(&mut self, buf: &mut String) -> Result<Option<NumericValue>, ScanError> {
        let mark = buf.len();
        let mut c = self.scanner.next_char()?;
        let sign = match c {
            Some(s @ '+') | Some(s @ '-') => {
                buf.push(s);
                c = self.scanner.next_char()?;
                Some(s)
            }
            _ => None,
        };

        let mut has_integer_digits = false;
        while let Some(d @ '0'..='9') = c {
            has_integer_digits = true;
            buf.push(d);
            c = self.scanner.next_char()?;
        }

        let mut is_float = false;
        if c == Some('.') {
            let after_dot = self.scanner.next_char()?;
            if is_digit(after_dot) {
                is_float = true;
                buf.push('.');
                c = after_dot;
                while let Some(d @ '0'..='9') = c {
                    buf.push(d);
                    c = self.scanner.next_char()?;
                }
            } else {
                // The dot belongs to whatever comes next.
                self.scanner.push_back(after_dot);
            }
        }

        if !has_integer_digits && !is_float {
            self.scanner.push_back(c);
            if sign.is_some() {
                self.scanner.push_back(sign);
            }
            buf.truncate(mark);
            return Ok(None)
        }

        if let Some(e @ 'e') | Some(e @ 'E') = c {
            let after_e = self.scanner.next_char()?;
            let (exponent_sign, first_digit) = match after_e {
                Some('+') | Some('-') => (after_e, self.scanner.next_char()?),
                _ => (None, after_e),
            };
            if is_digit(first_digit) {
                is_float = true;
                buf.push(e);
                if let Some(s) = exponent_sign {
                    buf.push(s);
                }
                c = first_digit;
                while let Some(d @ '0'..='9') = c {
                    buf.push(d);
                    c = self.scanner.next_char()?;
                }
            } else {
                // Not an exponent, as in `10em`: the number ends before the `e`.
                self.scanner.push_back(first_digit);
                if exponent_sign.is_some() {
                    self.scanner.push_back(exponent_sign);
                }
            }
        }
        self.scanner.push_back(c);

        Ok(Some(parse_number(&buf[mark..], is_float)))
    }

    /// 'string' macro, after the opening quote.
    ///
    /// On failure, `buf` holds what was read so far and the character
    /// that interrupted the string is pushed back.
    fn string(&mut self, quote: char, buf: &mut String) -> Result<bool, ScanError> {
        loop {
            let c = self.scanner.next_char()?;
            match c {
                None | Some('\n') => {
                    self.scanner.push_back(c);
                    return Ok(false)
                }
                Some('\\') => {
                    if !self.escape_after_backslash(buf)? {
                        match self.scanner.next_char()? {
                            // Escaped newline
                            Some('\n') => buf.push('\n'),
                            other => {
                                self.scanner.push_back(other);
                                self.scanner.push_back(c);
                                return Ok(false)
                            }
                        }
                    }
                }
                Some(c) if c == quote => return Ok(true),
                Some(c) => buf.push(c),
            }
        }
    }

    /// 'uri' macro, after `url(`.
    fn uri(&mut self, buf: &mut String) -> Result<bool, ScanError> {
        let mut c = self.skip_w()?;
        match c {
            Some(quote @ '\'') | Some(quote @ '"') => {
                if !self.string(quote, buf)? {
                    return Ok(false)
                }
                c = self.scanner.next_char()?;
            }
            _ => loop {
                match c {
                    Some(u) if is_urichar(u) => buf.push(u),
                    Some('\\') => {
                        if !self.escape_after_backslash(buf)? {
                            break
                        }
                    }
                    _ => break,
                }
                c = self.scanner.next_char()?;
            },
        }
        while let Some(' ') | Some('\t') | Some('\n') = c {
            c = self.scanner.next_char()?;
        }
        if c == Some(')') {
            Ok(true)
        } else {
            self.scanner.push_back(c);
            Ok(false)
        }
    }

    /// Skip 'w' and return the first other character.
    fn skip_w(&mut self) -> Result<Option<char>, ScanError> {
        loop {
            match self.scanner.next_char()? {
                Some(' ') | Some('\t') | Some('\n') => {}
                other => return Ok(other),
            }
        }
    }

    /// 'comment' macro, after `/*`. Fails at the end of the input.
    fn comment_after_slash_star(&mut self, buf: &mut String) -> Result<bool, ScanError> {
        let mut c = self.scanner.next_char()?;
        while let Some(ch) = c {
            c = self.scanner.next_char()?;
            if ch == '*' && c == Some('/') {
                return Ok(true)
            }
            buf.push(ch);
        }
        Ok(false)
    }
}


impl<S> fmt::Debug for Tokenizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("current_token", &self.current_token)
            .field("string_value", &self.string_value)
            .field("numeric_value", &self.numeric_value)
            .field("line_number", &self.line_number)
            .field("position", &self.position)
            .field("pushed_back", &self.pushed_back)
            .finish()
    }
}


/// Iterator over the tokens of a `Tokenizer`, returned by `Tokenizer::tokens`.
///
/// Stops before `Eof`, and after the first error.
pub struct Tokens<'t, S> {
    tokenizer: &'t mut Tokenizer<S>,
    done: bool,
}

impl<'t, S: CharSource> Iterator for Tokens<'t, S> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Result<Token, ScanError>> {
        if self.done {
            return None
        }
        match self.tokenizer.next_token() {
            Ok(Eof) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(self.tokenizer.token())),
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}


#[inline]
fn is_digit(c: Option<char>) -> bool {
    matches!(c, Some('0'..='9'))
}

// Code points up to U+009F are never part of an identifier.
#[inline]
fn is_nonascii(c: char) -> bool {
    c > '\u{9F}'
}

#[inline]
fn is_urichar(c: char) -> bool {
    matches!(c, '!' | '#' | '$' | '%' | '&' | '*'..='[' | ']'..='~') || is_nonascii(c)
}

#[inline]
fn hex_value(c: char) -> u32 {
    c.to_digit(16).unwrap_or(0)
}

/// The character for an escaped scalar value.
///
/// Surrogates and values beyond U+10FFFF become U+FFFD.
fn escaped_char(scalar: u32) -> char {
    std::char::from_u32(scalar).unwrap_or('\u{FFFD}')
}

fn parse_number(lexeme: &str, is_float: bool) -> NumericValue {
    if !is_float {
        if let Ok(value) = lexeme.parse::<i64>() {
            return NumericValue::Integer(value)
        }
    }
    match lexeme.parse::<f64>() {
        Ok(value) => NumericValue::Float(value),
        Err(_) => unreachable!("the num macro produced {:?}, which is not a number", lexeme),
    }
}
