/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

// http://dev.w3.org/csswg/css-syntax/#input-preprocessing

use std::io;
use std::str::Chars;

use smallvec::SmallVec;

use crate::error::ScanError;


/// A pull-based supplier of Unicode code points.
///
/// `Ok(None)` marks the end of the input.
/// Once a source has returned `Ok(None)` it must keep doing so.
pub trait CharSource {
    /// Read the next code point.
    fn read_char(&mut self) -> io::Result<Option<char>>;
}

impl<'a> CharSource for Chars<'a> {
    #[inline]
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.next())
    }
}

impl<'a, S: CharSource + ?Sized> CharSource for &'a mut S {
    #[inline]
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }
}


/// Preprocesses a stream of code points for the `Tokenizer`.
///
/// `\r\n`, `\r` and `\x0C` are translated into `\n`, and U+0000 into U+FFFD,
/// so none of them is ever returned.
/// The scanner also counts positions and lines
/// and lets callers push back any number of characters.
pub struct Scanner<S> {
    source: S,

    /// Counted in code points, not bytes. From 0.
    ///
    /// Advanced once per character produced from the source,
    /// not again when a pushed back character is replayed.
    position: u64,

    /// Number of line breaks produced so far. From 0.
    line_number: u64,

    current_char: Option<char>,

    /// Set right after a `\r` so that the `\n` of a `\r\n` pair is swallowed.
    skip_lf: bool,

    /// Replayed last-in first-out before the source is read again.
    pushed_chars: SmallVec<[Option<char>; 8]>,
}


impl<S: CharSource> Scanner<S> {
    /// Create a scanner reading from `source`.
    pub fn new(source: S) -> Scanner<S> {
        Scanner {
            source,
            position: 0,
            line_number: 0,
            current_char: None,
            skip_lf: false,
            pushed_chars: SmallVec::new(),
        }
    }

    /// Return the next preprocessed character, or `None` at the end of the input.
    pub fn next_char(&mut self) -> Result<Option<char>, ScanError> {
        if let Some(c) = self.pushed_chars.pop() {
            self.current_char = c;
            return Ok(c)
        }

        let mut c = self.source.read_char()?;
        if self.skip_lf {
            self.skip_lf = false;
            if c == Some('\n') {
                self.position += 1;
                c = self.source.read_char()?;
            }
        }

        let c = match c {
            None => None,
            Some('\r') => {
                self.skip_lf = true;
                self.line_number += 1;
                self.position += 1;
                Some('\n')
            }
            Some('\n') | Some('\x0C') => {
                self.line_number += 1;
                self.position += 1;
                Some('\n')
            }
            Some('\0') => {
                self.position += 1;
                Some('\u{FFFD}')
            }
            Some(c) => {
                self.position += 1;
                Some(c)
            }
        };
        self.current_char = c;
        Ok(c)
    }

    /// Push `c` back so that it is returned by the next `next_char()` call.
    ///
    /// Characters pushed back in a row are returned in reverse order.
    #[inline]
    pub fn push_back(&mut self, c: Option<char>) {
        self.pushed_chars.push(c)
    }

    /// The last character returned by `next_char()`.
    #[inline]
    pub fn current_char(&self) -> Option<char> {
        self.current_char
    }

    /// Number of code points read from the source so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of line breaks read from the source so far.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}


#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::{CharSource, Scanner};
    use crate::error::ScanError;

    fn drain<S: CharSource>(scanner: &mut Scanner<S>) -> String {
        let mut result = String::new();
        while let Some(c) = scanner.next_char().unwrap() {
            result.push(c)
        }
        result
    }

    #[test]
    fn preprocess() {
        let mut scanner = Scanner::new("".chars());
        assert_eq!(drain(&mut scanner), "");

        let mut scanner = Scanner::new("Lorem\r\n\t\x00ipsum\ndolor\u{FFFD}\r\x0C".chars());
        assert_eq!(drain(&mut scanner), "Lorem\n\t\u{FFFD}ipsum\ndolor\u{FFFD}\n\n");
        assert_eq!(scanner.line_number(), 4);
    }

    #[test]
    fn crlf_is_one_line_break() {
        let mut scanner = Scanner::new("a\r\nb".chars());
        assert_eq!(scanner.next_char().unwrap(), Some('a'));
        assert_eq!(scanner.next_char().unwrap(), Some('\n'));
        assert_eq!(scanner.line_number(), 1);
        assert_eq!(scanner.position(), 2);
        assert_eq!(scanner.next_char().unwrap(), Some('b'));
        assert_eq!(scanner.line_number(), 1);
        // The swallowed `\n` still counts as a consumed code point.
        assert_eq!(scanner.position(), 4);
        assert_eq!(scanner.next_char().unwrap(), None);
    }

    #[test]
    fn lone_cr_does_not_swallow_a_later_lf() {
        let mut scanner = Scanner::new("\rx\n".chars());
        assert_eq!(drain(&mut scanner), "\nx\n");
        assert_eq!(scanner.line_number(), 2);
    }

    #[test]
    fn cr_cr_lf() {
        let mut scanner = Scanner::new("\r\r\n".chars());
        assert_eq!(drain(&mut scanner), "\n\n");
        assert_eq!(scanner.line_number(), 2);
    }

    #[test]
    fn nul_is_not_a_line_break() {
        let mut scanner = Scanner::new("\0".chars());
        assert_eq!(scanner.next_char().unwrap(), Some('\u{FFFD}'));
        assert_eq!(scanner.position(), 1);
        assert_eq!(scanner.line_number(), 0);
    }

    #[test]
    fn push_back_is_lifo_and_does_not_count() {
        let mut scanner = Scanner::new("abc".chars());
        let a = scanner.next_char().unwrap();
        let b = scanner.next_char().unwrap();
        let c = scanner.next_char().unwrap();
        let eof = scanner.next_char().unwrap();
        assert_eq!(eof, None);
        assert_eq!(scanner.position(), 3);

        scanner.push_back(eof);
        scanner.push_back(c);
        scanner.push_back(b);
        scanner.push_back(a);
        assert_eq!(drain(&mut scanner), "abc");
        assert_eq!(scanner.position(), 3);
        assert_eq!(scanner.current_char(), None);
    }

    #[test]
    fn deep_push_back() {
        let mut scanner = Scanner::new("".chars());
        for c in "0123456789abcdefghij".chars().rev() {
            scanner.push_back(Some(c))
        }
        assert_eq!(drain(&mut scanner), "0123456789abcdefghij");
    }

    #[test]
    fn io_errors_propagate() {
        struct Broken;

        impl CharSource for Broken {
            fn read_char(&mut self) -> io::Result<Option<char>> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }

        let mut scanner = Scanner::new(Broken);
        match scanner.next_char() {
            Err(ScanError::Io(error)) => assert_eq!(error.to_string(), "disk on fire"),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }
}
