/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::io::{self, Read};

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};
use tracing::debug;

use crate::scanner::CharSource;


const CHUNK_SIZE: usize = 8 * 1024;


/// A `CharSource` that decodes a byte stream.
///
/// Bytes are read in chunks and decoded incrementally,
/// so multi-byte sequences may straddle chunk boundaries.
/// Malformed byte sequences are replaced with U+FFFD.
///
/// * `ReadSource::new` decodes UTF-8. A byte order mark, if any, is removed
///   and selects UTF-8, UTF-16LE or UTF-16BE instead.
/// * `ReadSource::for_label` takes an encoding label
///   as defined by the [Encoding Standard](https://encoding.spec.whatwg.org/#names-and-labels),
///   e.g. from the `charset` parameter of a `Content-Type` header.
///   Unknown labels fall back to UTF-8.
pub struct ReadSource<R> {
    reader: R,
    decoder: Decoder,
    bytes: Box<[u8]>,
    decoded: String,
    /// Byte offset of the next character in `decoded`.
    cursor: usize,
    finished: bool,
}


impl<R: Read> ReadSource<R> {
    /// Decode `reader` as UTF-8, honoring a byte order mark.
    pub fn new(reader: R) -> ReadSource<R> {
        ReadSource::with_encoding(reader, UTF_8)
    }

    /// Decode `reader` with the encoding for `label`, or UTF-8 if the label is unknown.
    pub fn for_label(reader: R, label: &str) -> ReadSource<R> {
        let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
        ReadSource::with_encoding(reader, encoding)
    }

    /// Decode `reader` with `encoding`, honoring a byte order mark.
    pub fn with_encoding(reader: R, encoding: &'static Encoding) -> ReadSource<R> {
        ReadSource {
            reader,
            decoder: encoding.new_decoder(),
            bytes: vec![0; CHUNK_SIZE].into_boxed_slice(),
            decoded: String::new(),
            cursor: 0,
            finished: false,
        }
    }

    /// The encoding in use.
    ///
    /// This can change once the first bytes are read, if they are a byte order mark.
    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// Refill `decoded` with the next non-empty decoded chunk,
    /// leaving it empty at the end of the input.
    fn fill(&mut self) -> io::Result<()> {
        self.decoded.clear();
        self.cursor = 0;
        while self.decoded.is_empty() && !self.finished {
            let read = match self.reader.read(&mut self.bytes) {
                Ok(read) => read,
                Err(ref error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            let last = read == 0;
            let mut input = &self.bytes[..read];
            loop {
                if let Some(needed) = self.decoder.max_utf8_buffer_length(input.len()) {
                    self.decoded.reserve(needed);
                }
                let (result, consumed, had_errors) =
                    self.decoder.decode_to_string(input, &mut self.decoded, last);
                if had_errors {
                    debug!(
                        encoding = self.decoder.encoding().name(),
                        "malformed byte sequence replaced with U+FFFD"
                    );
                }
                input = &input[consumed..];
                match result {
                    CoderResult::InputEmpty => break,
                    CoderResult::OutputFull => continue,
                }
            }
            self.finished = last;
        }
        Ok(())
    }
}


impl<R: Read> CharSource for ReadSource<R> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        if self.cursor >= self.decoded.len() {
            self.fill()?;
        }
        match self.decoded[self.cursor..].chars().next() {
            Some(c) => {
                self.cursor += c.len_utf8();
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }
}


impl<R> fmt::Debug for ReadSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReadSource")
            .field("encoding", &self.decoder.encoding().name())
            .field("finished", &self.finished)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use pretty_assertions::assert_eq;

    use super::ReadSource;
    use crate::scanner::CharSource;

    fn decode<S: CharSource>(mut source: S) -> io::Result<String> {
        let mut result = String::new();
        while let Some(c) = source.read_char()? {
            result.push(c)
        }
        Ok(result)
    }

    /// Hands out one byte per `read` call, after an interruption.
    struct Trickle<'a> {
        bytes: &'a [u8],
        interrupt: bool,
    }

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"))
            }
            match self.bytes.split_first() {
                Some((&first, rest)) if !buf.is_empty() => {
                    buf[0] = first;
                    self.bytes = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn utf8() {
        let source = ReadSource::new("a { content: \"é😀\" }".as_bytes());
        assert_eq!(decode(source).unwrap(), "a { content: \"é😀\" }");
    }

    #[test]
    fn utf8_bom_is_removed() {
        let source = ReadSource::new(&b"\xEF\xBB\xBFp{}"[..]);
        assert_eq!(decode(source).unwrap(), "p{}");
    }

    #[test]
    fn utf16_bom_switches_encoding() {
        let mut source = ReadSource::new(&b"\xFF\xFEp\x00{\x00}\x00"[..]);
        assert_eq!(source.read_char().unwrap(), Some('p'));
        assert_eq!(source.encoding().name(), "UTF-16LE");
        assert_eq!(decode(source).unwrap(), "{}");
    }

    #[test]
    fn label() {
        let source = ReadSource::for_label(&b"caf\xE9"[..], "latin1");
        assert_eq!(source.encoding().name(), "windows-1252");
        assert_eq!(decode(source).unwrap(), "café");
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let source = ReadSource::for_label(&b"caf\xC3\xA9"[..], "not-an-encoding");
        assert_eq!(source.encoding().name(), "UTF-8");
        assert_eq!(decode(source).unwrap(), "café");
    }

    #[test]
    fn malformed_bytes_are_replaced() {
        let source = ReadSource::new(&b"a\xFFb\xC3"[..]);
        assert_eq!(decode(source).unwrap(), "a\u{FFFD}b\u{FFFD}");
    }

    #[test]
    fn sequences_split_across_reads() {
        let source = ReadSource::new(Trickle { bytes: "é😀x".as_bytes(), interrupt: false });
        assert_eq!(decode(source).unwrap(), "é😀x");
    }

    #[test]
    fn eof_is_sticky() {
        let mut source = ReadSource::new(&b""[..]);
        assert_eq!(source.read_char().unwrap(), None);
        assert_eq!(source.read_char().unwrap(), None);
    }

    #[test]
    fn read_errors_propagate() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"))
            }
        }

        let error = ReadSource::new(Broken).read_char().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }
}
