/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt::{self, Write};

use dtoa_short::Notation;

use crate::tokenizer::{NumericValue, Token, TokenKind};


/// Trait for things that can serialize themselves in CSS syntax.
pub trait ToCss {
    /// Serialize `self` in CSS syntax, writing to `dest`.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result where W: fmt::Write;

    /// Serialize `self` in CSS syntax and return a string.
    ///
    /// (This is a convenience wrapper for `to_css` and probably should not be overridden.)
    #[inline]
    fn to_css_string(&self) -> String {
        let mut s = String::new();
        self.to_css(&mut s).unwrap();
        s
    }
}


fn write_numeric<W>(value: NumericValue, has_sign: bool, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    match value {
        NumericValue::Integer(int_value) => {
            if has_sign && int_value >= 0 {
                dest.write_str("+")?;
            }
            dest.write_str(itoa::Buffer::new().format(int_value))
        }
        NumericValue::Float(value) => {
            // `value >= 0` is true for negative 0.
            if has_sign && value.is_sign_positive() {
                dest.write_str("+")?;
            }
            let notation = if value == 0.0 && value.is_sign_negative() {
                // Negative zero.
                dest.write_str("-0")?;
                Notation { decimal_point: false, scientific: false }
            } else {
                dtoa_short::write(dest, value)?
            };
            // An integral float keeps a fractional part, so it reads back as a float.
            if value.fract() == 0. && !notation.decimal_point && !notation.scientific {
                dest.write_str(".0")?;
            }
            Ok(())
        }
    }
}


impl ToCss for NumericValue {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result where W: fmt::Write {
        write_numeric(*self, false, dest)
    }
}


impl ToCss for Token {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result where W: fmt::Write {
        let has_sign = self.value.starts_with('+');
        match self.kind {
            TokenKind::Eof => {}
            TokenKind::WhiteSpace => {
                if self.value.is_empty() {
                    dest.write_char(' ')?
                } else {
                    dest.write_str(&self.value)?
                }
            }
            TokenKind::Ident => serialize_identifier(&self.value, dest)?,
            TokenKind::AtKeyword => {
                dest.write_str("@")?;
                serialize_identifier(&self.value, dest)?;
            }
            TokenKind::Hash => {
                dest.write_str("#")?;
                serialize_name(&self.value, dest)?;
            }
            TokenKind::QuotedString => serialize_string(&self.value, dest)?,
            TokenKind::Url => {
                dest.write_str("url(")?;
                serialize_string(&self.value, dest)?;
                dest.write_str(")")?;
            }
            TokenKind::Function => {
                serialize_identifier(&self.value, dest)?;
                dest.write_str("(")?;
            }
            TokenKind::Delim(value) => dest.write_char(value)?,

            TokenKind::Number => {
                if let Some(value) = self.numeric_value {
                    write_numeric(value, has_sign, dest)?
                }
            }
            TokenKind::Percentage => {
                if let Some(value) = self.numeric_value {
                    write_numeric(value, has_sign, dest)?
                }
                dest.write_str("%")?;
            }
            TokenKind::Dimension => {
                if let Some(value) = self.numeric_value {
                    write_numeric(value, has_sign, dest)?
                }
                if let Some(ref unit) = self.unit {
                    serialize_unit(unit, dest)?
                }
            }

            TokenKind::UnicodeRange => dest.write_str(&self.value)?,
            TokenKind::IncludeMatch => dest.write_str("~=")?,
            TokenKind::DashMatch => dest.write_str("|=")?,
            TokenKind::PrefixMatch => dest.write_str("^=")?,
            TokenKind::SuffixMatch => dest.write_str("$=")?,
            TokenKind::SubstringMatch => dest.write_str("*=")?,
            TokenKind::Column => dest.write_str("||")?,
            TokenKind::CDO => dest.write_str("<!--")?,
            TokenKind::CDC => dest.write_str("-->")?,
            TokenKind::Comment => {
                dest.write_str("/*")?;
                dest.write_str(&self.value)?;
                dest.write_str("*/")?;
            }

            TokenKind::BadUrl => {
                dest.write_str("url(")?;
                dest.write_str(&self.value)?;
                dest.write_str(" ")?;
            }
            TokenKind::BadString => {
                dest.write_str("\"")?;
                CssStringWriter::new(dest).write_str(&self.value)?;
                // This string ends in a newline.
                dest.write_str("\n")?;
            }
            TokenKind::BadComment => {
                dest.write_str("/*")?;
                dest.write_str(&self.value)?;
            }
        }
        Ok(())
    }
}


fn serialize_unit<W>(unit: &str, dest: &mut W) -> fmt::Result where W: fmt::Write {
    let mut chars = unit.chars();
    match (chars.next(), chars.next()) {
        // Disambiguate with scientific notation.
        (Some(first @ ('e' | 'E')), None | Some('-' | '0'..='9')) => {
            hex_escape(first, dest)?;
            serialize_name(&unit[1..], dest)
        }
        _ => serialize_identifier(unit, dest),
    }
}


fn hex_escape<W>(c: char, dest: &mut W) -> fmt::Result where W: fmt::Write {
    write!(dest, "\\{:x} ", c as u32)
}

fn char_escape<W>(c: char, dest: &mut W) -> fmt::Result where W: fmt::Write {
    dest.write_char('\\')?;
    dest.write_char(c)
}

#[inline]
fn is_name_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_') || c > '\u{9F}'
}

#[inline]
fn is_name_char(c: char) -> bool {
    is_name_start(c) || matches!(c, '0'..='9' | '-')
}


/// Write a CSS identifier, escaping characters as necessary.
///
/// Tokenizing the result yields a single `Ident` with `value`.
/// An empty `value` writes nothing.
pub fn serialize_identifier<W>(mut value: &str, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    if value.is_empty() {
        return Ok(())
    }

    if value == "-" {
        return dest.write_str("\\-")
    }
    if let Some(rest) = value.strip_prefix('-') {
        dest.write_str("-")?;
        value = rest;
    }
    let mut chars = value.chars();
    if let Some(first) = chars.next() {
        match first {
            c if is_name_start(c) => dest.write_char(c)?,
            '0'..='9' => hex_escape(first, dest)?,
            c => serialize_name_char(c, dest)?,
        }
    }
    serialize_name(chars.as_str(), dest)
}


/// Write a CSS name, like a custom property name or the value of a `Hash` token.
///
/// You should only use this when you know what you're doing, when in doubt,
/// consider using `serialize_identifier`.
pub fn serialize_name<W>(value: &str, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    let mut chunk_start = 0;
    for (i, c) in value.char_indices() {
        if is_name_char(c) {
            continue
        }
        dest.write_str(&value[chunk_start..i])?;
        serialize_name_char(c, dest)?;
        chunk_start = i + c.len_utf8();
    }
    dest.write_str(&value[chunk_start..])
}


fn serialize_name_char<W>(c: char, dest: &mut W) -> fmt::Result where W: fmt::Write {
    match c {
        '\0'..='\x1F' | '\x7F'..='\u{9F}' => hex_escape(c, dest),
        _ => char_escape(c, dest),
    }
}


/// Write a double-quoted CSS string token, escaping content as necessary.
pub fn serialize_string<W>(value: &str, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    dest.write_str("\"")?;
    CssStringWriter::new(dest).write_str(value)?;
    dest.write_str("\"")?;
    Ok(())
}


/// Write `value` bare if it is a plain identifier, as a double-quoted string otherwise.
///
/// A plain identifier needs no escaping: an optional `-`, a letter, `_`
/// or non-ASCII character, then letters, digits, `_`, `-` or non-ASCII characters.
pub fn serialize_string_or_ident<W>(value: &str, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    if is_plain_identifier(value) {
        dest.write_str(value)
    } else {
        serialize_string(value, dest)
    }
}

fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.strip_prefix('-').unwrap_or(value).chars();
    match chars.next() {
        Some(c) if is_name_start(c) => chars.all(is_name_char),
        _ => false,
    }
}


/// A `fmt::Write` adapter that escapes text for writing as a double-quoted CSS string.
/// Quotes are not included.
///
/// Typical usage:
///
/// ```{rust,ignore}
/// fn write_foo<W>(foo: &Foo, dest: &mut W) -> fmt::Result where W: fmt::Write {
///     dest.write_str("\"")?;
///     {
///         let mut string_dest = CssStringWriter::new(dest);
///         // Write into string_dest...
///     }
///     dest.write_str("\"")?;
///     Ok(())
/// }
/// ```
pub struct CssStringWriter<'a, W> {
    inner: &'a mut W,
}

impl<'a, W> CssStringWriter<'a, W> where W: fmt::Write {
    /// Wrap a text writer to create a `CssStringWriter`.
    pub fn new(inner: &'a mut W) -> CssStringWriter<'a, W> {
        CssStringWriter { inner }
    }
}

impl<'a, W> fmt::Write for CssStringWriter<'a, W> where W: fmt::Write {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut chunk_start = 0;
        for (i, b) in s.bytes().enumerate() {
            let escaped = match b {
                b'"' => Some("\\\""),
                b'\\' => Some("\\\\"),
                b'\0'..=b'\x1F' | b'\x7F' => None,
                _ => continue,
            };
            self.inner.write_str(&s[chunk_start..i])?;
            match escaped {
                Some(x) => self.inner.write_str(x)?,
                None => hex_escape(b as char, self.inner)?,
            };
            chunk_start = i + 1;
        }
        self.inner.write_str(&s[chunk_start..])
    }
}
