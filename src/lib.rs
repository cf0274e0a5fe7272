/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![crate_name = "csstokenizer"]
#![crate_type = "rlib"]
#![deny(missing_docs)]

/*!

A streaming tokenizer for CSS, pulling code points from any source one at a time.

# Input

A `Tokenizer` reads from a `CharSource`.
`Tokenizer::new` takes a `&str`.
If you have bytes (from a file, the network, or something),
use `Tokenizer::from_reader`, which decodes them with a `ReadSource`.

Characters go through a `Scanner` first,
which normalizes newlines and NUL characters and counts lines and positions.

# Tokens

Each call to `Tokenizer::next_token` returns a `TokenKind`.
Its payload stays available from the tokenizer until the next call:

```{rust,ignore}
let mut tokenizer = Tokenizer::new("width: 10px");
assert_eq!(tokenizer.next_token()?, TokenKind::Ident);
assert_eq!(tokenizer.current_string_value(), "width");
tokenizer.next_token()?;  // Delim(':')
tokenizer.next_token()?;  // WhiteSpace
assert_eq!(tokenizer.next_token()?, TokenKind::Dimension);
assert_eq!(tokenizer.current_numeric_value(), Some(NumericValue::Integer(10)));
assert_eq!(tokenizer.current_unit(), Some("px"));
```

Malformed CSS never fails: it produces `BadString`, `BadUrl` or `BadComment` tokens
and tokenization continues.
The only errors are failures of the underlying source, as `ScanError`.

One token can be pushed back with `Tokenizer::push_back`,
for callers that need one token of lookahead.

*/

pub use crate::error::ScanError;
pub use crate::from_bytes::ReadSource;
pub use crate::scanner::{CharSource, Scanner};
pub use crate::serializer::{serialize_identifier, serialize_name, serialize_string};
pub use crate::serializer::{serialize_string_or_ident, CssStringWriter, ToCss};
pub use crate::tokenizer::{NumericValue, Token, TokenKind, Tokenizer, TokenizerOptions, Tokens};


mod error;
mod from_bytes;
mod scanner;
mod serializer;
mod tokenizer;
