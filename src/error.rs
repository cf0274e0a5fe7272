/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::io;

use thiserror::Error;

/// A failure of the character source underneath a `Scanner` or `Tokenizer`.
///
/// Malformed CSS is never reported through this type:
/// it surfaces as one of the `Bad*` token kinds instead.
/// A `ScanError` is fatal for the current scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Reading from the underlying source failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}
