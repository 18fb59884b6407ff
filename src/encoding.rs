//! Per-repository byte encoding for paths and engine output
//!
//! Engines speak bytes: path arguments go in encoded, captured output comes
//! back encoded. The encoding is configured per repository handle and applied
//! symmetrically on both sides. UTF-8 is the default.

use serde::Serialize;
use std::ffi::OsString;

/// Byte encoding used for command arguments and captured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Encoding {
  /// UTF-8, decoded leniently (invalid sequences become U+FFFD)
  #[default]
  Utf8,
  /// ISO-8859-1: every byte maps to the Unicode scalar of equal value
  Latin1,
}

impl Encoding {
  /// Decode captured engine output into text.
  pub fn decode(&self, bytes: &[u8]) -> String {
    match self {
      Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
      Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    }
  }

  /// Encode caller-supplied text for use as a command argument.
  ///
  /// Characters outside Latin-1 have no representation there and are
  /// replaced with `?`, matching the lenient decode direction.
  pub fn encode(&self, text: &str) -> Vec<u8> {
    match self {
      Encoding::Utf8 => text.as_bytes().to_vec(),
      Encoding::Latin1 => text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect(),
    }
  }

  /// Encode text into an argument the platform can pass to a subprocess.
  ///
  /// On Unix the encoded bytes are passed through verbatim; elsewhere the
  /// argument falls back to the text itself.
  pub fn encode_arg(&self, text: &str) -> OsString {
    #[cfg(unix)]
    {
      use std::os::unix::ffi::OsStringExt;
      OsString::from_vec(self.encode(text))
    }
    #[cfg(not(unix))]
    {
      OsString::from(text.to_string())
    }
  }
}
