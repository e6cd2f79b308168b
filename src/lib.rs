//! OWASP-style escaping of text for XML and HTML content.
//!
//! The input is a byte buffer of unknown quality: valid UTF-8, Windows-1252 text, or anything in
//! between. The output is appended to a [`EscapeSink`] and is always plain ASCII:
//!
//! * `&`, `<`, `>`, `"`, `'` and `/` become `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#39;` and `&#47;`.
//! * Control characters other than tab, line feed and carriage return become `*`.
//! * Everything above ASCII becomes a numeric character reference.
//!
//! There are two escapers, sharing the same tables:
//!
//! * [`escape_xml_utf8`]: Decodes UTF-8 and writes each character as `&#x<hex>;`. When the input
//!                        is not valid UTF-8, it either starts over with the Windows-1252 escaper,
//!                        or writes a `*` placeholder.
//! * [`escape_xml_cp1252`]: Treats every byte as a Windows-1252 character. Never fails.
//!
//! [`escape_xml`] is the one to use for input of unknown encoding.
//!
//! ```
//! let mut out = Vec::new();
//! rapid_xml_escape::escape_xml(&mut out, b"He said \"hi\" & left");
//! assert_eq!(out, b"He said &quot;hi&quot; &amp; left");
//! ```

#![warn(missing_docs)]

#![cfg_attr(feature = "bencher", feature(test))]
#[cfg(feature = "bencher")]
extern crate test;

pub use cp1252::escape_xml_cp1252;
pub use options::{EscapeOptions, InputEncoding};
pub use sink::EscapeSink;
pub use utf8::{escape_xml_utf8, escape_xml_utf8_checked, DecodeError};

pub mod table;

mod cp1252;
mod options;
mod scan;
mod sink;
mod utf8;

/// Escape `src` into `sink`. The input is decoded as UTF-8, or as Windows-1252 if it is not valid
/// UTF-8.
#[inline]
pub fn escape_xml<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8]) {
    escape_xml_utf8(sink, src, true)
}

/// Escape `src` into `sink` according to `options`.
#[inline]
pub fn escape_xml_with<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8], options: &EscapeOptions) {
    options.escape(sink, src)
}

/// Escape `src` into a new `Vec`, same as [`escape_xml`].
pub fn escape_xml_to_vec(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    escape_xml(&mut out, src);
    out
}
