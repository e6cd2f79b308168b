//! Escaping of UTF-8 text, with fallback to Windows-1252 when the text turns out not to be UTF-8.

use std::fmt::Display;

use crate::cp1252::escape_xml_cp1252;
use crate::scan::skip_literal;
use crate::sink::{grow_hint, EscapeSink};
use crate::table::{EscapeCode, UTF8_TABLE};

/// Reason why input could not be escaped as UTF-8
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// A byte that can not start a character, e.g. a continuation byte or 0xfe.
    InvalidLeadByte {
        /// Byte index of the problem
        byte: usize,

        /// The offending byte
        value: u8,
    },

    /// Too few bytes follow the lead byte of a multi-byte sequence.
    Truncated {
        /// Byte index of the lead byte
        byte: usize,

        /// How many bytes have to follow the lead byte, its declared length
        expected: usize,

        /// How many bytes were left after the lead byte
        available: usize,
    },

    /// A byte inside of a multi-byte sequence was not a continuation byte.
    BadContinuation {
        /// Byte index of the problem
        byte: usize,

        /// The offending byte
        value: u8,
    },

    /// The sequence decoded to a surrogate, a noncharacter U+FFFE/U+FFFF or a value above U+10FFFF.
    InvalidCodePoint {
        /// Byte index of the lead byte
        byte: usize,

        /// The decoded value
        code_point: u32,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            DecodeError::InvalidLeadByte { byte, value } =>
                write!(f, "Byte {:#04x} at {} can not start an UTF-8 character.", value, byte),
            DecodeError::Truncated { byte, expected, available } =>
                write!(f, "UTF-8 sequence at {} needs {} more bytes, but only {} are left.", byte, expected, available),
            DecodeError::BadContinuation { byte, value } =>
                write!(f, "Byte {:#04x} at {} is not an UTF-8 continuation byte.", value, byte),
            DecodeError::InvalidCodePoint { byte, code_point } =>
                write!(f, "UTF-8 sequence at {} decodes to invalid code point {:#x}.", byte, code_point),
        }
    }
}

impl std::error::Error for DecodeError {}

/// What to do when the input turns out not to be UTF-8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OnInvalid {
    /// Stop and return the error.
    Report,

    /// Write the `*` placeholder. Continuation bytes are not checked in this mode.
    Placeholder,
}

/// Can `chr` be written as a character reference?
#[inline(always)]
fn is_valid_scalar(chr: u32) -> bool {
    chr < 0xd800 || (0xe000..=0xfffd).contains(&chr) || (0x10000..=0x10ffff).contains(&chr)
}

fn escape_utf8<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8], on_invalid: OnInvalid) -> Result<(), DecodeError> {
    let validate = on_invalid == OnInvalid::Report;

    sink.reserve(grow_hint(src.len()));

    let size = src.len();
    let mut i = 0;
    while i < size {
        let org = i;
        i = skip_literal(src, i);

        if i > org {
            sink.put(&src[org..i]);
        }

        if i >= size {
            break;
        }

        let start = i;
        let lead = src[i];
        let chr = match UTF8_TABLE[lead as usize] {
            EscapeCode::Literal => unreachable!("Literal bytes are skipped by skip_literal!"),

            EscapeCode::Entity(entity) => {
                sink.put(entity.as_bytes());
                i += 1;
                continue;
            }

            // Stray continuation byte, or a byte that never appears in UTF-8. There is nothing
            // to resynchronize on, so the rest is dropped.
            EscapeCode::Numeric => {
                if validate {
                    return Err(DecodeError::InvalidLeadByte { byte: i, value: lead });
                }
                sink.put_byte(b'*');
                break;
            }

            EscapeCode::Sequence(length) => {
                // The declared length has to be available after the lead byte, so a sequence
                // ending right at the end of input counts as truncated too.
                let len = length.len();
                let available = size - (i + 1);
                if len > available {
                    if validate {
                        return Err(DecodeError::Truncated { byte: i, expected: len, available });
                    }
                    sink.put_byte(b'*');
                    break;
                }

                let mut chr = u32::from(lead & length.lead_mask());
                for (offset, &byte) in src[i + 1..i + len].iter().enumerate() {
                    if validate && (byte & 0xc0) != 0x80 {
                        return Err(DecodeError::BadContinuation { byte: i + 1 + offset, value: byte });
                    }
                    chr = (chr << 6) + u32::from(byte & 0x3f);
                }
                i += len;

                chr
            }
        };

        if chr < 0x80 {
            // Overlong encoding of an ASCII character, it still has to be escaped.
            match UTF8_TABLE[chr as usize] {
                EscapeCode::Entity(entity) => sink.put(entity.as_bytes()),
                _ => sink.put_byte(chr as u8),
            }
        } else if is_valid_scalar(chr) {
            sink.put_hex_ref(chr);
        } else if validate {
            return Err(DecodeError::InvalidCodePoint { byte: start, code_point: chr });
        } else {
            sink.put_byte(b'*');
        }
    }

    Ok(())
}

/// Escape `src`, taken as UTF-8 text, into `sink`. Stops at the first problem.
///
/// On error, `sink` contains the escaped part of the input before the problem.
pub fn escape_xml_utf8_checked<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8]) -> Result<(), DecodeError> {
    escape_utf8(sink, src, OnInvalid::Report)
}

/// Escape `src`, taken as UTF-8 text, into `sink`.
///
/// Every character outside of ASCII is written as a numeric character reference.
///
/// If `src` is not valid UTF-8 and `fallback_to_cp1252` is set, anything written so far is removed
/// from `sink` and the whole `src` is escaped as Windows-1252 instead.
///
/// Without the fallback, a `*` is written in place of each sequence that decodes to an invalid
/// code point. Stray continuation bytes and sequences cut short by the end of input are replaced by
/// a `*` too, but escaping stops there and rest of `src` is not written.
pub fn escape_xml_utf8<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8], fallback_to_cp1252: bool) {
    if !fallback_to_cp1252 {
        match escape_utf8(sink, src, OnInvalid::Placeholder) {
            Ok(()) => {}
            Err(err) => unreachable!("Placeholder mode reported an error: {}", err),
        }
        return;
    }

    let mark = sink.len();
    if let Err(err) = escape_xml_utf8_checked(sink, src) {
        tracing::debug!(%err, "Input is not UTF-8, escaping it as Windows-1252");
        sink.truncate(mark);
        escape_xml_cp1252(sink, src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(src: &[u8], fallback_to_cp1252: bool) -> Vec<u8> {
        let mut out = Vec::new();
        escape_xml_utf8(&mut out, src, fallback_to_cp1252);
        out
    }

    fn escape_cp1252(src: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        escape_xml_cp1252(&mut out, src);
        out
    }

    fn escape_checked(src: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        escape_xml_utf8_checked(&mut out, src)?;
        Ok(out)
    }

    #[test]
    fn test_ascii() {
        for &fallback in &[true, false] {
            assert_eq!(escape(b"He said \"hi\" & left", fallback), b"He said &quot;hi&quot; &amp; left".to_vec());
            assert_eq!(escape(b"</script>", fallback), b"&lt;&#47;script&gt;".to_vec());
            assert_eq!(escape(b"it's", fallback), b"it&#39;s".to_vec());
            assert_eq!(escape(b"bell\x07", fallback), b"bell*".to_vec());
            assert_eq!(escape(b"", fallback), b"".to_vec());
        }
    }

    #[test]
    fn test_multibyte() {
        for &fallback in &[true, false] {
            assert_eq!(escape("caf\u{e9}s".as_bytes(), fallback), b"caf&#xe9;s".to_vec());
            assert_eq!(escape("\u{20ac}.".as_bytes(), fallback), b"&#x20ac;.".to_vec());
            assert_eq!(escape("5 \u{20ac} < 6 \u{20ac}\n".as_bytes(), fallback), b"5 &#x20ac; &lt; 6 &#x20ac;\n".to_vec());
            assert_eq!(escape("\u{1f600}!".as_bytes(), fallback), b"&#x1f600;!".to_vec());
            assert_eq!(escape("\u{10ffff} ".as_bytes(), fallback), b"&#x10ffff; ".to_vec());
            assert_eq!(escape("\u{fffd} ".as_bytes(), fallback), b"&#xfffd; ".to_vec());
        }
    }

    #[test]
    fn test_overlong_ascii_is_escaped() {
        assert_eq!(escape(b"\xc0\xa6 ", false), b"&amp; ".to_vec());
        assert_eq!(escape(b"\xc1\x81 ", false), b"A ".to_vec());
        assert_eq!(escape(b"\xc0\x80 ", false), b"* ".to_vec());
        assert_eq!(escape(b"\xe0\x80\xbc ", true), b"&lt; ".to_vec());
    }

    #[test]
    fn test_truncated() {
        assert_eq!(escape(b"a<b\xe2\x82", false), b"a&lt;b*".to_vec());
        assert_eq!(escape(b"a<b\xe2\x82", true), escape_cp1252(b"a<b\xe2\x82"));
        assert_eq!(escape(b"a<b\xe2\x82", true), b"a&lt;b&#xe2;&#8218;".to_vec());
        assert_eq!(escape(b"ok\xf0", false), b"ok*".to_vec());
    }

    #[test]
    fn test_sequence_at_end_of_input() {
        // A complete sequence with nothing behind it is still short of one byte.
        let inputs: [&[u8]; 3] = [b"x\xc3\xa9", b"x\xe2\x82\xac", b"x\xf0\x9f\x98\x80"];

        for input in &inputs {
            assert_eq!(escape(input, false), b"x*".to_vec());
            assert_eq!(escape(input, true), escape_cp1252(input));
        }
        assert_eq!(escape(b"x\xe2\x82\xac", true), b"x&#xe2;&#8218;&#xac;".to_vec());
        assert_eq!(escape(b"x\xc3\xa9", true), b"x&#xc3;&#xa9;".to_vec());

        // One more byte, of any kind, is enough.
        assert_eq!(escape(b"x\xc3\xa9y", false), b"x&#xe9;y".to_vec());
        assert_eq!(escape(b"x\xe2\x82\xac<", true), b"x&#x20ac;&lt;".to_vec());
        assert_eq!(escape(b"x\xf0\x9f\x98\x80\t", true), b"x&#x1f600;\t".to_vec());

        assert_eq!(
            escape_checked(b"x\xe2\x82\xac"),
            Err(DecodeError::Truncated { byte: 1, expected: 3, available: 2 }),
        );
    }

    #[test]
    fn test_stray_continuation() {
        assert_eq!(escape(b"x\x80y<", false), b"x*".to_vec());
        assert_eq!(escape(b"x\x80y<", true), b"x&#8364;y&lt;".to_vec());
        assert_eq!(escape(b"\xfe\xff", false), b"*".to_vec());
        assert_eq!(escape(b"\xfe\xff", true), b"&#xfe;&#xff;".to_vec());
    }

    #[test]
    fn test_bad_continuation() {
        // Windows-1252 text that happens to start like a sequence.
        assert_eq!(escape(b"caf\xe9 & co", true), b"caf&#xe9; &amp; co".to_vec());

        // Without fallback the bytes are folded in without checking.
        assert_eq!(escape(b"\xc3A.", false), b"&#xc1;.".to_vec());
    }

    #[test]
    fn test_invalid_code_point() {
        assert_eq!(escape(b"a\xed\xa0\x80b<", false), b"a*b&lt;".to_vec());
        assert_eq!(escape(b"a\xed\xa0\x80b<", true), escape_cp1252(b"a\xed\xa0\x80b<"));
        assert_eq!(escape(b"a\xed\xa0\x80b<", true), b"a&#xed;&#xa0;&#8364;b&lt;".to_vec());

        assert_eq!(escape(b"\xef\xbf\xbe|\xef\xbf\xbf|", false), b"*|*|".to_vec());
        assert_eq!(escape(b"\xf4\x90\x80\x80.", false), b"*.".to_vec());
        assert_eq!(escape(b"\xf8\x88\x80\x80\x80.", false), b"*.".to_vec());
        assert_eq!(escape(b"\xfc\x84\x80\x80\x80\x80.", false), b"*.".to_vec());
    }

    #[test]
    fn test_fallback_keeps_earlier_output() {
        let mut out = b"<td>".to_vec();
        escape_xml_utf8(&mut out, b"\xe9t\xe9 <", true);
        assert_eq!(out, b"<td>&#xe9;t&#xe9; &lt;".to_vec());
    }

    #[test]
    fn test_checked() {
        assert_eq!(escape_checked("x \u{e9} y".as_bytes()), Ok(b"x &#xe9; y".to_vec()));
        assert_eq!(escape_checked(b"ab\x80"), Err(DecodeError::InvalidLeadByte { byte: 2, value: 0x80 }));
        assert_eq!(escape_checked(b"a\xe2\x82"), Err(DecodeError::Truncated { byte: 1, expected: 3, available: 1 }));
        assert_eq!(escape_checked(b"\xc3(."), Err(DecodeError::BadContinuation { byte: 1, value: b'(' }));
        assert_eq!(escape_checked(b"&\xed\xa0\x80."), Err(DecodeError::InvalidCodePoint { byte: 1, code_point: 0xd800 }));
    }

    #[test]
    fn test_checked_keeps_prefix() {
        let mut out = Vec::new();
        let err = escape_xml_utf8_checked(&mut out, b"1 < 2 \xff").unwrap_err();
        assert_eq!(out, b"1 &lt; 2 ".to_vec());
        assert_eq!(err.to_string(), "Byte 0xff at 6 can not start an UTF-8 character.");
    }

    #[test]
    fn test_valid_utf8_same_with_and_without_fallback() {
        let text = "\u{201c}Quotes\u{201d} \u{2013} <b>na\u{ef}ve</b> \u{65e5}\u{672c} \u{1d11e}!";
        assert_eq!(escape(text.as_bytes(), true), escape(text.as_bytes(), false));
        assert_eq!(
            escape(text.as_bytes(), true),
            b"&#x201c;Quotes&#x201d; &#x2013; &lt;b&gt;na&#xef;ve&lt;&#47;b&gt; &#x65e5;&#x672c; &#x1d11e;!".to_vec(),
        );
    }
}
