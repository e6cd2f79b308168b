//! Escaping of Windows-1252 (and Latin-1) text.

use crate::scan::skip_literal;
use crate::sink::{grow_hint, EscapeSink};
use crate::table::{EscapeCode, CP1252_TABLE};

/// Escape `src`, taken as Windows-1252 text, into `sink`.
///
/// Every byte has a defined meaning in Windows-1252, so this can not fail. The characters of the
/// C1 range (0x80 - 0x9f) are written as the references of their Unicode equivalents, e.g. 0x80
/// becomes `&#8364;`. Bytes undefined in Windows-1252 and everything above 0x9f is written as
/// `&#x<byte>;`.
pub fn escape_xml_cp1252<S: EscapeSink + ?Sized>(sink: &mut S, src: &[u8]) {
    sink.reserve(grow_hint(src.len()));

    let mut i = 0;
    while i < src.len() {
        let org = i;
        i = skip_literal(src, i);

        if i > org {
            sink.put(&src[org..i]);
        }

        if i >= src.len() {
            break;
        }

        let byte = src[i];
        match CP1252_TABLE[byte as usize] {
            EscapeCode::Numeric => sink.put_hex_ref(u32::from(byte)),
            EscapeCode::Entity(entity) => sink.put(entity.as_bytes()),
            EscapeCode::Literal => sink.put_byte(byte),
            EscapeCode::Sequence(_) => unreachable!("Windows-1252 has no multi-byte sequences!"),
        }
        i += 1;
    }
}
