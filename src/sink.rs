//! The output side of the escapers.

static HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Growable buffer the escapers append to.
///
/// The escapers never read back what they wrote. The only time they remove anything is when UTF-8
/// decoding fails and the whole input is escaped again as Windows-1252; then the buffer is
/// truncated back to the length it had before the first attempt started.
pub trait EscapeSink {
    /// Reserve room for at least `additional` more bytes. This is only a hint.
    fn reserve(&mut self, additional: usize);

    /// Append a range of bytes.
    fn put(&mut self, bytes: &[u8]);

    /// Append a single byte.
    #[inline]
    fn put_byte(&mut self, byte: u8) {
        self.put(&[byte]);
    }

    /// Append a numeric character reference, `&#x<hex>;`, with lowercase hex digits and no
    /// leading zeroes.
    fn put_hex_ref(&mut self, value: u32) {
        let mut digits = [0u8; 8];
        let mut pos = digits.len();
        let mut rest = value;
        loop {
            pos -= 1;
            digits[pos] = HEX_DIGITS[(rest & 0xf) as usize];
            rest >>= 4;
            if rest == 0 {
                break;
            }
        }

        self.put(b"&#x");
        self.put(&digits[pos..]);
        self.put_byte(b';');
    }

    /// Current length of the buffer in bytes.
    fn len(&self) -> usize;

    /// Shorten the buffer to `len` bytes. Does nothing if it is not longer than that.
    fn truncate(&mut self, len: usize);
}

impl EscapeSink for Vec<u8> {
    #[inline]
    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    #[inline]
    fn put_byte(&mut self, byte: u8) {
        self.push(byte);
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }
}

/// How much to reserve for escaped `len` input bytes. Most inputs grow only a little.
#[inline]
pub(crate) fn grow_hint(len: usize) -> usize {
    len.saturating_add(len / 5)
}
