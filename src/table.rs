//! Escape codes and the byte classification tables.
//!
//! Every byte value maps to an [`EscapeCode`] in one of two tables: [`CP1252_TABLE`] for bytes
//! that are taken as Windows-1252 characters and [`UTF8_TABLE`] for bytes that are taken as the
//! start of an UTF-8 sequence. Both tables are built at compile time and never change.
//!
//! The codes also have a compact raw form, which is what `dump_tables` prints:
//!
//! ```text
//!   0     ..  Literal, copy the byte as is
//!   1     ..  Numeric, escape as `&#x..;` (or invalid, in UTF-8 mode)
//!   2..=6 ..  Sequence, UTF-8 lead byte of a sequence of that many bytes
//!   7..   ..  Entity, index of the replacement string
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Replacement string emitted for a classified byte or code point.
///
/// The discriminant is the raw escape code of the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Entity {
    /// `*`, stands in for control characters and undecodable input
    Placeholder = 7,
    /// `"`
    Quot = 8,
    /// `&`
    Amp = 9,
    /// `'`, `&apos;` is not recommended
    Apos = 10,
    /// `/`, it helps end an XML entity
    Slash = 11,
    /// `<`
    Lt = 12,
    /// `>`
    Gt = 13,

    /// 0x80: euro sign
    Euro = 14,
    /// 0x82: single low-9 quotation mark
    SingleLowQuote = 15,
    /// 0x83: latin small letter f with hook
    FHook = 16,
    /// 0x84: double low-9 quotation mark
    DoubleLowQuote = 17,
    /// 0x85: horizontal ellipsis
    Ellipsis = 18,
    /// 0x86: dagger
    Dagger = 19,
    /// 0x87: double dagger
    DoubleDagger = 20,
    /// 0x88: modifier letter circumflex accent
    Circumflex = 21,
    /// 0x89: per mille sign
    PerMille = 22,
    /// 0x8A: latin capital letter s with caron
    CapitalSCaron = 23,
    /// 0x8B: single left-pointing angle quotation mark
    LeftAngleQuote = 24,
    /// 0x8C: latin capital ligature oe
    CapitalOe = 25,
    /// 0x8E: latin capital letter z with caron
    CapitalZCaron = 26,
    /// 0x91: left single quotation mark
    LeftSingleQuote = 27,
    /// 0x92: right single quotation mark
    RightSingleQuote = 28,
    /// 0x93: left double quotation mark
    LeftDoubleQuote = 29,
    /// 0x94: right double quotation mark
    RightDoubleQuote = 30,
    /// 0x95: bullet
    Bullet = 31,
    /// 0x96: en dash
    EnDash = 32,
    /// 0x97: em dash
    EmDash = 33,
    /// 0x98: small tilde
    SmallTilde = 34,
    /// 0x99: trade mark sign
    TradeMark = 35,
    /// 0x9A: latin small letter s with caron
    SmallSCaron = 36,
    /// 0x9B: single right-pointing angle quotation mark
    RightAngleQuote = 37,
    /// 0x9C: latin small ligature oe
    SmallOe = 38,
    /// 0x9E: latin small letter z with caron
    SmallZCaron = 39,
    /// 0x9F: latin capital letter y with diaeresis
    CapitalYDiaeresis = 40,
}

impl Entity {
    /// The replacement string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Entity::Placeholder => "*",
            Entity::Quot => "&quot;",
            Entity::Amp => "&amp;",
            Entity::Apos => "&#39;",
            Entity::Slash => "&#47;",
            Entity::Lt => "&lt;",
            Entity::Gt => "&gt;",

            Entity::Euro => "&#8364;",
            Entity::SingleLowQuote => "&#8218;",
            Entity::FHook => "&#402;",
            Entity::DoubleLowQuote => "&#8222;",
            Entity::Ellipsis => "&#8230;",
            Entity::Dagger => "&#8224;",
            Entity::DoubleDagger => "&#8225;",
            Entity::Circumflex => "&#710;",
            Entity::PerMille => "&#8240;",
            Entity::CapitalSCaron => "&#352;",
            Entity::LeftAngleQuote => "&#8249;",
            Entity::CapitalOe => "&#338;",
            Entity::CapitalZCaron => "&#381;",
            Entity::LeftSingleQuote => "&#8216;",
            Entity::RightSingleQuote => "&#8217;",
            Entity::LeftDoubleQuote => "&#8220;",
            Entity::RightDoubleQuote => "&#8221;",
            Entity::Bullet => "&#8226;",
            Entity::EnDash => "&#8211;",
            Entity::EmDash => "&#8212;",
            Entity::SmallTilde => "&#732;",
            Entity::TradeMark => "&#8482;",
            Entity::SmallSCaron => "&#353;",
            Entity::RightAngleQuote => "&#8250;",
            Entity::SmallOe => "&#339;",
            Entity::SmallZCaron => "&#382;",
            Entity::CapitalYDiaeresis => "&#376;",
        }
    }

    /// The replacement string as bytes.
    #[inline(always)]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// Declared length of an UTF-8 sequence, taken from its lead byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SequenceLength {
    /// `110xxxxx`
    Two = 2,
    /// `1110xxxx`
    Three = 3,
    /// `11110xxx`
    Four = 4,
    /// `111110xx`
    Five = 5,
    /// `1111110x`
    Six = 6,
}

impl SequenceLength {
    /// Total length of the sequence, lead byte included.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self as usize
    }

    /// Mask selecting the code point bits of the lead byte.
    #[inline(always)]
    pub const fn lead_mask(self) -> u8 {
        0xff >> (self as u8)
    }
}

/// What to do with a byte found in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EscapeCode {
    /// Copy the byte to the output unchanged.
    Literal,

    /// Emit a numeric character reference of the byte. In UTF-8 mode the byte can not start a
    /// sequence, so it is treated as invalid.
    Numeric,

    /// The byte starts a multi-byte UTF-8 sequence.
    Sequence(SequenceLength),

    /// Emit the replacement string.
    Entity(Entity),
}

impl EscapeCode {
    /// Decode the raw form of the code. Returns `None` for values that name no code.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(EscapeCode::Literal),
            1 => Some(EscapeCode::Numeric),
            2..=6 => SequenceLength::try_from(raw).ok().map(EscapeCode::Sequence),
            _ => Entity::try_from(raw).ok().map(EscapeCode::Entity),
        }
    }

    /// The raw form of the code.
    pub fn to_raw(self) -> u8 {
        match self {
            EscapeCode::Literal => 0,
            EscapeCode::Numeric => 1,
            EscapeCode::Sequence(length) => length.into(),
            EscapeCode::Entity(entity) => entity.into(),
        }
    }

    /// Is this the code of bytes that need no escaping?
    #[inline(always)]
    pub const fn is_literal(self) -> bool {
        matches!(self, EscapeCode::Literal)
    }
}

/// Codes for the 7-bit range, shared by both tables. Everything above is `Literal` and has to be
/// filled in by the caller.
const fn ascii_codes() -> [EscapeCode; 256] {
    let mut table = [EscapeCode::Literal; 256];

    let mut b = 0;
    while b < 0x20 {
        table[b] = EscapeCode::Entity(Entity::Placeholder);
        b += 1;
    }
    table[b'\t' as usize] = EscapeCode::Literal;
    table[b'\n' as usize] = EscapeCode::Literal;
    table[b'\r' as usize] = EscapeCode::Literal;

    table[b'"' as usize] = EscapeCode::Entity(Entity::Quot);
    table[b'&' as usize] = EscapeCode::Entity(Entity::Amp);
    table[b'\'' as usize] = EscapeCode::Entity(Entity::Apos);
    table[b'/' as usize] = EscapeCode::Entity(Entity::Slash);
    table[b'<' as usize] = EscapeCode::Entity(Entity::Lt);
    table[b'>' as usize] = EscapeCode::Entity(Entity::Gt);

    table
}

const fn fill(mut table: [EscapeCode; 256], from: usize, to: usize, code: EscapeCode) -> [EscapeCode; 256] {
    let mut b = from;
    while b <= to {
        table[b] = code;
        b += 1;
    }
    table
}

const fn build_cp1252_table() -> [EscapeCode; 256] {
    let mut table = ascii_codes();

    // Latin-1 is the same in Unicode, but we escape it numerically anyway.
    table = fill(table, 0x80, 0xff, EscapeCode::Numeric);

    // Map the C1 range to what Windows-1252 puts there.
    table[0x80] = EscapeCode::Entity(Entity::Euro);
    table[0x82] = EscapeCode::Entity(Entity::SingleLowQuote);
    table[0x83] = EscapeCode::Entity(Entity::FHook);
    table[0x84] = EscapeCode::Entity(Entity::DoubleLowQuote);
    table[0x85] = EscapeCode::Entity(Entity::Ellipsis);
    table[0x86] = EscapeCode::Entity(Entity::Dagger);
    table[0x87] = EscapeCode::Entity(Entity::DoubleDagger);
    table[0x88] = EscapeCode::Entity(Entity::Circumflex);
    table[0x89] = EscapeCode::Entity(Entity::PerMille);
    table[0x8a] = EscapeCode::Entity(Entity::CapitalSCaron);
    table[0x8b] = EscapeCode::Entity(Entity::LeftAngleQuote);
    table[0x8c] = EscapeCode::Entity(Entity::CapitalOe);
    table[0x8e] = EscapeCode::Entity(Entity::CapitalZCaron);
    table[0x91] = EscapeCode::Entity(Entity::LeftSingleQuote);
    table[0x92] = EscapeCode::Entity(Entity::RightSingleQuote);
    table[0x93] = EscapeCode::Entity(Entity::LeftDoubleQuote);
    table[0x94] = EscapeCode::Entity(Entity::RightDoubleQuote);
    table[0x95] = EscapeCode::Entity(Entity::Bullet);
    table[0x96] = EscapeCode::Entity(Entity::EnDash);
    table[0x97] = EscapeCode::Entity(Entity::EmDash);
    table[0x98] = EscapeCode::Entity(Entity::SmallTilde);
    table[0x99] = EscapeCode::Entity(Entity::TradeMark);
    table[0x9a] = EscapeCode::Entity(Entity::SmallSCaron);
    table[0x9b] = EscapeCode::Entity(Entity::RightAngleQuote);
    table[0x9c] = EscapeCode::Entity(Entity::SmallOe);
    table[0x9e] = EscapeCode::Entity(Entity::SmallZCaron);
    table[0x9f] = EscapeCode::Entity(Entity::CapitalYDiaeresis);

    table
}

const fn build_utf8_table() -> [EscapeCode; 256] {
    let mut table = ascii_codes();

    // Continuation bytes, invalid as a start of a sequence: 10xxxxxx
    table = fill(table, 0x80, 0xbf, EscapeCode::Numeric);

    table = fill(table, 0xc0, 0xdf, EscapeCode::Sequence(SequenceLength::Two));
    table = fill(table, 0xe0, 0xef, EscapeCode::Sequence(SequenceLength::Three));
    table = fill(table, 0xf0, 0xf7, EscapeCode::Sequence(SequenceLength::Four));
    table = fill(table, 0xf8, 0xfb, EscapeCode::Sequence(SequenceLength::Five));
    table = fill(table, 0xfc, 0xfd, EscapeCode::Sequence(SequenceLength::Six));

    // Never valid: 1111111x
    table = fill(table, 0xfe, 0xff, EscapeCode::Numeric);

    table
}

/// Classification of bytes in Windows-1252 (or Latin-1) text.
pub static CP1252_TABLE: [EscapeCode; 256] = build_cp1252_table();

/// Classification of bytes at the start of an UTF-8 character.
pub static UTF8_TABLE: [EscapeCode; 256] = build_utf8_table();
