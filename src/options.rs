//! Configuration of the escaping, as it would appear in the configuration of a renderer.

use serde::Deserialize;

use crate::cp1252::escape_xml_cp1252;
use crate::sink::EscapeSink;
use crate::utf8::escape_xml_utf8;

/// Encoding the input is expected to be in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum InputEncoding {
    /// UTF-8, possibly falling back to Windows-1252 (see [`EscapeOptions::fallback_to_cp1252`])
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,

    /// Windows-1252, also good for Latin-1 and ASCII
    #[serde(rename = "windows-1252", alias = "cp1252")]
    Windows1252,
}

impl Default for InputEncoding {
    fn default() -> Self {
        InputEncoding::Utf8
    }
}

/// How to escape
///
/// Missing fields are taken from `EscapeOptions::default()`, which is what [`crate::escape_xml`]
/// does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct EscapeOptions {
    /// Encoding of the input
    pub encoding: InputEncoding,

    /// When UTF-8 input turns out to be invalid, escape it again as Windows-1252 instead of writing
    /// the `*` placeholder. Ignored for Windows-1252 input.
    pub fallback_to_cp1252: bool,
}

impl Default for EscapeOptions {
    fn default() -> Self {
        Self {
            encoding: InputEncoding::Utf8,
            fallback_to_cp1252: true,
        }
    }
}

impl EscapeOptions {
    /// Options for input known to be Windows-1252.
    pub fn cp1252() -> Self {
        Self {
            encoding: InputEncoding::Windows1252,
            fallback_to_cp1252: false,
        }
    }

    /// Escape `src` into `sink` the way these options say.
    pub fn escape<S: EscapeSink + ?Sized>(&self, sink: &mut S, src: &[u8]) {
        match self.encoding {
            InputEncoding::Utf8 => escape_xml_utf8(sink, src, self.fallback_to_cp1252),
            InputEncoding::Windows1252 => escape_xml_cp1252(sink, src),
        }
    }
}
