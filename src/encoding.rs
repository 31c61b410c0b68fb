//! Session text encodings negotiable via the CHARSET option.
//!
//! Sessions start in 7-bit US-ASCII and switch atomically when a CHARSET
//! subnegotiation completes. Decoding is lossy: undecodable sequences
//! become U+FFFD, unencodable characters become `?`, matching the usual
//! MUD-world behaviour of degrading rather than disconnecting.

/// A text encoding the engine can negotiate and convert.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum TextEncoding {
    /// 7-bit ASCII, the initial session encoding.
    #[default]
    UsAscii,
    /// ISO-8859-1.
    Latin1,
    Utf8,
    /// UTF-16, little-endian.
    Utf16,
    Utf16Be,
    /// UTF-32, little-endian.
    Utf32,
    Utf32Be,
}

impl TextEncoding {
    /// All encodings, in the order a server advertises them by default.
    pub const ALL: [TextEncoding; 7] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Utf16,
        TextEncoding::Utf16Be,
        TextEncoding::Utf32,
        TextEncoding::Utf32Be,
        TextEncoding::UsAscii,
    ];

    /// The canonical charset name used on the wire.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::UsAscii => "us-ascii",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Utf16Be => "utf-16BE",
            TextEncoding::Utf32 => "utf-32",
            TextEncoding::Utf32Be => "utf-32BE",
        }
    }

    /// Case-insensitive lookup by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<TextEncoding> {
        let name = name.trim();
        TextEncoding::ALL
            .into_iter()
            .find(|enc| enc.name().eq_ignore_ascii_case(name))
    }

    /// Encode text into this encoding's bytes.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::UsAscii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
                .collect(),
            TextEncoding::Utf16 => text
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect(),
            TextEncoding::Utf16Be => text
                .encode_utf16()
                .flat_map(u16::to_be_bytes)
                .collect(),
            TextEncoding::Utf32 => text
                .chars()
                .flat_map(|c| (c as u32).to_le_bytes())
                .collect(),
            TextEncoding::Utf32Be => text
                .chars()
                .flat_map(|c| (c as u32).to_be_bytes())
                .collect(),
        }
    }

    /// Decode bytes in this encoding into text, lossily.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::UsAscii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '\u{FFFD}' })
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Utf16 => decode_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            TextEncoding::Utf32 => decode_utf32(bytes, u32::from_le_bytes),
            TextEncoding::Utf32Be => decode_utf32(bytes, u32::from_be_bytes),
        }
    }
}

fn decode_utf16(bytes: &[u8], unpack: fn([u8; 2]) -> u16) -> String {
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unpack([pair[0], pair[1]]))
        .collect();
    if bytes.len() % 2 != 0 {
        units.push(0xFFFD);
    }
    String::from_utf16_lossy(&units)
}

fn decode_utf32(bytes: &[u8], unpack: fn([u8; 4]) -> u32) -> String {
    let mut out: String = bytes
        .chunks_exact(4)
        .map(|quad| {
            char::from_u32(unpack([quad[0], quad[1], quad[2], quad[3]])).unwrap_or('\u{FFFD}')
        })
        .collect();
    if bytes.len() % 4 != 0 {
        out.push('\u{FFFD}');
    }
    out
}
