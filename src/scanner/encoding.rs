//! Text decoding for scanned files
//!
//! Tries UTF-8, then ISO-8859-1, then Windows-1252. ISO-8859-1 is first
//! applied strictly: bytes in the C1 control range 0x80-0x9F are rejected
//! there so that Windows-1252 punctuation (smart quotes, euro sign) decodes
//! correctly. Bytes Windows-1252 leaves undefined fall through to a final
//! ISO-8859-1 pass that maps every byte, so decoding never fails.

/// Windows-1252 mapping for 0x80..=0x9F; `None` marks undefined bytes
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Encoding that successfully decoded a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
    /// ISO-8859-1 with C1 controls kept as-is
    Latin1Permissive,
}

fn is_c1(byte: u8) -> bool {
    (0x80..=0x9F).contains(&byte)
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| is_c1(*b)) {
        return None;
    }
    Some(bytes.iter().map(|b| char::from(*b)).collect())
}

fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|b| {
            if is_c1(*b) {
                CP1252_HIGH[usize::from(*b - 0x80)]
            } else {
                Some(char::from(*b))
            }
        })
        .collect()
}

/// Decode bytes with the fallback chain
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), TextEncoding::Utf8);
    }
    if let Some(text) = decode_latin1(bytes) {
        return (text, TextEncoding::Latin1);
    }
    if let Some(text) = decode_cp1252(bytes) {
        return (text, TextEncoding::Windows1252);
    }
    let text = bytes.iter().map(|b| char::from(*b)).collect();
    (text, TextEncoding::Latin1Permissive)
}
