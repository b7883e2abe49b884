//! Map payloads saved by the editor start with a one character compression
//! level. Level 3 stores the level 2 integer array as raw big-endian `u16`s;
//! clients only understand levels up to 2, so level 3 is unpacked on load.

pub const PACKED_LEVEL: u8 = b'3';
pub const JSON_LEVEL: u8 = b'2';

pub fn is_packed(data: &[u8]) -> bool {
    data.first() == Some(&PACKED_LEVEL)
}

/// Decodes the big-endian `u16` words after the level marker. A trailing odd
/// byte is ignored.
pub fn unpack_words(packed: &[u8]) -> Vec<u16> {
    packed
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Turns a stored map into what clients expect. Packed maps become `2`
/// followed by a JSON array; anything else is returned untouched.
pub fn to_client_format(data: Vec<u8>) -> Result<Vec<u8>, serde_json::Error> {
    if !is_packed(&data) {
        return Ok(data);
    }
    let words = unpack_words(&data[1..]);
    let mut out = vec![JSON_LEVEL];
    serde_json::to_writer(&mut out, &words)?;
    Ok(out)
}
