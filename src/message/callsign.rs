//! Callsign normalization and 28-bit packing.
//!
//! WSPR packs a callsign of up to six characters into 28 bits using a
//! positional mixed-radix scheme: the first two positions take the full
//! digit/letter/space alphabet, the third must be a digit, and the last
//! three take letters or space only.

use super::encode_error::EncodeError;

/// Character value in the WSPR alphabet: digits map to 0-9, letters to
/// 10-35, space to 36.
fn wspr_char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        ' ' => Some(36),
        _ => None,
    }
}

/// Normalize a callsign into the canonical 6-character WSPR form:
/// left-padded with spaces until the third character is a digit, then
/// right-padded with spaces to exactly six characters.
pub(crate) fn normalize(callsign: &str) -> Result<String, EncodeError> {
    let mut chars: Vec<char> = callsign.trim().to_ascii_uppercase().chars().collect();

    let mut prepended = 0;
    loop {
        match chars.get(2) {
            Some(c) if c.is_ascii_digit() => break,
            _ => {
                // At most two prepends can move a digit into position 2;
                // beyond that the callsign has no digit where WSPR needs one.
                if prepended == 2 {
                    return Err(EncodeError::InvalidCallsign);
                }
                chars.insert(0, ' ');
                prepended += 1;
            }
        }
    }

    while chars.len() < 6 {
        chars.push(' ');
    }
    if chars.len() != 6 {
        return Err(EncodeError::InvalidCallsign);
    }

    Ok(chars.into_iter().collect())
}

/// Pack a callsign into its 28-bit WSPR integer.
pub(crate) fn pack(callsign: &str) -> Result<u32, EncodeError> {
    let normalized = normalize(callsign)?;

    let mut call_int: u32 = 0;
    for (i, c) in normalized.chars().enumerate() {
        let v = wspr_char_value(c).ok_or(EncodeError::InvalidCallsign)?;
        call_int = match i {
            0 => v,
            1 => call_int * 36 + v,
            2 => call_int * 10 + v,
            _ => {
                // Suffix positions are base 27 (letters plus space); a digit
                // here would underflow the -10 offset.
                if v < 10 {
                    return Err(EncodeError::InvalidCallsign);
                }
                call_int * 27 + v - 10
            }
        };
    }

    Ok(call_int)
}
