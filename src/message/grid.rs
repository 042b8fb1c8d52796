//! 15-bit packing of the 4-character Maidenhead square.

use super::encode_error::EncodeError;

/// Pack a 4-character grid square into its 15-bit WSPR integer.
///
/// The letters must be in A-R and the digits 0-9; anything else is a
/// malformed locator.
pub(crate) fn pack(grid: &str) -> Result<u32, EncodeError> {
    let b = grid.as_bytes();
    if b.len() != 4 {
        return Err(EncodeError::InvalidGrid);
    }
    if !(b'A'..=b'R').contains(&b[0]) || !(b'A'..=b'R').contains(&b[1]) {
        return Err(EncodeError::InvalidGrid);
    }
    if !b[2].is_ascii_digit() || !b[3].is_ascii_digit() {
        return Err(EncodeError::InvalidGrid);
    }

    let lon_field = (b[0] - b'A') as u32;
    let lat_field = (b[1] - b'A') as u32;
    let lon_digit = (b[2] - b'0') as u32;
    let lat_digit = (b[3] - b'0') as u32;

    Ok((179 - 10 * lon_field - lon_digit) * 180 + 10 * lat_field + lat_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_known_squares() {
        // DM03: (179 - 30 - 0) * 180 + 120 + 3
        assert_eq!(pack("DM03").unwrap(), 149 * 180 + 123);
        // AA00 is the far corner of the grid
        assert_eq!(pack("AA00").unwrap(), 179 * 180);
    }

    #[test]
    fn stays_within_15_bits() {
        for g in ["AA00", "RR99", "JJ00", "DM03", "FN42"] {
            assert!(pack(g).unwrap() < (1 << 15));
        }
    }

    #[test]
    fn rejects_malformed_locators() {
        assert_eq!(pack("DM0"), Err(EncodeError::InvalidGrid));
        assert_eq!(pack("DMAB"), Err(EncodeError::InvalidGrid));
        assert_eq!(pack("dm03"), Err(EncodeError::InvalidGrid));
        assert_eq!(pack("SA00"), Err(EncodeError::InvalidGrid));
    }
}
