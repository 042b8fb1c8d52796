//! Maidenhead grid locator derivation from a GPS fix.

/// Convert a latitude/longitude pair into a six-character Maidenhead
/// locator (field, square, sub-square).
///
/// Inputs are expected to be normalized (`lat` in [-90, 90], `lon` in
/// [-180, 180]); that is the caller's contract, not checked here. The
/// first four characters are the coarse square fed to the WSPR encoder,
/// the last two are the sub-square used by the telemetry codec.
pub fn locate(lat_deg: f64, lon_deg: f64) -> String {
    let mut chars = [' '; 6];

    // Field: 20 degree longitude bands, 10 degree latitude bands.
    chars[0] = (b'A' + ((lon_deg + 180.0) / 20.0) as u8) as char;
    chars[1] = (b'A' + ((lat_deg + 90.0) / 10.0) as u8) as char;

    // Square: 2 degree longitude, 1 degree latitude.
    chars[2] = (b'0' + (lon_deg.rem_euclid(20.0) / 2.0) as u8) as char;
    chars[3] = (b'0' + lat_deg.rem_euclid(10.0) as u8) as char;

    // Sub-square: 5 arc-minute longitude, 2.5 arc-minute latitude.
    chars[4] = (b'a' + (lon_deg.rem_euclid(2.0) / 2.0 * 24.0) as u8) as char;
    chars[5] = (b'a' + (lat_deg.rem_euclid(1.0) * 24.0) as u8) as char;

    chars.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_locations() {
        assert_eq!(locate(34.0522, -118.2437), "DM04vb");
        assert_eq!(locate(0.0, 0.0), "JJ00aa");
        assert_eq!(locate(-33.8688, 151.2093), "QF56od");
        assert_eq!(locate(51.4779, -0.0015), "IO91xl");
        assert_eq!(locate(-77.85, 166.67), "RB32id");
    }

    #[test]
    fn output_stays_inside_locator_alphabet() {
        let mut lat = -89.9;
        while lat < 90.0 {
            let mut lon = -179.9;
            while lon < 180.0 {
                let gs = locate(lat, lon);
                let b = gs.as_bytes();
                assert_eq!(b.len(), 6, "{gs}");
                assert!((b'A'..=b'R').contains(&b[0]), "{gs}");
                assert!((b'A'..=b'R').contains(&b[1]), "{gs}");
                assert!(b[2].is_ascii_digit() && b[3].is_ascii_digit(), "{gs}");
                assert!((b'a'..=b'x').contains(&b[4]), "{gs}");
                assert!((b'a'..=b'x').contains(&b[5]), "{gs}");
                lon += 7.3;
            }
            lat += 3.7;
        }
    }
}
