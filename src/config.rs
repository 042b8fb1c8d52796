//! Static beacon configuration, loaded once from a JSON file before the
//! scheduler starts.

use std::path::Path;

use serde::Deserialize;
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("could not read config file: {source}"))]
    Read { source: std::io::Error },

    #[snafu(display("could not parse config file: {source}"))]
    Parse { source: serde_json::Error },
}

/// Which message family the beacon alternates into on its telemetry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TelemetryMode {
    /// Plain beacon every cycle.
    #[serde(rename = "WSPR")]
    Wspr,
    /// U4B telemetry frames on the configured minute slot.
    #[serde(rename = "U4B")]
    U4b,
}

/// One or several transmit frequency offsets. With a list, the keyer
/// rotates through the entries, one per transmission.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Offsets {
    Single(f64),
    List(Vec<f64>),
}

impl Offsets {
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Offsets::Single(v) => vec![*v],
            Offsets::List(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Board hardware revision, used by the front end for pin mapping.
    pub version: String,
    pub callsign: String,
    /// WSPR dial frequency in Hz; handed to the radio driver, not used
    /// by the core.
    pub wspr_band: u64,
    pub wspr_offsets: Offsets,
    /// Synthesizer correction in parts per million.
    pub tx_correction: i32,
    pub telemetry_mode: TelemetryMode,
    /// U4B channel designator ('Q' or '0' plus digit).
    pub telemetry_call: String,
    /// 1-indexed minute-of-hour slot (mod 10) for telemetry frames;
    /// 0 selects the default slot.
    pub telemetry_minute: u32,
    pub log_to_file: bool,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).context(ReadSnafu)?;
        serde_json::from_str(&text).context(ParseSnafu)
    }

    /// The telemetry minute slot as stored internally (0-indexed,
    /// defaulting to the last slot of the cycle).
    pub fn telemetry_slot(&self) -> u32 {
        if self.telemetry_minute > 0 {
            self.telemetry_minute - 1
        } else {
            9
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "version": "1.1",
        "callsign": "W6NXP",
        "wspr_band": 14095600,
        "wspr_offsets": [1450.0, 1475.0],
        "tx_correction": -3,
        "telemetry_mode": "U4B",
        "telemetry_call": "Q5",
        "telemetry_minute": 10,
        "log_to_file": false
    }"#;

    #[test]
    fn parses_a_full_config() {
        let cfg: Config = serde_json::from_str(EXAMPLE).unwrap();
        assert_eq!(cfg.callsign, "W6NXP");
        assert_eq!(cfg.telemetry_mode, TelemetryMode::U4b);
        assert_eq!(cfg.wspr_offsets.to_vec(), vec![1450.0, 1475.0]);
        assert_eq!(cfg.telemetry_slot(), 9);
    }

    #[test]
    fn scalar_offset_is_accepted() {
        let cfg: Config =
            serde_json::from_str(&EXAMPLE.replace("[1450.0, 1475.0]", "1450.0")).unwrap();
        assert_eq!(cfg.wspr_offsets.to_vec(), vec![1450.0]);
    }

    #[test]
    fn telemetry_minute_zero_selects_the_last_slot() {
        let cfg: Config =
            serde_json::from_str(&EXAMPLE.replace("\"telemetry_minute\": 10", "\"telemetry_minute\": 0")).unwrap();
        assert_eq!(cfg.telemetry_slot(), 9);
        let cfg: Config =
            serde_json::from_str(&EXAMPLE.replace("\"telemetry_minute\": 10", "\"telemetry_minute\": 3")).unwrap();
        assert_eq!(cfg.telemetry_slot(), 2);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(serde_json::from_str::<Config>(&EXAMPLE.replace("U4B", "FT8")).is_err());
    }
}
