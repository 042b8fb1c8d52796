//! WSPR message packing: callsign, grid square and power level in,
//! 162 channel symbols out.

use crate::constants::SYMBOL_COUNT;

mod callsign;
mod channel_symbols;
mod grid;

pub mod encode_error;

pub use encode_error::EncodeError;

/// One complete WSPR transmission worth of 4-FSK symbols, each in 0..=3.
pub type SymbolSequence = [u8; SYMBOL_COUNT];

/// A fully packed WSPR message ready for the keyer.
#[derive(Debug, Clone)]
pub struct WsprMessage {
    pub callsign: String,
    pub grid: String,
    pub power: u8,
    /// Text form `"CALLSIGN GRID POWER"`, used for the telemetry log.
    pub display_string: String,
    pub symbols: SymbolSequence,
}

impl std::fmt::Display for WsprMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_string)
    }
}

/// Encode a callsign, 4-character grid square and power level (dBm) into
/// a WSPR message.
///
/// Validates all three fields; the symbol sequence itself is a pure
/// function of the inputs, so identical inputs always produce identical
/// symbols.
pub fn encode(callsign: &str, grid: &str, power: u8) -> Result<WsprMessage, EncodeError> {
    if power > 60 || !matches!(power % 10, 0 | 3 | 7) {
        return Err(EncodeError::InvalidPower);
    }

    let call_int = callsign::pack(callsign)?;
    let grid_int = grid::pack(grid)?;
    let symbols = channel_symbols::channel_symbols(call_int, grid_int, power);

    let callsign = callsign.trim().to_ascii_uppercase();
    Ok(WsprMessage {
        display_string: format!("{} {} {}", callsign, grid, power),
        callsign,
        grid: grid.to_string(),
        power,
        symbols,
    })
}
