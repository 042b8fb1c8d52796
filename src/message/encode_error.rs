use snafu::Snafu;

/// Validation failures raised while packing a message for transmission.
///
/// These are construction-time errors: the offending encode call fails and
/// nothing is transmitted. Inputs are never coerced into a valid range.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum EncodeError {
    /// Callsign cannot be normalized into the 6-character WSPR form
    #[snafu(display("callsign cannot be packed into a WSPR message"))]
    InvalidCallsign,

    /// Power level is outside the WSPR power table
    #[snafu(display("power must be 0-60 dBm ending in 0, 3 or 7"))]
    InvalidPower,

    /// Telemetry channel designator is not of the form Q# or 0#
    #[snafu(display("telemetry channel must be 'Q' or '0' followed by a digit"))]
    InvalidChannel,

    /// Grid locator contains characters outside the Maidenhead alphabet
    #[snafu(display("grid locator is not a valid Maidenhead square"))]
    InvalidGrid,
}
