//! Transmission scheduling: a state machine that aligns telemetry
//! collection and WSPR transmissions to GPS time and the PPS edge.
//!
//! The scheduler owns its collaborators (fix source, sensor source, and
//! the keyer holding the radio) and is driven by calling [`Scheduler::tick`]
//! from a polling loop. Each tick performs at most one state transition.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use snafu::Snafu;
use tracing::{info, trace, warn};

use crate::config::{Config, TelemetryMode};
use crate::constants::BEACON_POWER_DBM;
use crate::keyer::{RadioDriver, SharedKeyer, ToneClock};
use crate::locator;
use crate::message::{self, EncodeError, WsprMessage};
use crate::telemetry_log::LogSink;
use crate::u4b;

/// Latest position fix from a GPGGA sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionFix {
    /// UTC time of day as HHMMSS.
    pub t_utc: f64,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
    pub satellites: u32,
}

/// Latest course fix from a GPRMC sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseFix {
    /// UTC time of day as HHMMSS.
    pub t_utc: f64,
    /// UTC date as DDMMYY.
    pub date_utc: u32,
    pub groundspeed_kn: f64,
}

/// Provider of parsed GPS fixes. May block until the next sentence of
/// the right type arrives; returns stale or default data before the
/// first match.
pub trait FixSource {
    fn position_fix(&mut self) -> PositionFix;
    fn course_fix(&mut self) -> CourseFix;
}

/// One reading of the environmental sensors and the analog rails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSample {
    pub temp_c: f64,
    pub pressure_mbar: f64,
    pub v_in: f64,
    pub v_solar: f64,
    pub light_front: f64,
    pub light_back: f64,
}

/// Transient sensor read failure; the previous reading is kept.
#[derive(Debug, Snafu)]
#[snafu(display("transient sensor read failure"))]
pub struct SensorError;

pub trait SensorSource {
    fn sample(&mut self) -> Result<SensorSample, SensorError>;
}

/// Snapshot of everything that goes into a telemetry frame. Overwritten
/// wholesale each collection cycle, never field by field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryRecord {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
    pub satellites: u32,
    pub t_utc: f64,
    pub groundspeed_kn: f64,
    pub temp_c: f64,
    pub pressure_mbar: f64,
    pub v_in: f64,
    pub v_solar: f64,
    pub light_front: f64,
    pub light_back: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Init,
    WaitForTime,
    WaitForFix,
    CollectTelemetry,
    WaitForTransmit,
    AwaitPps,
    Transmitting,
}

/// Satellite count at or above which the GPS is reported healthy in the
/// telemetry stream.
const HEALTHY_SATELLITES: u32 = 8;

/// The measured solar rail sits below the window U4B expects; shift it
/// up before encoding.
const SOLAR_RAIL_OFFSET_V: f64 = 2.0;

pub struct Scheduler<F: FixSource, S: SensorSource, R: RadioDriver> {
    state: SchedulerState,
    fix_source: F,
    sensors: S,
    keyer: SharedKeyer<R>,
    tone_clock: Box<dyn ToneClock>,
    log_sink: Option<Box<dyn LogSink>>,

    callsign: String,
    telemetry_call: String,
    telemetry_mode: TelemetryMode,
    /// 0-indexed minute-of-hour slot (mod 10) for telemetry frames.
    telemetry_slot: u32,

    pps: Arc<AtomicU32>,
    pps_base: u32,
    last_pps: u32,

    telemetry: TelemetryRecord,
    pending: Option<WsprMessage>,
}

impl<F: FixSource, S: SensorSource, R: RadioDriver> Scheduler<F, S, R> {
    /// Build a scheduler from a validated configuration.
    ///
    /// The callsign and telemetry channel are checked here so that no
    /// encode call can fail once the state machine is running; a bad
    /// config is fatal before the first tick.
    pub fn new(
        config: &Config,
        fix_source: F,
        sensors: S,
        keyer: SharedKeyer<R>,
        tone_clock: Box<dyn ToneClock>,
        pps: Arc<AtomicU32>,
        log_sink: Option<Box<dyn LogSink>>,
    ) -> Result<Self, EncodeError> {
        message::encode(&config.callsign, "AA00", BEACON_POWER_DBM)?;
        if config.telemetry_mode == TelemetryMode::U4b {
            u4b::validate_channel(&config.telemetry_call)?;
        }

        Ok(Scheduler {
            state: SchedulerState::Init,
            fix_source,
            sensors,
            keyer,
            tone_clock,
            log_sink,
            callsign: config.callsign.clone(),
            telemetry_call: config.telemetry_call.clone(),
            telemetry_mode: config.telemetry_mode,
            telemetry_slot: config.telemetry_slot(),
            pps,
            pps_base: 0,
            last_pps: 0,
            telemetry: TelemetryRecord::default(),
            pending: None,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn telemetry(&self) -> &TelemetryRecord {
        &self.telemetry
    }

    /// PPS edges observed since the state machine was reset.
    fn pps_edges(&self) -> u32 {
        self.pps.load(Ordering::Relaxed).wrapping_sub(self.pps_base)
    }

    /// Advance the state machine by at most one transition.
    ///
    /// Errors can only come out of message encoding, which is fully
    /// validated at construction; a transient fix or sensor problem
    /// leaves the state unchanged and is retried on the next call.
    pub fn tick(&mut self) -> Result<SchedulerState, EncodeError> {
        let entered = self.state;

        match self.state {
            SchedulerState::Init => {
                self.pps_base = self.pps.load(Ordering::Relaxed);
                self.state = SchedulerState::WaitForTime;
            }

            SchedulerState::WaitForTime => {
                let fix = self.fix_source.position_fix();
                trace!(t_utc = fix.t_utc, satellites = fix.satellites, "waiting for time");
                // Once reported time outruns the PPS count the receiver is
                // producing both a live PPS and advancing time.
                if fix.t_utc > (self.pps_edges() + 10) as f64 && fix.satellites > 0 {
                    self.state = SchedulerState::WaitForFix;
                }
            }

            SchedulerState::WaitForFix => {
                let fix = self.fix_source.position_fix();
                trace!(satellites = fix.satellites, "waiting for fix");
                if fix.lat_deg as i64 != 0 || fix.lon_deg as i64 != 0 {
                    self.keyer.lock().unwrap().configure();
                    self.state = SchedulerState::CollectTelemetry;
                }
            }

            SchedulerState::CollectTelemetry => {
                let course = self.fix_source.course_fix();
                let message = self.build_message(&course)?;
                info!(text = %message.display_string, "message built");

                if let Some(sink) = self.log_sink.as_mut() {
                    sink.append(course.date_utc, course.t_utc, &message.display_string);
                }

                self.pending = Some(message);
                self.state = SchedulerState::WaitForTransmit;
            }

            SchedulerState::WaitForTransmit => {
                let fix = self.fix_source.position_fix();
                if fix.lat_deg as i64 == 0 && fix.lon_deg as i64 == 0 {
                    warn!("fix lost, message discarded");
                    self.pending = None;
                    self.state = SchedulerState::WaitForFix;
                } else {
                    // WSPR transmissions begin on even minutes; arm during
                    // the last second of the preceding odd minute so the
                    // first symbol leaves on the next PPS edge.
                    let t = fix.t_utc as u32;
                    if (t / 100) % 2 == 1 && t % 100 == 59 {
                        self.state = SchedulerState::AwaitPps;
                    }
                }
            }

            SchedulerState::AwaitPps => {
                if self.pps_edges() != self.last_pps {
                    match self.pending.take() {
                        Some(message) => {
                            self.keyer.lock().unwrap().arm(message.symbols);
                            self.tone_clock.start();
                            self.state = SchedulerState::Transmitting;
                        }
                        None => self.state = SchedulerState::CollectTelemetry,
                    }
                }
            }

            SchedulerState::Transmitting => {
                if self.keyer.lock().unwrap().is_idle() {
                    self.tone_clock.stop();
                    self.state = SchedulerState::CollectTelemetry;
                }
            }
        }

        self.last_pps = self.pps_edges();
        if self.state != entered {
            info!(from = ?entered, to = ?self.state, pps = self.last_pps, "state transition");
        }
        Ok(self.state)
    }

    /// Build the message for this cycle: a plain beacon, or a U4B frame
    /// when the minute-of-hour (mod 10) lands on the telemetry slot.
    fn build_message(&mut self, course: &CourseFix) -> Result<WsprMessage, EncodeError> {
        let minute_slot = (course.t_utc as u32 / 100) % 10;
        let telemetry_cycle =
            self.telemetry_mode == TelemetryMode::U4b && minute_slot == self.telemetry_slot;

        if !telemetry_cycle {
            // Refresh telemetry only on beacon cycles so a moving fix
            // cannot change between the two frames of one U4B pair.
            self.update_telemetry();
            let grid = locator::locate(self.telemetry.lat_deg, self.telemetry.lon_deg);
            return message::encode(&self.callsign, &grid[..4], BEACON_POWER_DBM);
        }

        // First telemetry frame after a cold start: nothing sampled yet.
        if self.telemetry.v_solar == 0.0 && self.telemetry.v_in == 0.0 {
            self.update_telemetry();
        }

        let grid = locator::locate(self.telemetry.lat_deg, self.telemetry.lon_deg);
        let gps_health = self.telemetry.satellites >= HEALTHY_SATELLITES;
        // Whichever face reads brighter tells us which way the tracker
        // hangs; it goes out in the U4B GPS-valid flag slot.
        let orientation = self.telemetry.light_front >= self.telemetry.light_back;

        let pseudo_call = u4b::encode_callsign(
            &self.telemetry_call,
            &grid[4..],
            self.telemetry.alt_m as u32,
        )?;
        let (telem_grid, telem_power) = u4b::encode_engineering(
            self.telemetry.temp_c as i32,
            self.telemetry.v_solar + SOLAR_RAIL_OFFSET_V,
            self.telemetry.groundspeed_kn,
            orientation,
            gps_health,
        );

        message::encode(&pseudo_call, &telem_grid, telem_power)
    }

    /// Overwrite the telemetry snapshot from all sources. A failed sensor
    /// read keeps the previous environmental values; the fix fields are
    /// always refreshed.
    fn update_telemetry(&mut self) {
        let position = self.fix_source.position_fix();
        let course = self.fix_source.course_fix();

        let sensors = match self.sensors.sample() {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "sensor read failed, keeping previous values");
                SensorSample {
                    temp_c: self.telemetry.temp_c,
                    pressure_mbar: self.telemetry.pressure_mbar,
                    v_in: self.telemetry.v_in,
                    v_solar: self.telemetry.v_solar,
                    light_front: self.telemetry.light_front,
                    light_back: self.telemetry.light_back,
                }
            }
        };

        self.telemetry = TelemetryRecord {
            lat_deg: position.lat_deg,
            lon_deg: position.lon_deg,
            alt_m: position.alt_m,
            satellites: position.satellites,
            t_utc: position.t_utc,
            groundspeed_kn: course.groundspeed_kn,
            temp_c: sensors.temp_c,
            pressure_mbar: sensors.pressure_mbar,
            v_in: sensors.v_in,
            v_solar: sensors.v_solar,
            light_front: sensors.light_front,
            light_back: sensors.light_back,
        };
        trace!(telemetry = ?self.telemetry, "telemetry updated");
    }
}
